use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use color_eyre::eyre::Context;
use serde::{Deserialize, Serialize};

use crate::http_server::error::{Report, unprocessable};
use crate::http_server::state::AppState;
use crate::services::relay::Reply;

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub replies: Vec<Reply>,
}

#[derive(Debug, Deserialize)]
pub struct InlineRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct InlineResponse {
    pub reply: Option<Reply>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    pub data: String,
}

/// Runs the flow on its own task; a panic there is answered with a 500.
pub async fn post_message(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<MessageRequest>,
) -> Result<Response, Report> {
    if request.text.trim().is_empty() {
        return Ok(unprocessable("text must not be empty"));
    }

    let replies =
        tokio::spawn(async move { app_state.relay.handle_message(&request.text).await })
            .await
            .wrap_err("Message handler failed")?;
    Ok(Json(MessageResponse { replies }).into_response())
}

pub async fn post_inline(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<InlineRequest>,
) -> Result<Response, Report> {
    let reply =
        tokio::spawn(async move { app_state.relay.handle_inline_query(&request.query).await })
            .await
            .wrap_err("Inline query handler failed")?;
    Ok(Json(InlineResponse { reply }).into_response())
}

pub async fn post_callback(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<CallbackRequest>,
) -> Response {
    Json(app_state.relay.handle_callback(&request.data)).into_response()
}
