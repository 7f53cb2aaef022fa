use color_eyre::Result;
use color_eyre::eyre::Context;
use reqwest::Client;

use crate::config::Config;
use crate::ports::page_fetcher::{FetchError, PageFetcher};

/// Plain GET with a browser user agent; track pages serve stripped markup otherwise.
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.scrape.user_agent.clone())
            .timeout(config.scrape_timeout()?)
            .build()
            .wrap_err("Failed to build scraping http client")?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::FailedToSendRequest)?;

        if !response.status().is_success() {
            return Err(FetchError::UnexpectedStatus {
                url: url.to_string(),
                status: response.status(),
            });
        }

        response.text().await.map_err(FetchError::FailedToReadBody)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        Router,
        http::{HeaderMap, StatusCode, header},
        routing::get,
    };

    use super::*;
    use crate::test_utils::serve_locally;

    async fn fetcher_for(router: Router, timeout: &str) -> (HttpPageFetcher, String) {
        let base = serve_locally(router).await;
        let mut config = Config::default();
        config.scrape.timeout = timeout.to_string();
        (HttpPageFetcher::new(&config).unwrap(), base)
    }

    #[tokio::test]
    async fn test_returns_body_and_sends_user_agent() {
        let router = Router::new().route(
            "/track",
            get(|headers: HeaderMap| async move {
                let agent = headers
                    .get(header::USER_AGENT)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                format!("<html>{agent}</html>")
            }),
        );
        let (fetcher, base) = fetcher_for(router, "2s").await;

        let html = fetcher.fetch_html(&format!("{base}/track")).await.unwrap();
        assert_eq!(html, "<html>Mozilla/5.0</html>");
    }

    #[tokio::test]
    async fn test_forbidden_is_unexpected_status() {
        let router = Router::new().route(
            "/track",
            get(|| async { (StatusCode::FORBIDDEN, "denied") }),
        );
        let (fetcher, base) = fetcher_for(router, "2s").await;
        let url = format!("{base}/track");

        match fetcher.fetch_html(&url).await {
            Err(FetchError::UnexpectedStatus { url: failed, status }) => {
                assert_eq!(failed, url);
                assert_eq!(status, StatusCode::FORBIDDEN);
            }
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_page_times_out() {
        let router = Router::new().route(
            "/track",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                "<html></html>"
            }),
        );
        let (fetcher, base) = fetcher_for(router, "50ms").await;

        assert!(matches!(
            fetcher.fetch_html(&format!("{base}/track")).await,
            Err(FetchError::FailedToSendRequest(error)) if error.is_timeout()
        ));
    }
}
