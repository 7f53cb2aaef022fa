use std::num::NonZeroU32;
use std::sync::Arc;

use color_eyre::Result;
use color_eyre::eyre::Context;
use governor::{
    Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::direct::NotKeyed,
};
use reqwest::Client;

use super::types::OdesliResponse;
use crate::config::Config;
use crate::links::Resolution;
use crate::ports::link_resolver::LinkResolver;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

#[derive(Debug, thiserror::Error)]
pub enum OdesliError {
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Odesli returned status {0}")]
    UnexpectedStatus(reqwest::StatusCode),
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}

/// song.link / Odesli client.
pub struct OdesliClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    accept_language: String,
    rate_limiter: Option<Arc<DirectRateLimiter>>,
}

impl OdesliClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.odesli_timeout()?)
            .build()
            .wrap_err("Failed to build Odesli http client")?;

        let rate_limiter = NonZeroU32::new(config.odesli.requests_per_minute)
            .map(|per_minute| Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))));

        let country = config.country_code();
        let language = config.language.to_lowercase();
        Ok(Self {
            client,
            endpoint: config.odesli.endpoint.clone(),
            api_key: config.odesli.api_key.clone(),
            accept_language: format!("{language}-{country},{language};q=0.9,en;q=0.8"),
            rate_limiter,
        })
    }

    /// One request, no retries.
    pub async fn fetch(&self, url: &str, country: &str) -> Result<OdesliResponse, OdesliError> {
        if let Some(limiter) = &self.rate_limiter {
            tracing::trace!("Waiting for Odesli rate limiter");
            limiter.until_ready().await;
        }

        let mut query = vec![("url", url), ("userCountry", country)];
        if let Some(key) = &self.api_key {
            query.push(("key", key.as_str()));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .header(reqwest::header::ACCEPT_LANGUAGE, &self.accept_language)
            .send()
            .await
            .map_err(OdesliError::FailedToSendRequest)?;

        if !response.status().is_success() {
            return Err(OdesliError::UnexpectedStatus(response.status()));
        }

        response
            .json::<OdesliResponse>()
            .await
            .map_err(OdesliError::FailedToParseResponse)
    }
}

#[async_trait::async_trait]
impl LinkResolver for OdesliClient {
    #[tracing::instrument(skip(self))]
    async fn resolve(&self, url: &str, country: &str) -> Resolution {
        match self.fetch(url, country).await {
            Ok(response) => {
                let resolution = response.into_resolution(country);
                if let Resolution::Resolved(resolved) = &resolution {
                    tracing::debug!(
                        platforms = resolved.links.len(),
                        kind = ?resolved.metadata.kind,
                        "Odesli resolution complete"
                    );
                }
                resolution
            }
            Err(error) => {
                tracing::warn!(%error, "Odesli lookup failed");
                Resolution::Unavailable
            }
        }
    }
}
