#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Failed to read response body: {0}")]
    FailedToReadBody(reqwest::Error),
}

/// Port for downloading third-party HTML pages that album links are scraped from.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}
