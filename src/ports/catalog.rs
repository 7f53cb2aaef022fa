#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Catalog search returned status {0}")]
    UnexpectedStatus(reqwest::StatusCode),
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}

/// Port for the song catalog used to seed setlist resolutions.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SongCatalog: Send + Sync {
    /// Returns a track URL on a resolvable platform for a free-text
    /// `artist title` query, or `None` when nothing matched.
    async fn find_track_url(&self, query: &str) -> Result<Option<String>, CatalogError>;
}
