use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum SetlistError {
    #[error("No setlist.fm API key configured")]
    MissingApiKey,
    #[error("Setlist {0} not found")]
    NotFound(String),
    #[error("Failed to send http request: {0}")]
    FailedToSendRequest(reqwest::Error),
    #[error("Setlist provider returned status {0}")]
    UnexpectedStatus(reqwest::StatusCode),
    #[error("Failed to parse response: {0}")]
    FailedToParseResponse(reqwest::Error),
}

/// Event metadata shown above a resolved setlist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetlistMeta {
    pub artist: String,
    pub venue: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetlistSong {
    pub title: String,
    /// Intro/outro tapes played over the PA.
    pub is_tape: bool,
    /// Song written by another artist.
    pub is_cover: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setlist {
    pub id: String,
    pub meta: SetlistMeta,
    /// Songs of every set in performance order.
    pub songs: Vec<SetlistSong>,
}

impl Setlist {
    /// Titles worth resolving: no tapes, no covers, no blank names.
    pub fn playable_titles(&self) -> Vec<String> {
        self.songs
            .iter()
            .filter(|song| !song.is_tape && !song.is_cover)
            .map(|song| song.title.trim())
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Port for the setlist metadata provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SetlistProvider: Send + Sync {
    async fn fetch_setlist(&self, setlist_id: &str) -> Result<Setlist, SetlistError>;
}
