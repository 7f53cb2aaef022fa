use chrono::NaiveDate;
use color_eyre::Result;
use color_eyre::eyre::Context;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::Config;
use crate::ports::setlist::{Setlist, SetlistError, SetlistMeta, SetlistProvider, SetlistSong};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetlistResponse {
    id: String,
    event_date: Option<String>,
    artist: Named,
    venue: Option<Venue>,
    #[serde(default)]
    sets: Sets,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Venue {
    name: Option<String>,
    city: Option<City>,
}

#[derive(Debug, Deserialize)]
struct City {
    name: Option<String>,
    country: Option<Named>,
}

#[derive(Debug, Default, Deserialize)]
struct Sets {
    #[serde(default)]
    set: Vec<Set>,
}

#[derive(Debug, Deserialize)]
struct Set {
    #[serde(default)]
    song: Vec<Song>,
}

#[derive(Debug, Deserialize)]
struct Song {
    #[serde(default)]
    name: String,
    #[serde(default)]
    tape: bool,
    /// Original artist, present only for covers.
    cover: Option<Named>,
}

impl From<SetlistResponse> for Setlist {
    fn from(response: SetlistResponse) -> Self {
        let venue = response.venue;
        let city = venue.as_ref().and_then(|v| v.city.as_ref());
        let meta = SetlistMeta {
            artist: response.artist.name,
            venue: venue.as_ref().and_then(|v| v.name.clone()),
            city: city.and_then(|c| c.name.clone()),
            country: city.and_then(|c| c.country.as_ref().map(|n| n.name.clone())),
            event_date: response
                .event_date
                .as_deref()
                .and_then(|date| NaiveDate::parse_from_str(date, "%d-%m-%Y").ok()),
            url: response.url,
        };
        let songs = response
            .sets
            .set
            .into_iter()
            .flat_map(|set| set.song)
            .map(|song| SetlistSong {
                title: song.name,
                is_tape: song.tape,
                is_cover: song.cover.is_some(),
            })
            .collect();

        Setlist {
            id: response.id,
            meta,
            songs,
        }
    }
}

/// setlist.fm REST API, version 1.0.
pub struct SetlistFmClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl SetlistFmClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.setlistfm_timeout()?)
            .build()
            .wrap_err("Failed to build setlist.fm http client")?;
        Ok(Self {
            client,
            endpoint: config.setlistfm.endpoint.trim_end_matches('/').to_string(),
            api_key: config.setlistfm_api_key(),
        })
    }
}

#[async_trait::async_trait]
impl SetlistProvider for SetlistFmClient {
    async fn fetch_setlist(&self, setlist_id: &str) -> Result<Setlist, SetlistError> {
        let api_key = self.api_key.as_deref().ok_or(SetlistError::MissingApiKey)?;

        let response = self
            .client
            .get(format!("{}/setlist/{}", self.endpoint, setlist_id))
            .header("x-api-key", api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(SetlistError::FailedToSendRequest)?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(SetlistError::NotFound(setlist_id.to_string())),
            status if !status.is_success() => return Err(SetlistError::UnexpectedStatus(status)),
            _ => {}
        }

        let body: SetlistResponse = response
            .json()
            .await
            .map_err(SetlistError::FailedToParseResponse)?;
        Ok(body.into())
    }
}
