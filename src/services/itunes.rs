use color_eyre::Result;
use color_eyre::eyre::Context;
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::ports::catalog::{CatalogError, SongCatalog};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    track_view_url: Option<String>,
}

/// iTunes Search API; its track URLs are accepted by the link aggregator.
pub struct ItunesCatalog {
    client: Client,
    endpoint: String,
    country: String,
}

impl ItunesCatalog {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.catalog_timeout()?)
            .build()
            .wrap_err("Failed to build catalog http client")?;
        Ok(Self {
            client,
            endpoint: config.catalog.endpoint.clone(),
            country: config.country_code(),
        })
    }
}

#[async_trait::async_trait]
impl SongCatalog for ItunesCatalog {
    async fn find_track_url(&self, query: &str) -> Result<Option<String>, CatalogError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("term", query),
                ("entity", "song"),
                ("limit", "1"),
                ("country", self.country.as_str()),
            ])
            .send()
            .await
            .map_err(CatalogError::FailedToSendRequest)?;

        if !response.status().is_success() {
            return Err(CatalogError::UnexpectedStatus(response.status()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(CatalogError::FailedToParseResponse)?;
        Ok(first_track_url(body))
    }
}

fn first_track_url(body: SearchResponse) -> Option<String> {
    body.results
        .into_iter()
        .find_map(|result| result.track_view_url)
        .filter(|url| !url.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_track_url() {
        let body: SearchResponse = serde_json::from_str(
            r#"{
                "resultCount": 2,
                "results": [
                    { "wrapperType": "track", "trackName": "Plainsong" },
                    {
                        "wrapperType": "track",
                        "trackName": "Plainsong",
                        "trackViewUrl": "https://music.apple.com/cl/album/plainsong/123?i=456&uo=4"
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            first_track_url(body).as_deref(),
            Some("https://music.apple.com/cl/album/plainsong/123?i=456&uo=4")
        );
    }

    #[test]
    fn test_no_results() {
        let body: SearchResponse =
            serde_json::from_str(r#"{ "resultCount": 0, "results": [] }"#).unwrap();
        assert_eq!(first_track_url(body), None);
    }
}
