use std::collections::HashMap;

use serde::Deserialize;

use crate::links::{EntityKind, LinkSet, Resolution, ResolvedLinks, TrackMetadata};
use crate::regionalize::regionalize_apple;

/// Response of `GET /v1-alpha.1/links`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OdesliResponse {
    pub entity_unique_id: Option<String>,
    pub page_url: Option<String>,
    #[serde(default)]
    pub links_by_platform: HashMap<String, PlatformLink>,
    #[serde(default)]
    pub entities_by_unique_id: HashMap<String, OdesliEntity>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformLink {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OdesliEntity {
    pub title: Option<String>,
    pub artist_name: Option<String>,
    pub name: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl OdesliResponse {
    /// Normalizes the payload: lowercased platform keys, Apple links moved to
    /// `country` for tracks, metadata of the requested entity.
    pub fn into_resolution(self, country: &str) -> Resolution {
        let uid = self.entity_unique_id.unwrap_or_default();
        let kind = EntityKind::from_entity_id(&uid);

        let mut links: LinkSet = self
            .links_by_platform
            .into_iter()
            .filter_map(|(platform, link)| link.url.map(|url| (platform, url)))
            .collect();
        if links.is_empty() {
            return Resolution::Unavailable;
        }

        // Album and artist pages are storefront-neutral enough as returned.
        if kind == EntityKind::Track {
            links.rewrite_urls(|platform, url| {
                platform
                    .is_apple_family()
                    .then(|| regionalize_apple(url, false, country))
            });
        }

        let entity = self.entities_by_unique_id.get(&uid);
        let metadata = TrackMetadata {
            title: entity.and_then(|e| e.title.clone()),
            artist: entity.and_then(|e| e.artist_name.clone().or_else(|| e.name.clone())),
            cover_url: entity.and_then(|e| e.thumbnail_url.clone()),
            kind,
        };

        Resolution::Resolved(ResolvedLinks {
            links,
            metadata,
            page_url: self.page_url,
        })
    }
}
