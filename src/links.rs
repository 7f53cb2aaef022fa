use std::collections::HashMap;

use serde::Serialize;

use crate::platform::PlatformKey;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEntry {
    pub platform: PlatformKey,
    pub url: String,
}

/// Equivalent URLs for one entity, keyed by platform.
///
/// Keys are case-folded on insertion and empty URLs are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSet {
    entries: HashMap<PlatformKey, LinkEntry>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `url` under the case-folded `platform`. A later insert for the
    /// same platform replaces the earlier one. Blank URLs are ignored.
    pub fn insert(&mut self, platform: &str, url: impl Into<String>) {
        let url = url.into();
        if url.trim().is_empty() {
            return;
        }
        let platform = PlatformKey::parse(platform);
        self.entries
            .insert(platform.clone(), LinkEntry { platform, url });
    }

    pub fn get(&self, platform: &PlatformKey) -> Option<&LinkEntry> {
        self.entries.get(platform)
    }

    pub fn url(&self, platform: &PlatformKey) -> Option<&str> {
        self.get(platform).map(|entry| entry.url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrites the URL of every entry for which `rewrite` returns `Some`.
    pub fn rewrite_urls(&mut self, mut rewrite: impl FnMut(&PlatformKey, &str) -> Option<String>) {
        for entry in self.entries.values_mut() {
            if let Some(url) = rewrite(&entry.platform, &entry.url)
                && !url.is_empty()
            {
                entry.url = url;
            }
        }
    }

    /// Present platforms, favorites first in fixed order, the rest by display name.
    pub fn sorted_keys(&self) -> Vec<PlatformKey> {
        let mut keys: Vec<PlatformKey> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn sorted_entries(&self) -> Vec<&LinkEntry> {
        self.sorted_keys()
            .iter()
            .filter_map(|key| self.entries.get(key))
            .collect()
    }

    pub fn has_hidden_platforms(&self) -> bool {
        self.entries.keys().any(|key| !key.is_favorite())
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for LinkSet {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut links = LinkSet::new();
        for (platform, url) in iter {
            links.insert(platform.as_ref(), url);
        }
        links
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Track,
    Album,
    Artist,
    #[default]
    Unknown,
}

impl EntityKind {
    /// Infers the kind from an aggregator entity id such as `SPOTIFY_SONG::abc`.
    pub fn from_entity_id(id: &str) -> Self {
        let id = id.to_lowercase();
        if id.contains("artist") {
            Self::Artist
        } else if id.contains("album") {
            Self::Album
        } else if id.contains("song") || id.contains("track") {
            Self::Track
        } else {
            Self::Unknown
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cover_url: Option<String>,
    pub kind: EntityKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLinks {
    pub links: LinkSet,
    pub metadata: TrackMetadata,
    /// The aggregator's own landing page for the entity.
    pub page_url: Option<String>,
}

/// Outcome of one link-aggregation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedLinks),
    Unavailable,
}

impl Resolution {
    pub fn into_resolved(self) -> Option<ResolvedLinks> {
        match self {
            Self::Resolved(resolved) => Some(resolved),
            Self::Unavailable => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumButton {
    pub label: String,
    pub url: String,
}

/// One setlist entry after fan-out resolution. `links` is empty when
/// resolution failed for this title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSong {
    pub title: String,
    pub cover_hint: Option<String>,
    pub links: LinkSet,
    pub page_url: Option<String>,
}

impl ResolvedSong {
    pub fn unresolved(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            cover_hint: None,
            links: LinkSet::new(),
            page_url: None,
        }
    }
}
