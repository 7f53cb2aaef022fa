use std::sync::Arc;

use serde::Serialize;

use crate::classify::{find_urls, is_artist_url, is_music_url, is_setlist_url, setlist_id};
use crate::config::Config;
use crate::links::{AlbumButton, EntityKind, LinkSet, ResolvedSong, TrackMetadata};
use crate::ports::catalog::SongCatalog;
use crate::ports::link_resolver::LinkResolver;
use crate::ports::page_fetcher::PageFetcher;
use crate::ports::setlist::{SetlistMeta, SetlistProvider};
use crate::services::album::AlbumLinkDeriver;
use crate::services::fanout::FanoutResolver;
use crate::services::keyboard::{
    ButtonGrid, CallbackAction, CallbackData, build_setlist_grid, build_track_grid,
};
use crate::services::session_store::SessionStore;

/// What the transport renders for one resolved URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    /// Short heading for inline results and notifications.
    pub title: String,
    pub caption: String,
    pub cover_url: Option<String>,
    pub grid: ButtonGrid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "grid", rename_all = "snake_case")]
pub enum CallbackOutcome {
    /// New grid for the message the button belongs to.
    Updated(ButtonGrid),
    /// The session was evicted; the caller leaves the message alone.
    Expired,
    Ignored,
}

#[derive(Debug, Clone)]
struct TrackSession {
    links: LinkSet,
    album_buttons: Vec<AlbumButton>,
}

#[derive(Debug, Clone)]
struct SetlistSession {
    setlist_id: String,
    meta: SetlistMeta,
    items: Vec<ResolvedSong>,
}

pub struct RelayService {
    resolver: Arc<dyn LinkResolver>,
    albums: AlbumLinkDeriver,
    fanout: FanoutResolver,
    setlists: Arc<dyn SetlistProvider>,
    track_sessions: SessionStore<TrackSession>,
    setlist_sessions: SessionStore<SetlistSession>,
    country: String,
    max_concurrency: usize,
    page_size: usize,
}

impl RelayService {
    pub fn new(
        config: &Config,
        resolver: Arc<dyn LinkResolver>,
        fetcher: Arc<dyn PageFetcher>,
        catalog: Arc<dyn SongCatalog>,
        setlists: Arc<dyn SetlistProvider>,
    ) -> Self {
        let country = config.country_code();
        Self {
            albums: AlbumLinkDeriver::new(fetcher, country.clone()),
            fanout: FanoutResolver::new(catalog, resolver.clone(), country.clone()),
            resolver,
            setlists,
            track_sessions: SessionStore::new("tracks", config.sessions.track_capacity),
            setlist_sessions: SessionStore::new("setlists", config.sessions.setlist_capacity),
            country,
            max_concurrency: config.setlist.max_concurrency,
            page_size: config.setlist.page_size,
        }
    }

    /// One reply per supported URL in `text`, in the order they appear.
    /// URLs that are not music or setlist links, or that fail to resolve,
    /// produce nothing.
    #[tracing::instrument(skip_all)]
    pub async fn handle_message(&self, text: &str) -> Vec<Reply> {
        let mut replies = Vec::new();
        for url in find_urls(text) {
            let reply = if is_setlist_url(&url) {
                self.setlist_reply(&url).await
            } else if is_music_url(&url) {
                self.track_reply(&url).await
            } else {
                tracing::debug!(url, "Skipping unsupported URL");
                None
            };
            replies.extend(reply);
        }
        replies
    }

    /// Only the first URL of an inline query is considered, and only music links.
    #[tracing::instrument(skip(self))]
    pub async fn handle_inline_query(&self, query: &str) -> Option<Reply> {
        let url = find_urls(query).into_iter().next()?;
        if !is_music_url(&url) {
            return None;
        }
        self.track_reply(&url).await
    }

    #[tracing::instrument(skip(self))]
    pub fn handle_callback(&self, data: &str) -> CallbackOutcome {
        let Some(callback) = CallbackData::parse(data) else {
            tracing::debug!("Undecodable callback data");
            return CallbackOutcome::Ignored;
        };

        match callback.action {
            CallbackAction::Noop => CallbackOutcome::Ignored,
            CallbackAction::More | CallbackAction::Less => {
                match self.track_sessions.lookup(&callback.token) {
                    Some(session) => CallbackOutcome::Updated(build_track_grid(
                        &session.links,
                        callback.action == CallbackAction::More,
                        &callback.token,
                        &session.album_buttons,
                    )),
                    None => {
                        tracing::info!("Track session expired");
                        CallbackOutcome::Expired
                    }
                }
            }
            CallbackAction::Page(page) => match self.setlist_sessions.lookup(&callback.token) {
                Some(session) => {
                    tracing::debug!(
                        setlist_id = %session.setlist_id,
                        artist = %session.meta.artist,
                        page,
                        "Paging setlist"
                    );
                    CallbackOutcome::Updated(build_setlist_grid(
                        &session.items,
                        &callback.token,
                        page,
                        self.page_size,
                    ))
                }
                None => {
                    tracing::info!("Setlist session expired");
                    CallbackOutcome::Expired
                }
            },
        }
    }

    async fn track_reply(&self, url: &str) -> Option<Reply> {
        let resolved = self
            .resolver
            .resolve(url, &self.country)
            .await
            .into_resolved()?;

        let is_artist = resolved.metadata.kind == EntityKind::Artist || is_artist_url(url);
        let album_buttons = if is_artist {
            Vec::new()
        } else {
            self.albums.derive_album_buttons(&resolved.links).await
        };

        let token = self.track_sessions.remember(TrackSession {
            links: resolved.links.clone(),
            album_buttons: album_buttons.clone(),
        });
        let grid = build_track_grid(&resolved.links, false, token.as_str(), &album_buttons);
        tracing::info!(
            url,
            platforms = resolved.links.len(),
            albums = album_buttons.len(),
            "Resolved link"
        );

        Some(Reply {
            title: reply_title(&resolved.metadata, is_artist),
            caption: track_caption(&resolved.metadata, is_artist),
            cover_url: resolved.metadata.cover_url,
            grid,
        })
    }

    async fn setlist_reply(&self, url: &str) -> Option<Reply> {
        let id = setlist_id(url)?;
        let setlist = match self.setlists.fetch_setlist(&id).await {
            Ok(setlist) => setlist,
            Err(error) => {
                tracing::warn!(setlist_id = %id, %error, "Failed to fetch setlist");
                return None;
            }
        };

        let titles = setlist.playable_titles();
        let items = self
            .fanout
            .resolve_many(&titles, &setlist.meta.artist, self.max_concurrency)
            .await;

        let title = setlist.meta.artist.clone();
        let caption = setlist_caption(&setlist.meta, &items);
        let cover_url = items.iter().find_map(|song| song.cover_hint.clone());
        tracing::info!(
            setlist_id = %setlist.id,
            artist = %setlist.meta.artist,
            songs = items.len(),
            "Resolved setlist"
        );

        let token = self.setlist_sessions.remember(SetlistSession {
            setlist_id: setlist.id,
            meta: setlist.meta,
            items: items.clone(),
        });

        Some(Reply {
            title,
            caption,
            cover_url,
            grid: build_setlist_grid(&items, token.as_str(), 0, self.page_size),
        })
    }
}

fn reply_title(metadata: &TrackMetadata, is_artist: bool) -> String {
    let title = if is_artist {
        metadata.artist.as_deref().or(metadata.title.as_deref())
    } else {
        metadata.title.as_deref()
    };
    title
        .unwrap_or(if is_artist { "Artist" } else { "Platforms" })
        .to_string()
}

fn track_caption(metadata: &TrackMetadata, is_artist: bool) -> String {
    if is_artist {
        let name = metadata
            .artist
            .as_deref()
            .or(metadata.title.as_deref())
            .unwrap_or("Artist");
        return format!("👤 {name}\n🔗 Available on:");
    }

    match (&metadata.title, &metadata.artist) {
        (Some(title), Some(artist)) => format!("🎵 {title} — {artist}\n🎶 Available on:"),
        (Some(title), None) => format!("🎵 {title}\n🎶 Available on:"),
        _ => "🎶 Available on:".to_string(),
    }
}

fn setlist_caption(meta: &SetlistMeta, items: &[ResolvedSong]) -> String {
    let mut lines = vec![format!("🎤 {}", meta.artist)];

    let place: Vec<&str> = [&meta.venue, &meta.city, &meta.country]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.trim().is_empty())
        .collect();
    if !place.is_empty() {
        lines.push(format!("📍 {}", place.join(", ")));
    }
    if let Some(date) = meta.event_date {
        lines.push(format!("📅 {}", date.format("%d/%m/%Y")));
    }

    let resolved = items.iter().filter(|song| !song.links.is_empty()).count();
    lines.push(format!("{resolved}/{} songs resolved", items.len()));
    lines.join("\n")
}
