use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use futures::future::join_all;
use regex::Regex;
use url::Url;

use crate::links::{AlbumButton, LinkSet};
use crate::platform::{ALBUM_DERIVATION_ORDER, AlbumStrategy, PlatformKey};
use crate::ports::page_fetcher::PageFetcher;
use crate::regionalize::regionalize_apple;

/// Auto-generated YouTube album playlists.
const YT_ALBUM_PLAYLIST_PREFIX: &str = "OLAK";

static SPOTIFY_ALBUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"open\.spotify\.com/album/([A-Za-z0-9]+)").unwrap());

static YT_PLAYLIST_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r#""playlistId":"(OLAK[^"]+)""#).unwrap(),
        Regex::new(r#"list=(OLAK[^"&]+)"#).unwrap(),
    ]
});

static YT_BROWSE_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r#""browseId":"(MPREb[^"]+)""#).unwrap(),
        Regex::new(r#"/browse/(MPREb[^"?]+)"#).unwrap(),
    ]
});

fn first_capture(res: &[Regex], haystack: &str) -> Option<String> {
    res.iter().find_map(|re| {
        re.captures(haystack)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn youtube_playlist_url(list_id: &str, prefer_music: bool) -> String {
    if prefer_music {
        format!("https://music.youtube.com/playlist?list={list_id}")
    } else {
        format!("https://www.youtube.com/playlist?list={list_id}")
    }
}

/// Best-effort album URLs for a resolved track.
pub struct AlbumLinkDeriver {
    fetcher: Arc<dyn PageFetcher>,
    country: String,
}

impl AlbumLinkDeriver {
    pub fn new(fetcher: Arc<dyn PageFetcher>, country: impl Into<String>) -> Self {
        Self {
            fetcher,
            country: country.into(),
        }
    }

    /// Derives album buttons for every supported platform present in `links`.
    ///
    /// Platforms are tried independently; a failing platform only loses its
    /// own button. Buttons come back in derivation order, deduplicated by URL.
    pub async fn derive_album_buttons(&self, links: &LinkSet) -> Vec<AlbumButton> {
        let candidates: Vec<(PlatformKey, String)> = ALBUM_DERIVATION_ORDER
            .iter()
            .filter_map(|platform| {
                links
                    .url(platform)
                    .map(|url| (platform.clone(), url.to_string()))
            })
            .collect();

        let derived = join_all(
            candidates
                .iter()
                .map(|(platform, url)| self.derive_album_url(platform, url)),
        )
        .await;

        let mut seen = HashSet::new();
        candidates
            .iter()
            .zip(derived)
            .filter_map(|((platform, _), album_url)| {
                album_url.map(|url| AlbumButton {
                    label: platform.album_label().to_string(),
                    url,
                })
            })
            .filter(|button| seen.insert(button.url.clone()))
            .collect()
    }

    /// Album URL for one platform's track URL, `None` when it cannot be derived.
    pub async fn derive_album_url(&self, platform: &PlatformKey, track_url: &str) -> Option<String> {
        let album_url = match platform.album_strategy()? {
            AlbumStrategy::AppleRewrite => Some(regionalize_apple(track_url, true, &self.country)),
            AlbumStrategy::SpotifyPage => self.spotify_album(track_url).await,
            AlbumStrategy::YoutubePlaylist { prefer_music } => {
                self.youtube_album(track_url, prefer_music).await
            }
            AlbumStrategy::SoundcloudSet => soundcloud_set(track_url),
        };
        if album_url.is_none() {
            tracing::debug!(%platform, track_url, "No album link derived");
        }
        album_url
    }

    async fn fetch(&self, url: &str) -> Option<String> {
        match self.fetcher.fetch_html(url).await {
            Ok(html) => Some(html),
            Err(error) => {
                tracing::debug!(url, %error, "Album page fetch failed");
                None
            }
        }
    }

    async fn spotify_album(&self, track_url: &str) -> Option<String> {
        let parsed = Url::parse(track_url).ok()?;
        if parsed.path().contains("/album/") {
            return Some(track_url.to_string());
        }
        let html = self.fetch(track_url).await?;
        let caps = SPOTIFY_ALBUM_RE.captures(&html)?;
        Some(format!("https://open.spotify.com/album/{}", &caps[1]))
    }

    async fn youtube_album(&self, track_url: &str, prefer_music: bool) -> Option<String> {
        let parsed = Url::parse(track_url).ok()?;
        if let Some(list_id) = query_param(&parsed, "list")
            && list_id.starts_with(YT_ALBUM_PLAYLIST_PREFIX)
        {
            return Some(youtube_playlist_url(&list_id, prefer_music));
        }

        let html = self.fetch(track_url).await?;
        if let Some(list_id) = first_capture(&*YT_PLAYLIST_RES, &html) {
            return Some(youtube_playlist_url(&list_id, prefer_music));
        }
        first_capture(&*YT_BROWSE_RES, &html)
            .map(|browse_id| format!("https://music.youtube.com/browse/{browse_id}"))
    }
}

fn soundcloud_set(track_url: &str) -> Option<String> {
    let parsed = Url::parse(track_url).ok()?;
    let set_path = query_param(&parsed, "in")?;
    Some(format!(
        "https://soundcloud.com/{}",
        set_path.trim_start_matches('/')
    ))
}
