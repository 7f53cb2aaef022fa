use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How an album-level URL is obtained for a platform's track URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumStrategy {
    /// Storefront rewrite without the track selector.
    AppleRewrite,
    /// Reuse `/album/` URLs, otherwise scrape the track page.
    SpotifyPage,
    /// `list=OLAK…` parameter or page scrape. `prefer_music` picks the playlist host.
    YoutubePlaylist { prefer_music: bool },
    /// `in=<user>/sets/<set>` query parameter.
    SoundcloudSet,
}

/// Canonical lowercase identifier of a streaming service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum PlatformKey {
    Spotify,
    Youtube,
    YoutubeMusic,
    AppleMusic,
    Soundcloud,
    Itunes,
    AmazonMusic,
    AmazonStore,
    Anghami,
    Audiomack,
    Audius,
    Bandcamp,
    Boomplay,
    Deezer,
    Google,
    GoogleStore,
    Napster,
    Pandora,
    Spinrilla,
    Tidal,
    Yandex,
    Other(String),
}

struct PlatformInfo {
    key: &'static str,
    display_name: &'static str,
    album_label: Option<&'static str>,
    apple_family: bool,
    album_strategy: Option<AlbumStrategy>,
}

const fn info(key: &'static str, display_name: &'static str) -> PlatformInfo {
    PlatformInfo {
        key,
        display_name,
        album_label: None,
        apple_family: false,
        album_strategy: None,
    }
}

static SPOTIFY: PlatformInfo = PlatformInfo {
    album_label: Some("💿🎧"),
    album_strategy: Some(AlbumStrategy::SpotifyPage),
    ..info("spotify", "Spotify")
};
static YOUTUBE: PlatformInfo = PlatformInfo {
    album_label: Some("💿▶️"),
    album_strategy: Some(AlbumStrategy::YoutubePlaylist {
        prefer_music: false,
    }),
    ..info("youtube", "YouTube")
};
static YOUTUBE_MUSIC: PlatformInfo = PlatformInfo {
    album_label: Some("💿🎵"),
    album_strategy: Some(AlbumStrategy::YoutubePlaylist { prefer_music: true }),
    ..info("youtubemusic", "YouTube Music")
};
static APPLE_MUSIC: PlatformInfo = PlatformInfo {
    album_label: Some("💿🍎"),
    apple_family: true,
    album_strategy: Some(AlbumStrategy::AppleRewrite),
    ..info("applemusic", "Apple Music")
};
static SOUNDCLOUD: PlatformInfo = PlatformInfo {
    album_label: Some("💿☁️"),
    album_strategy: Some(AlbumStrategy::SoundcloudSet),
    ..info("soundcloud", "SoundCloud")
};
static ITUNES: PlatformInfo = PlatformInfo {
    apple_family: true,
    ..info("itunes", "iTunes")
};

/// Platforms that are always shown, in display order.
pub const FAVORITES: [PlatformKey; 5] = [
    PlatformKey::Spotify,
    PlatformKey::Youtube,
    PlatformKey::YoutubeMusic,
    PlatformKey::AppleMusic,
    PlatformKey::Soundcloud,
];

/// Order in which album links are derived (and displayed).
pub const ALBUM_DERIVATION_ORDER: [PlatformKey; 5] = [
    PlatformKey::AppleMusic,
    PlatformKey::Spotify,
    PlatformKey::YoutubeMusic,
    PlatformKey::Youtube,
    PlatformKey::Soundcloud,
];

impl PlatformKey {
    /// Case-folds `raw` and maps it onto a known platform when possible.
    pub fn parse(raw: &str) -> Self {
        let key = raw.trim().to_lowercase();
        match key.as_str() {
            "spotify" => Self::Spotify,
            "youtube" => Self::Youtube,
            "youtubemusic" => Self::YoutubeMusic,
            "applemusic" => Self::AppleMusic,
            "soundcloud" => Self::Soundcloud,
            "itunes" => Self::Itunes,
            "amazonmusic" => Self::AmazonMusic,
            "amazonstore" => Self::AmazonStore,
            "anghami" => Self::Anghami,
            "audiomack" => Self::Audiomack,
            "audius" => Self::Audius,
            "bandcamp" => Self::Bandcamp,
            "boomplay" => Self::Boomplay,
            "deezer" => Self::Deezer,
            "google" => Self::Google,
            "googlestore" => Self::GoogleStore,
            "napster" => Self::Napster,
            "pandora" => Self::Pandora,
            "spinrilla" => Self::Spinrilla,
            "tidal" => Self::Tidal,
            "yandex" => Self::Yandex,
            _ => Self::Other(key),
        }
    }

    fn info(&self) -> Option<&'static PlatformInfo> {
        static AMAZON_MUSIC: PlatformInfo = info("amazonmusic", "Amazon Music");
        static AMAZON_STORE: PlatformInfo = info("amazonstore", "Amazon Store");
        static ANGHAMI: PlatformInfo = info("anghami", "Anghami");
        static AUDIOMACK: PlatformInfo = info("audiomack", "Audiomack");
        static AUDIUS: PlatformInfo = info("audius", "Audius");
        static BANDCAMP: PlatformInfo = info("bandcamp", "Bandcamp");
        static BOOMPLAY: PlatformInfo = info("boomplay", "Boomplay");
        static DEEZER: PlatformInfo = info("deezer", "Deezer");
        static GOOGLE: PlatformInfo = info("google", "Google Play Music");
        static GOOGLE_STORE: PlatformInfo = info("googlestore", "Google Store");
        static NAPSTER: PlatformInfo = info("napster", "Napster");
        static PANDORA: PlatformInfo = info("pandora", "Pandora");
        static SPINRILLA: PlatformInfo = info("spinrilla", "Spinrilla");
        static TIDAL: PlatformInfo = info("tidal", "Tidal");
        static YANDEX: PlatformInfo = info("yandex", "Yandex");

        let entry = match self {
            Self::Spotify => &SPOTIFY,
            Self::Youtube => &YOUTUBE,
            Self::YoutubeMusic => &YOUTUBE_MUSIC,
            Self::AppleMusic => &APPLE_MUSIC,
            Self::Soundcloud => &SOUNDCLOUD,
            Self::Itunes => &ITUNES,
            Self::AmazonMusic => &AMAZON_MUSIC,
            Self::AmazonStore => &AMAZON_STORE,
            Self::Anghami => &ANGHAMI,
            Self::Audiomack => &AUDIOMACK,
            Self::Audius => &AUDIUS,
            Self::Bandcamp => &BANDCAMP,
            Self::Boomplay => &BOOMPLAY,
            Self::Deezer => &DEEZER,
            Self::Google => &GOOGLE,
            Self::GoogleStore => &GOOGLE_STORE,
            Self::Napster => &NAPSTER,
            Self::Pandora => &PANDORA,
            Self::Spinrilla => &SPINRILLA,
            Self::Tidal => &TIDAL,
            Self::Yandex => &YANDEX,
            Self::Other(_) => return None,
        };
        Some(entry)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Other(key) => key,
            known => known.info().map(|i| i.key).unwrap_or_default(),
        }
    }

    pub fn display_name(&self) -> String {
        match self.info() {
            Some(info) => info.display_name.to_string(),
            None => capitalize(self.as_str()),
        }
    }

    /// Position in [`FAVORITES`], `None` for every other platform.
    pub fn favorite_rank(&self) -> Option<usize> {
        FAVORITES.iter().position(|favorite| favorite == self)
    }

    pub fn is_favorite(&self) -> bool {
        self.favorite_rank().is_some()
    }

    /// Apple Music and iTunes links get storefront regionalization.
    pub fn is_apple_family(&self) -> bool {
        self.info().is_some_and(|i| i.apple_family)
    }

    pub fn album_strategy(&self) -> Option<AlbumStrategy> {
        self.info().and_then(|i| i.album_strategy)
    }

    pub fn album_label(&self) -> &'static str {
        self.info().and_then(|i| i.album_label).unwrap_or("💿")
    }

    /// Favorites first in their fixed order, then everything else by display name.
    pub fn display_order(&self, other: &Self) -> Ordering {
        match (self.favorite_rank(), other.favorite_rank()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self
                .display_name()
                .to_lowercase()
                .cmp(&other.display_name().to_lowercase())
                .then_with(|| self.as_str().cmp(other.as_str())),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PlatformKey> for String {
    fn from(key: PlatformKey) -> Self {
        key.as_str().to_string()
    }
}

impl From<String> for PlatformKey {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl PartialOrd for PlatformKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PlatformKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.display_order(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(PlatformKey::parse("appleMusic"), PlatformKey::AppleMusic);
        assert_eq!(PlatformKey::parse("YOUTUBEMUSIC"), PlatformKey::YoutubeMusic);
        assert_eq!(
            PlatformKey::parse("NewService"),
            PlatformKey::Other("newservice".to_string())
        );
    }

    #[test]
    fn test_as_str_round_trips_known_keys() {
        for key in ["spotify", "applemusic", "amazonstore", "tidal", "yandex"] {
            assert_eq!(PlatformKey::parse(key).as_str(), key);
        }
    }

    #[test]
    fn test_unknown_display_name_is_capitalized() {
        assert_eq!(PlatformKey::parse("qobuz").display_name(), "Qobuz");
    }

    #[test]
    fn test_display_order_favorites_then_alphabetical() {
        let mut keys = vec![
            PlatformKey::Tidal,
            PlatformKey::Soundcloud,
            PlatformKey::Deezer,
            PlatformKey::Spotify,
            PlatformKey::AmazonMusic,
            PlatformKey::Youtube,
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                PlatformKey::Spotify,
                PlatformKey::Youtube,
                PlatformKey::Soundcloud,
                PlatformKey::AmazonMusic,
                PlatformKey::Deezer,
                PlatformKey::Tidal,
            ]
        );
    }

    #[test]
    fn test_itunes_sorts_alphabetically_ignoring_case() {
        let mut keys = vec![
            PlatformKey::Yandex,
            PlatformKey::Tidal,
            PlatformKey::Itunes,
            PlatformKey::Deezer,
            PlatformKey::AppleMusic,
        ];
        keys.sort();
        assert_eq!(
            keys,
            vec![
                PlatformKey::AppleMusic,
                PlatformKey::Deezer,
                PlatformKey::Itunes,
                PlatformKey::Tidal,
                PlatformKey::Yandex,
            ]
        );
    }

    #[test]
    fn test_favorite_rank_follows_favorites() {
        for (rank, key) in FAVORITES.iter().enumerate() {
            assert_eq!(key.favorite_rank(), Some(rank));
        }
        assert_eq!(PlatformKey::Itunes.favorite_rank(), None);
        assert_eq!(PlatformKey::parse("qobuz").favorite_rank(), None);
    }

    #[test]
    fn test_apple_family() {
        assert!(PlatformKey::AppleMusic.is_apple_family());
        assert!(PlatformKey::Itunes.is_apple_family());
        assert!(!PlatformKey::Spotify.is_apple_family());
    }
}
