use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

static SETLIST_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-([0-9a-fA-F]{6,12})\.html$").unwrap());

const MUSIC_DOMAINS: &[&str] = &[
    "spotify.com",
    "music.apple.com",
    "itunes.apple.com",
    "geo.music.apple.com",
    "youtube.com",
    "youtu.be",
    "music.youtube.com",
    "soundcloud.com",
    "bandcamp.com",
    "tidal.com",
    "deezer.com",
    "pandora.com",
    "yandex",
    "napster.com",
    "audiomack.com",
    "anghami.com",
    "boomplay.com",
    "amazonmusic.com",
    "music.amazon.",
    "audius.co",
];

const TRAILING_PUNCTUATION: &[char] = &[')', '.', ',', '>', ']', '}', '"', '\''];

/// Lowercased host and path of `url`, or `None` when it does not parse.
fn host_and_path(url: &str) -> Option<(String, String)> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some((host, parsed.path().to_string()))
}

pub fn is_music_url(url: &str) -> bool {
    host_and_path(url)
        .is_some_and(|(host, _)| MUSIC_DOMAINS.iter().any(|domain| host.contains(domain)))
}

pub fn is_setlist_url(url: &str) -> bool {
    host_and_path(url)
        .is_some_and(|(host, path)| host.contains("setlist.fm") && path.contains("/setlist/"))
}

pub fn is_artist_url(url: &str) -> bool {
    host_and_path(url).is_some_and(|(host, path)| {
        let apple_or_spotify = host.contains("music.apple.com")
            || host.contains("itunes.apple.com")
            || host.contains("spotify.com");
        apple_or_spotify && path.contains("/artist/")
    })
}

/// Extracts every http(s) URL from free text, stripping trailing punctuation
/// and dropping exact duplicates. First occurrence order is kept.
pub fn find_urls(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION))
        .filter(|url| !url.is_empty())
        .filter(|url| seen.insert(url.to_string()))
        .map(str::to_string)
        .collect()
}

/// The setlist.fm id at the end of a setlist page path,
/// e.g. `.../the-cure/2023/...-chile-63a5b2b3.html` -> `63a5b2b3`.
pub fn setlist_id(url: &str) -> Option<String> {
    if !is_setlist_url(url) {
        return None;
    }
    let (_, path) = host_and_path(url)?;
    SETLIST_ID_RE
        .captures(&path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_music_url() {
        assert!(is_music_url("https://open.spotify.com/track/abc"));
        assert!(is_music_url("https://geo.music.apple.com/us/album/x/1?i=2"));
        assert!(is_music_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(is_music_url("https://music.amazon.de/albums/B0"));
        assert!(is_music_url("https://music.yandex.ru/album/1"));
        assert!(!is_music_url("https://example.com/spotify.com"));
        assert!(!is_music_url("not a url"));
    }

    #[test]
    fn test_is_setlist_url() {
        assert!(is_setlist_url(
            "https://www.setlist.fm/setlist/the-cure/2023/estadio-nacional-santiago-chile-63a5b2b3.html"
        ));
        assert!(!is_setlist_url("https://www.setlist.fm/search?query=cure"));
        assert!(!is_setlist_url("https://example.com/setlist/abc.html"));
    }

    #[test]
    fn test_is_artist_url() {
        assert!(is_artist_url("https://open.spotify.com/artist/7bu3H8JO7d0UbMoVzbo70s"));
        assert!(is_artist_url("https://music.apple.com/cl/artist/the-cure/1234"));
        assert!(!is_artist_url("https://open.spotify.com/track/abc"));
        assert!(!is_artist_url("https://www.deezer.com/artist/1"));
    }

    #[test]
    fn test_find_urls_strips_trailing_punctuation() {
        let text = "check (https://open.spotify.com/track/abc). and <https://youtu.be/x>, \
                    \"https://soundcloud.com/a/b\" [https://tidal.com/track/1]}";
        assert_eq!(
            find_urls(text),
            vec![
                "https://open.spotify.com/track/abc",
                "https://youtu.be/x",
                "https://soundcloud.com/a/b",
                "https://tidal.com/track/1",
            ]
        );
    }

    #[test]
    fn test_find_urls_dedups_preserving_first_order() {
        let text = "https://b.example/2 https://a.example/1 https://b.example/2. https://a.example/1";
        assert_eq!(
            find_urls(text),
            vec!["https://b.example/2", "https://a.example/1"]
        );
    }

    #[test]
    fn test_find_urls_empty_text() {
        assert!(find_urls("").is_empty());
        assert!(find_urls("no links here").is_empty());
    }

    #[test]
    fn test_setlist_id() {
        assert_eq!(
            setlist_id(
                "https://www.setlist.fm/setlist/the-cure/2023/estadio-nacional-santiago-chile-63a5b2b3.html"
            ),
            Some("63a5b2b3".to_string())
        );
        assert_eq!(setlist_id("https://open.spotify.com/track/abc"), None);
    }
}
