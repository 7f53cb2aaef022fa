use url::Url;

const APPLE_MUSIC_HOST: &str = "music.apple.com";

/// Moves an Apple Music / iTunes URL to the `country` storefront.
///
/// The track form keeps the query (`?i=` selects the track inside an album
/// page); the album form drops it. The fragment is always dropped. Anything
/// that fails to parse comes back unchanged.
pub fn regionalize_apple(url: &str, for_album: bool, country: &str) -> String {
    match try_regionalize(url, for_album, country) {
        Some(rewritten) => rewritten,
        None => {
            tracing::debug!(url, "Could not regionalize Apple Music URL");
            url.to_string()
        }
    }
}

fn try_regionalize(url: &str, for_album: bool, country: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    parsed.set_host(Some(APPLE_MUSIC_HOST)).ok()?;

    let path = storefront_path(parsed.path(), &country.to_lowercase());
    parsed.set_path(&path);
    parsed.set_query(None);
    parsed.set_fragment(None);

    let mut rewritten = parsed.to_string();
    if !for_album {
        // The query is carried over as written; `Url` would re-encode it.
        if let Some(query) = raw_query(url) {
            rewritten.push('?');
            rewritten.push_str(query);
        }
    }
    Some(rewritten)
}

/// Query text exactly as it appears in `url`, without the fragment.
/// An empty query (`...?`) counts as none.
fn raw_query(url: &str) -> Option<&str> {
    let without_fragment = url.split_once('#').map_or(url, |(head, _)| head);
    without_fragment
        .split_once('?')
        .map(|(_, query)| query)
        .filter(|query| !query.is_empty())
}

fn storefront_path(path: &str, country: &str) -> String {
    let trimmed = path.trim_matches('/');
    match trimmed.split_once('/') {
        Some((first, rest)) if first.chars().count() == 2 => format!("/{country}/{rest}"),
        None if trimmed.chars().count() == 2 => format!("/{country}"),
        _ => format!("/{country}/{trimmed}"),
    }
}
