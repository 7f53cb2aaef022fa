use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::links::{Resolution, ResolvedLinks, TrackMetadata};
use crate::ports::catalog::{CatalogError, SongCatalog};
use crate::ports::link_resolver::LinkResolver;

/// Catalog that "finds" every query at a URL derived from the query itself.
pub struct EchoCatalog;

#[async_trait::async_trait]
impl SongCatalog for EchoCatalog {
    async fn find_track_url(&self, query: &str) -> Result<Option<String>, CatalogError> {
        Ok(Some(format!(
            "https://seed.example/{}",
            query.replace(' ', "-")
        )))
    }
}

/// Resolver that sleeps on every call and records how many calls overlap.
pub struct CountingResolver {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
    /// When set, the song numbered `i` in the seed URL sleeps `(n + 1 - i) * 5ms`
    /// so later songs finish first.
    reverse_of: Option<usize>,
}

impl CountingResolver {
    pub fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            reverse_of: None,
        }
    }

    pub fn with_reverse_delays(n: usize) -> Self {
        Self {
            reverse_of: Some(n),
            ..Self::new()
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn delay_for(&self, url: &str) -> Duration {
        let number = url
            .rsplit('-')
            .next()
            .and_then(|tail| tail.parse::<usize>().ok());
        match (self.reverse_of, number) {
            (Some(n), Some(i)) => Duration::from_millis(((n + 1).saturating_sub(i) * 5) as u64),
            _ => Duration::from_millis(10),
        }
    }
}

#[async_trait::async_trait]
impl LinkResolver for CountingResolver {
    async fn resolve(&self, url: &str, _country: &str) -> Resolution {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay_for(url)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Resolution::Resolved(ResolvedLinks {
            links: [("spotify", format!("https://open.spotify.com/track/{url}"))]
                .into_iter()
                .collect(),
            metadata: TrackMetadata::default(),
            page_url: None,
        })
    }
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve_locally(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
