use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::links::ResolvedSong;
use crate::ports::catalog::SongCatalog;
use crate::ports::link_resolver::LinkResolver;

pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// Resolves many song titles by one artist, a bounded number at a time.
pub struct FanoutResolver {
    catalog: Arc<dyn SongCatalog>,
    resolver: Arc<dyn LinkResolver>,
    country: String,
}

impl FanoutResolver {
    pub fn new(
        catalog: Arc<dyn SongCatalog>,
        resolver: Arc<dyn LinkResolver>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            resolver,
            country: country.into(),
        }
    }

    /// One entry per title, in input order. A title that fails at the
    /// catalog search or at link resolution comes back with empty links and
    /// never affects the others.
    #[tracing::instrument(skip(self, titles), fields(titles = titles.len()))]
    pub async fn resolve_many(
        &self,
        titles: &[String],
        artist_hint: &str,
        max_concurrency: usize,
    ) -> Vec<ResolvedSong> {
        let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));

        let tasks = titles.iter().map(|title| {
            let semaphore = semaphore.clone();
            async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return ResolvedSong::unresolved(title.as_str());
                };
                self.resolve_one(title, artist_hint).await
            }
        });

        // join_all yields results positionally, so completion order cannot
        // reorder the setlist.
        let songs = join_all(tasks).await;

        let resolved = songs.iter().filter(|song| !song.links.is_empty()).count();
        tracing::info!(
            resolved,
            failed = songs.len() - resolved,
            "Setlist fan-out complete"
        );
        songs
    }

    async fn resolve_one(&self, title: &str, artist_hint: &str) -> ResolvedSong {
        let query = format!("{artist_hint} {title}");
        let seed = match self.catalog.find_track_url(query.trim()).await {
            Ok(Some(seed)) => seed,
            Ok(None) => {
                tracing::debug!(title, "No catalog match");
                return ResolvedSong::unresolved(title);
            }
            Err(error) => {
                tracing::warn!(title, %error, "Catalog search failed");
                return ResolvedSong::unresolved(title);
            }
        };

        match self.resolver.resolve(&seed, &self.country).await.into_resolved() {
            Some(resolved) => ResolvedSong {
                title: title.to_string(),
                cover_hint: resolved.metadata.cover_url,
                links: resolved.links,
                page_url: resolved.page_url,
            },
            None => {
                tracing::debug!(title, %seed, "Seed URL could not be resolved");
                ResolvedSong::unresolved(title)
            }
        }
    }
}
