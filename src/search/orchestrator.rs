//! The request driver: strategy dispatch, raw-hit fetch, bounded enrichment
//! fan-out, and residual filtering.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::cache::{self, keys, Cache};
use crate::metadata::enrich::Enricher;
use crate::metadata::genres::GenreResolver;
use crate::metadata::provider::{DiscoverFilters, PrimaryProvider, RawHit, TitleKind};
use crate::search::criteria::{CanonicalMovie, SearchCriteria};
use crate::search::filter;
use crate::search::strategy::Strategy;

/// Terminal failure of a search request.
///
/// Raised only when the Primary provider's discovery phase fails; per-hit
/// enrichment failures degrade silently instead.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("primary metadata provider unavailable")]
    ProviderUnavailable(#[source] anyhow::Error),
}

/// TTL and fan-out knobs for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// TTL for title-search and discovery hit lists.
    pub search_ttl: Duration,
    /// TTL for the shared popular listing.
    pub popular_ttl: Duration,
    /// Upper bound on concurrently-running enrichments per request.
    pub max_concurrent_enrichments: usize,
    /// Page size of the popular-fallback response.
    pub popular_page_size: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            search_ttl: Duration::from_secs(600),
            popular_ttl: Duration::from_secs(3600),
            max_concurrent_enrichments: 8,
            popular_page_size: 20,
        }
    }
}

/// Coordinates one `search` call end to end.
pub struct SearchOrchestrator {
    primary: Arc<dyn PrimaryProvider>,
    enricher: Arc<Enricher>,
    genres: Arc<GenreResolver>,
    cache: Arc<dyn Cache>,
    settings: OrchestratorSettings,
}

impl SearchOrchestrator {
    pub fn new(
        primary: Arc<dyn PrimaryProvider>,
        enricher: Arc<Enricher>,
        genres: Arc<GenreResolver>,
        cache: Arc<dyn Cache>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            primary,
            enricher,
            genres,
            cache,
            settings,
        }
    }

    /// Run a search: select a strategy from the criteria shape, fetch raw
    /// hits, enrich them concurrently, then apply the residual filter.
    ///
    /// The result preserves the provider's hit ordering, except for the
    /// popular fallback which is sorted by title and truncated to one page.
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<CanonicalMovie>, SearchError> {
        let strategy = Strategy::select(criteria);
        debug!(?strategy, "Dispatching search");

        let hits = match strategy {
            Strategy::TitleOnly | Strategy::TitleWithFilters => {
                self.title_hits(criteria).await?
            }
            Strategy::FiltersOnly => self.discover_hits(criteria).await?,
            Strategy::PopularFallback => self.popular_hits().await?,
        };

        let mut movies = match strategy {
            Strategy::PopularFallback => {
                let mut movies = self.enrich_all_primary_only(&hits).await;
                movies.sort_by(|a, b| a.title.cmp(&b.title));
                movies.truncate(self.settings.popular_page_size);
                movies
            }
            _ => self.enrich_all(&hits).await,
        };

        if matches!(
            strategy,
            Strategy::TitleWithFilters | Strategy::FiltersOnly
        ) {
            movies.retain(|movie| filter::matches(movie, criteria));
        }

        info!(
            ?strategy,
            hits = hits.len(),
            results = movies.len(),
            "Search completed"
        );
        Ok(movies)
    }

    /// Title-search hits for every kind the criteria fan out to, cache-aside
    /// per kind.
    async fn title_hits(&self, criteria: &SearchCriteria) -> Result<Vec<RawHit>, SearchError> {
        let title = criteria.title.as_deref().unwrap_or_default();

        let mut hits = Vec::new();
        for kind in criteria.kind.kinds() {
            let key = keys::title_search(*kind, title);
            if let Some(cached) =
                cache::get_json::<Vec<RawHit>>(self.cache.as_ref(), &key).await
            {
                hits.extend(cached);
                continue;
            }

            let fetched = self
                .primary
                .search_title(*kind, title)
                .await
                .map_err(SearchError::ProviderUnavailable)?;
            cache::put_json(self.cache.as_ref(), &key, &fetched, self.settings.search_ttl)
                .await;
            hits.extend(fetched);
        }
        Ok(hits)
    }

    /// Discovery hits using whatever filters the Primary provider can express
    /// server-side; the rest is left to the residual filter.
    async fn discover_hits(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<RawHit>, SearchError> {
        let genre = criteria.genre.as_deref();
        let actor = criteria.actors.first().cloned();

        let mut hits = Vec::new();
        for kind in criteria.kind.kinds() {
            let key = keys::discover(*kind, genre, actor.as_deref());
            if let Some(cached) =
                cache::get_json::<Vec<RawHit>>(self.cache.as_ref(), &key).await
            {
                hits.extend(cached);
                continue;
            }

            // Genre tables differ per kind, so the name is resolved per kind.
            // An unknown name falls through to client-side filtering only.
            let genre_id = match genre {
                Some(name) => self.genres.id_for_name(*kind, name).await,
                None => None,
            };
            let filters = DiscoverFilters {
                genre_id,
                actor: actor.clone(),
            };

            let fetched = self
                .primary
                .discover(*kind, &filters)
                .await
                .map_err(SearchError::ProviderUnavailable)?;
            cache::put_json(self.cache.as_ref(), &key, &fetched, self.settings.search_ttl)
                .await;
            hits.extend(fetched);
        }
        Ok(hits)
    }

    /// The shared popular listing, one cache entry for all criteria-less
    /// requests. Both kinds are fetched and concatenated movie-first; the
    /// title sort and page truncation happen after enrichment.
    async fn popular_hits(&self) -> Result<Vec<RawHit>, SearchError> {
        let key = keys::popular();
        if let Some(cached) = cache::get_json::<Vec<RawHit>>(self.cache.as_ref(), &key).await {
            return Ok(cached);
        }

        let (movies, series) = tokio::join!(
            self.primary.popular(TitleKind::Movie),
            self.primary.popular(TitleKind::Series),
        );
        let mut fetched = movies.map_err(SearchError::ProviderUnavailable)?;
        fetched.extend(series.map_err(SearchError::ProviderUnavailable)?);
        cache::put_json(
            self.cache.as_ref(),
            &key,
            &fetched,
            self.settings.popular_ttl,
        )
        .await;
        Ok(fetched)
    }

    /// Bounded fan-out/fan-in enrichment. One task per hit; a failed task
    /// drops its hit and never aborts siblings. Output preserves input order.
    async fn enrich_all(&self, hits: &[RawHit]) -> Vec<CanonicalMovie> {
        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrent_enrichments));

        let tasks = hits.iter().map(|hit| {
            let semaphore = semaphore.clone();
            async move {
                let _permit = semaphore.acquire().await.ok();
                self.enricher.enrich(hit).await
            }
        });

        join_all(tasks)
            .await
            .into_iter()
            .filter_map(|result| match result {
                Ok(movie) => Some(movie),
                Err(e) => {
                    warn!(error = %e, "Dropping hit from results");
                    None
                }
            })
            .collect()
    }

    async fn enrich_all_primary_only(&self, hits: &[RawHit]) -> Vec<CanonicalMovie> {
        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrent_enrichments));

        let tasks = hits.iter().map(|hit| {
            let semaphore = semaphore.clone();
            async move {
                let _permit = semaphore.acquire().await.ok();
                self.enricher.enrich_primary_only(hit).await
            }
        });

        join_all(tasks).await
    }
}
