//! Per-hit enrichment: dual provider sub-fetch and field-level merging.
//!
//! For one raw search hit the [`Enricher`] concurrently fetches cast credits
//! from the Primary provider and supplemental detail from the Secondary
//! provider, then merges both into a [`CanonicalMovie`]. Each sub-fetch is
//! independently cache-aside with its own TTL class and its own timeout; a
//! timed-out sub-fetch is treated exactly like a failed one and never cancels
//! its sibling. A hit is dropped only when both sub-fetches fail.
//!
//! Merge policy (field-level precedence):
//! - `title`, `year`, `type`, `poster_url`, `genres`: Primary wins when
//!   present; Secondary only fills gaps.
//! - `actors`, `director`, `plot`, `runtime`: Secondary wins when non-empty;
//!   Primary credits fill the actor gap.
//! - `ratings`: Secondary only.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::cache::{self, keys, Cache};
use crate::metadata::genres::GenreResolver;
use crate::metadata::provider::{PrimaryProvider, RawHit, SecondaryProvider, Supplemental};
use crate::search::criteria::{CanonicalMovie, Provenance};

/// Both sub-fetches for a hit failed; the hit is dropped from the result list.
#[derive(Debug, Error)]
#[error("both credit and supplemental lookups failed for '{title}'")]
pub struct EnrichmentFailure {
    pub title: String,
}

/// TTL and timeout knobs for the enrichment sub-fetches.
#[derive(Debug, Clone)]
pub struct EnricherSettings {
    pub credits_ttl: Duration,
    pub secondary_ttl: Duration,
    pub sub_fetch_timeout: Duration,
}

impl Default for EnricherSettings {
    fn default() -> Self {
        Self {
            credits_ttl: Duration::from_secs(6 * 3600),
            secondary_ttl: Duration::from_secs(6 * 3600),
            sub_fetch_timeout: Duration::from_secs(10),
        }
    }
}

/// What the secondary side of an enrichment produced.
struct SecondarySide {
    external_id: Option<String>,
    data: Option<Supplemental>,
}

/// Builds one [`CanonicalMovie`] per raw hit.
pub struct Enricher {
    primary: Arc<dyn PrimaryProvider>,
    secondary: Arc<dyn SecondaryProvider>,
    cache: Arc<dyn Cache>,
    genres: Arc<GenreResolver>,
    settings: EnricherSettings,
}

impl Enricher {
    pub fn new(
        primary: Arc<dyn PrimaryProvider>,
        secondary: Arc<dyn SecondaryProvider>,
        cache: Arc<dyn Cache>,
        genres: Arc<GenreResolver>,
        settings: EnricherSettings,
    ) -> Self {
        Self {
            primary,
            secondary,
            cache,
            genres,
            settings,
        }
    }

    /// Enrich one raw hit into a canonical record.
    ///
    /// Returns [`EnrichmentFailure`] only when both the credits sub-fetch and
    /// the supplemental sub-fetch produced nothing; a partial result with
    /// provenance `Primary` or `Secondary` is still returnable.
    pub async fn enrich(&self, hit: &RawHit) -> Result<CanonicalMovie, EnrichmentFailure> {
        let (genre_names, credits, secondary) = tokio::join!(
            self.genres.resolve(hit.kind, &hit.genre_ids),
            self.fetch_credits(hit),
            self.fetch_secondary(hit),
        );

        let credits = match credits {
            Ok(actors) => Some(actors),
            Err(e) => {
                warn!(
                    id = hit.id,
                    title = %hit.title,
                    error = format!("{e:#}"),
                    "Credits sub-fetch failed"
                );
                None
            }
        };

        let primary_ok = credits.is_some();
        let secondary_ok = secondary.data.is_some();
        if !primary_ok && !secondary_ok {
            return Err(EnrichmentFailure {
                title: hit.title.clone(),
            });
        }

        let provenance = match (primary_ok, secondary_ok) {
            (true, true) => Provenance::Merged,
            (true, false) => Provenance::Primary,
            _ => Provenance::Secondary,
        };

        let supp = secondary.data.unwrap_or_default();
        let credit_names = credits.unwrap_or_default();

        Ok(CanonicalMovie {
            id: secondary
                .external_id
                .unwrap_or_else(|| hit.id.to_string()),
            title: if hit.title.is_empty() {
                supp.title.unwrap_or_default()
            } else {
                hit.title.clone()
            },
            year: hit.year.or(supp.year),
            kind: hit.kind,
            genres: if genre_names.is_empty() {
                supp.genres
            } else {
                genre_names
            },
            actors: if supp.actors.is_empty() {
                credit_names
            } else {
                supp.actors
            },
            director: supp.director,
            runtime: supp.runtime,
            plot: supp.plot,
            poster_url: hit.poster_path.clone().or(supp.poster_url),
            ratings: supp.ratings,
            provenance,
        })
    }

    /// Enrich a hit without consulting the Secondary provider.
    ///
    /// Used by the popular-fallback listing, which never cross-references.
    /// Infallible: a failed credits sub-fetch degrades to an empty cast list
    /// rather than dropping the hit, so the listing keeps its full page.
    pub async fn enrich_primary_only(&self, hit: &RawHit) -> CanonicalMovie {
        let (genre_names, credits) = tokio::join!(
            self.genres.resolve(hit.kind, &hit.genre_ids),
            self.fetch_credits(hit),
        );

        let actors = match credits {
            Ok(actors) => actors,
            Err(e) => {
                warn!(
                    id = hit.id,
                    title = %hit.title,
                    error = format!("{e:#}"),
                    "Credits sub-fetch failed"
                );
                Vec::new()
            }
        };

        CanonicalMovie {
            id: hit.id.to_string(),
            title: hit.title.clone(),
            year: hit.year,
            kind: hit.kind,
            genres: genre_names,
            actors,
            director: None,
            runtime: None,
            plot: None,
            poster_url: hit.poster_path.clone(),
            ratings: Default::default(),
            provenance: Provenance::Primary,
        }
    }

    /// Primary sub-fetch: cast credits, cache-aside under `credits:`.
    async fn fetch_credits(&self, hit: &RawHit) -> anyhow::Result<Vec<String>> {
        let key = keys::credits(hit.kind, hit.id);
        if let Some(actors) = cache::get_json::<Vec<String>>(self.cache.as_ref(), &key).await {
            return Ok(actors);
        }

        let actors = timeout(
            self.settings.sub_fetch_timeout,
            self.primary.credits(hit.kind, hit.id),
        )
        .await
        .context("credits lookup timed out")??;

        cache::put_json(self.cache.as_ref(), &key, &actors, self.settings.credits_ttl).await;
        Ok(actors)
    }

    /// Secondary sub-fetch.
    ///
    /// Resolution order: cross-reference the hit to an external id via the
    /// Primary detail endpoint (cache-aside under `xref:`, negative results
    /// included), then look the id up against the Secondary provider (cached
    /// under `omdb:`). A hit the Primary affirmatively reports as having no
    /// external id is a miss -- no title guessing. Only when the
    /// cross-reference itself cannot be determined does the baseline
    /// title+year lookup run. Failures never propagate; they surface as
    /// `data: None` and feed the provenance decision.
    async fn fetch_secondary(&self, hit: &RawHit) -> SecondarySide {
        let external_id = match self.resolve_external_id(hit).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                debug!(id = hit.id, title = %hit.title, "No external id for hit");
                return SecondarySide {
                    external_id: None,
                    data: None,
                };
            }
            Err(e) => {
                warn!(
                    id = hit.id,
                    title = %hit.title,
                    error = format!("{e:#}"),
                    "Cross-reference failed; falling back to title lookup"
                );
                return SecondarySide {
                    external_id: None,
                    data: self.lookup_by_title(hit).await,
                };
            }
        };

        let key = keys::secondary(&external_id);
        if let Some(cached) =
            cache::get_json::<Option<Supplemental>>(self.cache.as_ref(), &key).await
        {
            return SecondarySide {
                external_id: Some(external_id),
                data: cached,
            };
        }

        let result = timeout(
            self.settings.sub_fetch_timeout,
            self.secondary.lookup_by_external_id(&external_id),
        )
        .await
        .context("secondary lookup timed out")
        .and_then(|r| r);

        let data = match result {
            Ok(data) => {
                // Not-found is cached too, so a known-missing title is not
                // re-queried every request.
                cache::put_json(
                    self.cache.as_ref(),
                    &key,
                    &data,
                    self.settings.secondary_ttl,
                )
                .await;
                data
            }
            Err(e) => {
                warn!(
                    external_id = %external_id,
                    error = format!("{e:#}"),
                    "Secondary sub-fetch failed"
                );
                None
            }
        };

        SecondarySide {
            external_id: Some(external_id),
            data,
        }
    }

    async fn resolve_external_id(&self, hit: &RawHit) -> anyhow::Result<Option<String>> {
        let key = keys::xref(hit.kind, hit.id);
        if let Some(cached) =
            cache::get_json::<Option<String>>(self.cache.as_ref(), &key).await
        {
            return Ok(cached);
        }

        let external_id = timeout(
            self.settings.sub_fetch_timeout,
            self.primary.external_id(hit.kind, hit.id),
        )
        .await
        .context("external id lookup timed out")??;

        cache::put_json(
            self.cache.as_ref(),
            &key,
            &external_id,
            self.settings.secondary_ttl,
        )
        .await;
        Ok(external_id)
    }

    async fn lookup_by_title(&self, hit: &RawHit) -> Option<Supplemental> {
        if hit.title.is_empty() {
            return None;
        }

        let key = keys::secondary_by_title(&hit.title, hit.year);
        if let Some(cached) =
            cache::get_json::<Option<Supplemental>>(self.cache.as_ref(), &key).await
        {
            return cached;
        }

        let result = timeout(
            self.settings.sub_fetch_timeout,
            self.secondary.lookup_by_title(&hit.title, hit.year),
        )
        .await
        .context("secondary title lookup timed out")
        .and_then(|r| r);

        match result {
            Ok(data) => {
                cache::put_json(
                    self.cache.as_ref(),
                    &key,
                    &data,
                    self.settings.secondary_ttl,
                )
                .await;
                data
            }
            Err(e) => {
                warn!(
                    title = %hit.title,
                    error = format!("{e:#}"),
                    "Secondary title lookup failed"
                );
                None
            }
        }
    }
}
