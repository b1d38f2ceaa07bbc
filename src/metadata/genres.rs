//! Cached genre id-to-name resolution.
//!
//! The Primary provider's genre table changes rarely, so it is fetched whole
//! and cached under a long TTL (`genres:<kind>`). Two concurrent requests may
//! race to repopulate an expired entry; that is a benign duplicate-work race
//! (last writer wins on the cache key), accepted instead of a single-flight
//! lock.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::cache::{self, keys, Cache};
use crate::metadata::provider::{GenreMap, PrimaryProvider, TitleKind};

/// Resolves Primary-provider genre ids to display names, and names back to
/// ids for server-side discovery filters.
pub struct GenreResolver {
    primary: Arc<dyn PrimaryProvider>,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl GenreResolver {
    pub fn new(primary: Arc<dyn PrimaryProvider>, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self {
            primary,
            cache,
            ttl,
        }
    }

    async fn genre_map(&self, kind: TitleKind) -> anyhow::Result<GenreMap> {
        let key = keys::genres(kind);
        if let Some(map) = cache::get_json::<GenreMap>(self.cache.as_ref(), &key).await {
            return Ok(map);
        }

        let map = self.primary.genres(kind).await?;
        cache::put_json(self.cache.as_ref(), &key, &map, self.ttl).await;
        Ok(map)
    }

    /// Resolve genre ids to names, preserving input order.
    ///
    /// Unknown ids are dropped silently (provider schema drift tolerance).
    /// A failed table fetch degrades to an empty list -- genre names are
    /// display metadata and never worth failing a request over.
    pub async fn resolve(&self, kind: TitleKind, genre_ids: &[u32]) -> Vec<String> {
        let map = match self.genre_map(kind).await {
            Ok(map) => map,
            Err(e) => {
                warn!(kind = %kind, error = %e, "Genre table fetch failed; returning no genres");
                return Vec::new();
            }
        };

        genre_ids
            .iter()
            .filter_map(|id| map.get(id).cloned())
            .collect()
    }

    /// Case-insensitive reverse lookup of a genre name.
    ///
    /// Used to translate a criteria genre into a server-side discovery filter;
    /// `None` (unknown name or failed fetch) means the filter is applied
    /// client-side only.
    pub async fn id_for_name(&self, kind: TitleKind, name: &str) -> Option<u32> {
        let map = match self.genre_map(kind).await {
            Ok(map) => map,
            Err(e) => {
                warn!(kind = %kind, error = %e, "Genre table fetch failed; skipping server-side genre filter");
                return None;
            }
        };

        let wanted = name.trim();
        map.iter()
            .find(|(_, genre_name)| genre_name.eq_ignore_ascii_case(wanted))
            .map(|(id, _)| *id)
    }
}
