//! Capability traits for the two external metadata providers, along with the
//! shared data types returned by provider queries.
//!
//! The *Primary* provider (TMDB-shaped) drives discovery: title search,
//! filter-based discovery, popular listings, genre tables, and cast credits.
//! The *Secondary* provider (OMDb-shaped) supplies per-title detail looked up
//! by external id or title+year.
//!
//! Providers are expected to be wrapped in an `Arc` so they can be shared
//! across tasks; each call may fail with a transport or non-2xx error.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Concrete media class as the Primary provider distinguishes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitleKind {
    Movie,
    Series,
}

impl TitleKind {
    /// Short lowercase label, also used in cache key namespacing.
    pub fn as_str(&self) -> &'static str {
        match self {
            TitleKind::Movie => "movie",
            TitleKind::Series => "series",
        }
    }
}

impl std::fmt::Display for TitleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single provider-native record for one title, as returned by search,
/// discovery, or popular listings.
///
/// Owned transiently by the orchestrator during one request; cached only
/// inside provider-specific hit lists, never under its own key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawHit {
    /// Primary-provider numeric identifier.
    pub id: u64,
    pub kind: TitleKind,
    pub title: String,
    /// Release or first-air year, if known.
    pub year: Option<u16>,
    /// Primary-provider genre ids; resolved to names via the genre table.
    pub genre_ids: Vec<u32>,
    /// Fully-qualified poster URL, if the provider supplied artwork.
    pub poster_path: Option<String>,
}

/// Genre id-to-name table for one media kind.
pub type GenreMap = BTreeMap<u32, String>;

/// Server-side filters the Primary provider's discovery endpoint can express.
#[derive(Debug, Clone, Default)]
pub struct DiscoverFilters {
    pub genre_id: Option<u32>,
    /// Actor name; the provider resolves it to a person internally.
    pub actor: Option<String>,
}

/// Per-title detail from the Secondary provider.
///
/// All fields are optional or empty-able: the merge policy in
/// [`enrich`](super::enrich) decides which side wins per field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Supplemental {
    pub title: Option<String>,
    pub year: Option<u16>,
    pub actors: Vec<String>,
    pub director: Option<String>,
    /// Human-readable runtime, e.g. `"148 min"`.
    pub runtime: Option<String>,
    pub plot: Option<String>,
    pub poster_url: Option<String>,
    pub genres: Vec<String>,
    /// Rating-source name to score string, e.g.
    /// `"Rotten Tomatoes" -> "87%"`.
    pub ratings: BTreeMap<String, String>,
}

/// Async capability for the primary (discovery) metadata provider.
#[async_trait]
pub trait PrimaryProvider: Send + Sync {
    /// Search for titles of one kind matching `title`.
    async fn search_title(&self, kind: TitleKind, title: &str) -> anyhow::Result<Vec<RawHit>>;

    /// Discover titles of one kind via server-side filters.
    async fn discover(
        &self,
        kind: TitleKind,
        filters: &DiscoverFilters,
    ) -> anyhow::Result<Vec<RawHit>>;

    /// One page of the provider's popular/trending listing.
    async fn popular(&self, kind: TitleKind) -> anyhow::Result<Vec<RawHit>>;

    /// Full genre id-to-name table for one kind.
    async fn genres(&self, kind: TitleKind) -> anyhow::Result<GenreMap>;

    /// Cast names for one title, in billing order.
    async fn credits(&self, kind: TitleKind, id: u64) -> anyhow::Result<Vec<String>>;

    /// Cross-reference id usable with the Secondary provider (IMDb id), or
    /// `None` when the provider has no mapping for this title.
    async fn external_id(&self, kind: TitleKind, id: u64) -> anyhow::Result<Option<String>>;
}

/// Async capability for the secondary (supplemental detail) provider.
#[async_trait]
pub trait SecondaryProvider: Send + Sync {
    /// Look up a title by its external (IMDb) id. `Ok(None)` means the
    /// provider does not know the title.
    async fn lookup_by_external_id(
        &self,
        external_id: &str,
    ) -> anyhow::Result<Option<Supplemental>>;

    /// Fallback lookup by title and optional year.
    async fn lookup_by_title(
        &self,
        title: &str,
        year: Option<u16>,
    ) -> anyhow::Result<Option<Supplemental>>;
}
