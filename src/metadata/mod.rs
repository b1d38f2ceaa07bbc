//! Metadata provider system: external clients, genre resolution, enrichment.
//!
//! # Module layout
//!
//! - [`provider`] -- Capability traits and shared data types.
//! - [`providers`] -- Concrete provider clients (TMDB, OMDb).
//! - [`genres`] -- Cached genre id-to-name resolution.
//! - [`enrich`] -- Per-hit dual-provider enrichment and field merging.

pub mod enrich;
pub mod genres;
pub mod provider;
pub mod providers;

pub use enrich::{Enricher, EnricherSettings, EnrichmentFailure};
pub use genres::GenreResolver;
pub use provider::{
    DiscoverFilters, GenreMap, PrimaryProvider, RawHit, SecondaryProvider, Supplemental, TitleKind,
};
