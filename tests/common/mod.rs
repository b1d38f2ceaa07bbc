//! Shared test harness for integration tests.
//!
//! Provides stub Primary/Secondary providers with per-endpoint call counters,
//! and [`TestHarness`] which wires them into a full [`AppContext`] backed by
//! an in-memory cache.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use screendex::config::Config;
use screendex::metadata::provider::{
    DiscoverFilters, GenreMap, PrimaryProvider, RawHit, SecondaryProvider, Supplemental, TitleKind,
};
use screendex::server::{build_context_with_providers, AppContext};

/// Canned Primary provider. Configure the public fields before wrapping in an
/// `Arc`; every endpoint counts its calls.
pub struct StubPrimary {
    pub search_hits: Vec<RawHit>,
    pub discover_hits: Vec<RawHit>,
    pub popular_hits: Vec<RawHit>,
    pub genre_map: GenreMap,
    pub credits: Vec<String>,
    pub external_id: Option<String>,
    pub fail_search: bool,
    pub fail_discover: bool,

    pub search_calls: AtomicUsize,
    pub discover_calls: AtomicUsize,
    pub popular_calls: AtomicUsize,
    pub genres_calls: AtomicUsize,
    pub credits_calls: AtomicUsize,
    pub external_id_calls: AtomicUsize,
}

impl Default for StubPrimary {
    fn default() -> Self {
        Self {
            search_hits: Vec::new(),
            discover_hits: Vec::new(),
            popular_hits: Vec::new(),
            genre_map: GenreMap::from([
                (28, "Action".to_string()),
                (18, "Drama".to_string()),
                (878, "Science Fiction".to_string()),
            ]),
            credits: vec!["Ben Affleck".to_string(), "Henry Cavill".to_string()],
            external_id: None,
            fail_search: false,
            fail_discover: false,
            search_calls: AtomicUsize::new(0),
            discover_calls: AtomicUsize::new(0),
            popular_calls: AtomicUsize::new(0),
            genres_calls: AtomicUsize::new(0),
            credits_calls: AtomicUsize::new(0),
            external_id_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PrimaryProvider for StubPrimary {
    async fn search_title(&self, kind: TitleKind, _title: &str) -> anyhow::Result<Vec<RawHit>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            anyhow::bail!("search endpoint down");
        }
        Ok(self
            .search_hits
            .iter()
            .filter(|hit| hit.kind == kind)
            .cloned()
            .collect())
    }

    async fn discover(
        &self,
        kind: TitleKind,
        _filters: &DiscoverFilters,
    ) -> anyhow::Result<Vec<RawHit>> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_discover {
            anyhow::bail!("discover endpoint down");
        }
        Ok(self
            .discover_hits
            .iter()
            .filter(|hit| hit.kind == kind)
            .cloned()
            .collect())
    }

    async fn popular(&self, kind: TitleKind) -> anyhow::Result<Vec<RawHit>> {
        self.popular_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .popular_hits
            .iter()
            .filter(|hit| hit.kind == kind)
            .cloned()
            .collect())
    }

    async fn genres(&self, _kind: TitleKind) -> anyhow::Result<GenreMap> {
        self.genres_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.genre_map.clone())
    }

    async fn credits(&self, _kind: TitleKind, _id: u64) -> anyhow::Result<Vec<String>> {
        self.credits_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.credits.clone())
    }

    async fn external_id(&self, _kind: TitleKind, _id: u64) -> anyhow::Result<Option<String>> {
        self.external_id_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.external_id.clone())
    }
}

/// Canned Secondary provider.
pub struct StubSecondary {
    pub record: Option<Supplemental>,
    pub fail: bool,

    pub id_calls: AtomicUsize,
    pub title_calls: AtomicUsize,
}

impl Default for StubSecondary {
    fn default() -> Self {
        Self {
            record: None,
            fail: false,
            id_calls: AtomicUsize::new(0),
            title_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SecondaryProvider for StubSecondary {
    async fn lookup_by_external_id(&self, _id: &str) -> anyhow::Result<Option<Supplemental>> {
        self.id_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("secondary provider down");
        }
        Ok(self.record.clone())
    }

    async fn lookup_by_title(
        &self,
        _title: &str,
        _year: Option<u16>,
    ) -> anyhow::Result<Option<Supplemental>> {
        self.title_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("secondary provider down");
        }
        Ok(self.record.clone())
    }
}

/// Test harness wrapping a fully-constructed [`AppContext`] with stubbed
/// providers and an in-memory cache.
pub struct TestHarness {
    pub ctx: AppContext,
    pub primary: Arc<StubPrimary>,
    pub secondary: Arc<StubSecondary>,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub fn new(primary: StubPrimary, secondary: StubSecondary) -> Self {
        Self::with_config(Config::default(), primary, secondary)
    }

    /// Create a new harness with a custom configuration.
    pub fn with_config(config: Config, primary: StubPrimary, secondary: StubSecondary) -> Self {
        let primary = Arc::new(primary);
        let secondary = Arc::new(secondary);
        let ctx = build_context_with_providers(config, primary.clone(), secondary.clone());
        Self {
            ctx,
            primary,
            secondary,
        }
    }
}

/// A raw movie hit with sensible defaults.
pub fn movie_hit(id: u64, title: &str, year: u16) -> RawHit {
    RawHit {
        id,
        kind: TitleKind::Movie,
        title: title.to_string(),
        year: Some(year),
        genre_ids: vec![28, 878],
        poster_path: Some(format!("https://image.tmdb.org/t/p/w500/{id}.jpg")),
    }
}

/// A raw series hit with sensible defaults.
pub fn series_hit(id: u64, title: &str, year: u16) -> RawHit {
    RawHit {
        id,
        kind: TitleKind::Series,
        title: title.to_string(),
        year: Some(year),
        genre_ids: vec![18],
        poster_path: None,
    }
}

/// A fully-populated Secondary record.
pub fn supplemental(title: &str, year: u16) -> Supplemental {
    Supplemental {
        title: Some(title.to_string()),
        year: Some(year),
        actors: vec!["Ben Affleck".to_string(), "Amy Adams".to_string()],
        director: Some("Zack Snyder".to_string()),
        runtime: Some("152 min".to_string()),
        plot: Some("Batman confronts Superman.".to_string()),
        poster_url: Some("https://example.com/poster.jpg".to_string()),
        genres: vec!["Action".to_string(), "Adventure".to_string()],
        ratings: BTreeMap::from([
            ("Internet Movie Database".to_string(), "6.5/10".to_string()),
            ("Rotten Tomatoes".to_string(), "29%".to_string()),
        ]),
    }
}
