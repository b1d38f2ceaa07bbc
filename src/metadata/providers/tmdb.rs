//! TMDB (The Movie Database) primary provider.
//!
//! Implements [`PrimaryProvider`] against the TMDB v3 REST API.
//!
//! Features:
//! - Token-bucket rate limiting at 4 requests / second via [`governor`].
//! - Automatic retry on HTTP 429 with `Retry-After` header support (max 3 retries).
//! - 10-second request timeout.
//! - Person resolution inside discovery (`with_cast` for movies, per-person
//!   TV credits for series).

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::TmdbConfig;
use crate::metadata::provider::{
    DiscoverFilters, GenreMap, PrimaryProvider, RawHit, TitleKind,
};

const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_RETRIES: u32 = 3;

// ---------------------------------------------------------------------------
// TMDB API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TmdbPage<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieHit {
    id: u64,
    title: Option<String>,
    release_date: Option<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbTvHit {
    id: u64,
    name: Option<String>,
    first_air_date: Option<String>,
    #[serde(default)]
    genre_ids: Vec<u32>,
    poster_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenreList {
    #[serde(default)]
    genres: Vec<TmdbGenre>,
}

#[derive(Debug, Deserialize)]
struct TmdbGenre {
    id: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TmdbCredits {
    #[serde(default)]
    cast: Vec<TmdbCastMember>,
}

#[derive(Debug, Deserialize)]
struct TmdbCastMember {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbMovieDetail {
    imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbTvDetail {
    external_ids: Option<TmdbExternalIds>,
}

#[derive(Debug, Deserialize)]
struct TmdbExternalIds {
    imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TmdbPerson {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct TmdbPersonTvCredits {
    #[serde(default)]
    cast: Vec<TmdbTvHit>,
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// TMDB primary provider with built-in rate limiting and 429 retry.
pub struct TmdbProvider {
    client: reqwest::Client,
    api_key: String,
    language: String,
    base_url: String,
    rate_limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TmdbProvider {
    /// Create a provider from config. Rate limiting is fixed at 4 req/s.
    pub fn new(config: &TmdbConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        let quota = Quota::per_second(NonZeroU32::new(4).unwrap());

        Self {
            client,
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::direct(quota),
        }
    }

    fn url(&self, path: &str, extra_params: &[(&str, &str)]) -> anyhow::Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .with_context(|| format!("invalid TMDB URL for {path}"))?;
        url.query_pairs_mut()
            .append_pair("api_key", &self.api_key)
            .append_pair("language", &self.language);
        for (key, value) in extra_params {
            url.query_pairs_mut().append_pair(key, value);
        }
        Ok(url)
    }

    /// Execute a GET request with rate limiting and 429-retry logic.
    async fn get(&self, url: Url) -> anyhow::Result<reqwest::Response> {
        let mut retries = 0u32;
        loop {
            self.rate_limiter.until_ready().await;

            let resp = self
                .client
                .get(url.clone())
                .send()
                .await
                .with_context(|| format!("TMDB request failed: {}", url.path()))?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!(
                    retry = retries,
                    wait_secs = wait,
                    "TMDB returned 429, backing off"
                );
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            return resp
                .error_for_status()
                .with_context(|| format!("TMDB request returned error: {}", url.path()));
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        extra_params: &[(&str, &str)],
    ) -> anyhow::Result<T> {
        let url = self.url(path, extra_params)?;
        debug!(path, "TMDB GET");
        self.get(url)
            .await?
            .json()
            .await
            .with_context(|| format!("failed to parse TMDB response for {path}"))
    }

    /// Resolve an actor name to the best-matching TMDB person id.
    async fn search_person(&self, name: &str) -> anyhow::Result<Option<u64>> {
        let page: TmdbPage<TmdbPerson> = self
            .get_json("/search/person", &[("query", name), ("page", "1")])
            .await?;
        Ok(page.results.first().map(|p| p.id))
    }

    async fn discover_movies(&self, filters: &DiscoverFilters) -> anyhow::Result<Vec<RawHit>> {
        let mut params: Vec<(&str, String)> = vec![("page", "1".to_string())];
        if let Some(genre_id) = filters.genre_id {
            params.push(("with_genres", genre_id.to_string()));
        }
        if let Some(actor) = filters.actor.as_deref() {
            match self.search_person(actor).await? {
                Some(person_id) => params.push(("with_cast", person_id.to_string())),
                None => return Ok(Vec::new()),
            }
        }

        let borrowed: Vec<(&str, &str)> =
            params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let page: TmdbPage<TmdbMovieHit> = self.get_json("/discover/movie", &borrowed).await?;
        Ok(page.results.into_iter().map(movie_hit).collect())
    }

    /// TV discovery. With an actor filter the discover endpoint cannot express
    /// cast membership, so the person's TV credits are fetched instead and
    /// intersected with the genre filter client-side.
    async fn discover_tv(&self, filters: &DiscoverFilters) -> anyhow::Result<Vec<RawHit>> {
        if let Some(actor) = filters.actor.as_deref() {
            let person_id = match self.search_person(actor).await? {
                Some(id) => id,
                None => return Ok(Vec::new()),
            };
            let credits: TmdbPersonTvCredits = self
                .get_json(&format!("/person/{person_id}/tv_credits"), &[])
                .await?;
            let hits = credits
                .cast
                .into_iter()
                .map(tv_hit)
                .filter(|hit| match filters.genre_id {
                    Some(genre_id) => hit.genre_ids.contains(&genre_id),
                    None => true,
                })
                .collect();
            return Ok(hits);
        }

        let mut params: Vec<(&str, String)> = vec![("page", "1".to_string())];
        if let Some(genre_id) = filters.genre_id {
            params.push(("with_genres", genre_id.to_string()));
        }
        let borrowed: Vec<(&str, &str)> =
            params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let page: TmdbPage<TmdbTvHit> = self.get_json("/discover/tv", &borrowed).await?;
        Ok(page.results.into_iter().map(tv_hit).collect())
    }
}

/// TMDB path segment for a media kind.
fn endpoint(kind: TitleKind) -> &'static str {
    match kind {
        TitleKind::Movie => "movie",
        TitleKind::Series => "tv",
    }
}

/// Extract a four-digit year from a date string like `"2023-04-15"`.
fn parse_year(date: &Option<String>) -> Option<u16> {
    date.as_deref()
        .and_then(|d| d.get(..4))
        .and_then(|y| y.parse::<u16>().ok())
}

/// Convert a TMDB image path fragment to a full URL.
fn image_url(path: &str) -> String {
    format!("{TMDB_IMAGE_BASE}{path}")
}

fn movie_hit(r: TmdbMovieHit) -> RawHit {
    RawHit {
        id: r.id,
        kind: TitleKind::Movie,
        title: r.title.unwrap_or_default(),
        year: parse_year(&r.release_date),
        genre_ids: r.genre_ids,
        poster_path: r.poster_path.map(|p| image_url(&p)),
    }
}

fn tv_hit(r: TmdbTvHit) -> RawHit {
    RawHit {
        id: r.id,
        kind: TitleKind::Series,
        title: r.name.unwrap_or_default(),
        year: parse_year(&r.first_air_date),
        genre_ids: r.genre_ids,
        poster_path: r.poster_path.map(|p| image_url(&p)),
    }
}

#[async_trait]
impl PrimaryProvider for TmdbProvider {
    async fn search_title(&self, kind: TitleKind, title: &str) -> anyhow::Result<Vec<RawHit>> {
        let params = [("query", title), ("page", "1")];
        match kind {
            TitleKind::Movie => {
                let page: TmdbPage<TmdbMovieHit> =
                    self.get_json("/search/movie", &params).await?;
                Ok(page.results.into_iter().map(movie_hit).collect())
            }
            TitleKind::Series => {
                let page: TmdbPage<TmdbTvHit> = self.get_json("/search/tv", &params).await?;
                Ok(page.results.into_iter().map(tv_hit).collect())
            }
        }
    }

    async fn discover(
        &self,
        kind: TitleKind,
        filters: &DiscoverFilters,
    ) -> anyhow::Result<Vec<RawHit>> {
        match kind {
            TitleKind::Movie => self.discover_movies(filters).await,
            TitleKind::Series => self.discover_tv(filters).await,
        }
    }

    async fn popular(&self, kind: TitleKind) -> anyhow::Result<Vec<RawHit>> {
        let path = format!("/{}/popular", endpoint(kind));
        let params = [("page", "1")];
        match kind {
            TitleKind::Movie => {
                let page: TmdbPage<TmdbMovieHit> = self.get_json(&path, &params).await?;
                Ok(page.results.into_iter().map(movie_hit).collect())
            }
            TitleKind::Series => {
                let page: TmdbPage<TmdbTvHit> = self.get_json(&path, &params).await?;
                Ok(page.results.into_iter().map(tv_hit).collect())
            }
        }
    }

    async fn genres(&self, kind: TitleKind) -> anyhow::Result<GenreMap> {
        let list: TmdbGenreList = self
            .get_json(&format!("/genre/{}/list", endpoint(kind)), &[])
            .await?;
        Ok(list.genres.into_iter().map(|g| (g.id, g.name)).collect())
    }

    async fn credits(&self, kind: TitleKind, id: u64) -> anyhow::Result<Vec<String>> {
        let credits: TmdbCredits = self
            .get_json(&format!("/{}/{id}/credits", endpoint(kind)), &[])
            .await?;
        Ok(credits.cast.into_iter().filter_map(|c| c.name).collect())
    }

    async fn external_id(&self, kind: TitleKind, id: u64) -> anyhow::Result<Option<String>> {
        match kind {
            TitleKind::Movie => {
                let detail: TmdbMovieDetail =
                    self.get_json(&format!("/movie/{id}"), &[]).await?;
                Ok(detail.imdb_id.filter(|s| !s.is_empty()))
            }
            TitleKind::Series => {
                let detail: TmdbTvDetail = self
                    .get_json(
                        &format!("/tv/{id}"),
                        &[("append_to_response", "external_ids")],
                    )
                    .await?;
                Ok(detail
                    .external_ids
                    .and_then(|ext| ext.imdb_id)
                    .filter(|s| !s.is_empty()))
            }
        }
    }
}
