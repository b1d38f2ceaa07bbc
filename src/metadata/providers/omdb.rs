//! OMDb secondary provider.
//!
//! Implements [`SecondaryProvider`] against the OMDb API. OMDb reports
//! missing titles with HTTP 200 and `"Response": "False"`, and missing fields
//! as the literal string `"N/A"`; both are normalized here so the merge layer
//! only ever sees real values or absence.

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::OmdbConfig;
use crate::metadata::provider::{SecondaryProvider, Supplemental};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbPayload {
    response: String,
    title: Option<String>,
    year: Option<String>,
    runtime: Option<String>,
    genre: Option<String>,
    director: Option<String>,
    actors: Option<String>,
    plot: Option<String>,
    poster: Option<String>,
    #[serde(default)]
    ratings: Vec<OmdbRating>,
}

#[derive(Debug, Deserialize)]
struct OmdbRating {
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "Value")]
    value: String,
}

/// OMDb secondary provider.
pub struct OmdbProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    rate_limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl OmdbProvider {
    /// Create a provider from config. Rate limiting is fixed at 2 req/s.
    pub fn new(config: &OmdbConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        let quota = Quota::per_second(NonZeroU32::new(2).unwrap());

        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::direct(quota),
        }
    }

    async fn lookup(&self, params: &[(&str, &str)]) -> anyhow::Result<Option<Supplemental>> {
        let mut url = Url::parse(&self.base_url).context("invalid OMDb base URL")?;
        url.query_pairs_mut().append_pair("apikey", &self.api_key);
        for (key, value) in params {
            url.query_pairs_mut().append_pair(key, value);
        }

        self.rate_limiter.until_ready().await;
        debug!(params = ?params, "OMDb lookup");

        let payload: OmdbPayload = self
            .client
            .get(url)
            .send()
            .await
            .context("OMDb request failed")?
            .error_for_status()
            .context("OMDb request returned error")?
            .json()
            .await
            .context("failed to parse OMDb response")?;

        if !payload.response.eq_ignore_ascii_case("true") {
            return Ok(None);
        }
        Ok(Some(to_supplemental(payload)))
    }
}

/// Treat OMDb's `"N/A"` placeholder as absent.
fn non_na(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "N/A")
}

/// Split an OMDb comma-separated list field into entries.
fn split_list(value: Option<String>) -> Vec<String> {
    non_na(value)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Extract a leading four-digit year; OMDb series years look like `"2011–2019"`.
fn parse_year(value: Option<String>) -> Option<u16> {
    non_na(value)
        .as_deref()
        .and_then(|y| y.get(..4))
        .and_then(|y| y.parse::<u16>().ok())
}

fn to_supplemental(payload: OmdbPayload) -> Supplemental {
    let ratings: BTreeMap<String, String> = payload
        .ratings
        .into_iter()
        .map(|r| (r.source, r.value))
        .collect();

    Supplemental {
        title: non_na(payload.title),
        year: parse_year(payload.year),
        actors: split_list(payload.actors),
        director: non_na(payload.director),
        runtime: non_na(payload.runtime),
        plot: non_na(payload.plot),
        poster_url: non_na(payload.poster),
        genres: split_list(payload.genre),
        ratings,
    }
}

#[async_trait]
impl SecondaryProvider for OmdbProvider {
    async fn lookup_by_external_id(
        &self,
        external_id: &str,
    ) -> anyhow::Result<Option<Supplemental>> {
        self.lookup(&[("i", external_id)]).await
    }

    async fn lookup_by_title(
        &self,
        title: &str,
        year: Option<u16>,
    ) -> anyhow::Result<Option<Supplemental>> {
        match year {
            Some(y) => self.lookup(&[("t", title), ("y", &y.to_string())]).await,
            None => self.lookup(&[("t", title)]).await,
        }
    }
}
