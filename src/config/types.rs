use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub omdb: OmdbConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// TMDB v3 API key. Overridable via the `TMDB_API_KEY` environment
    /// variable.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_tmdb_language")]
    pub language: String,

    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}
fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            language: default_tmdb_language(),
            base_url: default_tmdb_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OmdbConfig {
    /// OMDb API key. Overridable via the `OMDB_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_omdb_base_url")]
    pub base_url: String,
}

fn default_omdb_base_url() -> String {
    "https://www.omdbapi.com".to_string()
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_omdb_base_url(),
        }
    }
}

/// Per-data-class TTL table. TTLs are policy, not logic: every class can be
/// tuned independently without touching the fetch paths.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Genre id-to-name tables change rarely.
    #[serde(default = "default_genres_ttl")]
    pub genres_ttl_secs: u64,

    /// The shared popular listing is expensive and criteria-independent.
    #[serde(default = "default_popular_ttl")]
    pub popular_ttl_secs: u64,

    /// Title-search and discovery hit lists.
    #[serde(default = "default_search_ttl")]
    pub search_ttl_secs: u64,

    /// Cast credit listings.
    #[serde(default = "default_credits_ttl")]
    pub credits_ttl_secs: u64,

    /// Secondary-provider lookups and cross-reference ids.
    #[serde(default = "default_secondary_ttl")]
    pub secondary_ttl_secs: u64,
}

fn default_max_entries() -> usize {
    4096
}
fn default_genres_ttl() -> u64 {
    24 * 3600
}
fn default_popular_ttl() -> u64 {
    3600
}
fn default_search_ttl() -> u64 {
    600
}
fn default_credits_ttl() -> u64 {
    6 * 3600
}
fn default_secondary_ttl() -> u64 {
    6 * 3600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            genres_ttl_secs: default_genres_ttl(),
            popular_ttl_secs: default_popular_ttl(),
            search_ttl_secs: default_search_ttl(),
            credits_ttl_secs: default_credits_ttl(),
            secondary_ttl_secs: default_secondary_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Upper bound on concurrently-running enrichments per request.
    #[serde(default = "default_max_concurrent_enrichments")]
    pub max_concurrent_enrichments: usize,

    /// Timeout applied to each enrichment sub-fetch.
    #[serde(default = "default_sub_fetch_timeout")]
    pub sub_fetch_timeout_secs: u64,

    /// Page size of the popular-fallback response.
    #[serde(default = "default_popular_page_size")]
    pub popular_page_size: usize,
}

fn default_max_concurrent_enrichments() -> usize {
    8
}
fn default_sub_fetch_timeout() -> u64 {
    10
}
fn default_popular_page_size() -> usize {
    20
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_enrichments: default_max_concurrent_enrichments(),
            sub_fetch_timeout_secs: default_sub_fetch_timeout(),
            popular_page_size: default_popular_page_size(),
        }
    }
}
