mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./screendex.toml",
        "~/.config/screendex/config.toml",
        "/etc/screendex/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// API keys can be supplied through the environment instead of the config
/// file, taking precedence when both are set.
fn apply_env_overrides(config: &mut Config) {
    if let Ok(key) = std::env::var("TMDB_API_KEY") {
        if !key.is_empty() {
            config.providers.tmdb.api_key = key;
        }
    }
    if let Ok(key) = std::env::var("OMDB_API_KEY") {
        if !key.is_empty() {
            config.providers.omdb.api_key = key;
        }
    }
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.providers.tmdb.api_key.is_empty() {
        tracing::warn!("No TMDB API key configured; primary provider calls will fail");
    }
    if config.providers.omdb.api_key.is_empty() {
        tracing::warn!("No OMDb API key configured; results will not be enriched");
    }

    if config.search.max_concurrent_enrichments == 0 {
        anyhow::bail!("search.max_concurrent_enrichments cannot be 0");
    }
    if config.cache.max_entries == 0 {
        anyhow::bail!("cache.max_entries cannot be 0");
    }

    Ok(())
}
