mod cli;

use screendex::{
    config, server,
    search::criteria::{MediaKind, SearchCriteria},
};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

async fn start_server(host: String, port: u16, config_path: Option<&std::path::Path>) -> Result<()> {
    // Load config
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    config.server.host = host;
    config.server.port = port;

    tracing::info!("Starting Screendex server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "screendex=trace,tower_http=debug".to_string()
        } else {
            "screendex=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            // Create tokio runtime
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Search {
            title,
            actors,
            media_type,
            genre,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_search(
                title,
                actors,
                media_type,
                genre,
                cli.config.as_deref(),
            ))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("screendex {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn run_search(
    title: Option<String>,
    actors: Option<String>,
    media_type: Option<String>,
    genre: Option<String>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let kind = match media_type.as_deref().map(str::trim) {
        None | Some("") | Some("any") => MediaKind::Any,
        Some("movie") => MediaKind::Movie,
        Some("series") => MediaKind::Series,
        Some(other) => anyhow::bail!("Unknown type '{}'; expected movie, series, or any", other),
    };

    let criteria = SearchCriteria {
        title,
        actors: actors
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        kind,
        genre,
    };

    let ctx = server::build_context(config);
    let movies = ctx.orchestrator.search(&criteria).await?;
    println!("{}", serde_json::to_string_pretty(&movies)?);
    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!(
                "  TMDB key configured: {}",
                !config.providers.tmdb.api_key.is_empty()
            );
            println!(
                "  OMDb key configured: {}",
                !config.providers.omdb.api_key.is_empty()
            );
            println!("  Cache entries: {}", config.cache.max_entries);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}
