use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "screendex")]
#[command(author, version, about = "Movie and TV metadata search aggregator")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP search server
    Start {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Run a single search from the command line and print the JSON result
    Search {
        /// Title to search for
        #[arg(long)]
        title: Option<String>,

        /// Comma-separated actor names
        #[arg(long)]
        actors: Option<String>,

        /// Media type: movie, series, or any
        #[arg(long, value_name = "TYPE")]
        media_type: Option<String>,

        /// Genre name
        #[arg(long)]
        genre: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
