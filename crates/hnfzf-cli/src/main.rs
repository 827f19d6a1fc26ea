mod db;
mod ingest;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const DEFAULT_SEARCH_TERM: &str = "WH1000XM4B";

#[derive(Debug, Parser)]
#[command(name = "hnfzf-cli")]
#[command(about = "hnfzf product search command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one search and print the enriched listings as JSON
    Ingest {
        #[arg(default_value = DEFAULT_SEARCH_TERM)]
        term: String,
        /// Search endpoint base URL
        #[arg(long, env = "HNFZF_SEARCH_BASE_URL")]
        search_base_url: Option<String>,
        /// Detail pages fetched at once
        #[arg(long, env = "HNFZF_SCRAPER_MAX_CONCURRENT_DETAIL_FETCHES")]
        max_concurrent: Option<usize>,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    // Logs go to stderr so `ingest` output stays pipeable JSON.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Ingest {
            term,
            search_base_url,
            max_concurrent,
        }) => ingest::run_ingest(&term, search_base_url, max_concurrent).await,
        Some(Commands::Db { command }) => match command {
            DbCommands::Migrate => db::run_migrate().await,
            DbCommands::Ping => db::run_ping().await,
        },
        None => {
            println!("hnfzf-cli ready; try `hnfzf-cli ingest {DEFAULT_SEARCH_TERM}`");
            Ok(())
        }
    }
}
