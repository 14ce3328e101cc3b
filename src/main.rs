use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trendlens::commands::{fetch, serve};
use trendlens::models::Platform;

#[derive(Parser)]
#[command(
    name = "trendlens",
    version,
    about = "Trend aggregation backend for Google Trends and Reddit search",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Bind address, e.g. 0.0.0.0:8080
        #[arg(short, long)]
        bind: Option<String>,

        /// Expose the redacted config debug route
        #[arg(long, default_value = "false")]
        debug_routes: bool,
    },

    /// Fetch and analyze one query, print the report as JSON
    Fetch {
        /// Platform to query (google, reddit)
        platform: Platform,

        /// Search query
        query: String,

        /// Skip the persistence write
        #[arg(long, default_value = "false")]
        no_store: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    tracing::info!("trendlens starting");

    match cli.command {
        Commands::Serve { bind, debug_routes } => {
            tracing::info!(bind = ?bind, debug_routes = %debug_routes, "Starting serve command");
            serve(bind, debug_routes).await?;
        }

        Commands::Fetch {
            platform,
            query,
            no_store,
        } => {
            tracing::info!(
                platform = %platform,
                query = %query,
                no_store = %no_store,
                "Starting fetch command"
            );
            fetch(platform, query, no_store).await?;
        }
    }

    tracing::info!("trendlens completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("trendlens=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("trendlens=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
