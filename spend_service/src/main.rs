//! Spending forecast command-line tool
//!
//! Trains the shared forecast model, prints forecasts and serves the HTTP API.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use spend_service::commands::{self, HistorySource};
use spend_service::Config;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Next-month spending forecasts per category
#[derive(Parser)]
#[command(name = "spend-ai")]
#[command(about = "Per-category spending forecasts and budgeting insights")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Model artifact path (overrides MODEL_PATH)
    #[arg(short, long, global = true)]
    model: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the forecast model and write the artifact
    Train {
        /// Read transactions from a CSV export instead of the database
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Users to train on (all users when omitted)
        #[arg(short, long = "user-id")]
        user_ids: Vec<i64>,
    },

    /// Print next-month forecasts for one user as JSON
    Predict {
        /// User whose debits are forecast
        #[arg(short, long)]
        user_id: i64,

        /// Read transactions from a CSV export instead of the database
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Include trend and suggestion per category
        #[arg(short, long)]
        insights: bool,
    },

    /// Serve the HTTP API
    Serve {
        /// Listen address (overrides BIND_ADDR)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = Config::from_env()?;
    if let Some(model) = cli.model {
        config.model_path = model;
    }
    debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Train { csv, user_ids } => {
            let source = HistorySource::open(&config, csv.as_deref()).await?;
            commands::train::run(&source, &config.model_store(), &user_ids).await?;
        }
        Commands::Predict {
            user_id,
            csv,
            insights,
        } => {
            let source = HistorySource::open(&config, csv.as_deref()).await?;
            commands::predict::run(
                &source,
                &config.model_store(),
                user_id,
                insights,
                config.suggestions.clone(),
            )
            .await?;
        }
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            commands::serve::run(&config).await?;
        }
    }

    Ok(())
}
