//! FoodBridge CLI - Database migrations, demo data and offline reports.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! fb-cli migrate
//!
//! # Load demo organizations, users and items
//! fb-cli seed
//!
//! # Print the analytics report as JSON
//! fb-cli report --days 30 --horizon 7
//! ```
//!
//! All commands read `FOODBRIDGE_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fb-cli")]
#[command(author, version, about = "FoodBridge CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo data
    Seed {
        /// Days of history to generate
        #[arg(short, long, default_value_t = 28)]
        days: u32,
    },
    /// Compute the analytics report from the current database
    Report {
        /// Days of daily series to include, also the forecast window (7-90)
        #[arg(short, long, default_value_t = 14)]
        days: usize,

        /// Days to forecast past today
        #[arg(long, default_value_t = 7)]
        horizon: usize,

        /// Cohort weeks to include
        #[arg(short, long, default_value_t = 12)]
        weeks: usize,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fb_cli=info,foodbridge_server=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { days } => commands::seed::demo_data(days).await?,
        Commands::Report {
            days,
            horizon,
            weeks,
        } => {
            let options = commands::report::ReportOptions::new(days, horizon, weeks)?;
            commands::report::print(&options).await?;
        }
    }
    Ok(())
}
