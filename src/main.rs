//! QuickTask API server
//!
//! A REST API for managing personal tasks: create, list, update,
//! soft-delete, and restore, backed by a single SQLite table.

use anyhow::Result;
use clap::Parser;
use quicktask::api;
use quicktask::cli::Cli;
use quicktask::config::Config;
use quicktask::db::Database;
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    // Environment config first, CLI flags override
    let mut config = Config::from_env();
    if let Some(database) = &cli.database {
        config.db_path = database.into();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    config.ensure_db_dir()?;

    info!("Starting QuickTask API v{}", env!("CARGO_PKG_VERSION"));
    info!("Database: {:?}", config.db_path);
    info!("Port: {}", config.port);

    let db = Database::open(&config.db_path)?;
    info!("Database initialized successfully");

    api::serve(Arc::new(db), config.port).await
}
