//! CLI definitions for the QuickTask server.
//!
//! This module defines the CLI structure using clap's derive macros.

use clap::Parser;

/// QuickTask REST API server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the SQLite database file (overrides QUICKTASK_DB_PATH)
    #[arg(short, long)]
    pub database: Option<String>,

    /// Port for the HTTP server (overrides QUICKTASK_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2")]
    pub log: String,
}
