//! Command-line interface for pickem.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pickem - NFL pick'em pool server
#[derive(Parser, Debug)]
#[command(name = "pickem")]
#[command(about = "Group pick'em pool: picks against the spread and total, scored weekly", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the SQLite database (created if it doesn't exist)
        #[arg(long)]
        database_url: Option<String>,

        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Apply pending database migrations and exit
    Migrate {
        /// Path to the SQLite database
        #[arg(long)]
        database_url: Option<String>,
    },

    /// Grade a week's final games and rebuild weekly records
    Score {
        /// Week number
        #[arg(long)]
        week: i32,

        /// Season year
        #[arg(long)]
        season: i32,

        /// Only score this group
        #[arg(long)]
        group_id: Option<i32>,

        /// Path to the SQLite database
        #[arg(long)]
        database_url: Option<String>,
    },
}
