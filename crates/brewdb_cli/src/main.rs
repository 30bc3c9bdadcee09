//! brewdb CLI
//!
//! Command-line tools for brewdb database files.
//!
//! # Commands
//!
//! - `info` - Display database metadata and per-table row counts
//! - `tables` - List table names
//! - `stats` - Display per-field statistics for a table
//! - `query` - Run a select against a table
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// brewdb command-line database tools.
#[derive(Parser)]
#[command(name = "brewdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display database metadata and per-table row counts
    Info {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List table names
    Tables,

    /// Display per-field statistics for a table
    Stats {
        /// Table to analyze
        table: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Run a select against a table
    Query {
        /// Table to query
        table: String,

        /// Filter expression as JSON, e.g. '{"age": {"$gte": 30}}'
        #[arg(short, long)]
        filter: Option<String>,

        /// Comma-separated fields to keep in the output
        #[arg(long)]
        fields: Option<String>,

        /// Maximum number of rows to return
        #[arg(short, long)]
        limit: Option<usize>,

        /// Number of matching rows to skip
        #[arg(short, long, default_value = "0")]
        offset: usize,

        /// Field to sort by
        #[arg(long)]
        order_by: Option<String>,

        /// Sort descending
        #[arg(short, long)]
        reverse: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Info { format } => {
            let path = cli.path.ok_or("Database path required for info")?;
            commands::info::run(&path, &format)?;
        }
        Commands::Tables => {
            let path = cli.path.ok_or("Database path required for tables")?;
            commands::tables::run(&path)?;
        }
        Commands::Stats { table, format } => {
            let path = cli.path.ok_or("Database path required for stats")?;
            commands::stats::run(&path, &table, &format)?;
        }
        Commands::Query {
            table,
            filter,
            fields,
            limit,
            offset,
            order_by,
            reverse,
        } => {
            let path = cli.path.ok_or("Database path required for query")?;
            commands::query::run(
                &path,
                &table,
                filter.as_deref(),
                fields.as_deref(),
                limit,
                offset,
                order_by.as_deref(),
                reverse,
            )?;
        }
        Commands::Version => {
            println!("brewdb CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("brewdb Core v{}", brewdb_core::VERSION);
        }
    }

    Ok(())
}
