//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Ledgerly - Small-business financial insights
#[derive(Parser)]
#[command(name = "ledgerly")]
#[command(about = "Self-hosted financial dashboard for small businesses", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ~/.config/ledgerly/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path (overrides config and LEDGERLY_DB)
    #[arg(long, global = true, conflicts_with = "memory")]
    pub db: Option<PathBuf>,

    /// Use process-local storage; nothing is kept after exit
    #[arg(long, global = true)]
    pub memory: bool,

    /// User to act as (defaults to the configured default user)
    #[arg(long, global = true)]
    pub user: Option<i64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import transactions from a CSV export
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List imported transactions
    Transactions {
        /// Maximum number of rows to show (most recent last)
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show financial metrics
    Metrics {
        /// Print the full metrics object as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the forward projection
    Forecast,

    /// Show AI insights
    Insights {
        /// Ask the AI backend for a fresh set first
        #[arg(long)]
        regenerate: bool,
    },

    /// Generate a PDF report
    Report {
        /// Report title
        #[arg(short, long)]
        title: Option<String>,

        /// Report type: monthly, quarterly, yearly, custom
        #[arg(long = "type", default_value = "monthly")]
        report_type: String,

        /// Output file (defaults to the title-derived filename)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List generated reports
    Reports,

    /// Write the sample CSV template
    Sample {
        /// Output file (prints to stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show storage, AI backend and renderer status
    Status,

    /// Manage AI prompt templates
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on (defaults to config, then 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to config, then 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Directory containing the built dashboard to serve
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all prompts and their override status
    List,
    /// Show a prompt's content
    Show {
        /// Prompt ID (e.g., financial_insights)
        prompt_id: String,
    },
    /// Print the override directory
    Path,
}
