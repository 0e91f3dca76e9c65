//! Ledgerly CLI - Small-business financial insights
//!
//! Usage:
//!   ledgerly init                  Initialize database
//!   ledgerly import --file CSV     Import transactions
//!   ledgerly insights --regenerate Ask the AI backend for fresh insights
//!   ledgerly serve --port 3000     Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let ctx = commands::Context::load(&cli)?;

    match cli.command {
        Commands::Init => commands::cmd_init(&ctx),
        Commands::Import { file } => commands::cmd_import(&ctx, &file),
        Commands::Transactions { limit } => commands::cmd_transactions(&ctx, limit),
        Commands::Metrics { json } => commands::cmd_metrics(&ctx, json),
        Commands::Forecast => commands::cmd_forecast(&ctx),
        Commands::Insights { regenerate } => commands::cmd_insights(&ctx, regenerate).await,
        Commands::Report {
            title,
            report_type,
            out,
        } => commands::cmd_report(&ctx, title.as_deref(), &report_type, out.as_deref()).await,
        Commands::Reports => commands::cmd_reports(&ctx),
        Commands::Sample { out } => commands::cmd_sample(out.as_deref()),
        Commands::Status => commands::cmd_status(&ctx).await,
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(&ctx),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(&ctx, &prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(&ctx),
        },
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(ctx, host, port, static_dir).await,
    }
}
