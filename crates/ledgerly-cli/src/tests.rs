//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::path::PathBuf;

use clap::Parser;
use ledgerly_core::config::StorageConfig;
use ledgerly_core::{AiBackendKind, AppConfig, PromptId, RendererKind, SAMPLE_CSV};
use tempfile::TempDir;

use crate::cli::{Cli, Commands, PromptsAction};
use crate::commands::{self, truncate, Context};

/// Context backed by a throwaway SQLite file and the mock collaborators
fn setup_test_ctx() -> (TempDir, Context) {
    let dir = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.ai.backend = AiBackendKind::Mock;
    config.renderer.backend = RendererKind::Mock;
    let ctx = Context::with_overrides(config, Some(dir.path().join("test.db")), false, Some(1));
    (dir, ctx)
}

fn write_sample(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("books.csv");
    std::fs::write(&path, SAMPLE_CSV).unwrap();
    path
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_global_flags() {
    let cli = Cli::try_parse_from([
        "ledgerly", "--db", "books.db", "--user", "7", "-v", "metrics", "--json",
    ])
    .unwrap();
    assert_eq!(cli.db, Some(PathBuf::from("books.db")));
    assert_eq!(cli.user, Some(7));
    assert!(cli.verbose);
    assert!(matches!(cli.command, Commands::Metrics { json: true }));
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["ledgerly", "status", "--memory"]).unwrap();
    assert!(cli.memory);
    assert!(matches!(cli.command, Commands::Status));
}

#[test]
fn test_db_conflicts_with_memory() {
    let result = Cli::try_parse_from(["ledgerly", "--db", "x.db", "--memory", "status"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_report_defaults() {
    let cli = Cli::try_parse_from(["ledgerly", "report"]).unwrap();
    match cli.command {
        Commands::Report {
            title,
            report_type,
            out,
        } => {
            assert!(title.is_none());
            assert_eq!(report_type, "monthly");
            assert!(out.is_none());
        }
        _ => panic!("expected report command"),
    }
}

#[test]
fn test_parse_report_type_flag() {
    let cli = Cli::try_parse_from([
        "ledgerly", "report", "--title", "Q1 Review", "--type", "quarterly", "--out", "q1.pdf",
    ])
    .unwrap();
    match cli.command {
        Commands::Report {
            title,
            report_type,
            out,
        } => {
            assert_eq!(title.as_deref(), Some("Q1 Review"));
            assert_eq!(report_type, "quarterly");
            assert_eq!(out, Some(PathBuf::from("q1.pdf")));
        }
        _ => panic!("expected report command"),
    }
}

#[test]
fn test_parse_serve_and_prompts() {
    let cli = Cli::try_parse_from(["ledgerly", "serve", "--port", "8080"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Serve {
            port: Some(8080),
            host: None,
            static_dir: None
        }
    ));

    let cli = Cli::try_parse_from(["ledgerly", "prompts", "show", "financial_report"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Prompts {
            action: Some(PromptsAction::Show { .. })
        }
    ));
}

#[test]
fn test_import_requires_file() {
    assert!(Cli::try_parse_from(["ledgerly", "import"]).is_err());
}

// ========== Context Tests ==========

#[test]
fn test_memory_flag_wins() {
    let ctx = Context::with_overrides(AppConfig::default(), None, true, None);
    assert_eq!(ctx.config.storage, StorageConfig::Memory);
    assert!(ctx.db_path().is_none());
    assert_eq!(ctx.user_id, ledgerly_core::config::DEFAULT_USER_ID);
}

#[test]
fn test_db_flag_overrides_config() {
    let ctx = Context::with_overrides(
        AppConfig::default(),
        Some(PathBuf::from("/tmp/other.db")),
        false,
        Some(3),
    );
    assert_eq!(ctx.db_path(), Some(std::path::Path::new("/tmp/other.db")));
    assert_eq!(ctx.user_id, 3);
}

#[test]
fn test_user_defaults_to_config() {
    let config = AppConfig {
        default_user_id: 42,
        ..AppConfig::default()
    };
    let ctx = Context::with_overrides(config, None, true, None);
    assert_eq!(ctx.user_id, 42);
}

// ========== Command Tests ==========

#[test]
fn test_cmd_init() {
    let (_dir, ctx) = setup_test_ctx();
    assert!(commands::cmd_init(&ctx).is_ok());
    assert!(ctx.db_path().unwrap().exists());
}

#[test]
fn test_cmd_import_then_list() {
    let (dir, ctx) = setup_test_ctx();
    let file = write_sample(&dir);

    commands::cmd_import(&ctx, &file).unwrap();
    assert_eq!(ctx.service().unwrap().transactions(1).unwrap().len(), 5);

    assert!(commands::cmd_transactions(&ctx, 2).is_ok());
    assert!(commands::cmd_metrics(&ctx, false).is_ok());
    assert!(commands::cmd_metrics(&ctx, true).is_ok());
    assert!(commands::cmd_forecast(&ctx).is_ok());
}

#[test]
fn test_cmd_import_missing_file() {
    let (dir, ctx) = setup_test_ctx();
    let result = commands::cmd_import(&ctx, &dir.path().join("nope.csv"));
    assert!(result.is_err());
}

#[test]
fn test_cmd_import_invalid_csv_stores_nothing() {
    let (dir, ctx) = setup_test_ctx();
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "Date,Description\n2024-01-15,Lunch\n").unwrap();

    let err = commands::cmd_import(&ctx, &path).unwrap_err();
    assert!(format!("{:#}", err).contains("No valid financial data found in file"));
    assert!(ctx.service().unwrap().transactions(1).unwrap().is_empty());
}

#[test]
fn test_cmd_metrics_empty() {
    let (_dir, ctx) = setup_test_ctx();
    assert!(commands::cmd_metrics(&ctx, false).is_ok());
    assert!(commands::cmd_transactions(&ctx, 20).is_ok());
}

#[tokio::test]
async fn test_cmd_insights_regenerate() {
    let (dir, ctx) = setup_test_ctx();
    commands::cmd_import(&ctx, &write_sample(&dir)).unwrap();

    commands::cmd_insights(&ctx, true).await.unwrap();
    assert_eq!(ctx.service().unwrap().insights(1).unwrap().len(), 3);

    assert!(commands::cmd_insights(&ctx, false).await.is_ok());
}

#[tokio::test]
async fn test_cmd_insights_without_data() {
    let (_dir, ctx) = setup_test_ctx();
    let err = commands::cmd_insights(&ctx, true).await.unwrap_err();
    assert!(format!("{:#}", err).contains("No financial data available"));
}

#[tokio::test]
async fn test_cmd_report_writes_document() {
    let (dir, ctx) = setup_test_ctx();
    commands::cmd_import(&ctx, &write_sample(&dir)).unwrap();

    let out = dir.path().join("q1.pdf");
    commands::cmd_report(&ctx, Some("Q1 Review"), "quarterly", Some(&out))
        .await
        .unwrap();

    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let reports = ctx.service().unwrap().reports(1).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].title, "Q1 Review");
    assert!(commands::cmd_reports(&ctx).is_ok());
}

#[tokio::test]
async fn test_cmd_report_rejects_unknown_type() {
    let (dir, ctx) = setup_test_ctx();
    commands::cmd_import(&ctx, &write_sample(&dir)).unwrap();

    let result = commands::cmd_report(&ctx, None, "weekly", None).await;
    assert!(result.is_err());
    assert!(ctx.service().unwrap().reports(1).unwrap().is_empty());
}

#[tokio::test]
async fn test_cmd_report_without_renderer() {
    let (dir, mut ctx) = setup_test_ctx();
    ctx.config.renderer.backend = RendererKind::None;
    commands::cmd_import(&ctx, &write_sample(&dir)).unwrap();

    let err = commands::cmd_report(&ctx, None, "monthly", Some(&dir.path().join("r.pdf")))
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("Document renderer is not configured"));
}

#[tokio::test]
async fn test_cmd_status() {
    let (_dir, ctx) = setup_test_ctx();
    assert!(commands::cmd_status(&ctx).await.is_ok());
}

#[test]
fn test_cmd_sample_writes_template() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("sample.csv");
    commands::cmd_sample(Some(&out)).unwrap();
    assert_eq!(std::fs::read_to_string(&out).unwrap(), SAMPLE_CSV);
}

// ========== Prompts Command Tests ==========

#[test]
fn test_parse_prompt_id() {
    assert_eq!(
        commands::parse_prompt_id("financial_insights"),
        Some(PromptId::FinancialInsights)
    );
    assert_eq!(commands::parse_prompt_id("monthly_summary"), None);
}

#[test]
fn test_cmd_prompts_with_override_dir() {
    let (dir, mut ctx) = setup_test_ctx();
    ctx.config.ai.prompts_dir = Some(dir.path().join("prompts"));

    assert!(commands::cmd_prompts_list(&ctx).is_ok());
    assert!(commands::cmd_prompts_show(&ctx, "financial_report").is_ok());
    assert!(commands::cmd_prompts_show(&ctx, "unknown").is_err());
    assert!(commands::cmd_prompts_path(&ctx).is_ok());
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("Client Payment - ABC Corp", 10), "Client ...");
    assert_eq!(truncate("Café Crème Brûlée", 8), "Café ...");
}
