//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `Context` - Resolved configuration and acting user
//! - `cmd_init` - Initialize the database

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use ledgerly_core::config::StorageConfig;
use ledgerly_core::{AppConfig, FinanceService, UserId};
use tracing::debug;

use crate::cli::Cli;

/// Configuration after file, environment and global flags are applied
pub struct Context {
    pub config: AppConfig,
    pub user_id: UserId,
}

impl Context {
    pub fn load(cli: &Cli) -> Result<Self> {
        let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
        Ok(Self::with_overrides(config, cli.db.clone(), cli.memory, cli.user))
    }

    /// Apply the global flags on top of a loaded configuration
    pub fn with_overrides(
        mut config: AppConfig,
        db: Option<PathBuf>,
        memory: bool,
        user: Option<UserId>,
    ) -> Self {
        if memory {
            config.storage = StorageConfig::Memory;
        } else if let Some(path) = db {
            config.storage = StorageConfig::Sqlite { path };
        }
        let user_id = user.unwrap_or(config.default_user_id);
        debug!(storage = %config.storage.describe(), user_id, "Resolved CLI context");
        Self { config, user_id }
    }

    pub fn service(&self) -> Result<FinanceService> {
        FinanceService::from_config(&self.config).context("Failed to open storage")
    }

    pub fn db_path(&self) -> Option<&Path> {
        match &self.config.storage {
            StorageConfig::Sqlite { path } => Some(path),
            StorageConfig::Memory => None,
        }
    }
}

pub fn cmd_init(ctx: &Context) -> Result<()> {
    match ctx.db_path() {
        Some(path) => println!("🔧 Initializing database at {}...", path.display()),
        None => println!("🔧 Using in-memory storage (nothing is written to disk)"),
    }

    let service = ctx.service()?;
    let count = service.transactions(ctx.user_id)?.len();

    println!("✅ Storage ready ({} transactions for user {})", count, ctx.user_id);
    println!();
    println!("Next steps:");
    println!("  1. Get the template: ledgerly sample --out books.csv");
    println!("  2. Import transactions: ledgerly import --file books.csv");
    println!("  3. Start web UI: ledgerly serve");

    Ok(())
}
