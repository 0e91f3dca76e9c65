//! Storage backends for transactions, insights and reports
//!
//! - `Storage` trait defines the repository interface the service talks to
//! - `MemoryStorage` keeps everything in process (demo mode, tests)
//! - `Database` persists to SQLite through an r2d2 pool
//!
//! The backend is chosen once at startup from [`StorageConfig`]; nothing
//! downstream probes which one it got.

use std::sync::Arc;

use tracing::info;

use crate::config::StorageConfig;
use crate::db::Database;
use crate::error::Result;
use crate::models::{
    AiInsight, GeneratedInsight, NewReport, NewTransaction, Report, Transaction, UserId,
};

mod memory;

pub use memory::MemoryStorage;

/// Per-user repository operations
///
/// Every write that touches more than one row is atomic: either all rows
/// land or none do.
pub trait Storage: Send + Sync {
    /// Short backend name for status output
    fn name(&self) -> &str;

    /// All transactions of a user in insertion order
    fn list_transactions(&self, user_id: UserId) -> Result<Vec<Transaction>>;

    fn count_transactions(&self, user_id: UserId) -> Result<usize> {
        Ok(self.list_transactions(user_id)?.len())
    }

    /// Insert a batch of transactions, all or nothing
    ///
    /// Returns the number of rows inserted.
    fn insert_transactions(&self, transactions: &[NewTransaction]) -> Result<usize>;

    /// Current insight set of a user
    fn list_insights(&self, user_id: UserId) -> Result<Vec<AiInsight>>;

    /// Swap a user's insight set for a new one in a single step
    fn replace_insights(
        &self,
        user_id: UserId,
        insights: &[GeneratedInsight],
    ) -> Result<Vec<AiInsight>>;

    /// Drop every insight of a user
    fn clear_insights(&self, user_id: UserId) -> Result<()>;

    /// Reports of a user, newest first
    fn list_reports(&self, user_id: UserId) -> Result<Vec<Report>>;

    /// Append a report to the log
    fn insert_report(&self, report: &NewReport) -> Result<Report>;
}

/// Build the storage backend named by the configuration
pub fn open_storage(config: &StorageConfig) -> Result<Arc<dyn Storage>> {
    match config {
        StorageConfig::Memory => {
            info!("Using in-memory storage");
            Ok(Arc::new(MemoryStorage::new()))
        }
        StorageConfig::Sqlite { path } => {
            info!(path = %path.display(), "Using SQLite storage");
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Ok(Arc::new(Database::new(&path.to_string_lossy())?))
        }
    }
}
