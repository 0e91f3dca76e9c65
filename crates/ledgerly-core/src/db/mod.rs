//! SQLite storage with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `transactions` - Transaction batch insert and listing
//! - `insights` - AI insight set swap
//! - `reports` - Append-only report log

use std::sync::Arc;

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tempfile::TempPath;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{
    AiInsight, GeneratedInsight, NewReport, NewTransaction, Report, Transaction, UserId,
};
use crate::storage::Storage;

mod insights;
mod reports;
mod transactions;


pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
    /// Backing file of a throwaway database, removed with the last clone
    _temp: Option<Arc<TempPath>>,
}

impl Database {
    /// Open (or create) a database file and bring its schema up to date
    pub fn new(path: &str) -> Result<Self> {
        Self::open(path, None)
    }

    fn open(path: &str, temp: Option<TempPath>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
            _temp: temp.map(Arc::new),
        };
        db.run_migrations()?;

        info!(path, "Database ready");
        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing and demo mode)
    ///
    /// Uses a temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Result<Self> {
        let temp = tempfile::Builder::new()
            .prefix("ledgerly_")
            .suffix(".db")
            .tempfile()?
            .into_temp_path();
        let path = temp
            .to_str()
            .ok_or_else(|| Error::InvalidData("temporary path is not UTF-8".into()))?
            .to_string();

        Self::open(&path, Some(temp))
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the ingestion writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Normalized transactions, one row per CSV line
            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                status TEXT NOT NULL DEFAULT 'completed',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_user ON transactions(user_id);

            -- Current AI insight set per user (replaced wholesale on regenerate)
            -- AUTOINCREMENT: a replaced set never reuses ids of the old one
            CREATE TABLE IF NOT EXISTS ai_insights (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                type TEXT NOT NULL,
                generated_at DATETIME NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_ai_insights_user ON ai_insights(user_id);

            -- Append-only report log
            CREATE TABLE IF NOT EXISTS reports (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                type TEXT NOT NULL,
                generated_at DATETIME NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reports_user ON reports(user_id);
            "#,
        )?;

        Ok(())
    }
}

impl Storage for Database {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn list_transactions(&self, user_id: UserId) -> Result<Vec<Transaction>> {
        Database::list_transactions(self, user_id)
    }

    fn count_transactions(&self, user_id: UserId) -> Result<usize> {
        Ok(Database::count_transactions(self, user_id)? as usize)
    }

    fn insert_transactions(&self, transactions: &[NewTransaction]) -> Result<usize> {
        Database::insert_transactions(self, transactions)
    }

    fn list_insights(&self, user_id: UserId) -> Result<Vec<AiInsight>> {
        Database::list_insights(self, user_id)
    }

    fn replace_insights(
        &self,
        user_id: UserId,
        insights: &[GeneratedInsight],
    ) -> Result<Vec<AiInsight>> {
        Database::replace_insights(self, user_id, insights)
    }

    fn clear_insights(&self, user_id: UserId) -> Result<()> {
        Database::clear_insights(self, user_id)
    }

    fn list_reports(&self, user_id: UserId) -> Result<Vec<Report>> {
        Database::list_reports(self, user_id)
    }

    fn insert_report(&self, report: &NewReport) -> Result<Report> {
        Database::insert_report(self, report)
    }
}
