//! Transaction database operations

use rusqlite::params;
use tracing::debug;

use super::Database;
use crate::error::Result;
use crate::models::{NewTransaction, Transaction, UserId};

impl Database {
    /// Insert a batch of transactions in one SQLite transaction
    pub fn insert_transactions(&self, transactions: &[NewTransaction]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO transactions (user_id, date, description, category, amount, type, status)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )?;

            for t in transactions {
                stmt.execute(params![
                    t.user_id,
                    t.date.to_string(),
                    t.description,
                    t.category,
                    t.amount,
                    t.transaction_type.as_str(),
                    t.status.as_str(),
                ])?;
            }
        }

        tx.commit()?;
        debug!(count = transactions.len(), "Inserted transactions");
        Ok(transactions.len())
    }

    /// All transactions of a user in insertion order
    pub fn list_transactions(&self, user_id: UserId) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, date, description, category, amount, type, status
            FROM transactions
            WHERE user_id = ?
            ORDER BY id
            "#,
        )?;

        let transactions = stmt
            .query_map(params![user_id], Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Count transactions of a user
    pub fn count_transactions(&self, user_id: UserId) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let date_str: String = row.get(2)?;
        let type_str: String = row.get(6)?;
        let status_str: String = row.get(7)?;
        Ok(Transaction {
            id: row.get(0)?,
            user_id: row.get(1)?,
            date: chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
            description: row.get(3)?,
            category: row.get(4)?,
            amount: row.get(5)?,
            transaction_type: type_str.parse().map_err(|e: String| {
                rusqlite::Error::FromSqlConversionFailure(
                    6,
                    rusqlite::types::Type::Text,
                    e.into(),
                )
            })?,
            status: status_str.parse().unwrap_or_default(),
        })
    }
}
