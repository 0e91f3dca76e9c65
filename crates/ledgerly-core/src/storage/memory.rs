//! In-process storage

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use super::Storage;
use crate::error::{Error, Result};
use crate::models::{
    AiInsight, GeneratedInsight, NewReport, NewTransaction, Report, Transaction, UserId,
};

#[derive(Default)]
struct Tables {
    transactions: HashMap<UserId, Vec<Transaction>>,
    insights: HashMap<UserId, Vec<AiInsight>>,
    reports: HashMap<UserId, Vec<Report>>,
    next_transaction_id: i64,
    next_insight_id: i64,
    next_report_id: i64,
}

/// RwLock-guarded maps keyed by user
///
/// A single lock covers all tables so multi-row writes are atomic.
#[derive(Default)]
pub struct MemoryStorage {
    tables: RwLock<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| Error::InvalidData("memory storage lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| Error::InvalidData("memory storage lock poisoned".into()))
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Storage for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn list_transactions(&self, user_id: UserId) -> Result<Vec<Transaction>> {
        Ok(self
            .read()?
            .transactions
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    fn insert_transactions(&self, transactions: &[NewTransaction]) -> Result<usize> {
        let mut tables = self.write()?;
        for tx in transactions {
            let id = next_id(&mut tables.next_transaction_id);
            tables
                .transactions
                .entry(tx.user_id)
                .or_default()
                .push(Transaction::from_new(id, tx.clone()));
        }
        Ok(transactions.len())
    }

    fn list_insights(&self, user_id: UserId) -> Result<Vec<AiInsight>> {
        Ok(self
            .read()?
            .insights
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    fn replace_insights(
        &self,
        user_id: UserId,
        insights: &[GeneratedInsight],
    ) -> Result<Vec<AiInsight>> {
        let mut tables = self.write()?;
        let generated_at = Utc::now();

        let stored: Vec<AiInsight> = insights
            .iter()
            .map(|i| AiInsight {
                id: next_id(&mut tables.next_insight_id),
                user_id,
                title: i.title.clone(),
                content: i.content.clone(),
                insight_type: i.insight_type,
                generated_at,
            })
            .collect();

        tables.insights.insert(user_id, stored.clone());
        Ok(stored)
    }

    fn clear_insights(&self, user_id: UserId) -> Result<()> {
        self.write()?.insights.remove(&user_id);
        Ok(())
    }

    fn list_reports(&self, user_id: UserId) -> Result<Vec<Report>> {
        let mut reports = self
            .read()?
            .reports
            .get(&user_id)
            .cloned()
            .unwrap_or_default();
        reports.reverse();
        Ok(reports)
    }

    fn insert_report(&self, report: &NewReport) -> Result<Report> {
        let mut tables = self.write()?;
        let stored = Report {
            id: next_id(&mut tables.next_report_id),
            user_id: report.user_id,
            title: report.title.clone(),
            content: report.content.clone(),
            report_type: report.report_type,
            generated_at: Utc::now(),
        };
        tables
            .reports
            .entry(report.user_id)
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }
}
