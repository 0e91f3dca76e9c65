//! Report log operations

use chrono::Utc;
use rusqlite::params;

use super::{format_datetime, parse_datetime, Database};
use crate::error::Result;
use crate::models::{NewReport, Report, UserId};

impl Database {
    /// Reports of a user, newest first
    pub fn list_reports(&self, user_id: UserId) -> Result<Vec<Report>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, title, content, type, generated_at
            FROM reports
            WHERE user_id = ?
            ORDER BY id DESC
            "#,
        )?;

        let reports = stmt
            .query_map(params![user_id], |row| {
                let type_str: String = row.get(4)?;
                let generated_at: String = row.get(5)?;
                Ok(Report {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    content: row.get(3)?,
                    report_type: type_str.parse().unwrap_or_default(),
                    generated_at: parse_datetime(&generated_at),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(reports)
    }

    pub fn insert_report(&self, report: &NewReport) -> Result<Report> {
        let conn = self.conn()?;
        let generated_at = format_datetime(&Utc::now());

        conn.execute(
            r#"
            INSERT INTO reports (user_id, title, content, type, generated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                report.user_id,
                report.title,
                report.content,
                report.report_type.as_str(),
                generated_at,
            ],
        )?;

        Ok(Report {
            id: conn.last_insert_rowid(),
            user_id: report.user_id,
            title: report.title.clone(),
            content: report.content.clone(),
            report_type: report.report_type,
            generated_at: parse_datetime(&generated_at),
        })
    }
}
