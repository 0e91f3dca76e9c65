//! AI insight database operations

use chrono::Utc;
use rusqlite::params;

use super::{format_datetime, parse_datetime, Database};
use crate::error::Result;
use crate::models::{AiInsight, GeneratedInsight, InsightType, UserId};

impl Database {
    pub fn list_insights(&self, user_id: UserId) -> Result<Vec<AiInsight>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, title, content, type, generated_at
            FROM ai_insights
            WHERE user_id = ?
            ORDER BY id
            "#,
        )?;

        let insights = stmt
            .query_map(params![user_id], |row| {
                let type_str: String = row.get(4)?;
                let generated_at: String = row.get(5)?;
                Ok(AiInsight {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    content: row.get(3)?,
                    insight_type: type_str.parse().unwrap_or(InsightType::Info),
                    generated_at: parse_datetime(&generated_at),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(insights)
    }

    /// Delete the old set and insert the new one inside one transaction, so
    /// readers see either the old set or the new set
    pub fn replace_insights(
        &self,
        user_id: UserId,
        insights: &[GeneratedInsight],
    ) -> Result<Vec<AiInsight>> {
        let mut conn = self.conn()?;
        let generated_at = Utc::now();
        let generated_at_str = format_datetime(&generated_at);

        let tx = conn.transaction()?;
        tx.execute("DELETE FROM ai_insights WHERE user_id = ?", params![user_id])?;

        let mut stored = Vec::with_capacity(insights.len());
        for insight in insights {
            tx.execute(
                r#"
                INSERT INTO ai_insights (user_id, title, content, type, generated_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
                params![
                    user_id,
                    insight.title,
                    insight.content,
                    insight.insight_type.as_str(),
                    generated_at_str,
                ],
            )?;
            stored.push(AiInsight {
                id: tx.last_insert_rowid(),
                user_id,
                title: insight.title.clone(),
                content: insight.content.clone(),
                insight_type: insight.insight_type,
                generated_at: parse_datetime(&generated_at_str),
            });
        }

        tx.commit()?;
        Ok(stored)
    }

    pub fn clear_insights(&self, user_id: UserId) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM ai_insights WHERE user_id = ?", params![user_id])?;
        Ok(())
    }
}
