//! Prompt variables for the narrative generator
//!
//! Turns the financial summary, a transaction sample and prior insights into
//! the `{{var}}` values the prompt templates expect, and renders a prompt
//! together with the sampling settings from its frontmatter.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{Error, Result};
use crate::format::{format_currency, format_percentage};
use crate::metrics::FinancialSummary;
use crate::models::{AiInsight, ReportType, Transaction};
use crate::prompts::{PromptId, PromptLibrary};

/// Transactions sent along with an insight request
pub const INSIGHT_SAMPLE_SIZE: usize = 10;

/// A prompt ready to send: rendered text plus sampling settings
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    pub system: Option<String>,
    pub user: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub json_output: bool,
}

/// Render a prompt from the library
pub fn render_prompt(
    prompts: &RwLock<PromptLibrary>,
    id: PromptId,
    vars: &HashMap<&str, String>,
) -> Result<RenderedPrompt> {
    let mut prompts = prompts
        .write()
        .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
    let template = prompts.get(id)?;

    Ok(RenderedPrompt {
        system: template.system_section().map(str::to_string),
        user: template.render_user(vars),
        temperature: template.metadata.temperature,
        max_tokens: template.metadata.max_tokens,
        json_output: template.metadata.json_output,
    })
}

/// The most recent transactions by date, newest first
///
/// Ties keep insertion order.
pub fn recent_sample(transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.into_iter().take(limit).cloned().collect()
}

fn summary_vars(summary: &FinancialSummary) -> HashMap<&'static str, String> {
    let mut vars = HashMap::new();
    vars.insert("total_revenue", format_currency(summary.total_revenue));
    vars.insert("total_expenses", format_currency(summary.total_expenses));
    vars.insert("net_cash_flow", format_currency(summary.net_cash_flow));
    vars.insert(
        "average_monthly_revenue",
        format_currency(summary.average_monthly_revenue),
    );
    vars.insert(
        "average_monthly_expenses",
        format_currency(summary.average_monthly_expenses),
    );
    vars.insert(
        "revenue_growth_rate",
        format_percentage(summary.revenue_growth_rate),
    );
    vars.insert(
        "expense_growth_rate",
        format_percentage(summary.expense_growth_rate),
    );
    vars.insert("runway", format!("{:.1}", summary.runway));
    vars
}

/// Variables for the insights prompt
pub fn insight_vars(
    summary: &FinancialSummary,
    sample: &[Transaction],
) -> HashMap<&'static str, String> {
    let mut vars = summary_vars(summary);
    let lines: Vec<String> = sample
        .iter()
        .map(|tx| {
            format!(
                "{}: {} - ${:.2} ({})",
                tx.date.format("%Y-%m-%d"),
                tx.description,
                tx.amount,
                tx.transaction_type
            )
        })
        .collect();
    vars.insert("transactions", lines.join("\n"));
    vars
}

/// Variables for the report prompt
pub fn report_vars(
    summary: &FinancialSummary,
    insights: &[AiInsight],
    report_type: ReportType,
) -> HashMap<&'static str, String> {
    let mut vars = summary_vars(summary);
    vars.insert("report_type", report_type.as_str().to_string());
    let lines: Vec<String> = insights
        .iter()
        .map(|i| format!("- {}: {}", i.title, i.content))
        .collect();
    vars.insert("insights", lines.join("\n"));
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::test_support::{expense, income};
    use crate::models::InsightType;

    fn summary() -> FinancialSummary {
        FinancialSummary {
            total_revenue: 12000.0,
            total_expenses: 6000.0,
            net_cash_flow: 6000.0,
            average_monthly_revenue: 1000.0,
            average_monthly_expenses: 500.0,
            revenue_growth_rate: 8.25,
            expense_growth_rate: -2.0,
            runway: 12.0,
        }
    }

    #[test]
    fn test_recent_sample_newest_first_and_bounded() {
        let txs: Vec<Transaction> = (1..=15)
            .map(|d| income(&format!("2024-01-{:02}", d), "Revenue", d as f64))
            .collect();

        let sample = recent_sample(&txs, INSIGHT_SAMPLE_SIZE);
        assert_eq!(sample.len(), 10);
        assert_eq!(sample[0].amount, 15.0);
        assert_eq!(sample[9].amount, 6.0);

        assert_eq!(recent_sample(&txs[..3], INSIGHT_SAMPLE_SIZE).len(), 3);
    }

    #[test]
    fn test_insight_vars() {
        let sample = vec![expense("2024-01-16", "Operating Expenses", 2500.0)];
        let vars = insight_vars(&summary(), &sample);

        assert_eq!(vars["total_revenue"], "$12,000");
        assert_eq!(vars["revenue_growth_rate"], "+8.3%");
        assert_eq!(vars["expense_growth_rate"], "-2.0%");
        assert_eq!(vars["runway"], "12.0");
        assert_eq!(
            vars["transactions"],
            format!("2024-01-16: {} - $2500.00 (expense)", sample[0].description)
        );
    }

    #[test]
    fn test_report_vars_lists_insights() {
        let insight = AiInsight {
            id: 1,
            user_id: 1,
            title: "Healthy runway".into(),
            content: "A year of cash on hand.".into(),
            insight_type: InsightType::Positive,
            generated_at: chrono::Utc::now(),
        };

        let vars = report_vars(&summary(), &[insight], ReportType::Quarterly);
        assert_eq!(vars["report_type"], "quarterly");
        assert_eq!(vars["insights"], "- Healthy runway: A year of cash on hand.");

        let vars = report_vars(&summary(), &[], ReportType::Monthly);
        assert!(vars["insights"].is_empty());
    }

    #[test]
    fn test_render_prompt_carries_sampling_settings() {
        let library = RwLock::new(PromptLibrary::embedded_only());
        let vars = insight_vars(&summary(), &[]);

        let prompt = render_prompt(&library, PromptId::FinancialInsights, &vars).unwrap();
        assert!(prompt.json_output);
        assert_eq!(prompt.max_tokens, Some(1000));
        assert!(prompt.system.unwrap().contains("financial analyst"));
        assert!(prompt.user.contains("Total Revenue: $12,000"));
        assert!(!prompt.user.contains("Recent Transactions Sample"));
        assert!(!prompt.user.contains("{{"));
    }
}
