//! Rule-based target areas

use super::types::{CategoryAmount, Kpis, Priority, TargetArea};

/// Share of total expenses above which a category is flagged
const CONCENTRATION_THRESHOLD: f64 = 30.0;
const CONCENTRATION_HIGH: f64 = 50.0;

const GROSS_MARGIN_THRESHOLD: f64 = 50.0;
const GROSS_MARGIN_HIGH: f64 = 30.0;

/// Flag problem areas, in order: cash flow, concentrated expense
/// categories, profitability
pub fn identify_target_areas(breakdown: &[CategoryAmount], kpis: &Kpis) -> Vec<TargetArea> {
    let mut areas = Vec::new();

    if kpis.burn_rate > 0.0 {
        areas.push(TargetArea {
            category: "Cash Flow".to_string(),
            issue: "Negative cash flow detected".to_string(),
            priority: Priority::High,
            recommendation: "Focus on increasing revenue or reducing operating expenses"
                .to_string(),
        });
    }

    let total: f64 = breakdown.iter().map(|c| c.amount).sum();
    if total > 0.0 {
        for entry in breakdown {
            let share = entry.amount * 100.0 / total;
            if share > CONCENTRATION_THRESHOLD {
                areas.push(TargetArea {
                    category: "Expense Management".to_string(),
                    issue: format!(
                        "High spending in {} ({:.1}% of total expenses)",
                        entry.category, share
                    ),
                    priority: if share > CONCENTRATION_HIGH {
                        Priority::High
                    } else {
                        Priority::Medium
                    },
                    recommendation: format!("Review and optimize {} expenses", entry.category),
                });
            }
        }
    }

    if kpis.gross_margin < GROSS_MARGIN_THRESHOLD {
        areas.push(TargetArea {
            category: "Profitability".to_string(),
            issue: format!("Low gross margin ({:.1}%)", kpis.gross_margin),
            priority: if kpis.gross_margin < GROSS_MARGIN_HIGH {
                Priority::High
            } else {
                Priority::Medium
            },
            recommendation: "Consider increasing prices or reducing cost of goods sold"
                .to_string(),
        });
    }

    areas
}
