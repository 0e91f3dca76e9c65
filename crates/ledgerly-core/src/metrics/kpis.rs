//! Key performance indicators

use crate::models::Transaction;

use super::aggregate::Totals;
use super::types::Kpis;

/// Expense categories counted as cost of goods sold
const COGS_CATEGORIES: [&str; 2] = ["COGS", "Cost of Goods Sold"];

/// Placeholder until subscriber data exists
pub const ESTIMATED_CHURN_RATE: f64 = 5.2;

fn is_cogs(category: &str) -> bool {
    COGS_CATEGORIES.contains(&category)
}

fn is_marketing(category: &str) -> bool {
    category.to_lowercase().contains("marketing")
}

pub fn calculate_kpis(transactions: &[Transaction], totals: &Totals) -> Kpis {
    let mut cogs = 0.0;
    let mut operating_expenses = 0.0;
    let mut marketing = 0.0;

    for tx in transactions.iter().filter(|t| t.is_expense()) {
        if is_cogs(&tx.category) {
            cogs += tx.amount;
        } else {
            operating_expenses += tx.amount;
        }
        if is_marketing(&tx.category) {
            marketing += tx.amount;
        }
    }

    let revenue = totals.revenue;
    let count = transactions.len() as f64;

    let margin = |cost: f64| {
        if revenue > 0.0 {
            (revenue - cost) / revenue * 100.0
        } else {
            0.0
        }
    };

    Kpis {
        gross_margin: margin(cogs),
        operating_margin: margin(operating_expenses),
        burn_rate: (totals.expenses - totals.revenue) / 12.0,
        customer_acquisition_cost: if marketing > 0.0 {
            marketing / (count / 100.0).max(1.0)
        } else {
            0.0
        },
        average_revenue_per_user: if revenue > 0.0 {
            revenue / (count / 50.0).max(1.0)
        } else {
            0.0
        },
        churn_rate: ESTIMATED_CHURN_RATE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::aggregate::totals;
    use crate::metrics::test_support::{expense, income};

    fn kpis_for(txs: &[Transaction]) -> Kpis {
        calculate_kpis(txs, &totals(txs))
    }

    #[test]
    fn test_margins_split_cogs_from_operating() {
        let txs = vec![
            income("2024-01-01", "Revenue", 10000.0),
            expense("2024-01-02", "COGS", 3000.0),
            expense("2024-01-03", "Cost of Goods Sold", 1000.0),
            expense("2024-01-04", "Rent", 2000.0),
        ];
        let kpis = kpis_for(&txs);
        assert_eq!(kpis.gross_margin, 60.0);
        assert_eq!(kpis.operating_margin, 80.0);
        assert_eq!(kpis.burn_rate, -4000.0 / 12.0);
    }

    #[test]
    fn test_cogs_match_is_exact() {
        let txs = vec![
            income("2024-01-01", "Revenue", 1000.0),
            expense("2024-01-02", "cogs", 500.0),
        ];
        assert_eq!(kpis_for(&txs).gross_margin, 100.0);
    }

    #[test]
    fn test_no_revenue_means_zero_margins() {
        let kpis = kpis_for(&[expense("2024-01-02", "Rent", 1200.0)]);
        assert_eq!(kpis.gross_margin, 0.0);
        assert_eq!(kpis.operating_margin, 0.0);
        assert_eq!(kpis.average_revenue_per_user, 0.0);
        assert_eq!(kpis.burn_rate, 100.0);
        assert_eq!(kpis.churn_rate, 5.2);
    }

    #[test]
    fn test_marketing_match_is_case_insensitive_substring() {
        let txs = vec![
            expense("2024-01-02", "Digital MARKETING", 300.0),
            expense("2024-01-03", "Marketing Events", 200.0),
            expense("2024-01-04", "Rent", 1000.0),
        ];
        // fewer than 100 transactions divides by one
        assert_eq!(kpis_for(&txs).customer_acquisition_cost, 500.0);
    }

    #[test]
    fn test_per_user_ratios_scale_with_volume() {
        let mut txs: Vec<Transaction> = (0..199)
            .map(|_| income("2024-01-01", "Revenue", 10.0))
            .collect();
        txs.push(expense("2024-01-02", "Marketing", 100.0));
        let kpis = kpis_for(&txs);
        // 200 transactions: CAC divisor 2, ARPU divisor 4
        assert_eq!(kpis.customer_acquisition_cost, 50.0);
        assert!((kpis.average_revenue_per_user - 1990.0 / 4.0).abs() < 1e-9);
    }
}
