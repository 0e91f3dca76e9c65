//! Import and transaction listing commands

use std::path::Path;

use anyhow::{Context as _, Result};
use ledgerly_core::format::format_currency;
use ledgerly_core::TransactionType;

use super::{truncate, Context};

pub fn cmd_import(ctx: &Context, file: &Path) -> Result<()> {
    println!("📥 Importing transactions from {}...", file.display());

    let data = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let service = ctx.service()?;
    let count = service
        .ingest_csv(ctx.user_id, &data)
        .context("Import failed")?;

    println!("✅ Imported {} financial records", count);
    println!();
    println!("Next: ledgerly metrics");
    Ok(())
}

pub fn cmd_transactions(ctx: &Context, limit: usize) -> Result<()> {
    let service = ctx.service()?;
    let transactions = service.transactions(ctx.user_id)?;

    if transactions.is_empty() {
        println!("No transactions found. Import some with: ledgerly import --file FILE");
        return Ok(());
    }

    let skip = transactions.len().saturating_sub(limit);

    println!();
    println!(
        "{:<10}  {:<36}  {:<20}  {:>12}",
        "DATE", "DESCRIPTION", "CATEGORY", "AMOUNT"
    );
    println!("{}", "-".repeat(84));

    for tx in transactions.iter().skip(skip) {
        let amount = match tx.transaction_type {
            TransactionType::Income => format_currency(tx.amount),
            TransactionType::Expense => format_currency(-tx.amount),
        };
        println!(
            "{:<10}  {:<36}  {:<20}  {:>12}",
            tx.date.format("%Y-%m-%d"),
            truncate(&tx.description, 36),
            truncate(&tx.category, 20),
            amount
        );
    }

    if skip > 0 {
        println!();
        println!(
            "Showing {} of {} transactions (use --limit to see more)",
            transactions.len() - skip,
            transactions.len()
        );
    }

    Ok(())
}

/// Write the sample template to a file, or stdout
pub fn cmd_sample(out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, ledgerly_core::SAMPLE_CSV)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✅ Sample CSV written to {}", path.display());
        }
        None => print!("{}", ledgerly_core::SAMPLE_CSV),
    }
    Ok(())
}
