//! CSV ingestion for business transaction exports
//!
//! Exports from accounting tools, banks and spreadsheets disagree on column
//! casing and on whether a type column exists at all. Every row is turned
//! into a [`NewTransaction`] with a non-negative amount and an explicit
//! income/expense type.

use std::collections::HashMap;
use std::io::Read;

use chrono::{Datelike, NaiveDate, Utc};
use csv::{ReaderBuilder, Trim};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{NewTransaction, TransactionStatus, TransactionType, UserId};

/// Downloadable template describing the minimum viable input
pub const SAMPLE_CSV: &str = "Date,Description,Category,Amount,Type
2024-01-15,Client Payment - ABC Corp,Revenue,5000,income
2024-01-16,Office Rent,Operating Expenses,2500,expense
2024-01-17,Software Subscription,Technology,299,expense
2024-01-18,Consulting Revenue,Revenue,3500,income
2024-01-19,Marketing Campaign,Marketing,800,expense
";

const AMOUNT_KEYS: [&str; 3] = ["amount", "Amount", "AMOUNT"];
const DESCRIPTION_KEYS: [&str; 3] = ["description", "Description", "DESCRIPTION"];
const CATEGORY_KEYS: [&str; 3] = ["category", "Category", "CATEGORY"];
const DATE_KEYS: [&str; 3] = ["date", "Date", "DATE"];
const TYPE_KEYS: [&str; 3] = ["type", "Type", "TYPE"];

const DEFAULT_DESCRIPTION: &str = "Unknown";
const DEFAULT_CATEGORY: &str = "Other";

/// One CSV row keyed by its (trimmed) header names
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based line number in the source, for error messages
    pub line: u64,
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new(line: u64, fields: HashMap<String, String>) -> Self {
        Self { line, fields }
    }

    /// Whether any of the keys is a column of this record, even if empty
    fn has_any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.fields.contains_key(*k))
    }

    /// First non-empty value among the keys
    fn first(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.fields.get(*k))
            .map(|v| v.as_str())
            .find(|v| !v.is_empty())
    }
}

/// Read every data row of a CSV document
///
/// The first row is the header. Headers and values are trimmed and blank
/// lines are skipped. Rows whose field count differs from the header, or
/// input that is not UTF-8, fail with [`Error::Parse`].
pub fn read_records<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut records = Vec::new();

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        records.push(RawRecord::new(line, fields));
    }

    debug!(rows = records.len(), "Read CSV records");
    Ok(records)
}

/// Pre-flight gate for a parsed record set
///
/// Returns false when there are no records or none of them carries an
/// amount column under any of its accepted spellings.
pub fn validate_records(records: &[RawRecord]) -> bool {
    !records.is_empty() && records.iter().any(|r| r.has_any(&AMOUNT_KEYS))
}

/// Turn one raw row into a transaction owned by `user_id`
///
/// `today` is used when the row has no date.
pub fn normalize_record(
    record: &RawRecord,
    user_id: UserId,
    today: NaiveDate,
) -> Result<NewTransaction> {
    let amount = record.first(&AMOUNT_KEYS).map(parse_amount).unwrap_or(0.0);

    let description = record
        .first(&DESCRIPTION_KEYS)
        .unwrap_or(DEFAULT_DESCRIPTION)
        .to_string();
    let category = record
        .first(&CATEGORY_KEYS)
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string();

    let date = match record.first(&DATE_KEYS) {
        Some(s) => parse_date(s).ok_or_else(|| {
            Error::Validation(format!("Unable to parse date '{}' on line {}", s, record.line))
        })?,
        None => today,
    };

    let transaction_type = match record.first(&TYPE_KEYS) {
        Some(t) if t.eq_ignore_ascii_case("income") => TransactionType::Income,
        Some(_) => TransactionType::Expense,
        None if amount > 0.0 => TransactionType::Income,
        None => TransactionType::Expense,
    };

    Ok(NewTransaction {
        user_id,
        date,
        description,
        category,
        amount: amount.abs(),
        transaction_type,
        status: TransactionStatus::Completed,
    })
}

/// Parse a CSV document into transactions, dating undated rows today
pub fn parse_csv<R: Read>(reader: R, user_id: UserId) -> Result<Vec<NewTransaction>> {
    parse_csv_as_of(reader, user_id, Utc::now().date_naive())
}

/// Parse a CSV document into transactions with an explicit "today"
pub fn parse_csv_as_of<R: Read>(
    reader: R,
    user_id: UserId,
    today: NaiveDate,
) -> Result<Vec<NewTransaction>> {
    let records = read_records(reader)?;
    let transactions = records
        .iter()
        .map(|r| normalize_record(r, user_id, today))
        .collect::<Result<Vec<_>>>()?;

    debug!(count = transactions.len(), user_id, "Normalized transactions");
    Ok(transactions)
}

/// Parse a date string in various common formats
fn parse_date(s: &str) -> Option<NaiveDate> {
    // %y before %Y: chrono's %Y also accepts short years, turning 24 into 0024
    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%y", // 01/15/24
        "%m/%d/%Y", // 01/15/2024
        "%m-%d-%Y", // 01-15-2024
        "%d/%m/%Y", // 15/01/2024 (European)
    ];

    formats
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
        .find(|d| d.year() >= 1000)
}

/// Parse an amount string, handling currency symbols, commas and
/// accounting-style negatives. Anything unparseable is zero.
fn parse_amount(s: &str) -> f64 {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn parse(csv: &str) -> Result<Vec<NewTransaction>> {
        parse_csv_as_of(csv.as_bytes(), 7, today())
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("01/15/2024"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date("2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(parse_date("15/01/2024"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(parse_date("next tuesday"), None);
    }

    #[test]
    fn test_parse_date_two_digit_year() {
        assert_eq!(parse_date("01/15/24"), NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(parse_date("12/31/99"), NaiveDate::from_ymd_opt(1999, 12, 31));
        // short years never fall through to a four-digit format
        assert_eq!(parse_date("01-15-24"), None);
        assert_eq!(parse_date("15/01/24"), None);
    }

    #[test]
    fn test_short_year_row_is_dated_2024() {
        let txs = parse("Date,Amount\n01/15/24,100\n").unwrap();
        assert_eq!(txs[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56"), 1234.56);
        assert_eq!(parse_amount("-123.45"), -123.45);
        assert_eq!(parse_amount("(100.00)"), -100.00);
        assert_eq!(parse_amount("n/a"), 0.0);
    }

    #[test]
    fn test_sample_template_parses() {
        let txs = parse(SAMPLE_CSV).unwrap();
        assert_eq!(txs.len(), 5);
        assert_eq!(txs[0].description, "Client Payment - ABC Corp");
        assert_eq!(txs[0].transaction_type, TransactionType::Income);
        assert_eq!(txs[1].category, "Operating Expenses");
        assert_eq!(txs[1].transaction_type, TransactionType::Expense);
        assert!(txs.iter().all(|t| t.user_id == 7));
        assert!(txs
            .iter()
            .all(|t| t.status == TransactionStatus::Completed));
    }

    #[test]
    fn test_sign_decides_type_without_type_column() {
        let txs = parse("amount,description\n-150,Refund issued\n300,Sale\n0,Nothing\n").unwrap();
        assert_eq!(txs[0].amount, 150.0);
        assert_eq!(txs[0].transaction_type, TransactionType::Expense);
        assert_eq!(txs[1].amount, 300.0);
        assert_eq!(txs[1].transaction_type, TransactionType::Income);
        assert_eq!(txs[2].transaction_type, TransactionType::Expense);
    }

    #[test]
    fn test_explicit_type_wins_over_sign() {
        let txs = parse("Amount,Type\n-40,INCOME\n40,refund\n").unwrap();
        assert_eq!(txs[0].transaction_type, TransactionType::Income);
        assert_eq!(txs[0].amount, 40.0);
        assert_eq!(txs[1].transaction_type, TransactionType::Expense);
    }

    #[test]
    fn test_empty_type_falls_back_to_sign() {
        let txs = parse("Amount,Type\n250,\n").unwrap();
        assert_eq!(txs[0].transaction_type, TransactionType::Income);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let txs = parse("AMOUNT,DESCRIPTION,CATEGORY,DATE\n12.50,,,\n").unwrap();
        assert_eq!(txs[0].description, "Unknown");
        assert_eq!(txs[0].category, "Other");
        assert_eq!(txs[0].date, today());
        assert_eq!(txs[0].amount, 12.5);
    }

    #[test]
    fn test_unparseable_amount_is_zero_expense() {
        let txs = parse("amount,type\nabc,\n").unwrap();
        assert_eq!(txs[0].amount, 0.0);
        assert_eq!(txs[0].transaction_type, TransactionType::Expense);
    }

    #[test]
    fn test_trims_headers_and_values_and_skips_blank_lines() {
        let csv = " Date , Amount , Category \n 2024-02-01 ,  99.5 , Travel \n\n2024-02-02,1,Travel\n";
        let txs = parse(csv).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].category, "Travel");
        assert_eq!(txs[0].amount, 99.5);
        assert_eq!(txs[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn test_bad_date_is_validation_error() {
        let err = parse("date,amount\n2024-01-15,1\nyesterday,2\n").unwrap_err();
        match err {
            Error::Validation(msg) => {
                assert!(msg.contains("yesterday"));
                assert!(msg.contains("line 3"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_ragged_rows_are_parse_error() {
        let err = parse("date,amount\n2024-01-15,1,extra\n").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().starts_with("Failed to parse CSV data: "));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let bytes: &[u8] = b"amount\n\xff\xfe\n";
        let err = parse_csv_as_of(bytes, 1, today()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_validate_records() {
        let records = read_records("Amount,Description\n10,Coffee\n".as_bytes()).unwrap();
        assert!(validate_records(&records));

        let records = read_records("Total,Description\n10,Coffee\n".as_bytes()).unwrap();
        assert!(!validate_records(&records));

        let records = read_records("amount\n".as_bytes()).unwrap();
        assert!(records.is_empty());
        assert!(!validate_records(&records));
    }
}
