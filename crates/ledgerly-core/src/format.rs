//! Human-readable money and percentages (US dollars)

/// `$5,000`, `-$2,500`; rounded to whole dollars
pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}${}", sign, grouped)
}

/// `$1.2M`, `$5.0K`, otherwise the full amount
pub fn format_compact_currency(amount: f64) -> String {
    if amount >= 1_000_000.0 {
        format!("${:.1}M", amount / 1_000_000.0)
    } else if amount >= 1_000.0 {
        format!("${:.1}K", amount / 1_000.0)
    } else {
        format_currency(amount)
    }
}

/// Signed percentage with one decimal: `+8.3%`, `-2.0%`, `0.0%`
pub fn format_percentage(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    // values that round to zero print unsigned, never as -0.0
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let sign = if rounded > 0.0 { "+" } else { "" };
    format!("{}{:.1}%", sign, rounded)
}
