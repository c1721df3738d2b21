// src/common/format.rs
//
// Formatação das células das tabelas. Valores ausentes viram "-".

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

pub const EMPTY: &str = "-";

/// `5000` -> `$5,000`, `1234.5` -> `$1,234.5`. No máximo 3 casas decimais.
pub fn money(amount: Option<Decimal>) -> String {
    match amount {
        Some(value) => format!("${}", group_thousands(value)),
        None => EMPTY.to_string(),
    }
}

fn group_thousands(value: Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// `Mar 5, 2024`
pub fn date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| EMPTY.to_string())
}

/// Mesma forma de `date`, a partir de um timestamp.
pub fn day(value: Option<DateTime<Utc>>) -> String {
    date(value.map(|ts| ts.date_naive()))
}

/// `Mar 5, 2024 3:07 PM`
pub fn timestamp(value: DateTime<Utc>) -> String {
    value.format("%b %-d, %Y %-I:%M %p").to_string()
}

pub fn text(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => EMPTY.to_string(),
    }
}

pub fn percent(value: Option<i32>) -> String {
    value
        .map(|p| format!("{p}%"))
        .unwrap_or_else(|| EMPTY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(Some(Decimal::from(5000))), "$5,000");
        assert_eq!(money(Some(Decimal::from(1_234_567))), "$1,234,567");
        assert_eq!(money(Some(Decimal::from(999))), "$999");
        assert_eq!(money(Some(Decimal::from_str("1234.50").unwrap())), "$1,234.5");
        assert_eq!(money(Some(Decimal::from_str("10.12345").unwrap())), "$10.123");
        assert_eq!(money(None), "-");
    }

    #[test]
    fn dates_use_short_month_names() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(date(Some(d)), "Mar 5, 2024");
        assert_eq!(date(None), "-");

        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 15, 7, 0).unwrap();
        assert_eq!(timestamp(ts), "Mar 5, 2024 3:07 PM");
        assert_eq!(day(Some(ts)), "Mar 5, 2024");
    }

    #[test]
    fn empty_text_is_dashed() {
        assert_eq!(text(Some("")), "-");
        assert_eq!(text(None), "-");
        assert_eq!(text(Some("Acme")), "Acme");
        assert_eq!(percent(Some(40)), "40%");
    }
}
