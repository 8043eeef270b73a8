//! Number formatting for salaries, counts and tenures.

use crate::mappers::salary_mapper;
use crate::models::Currency;

/// Format an integer with thousands separators: `45000` -> `45,000`
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a count compactly for badges: `950`, `1.5k`, `2.3M`
pub fn format_compact(n: f64) -> String {
    let abs = n.abs();
    // Bucket on the value as displayed, so 999.6 reads "1.0k" and not "1000"
    if abs >= 999_950.0 {
        format!("{:.1}M", n / 1_000_000.0)
    } else if abs >= 999.5 {
        format!("{:.1}k", n / 1_000.0)
    } else {
        format!("{}", n.round() as i64)
    }
}

/// Format a salary with its currency symbol.
///
/// Single-character symbols are glued to the amount (`£45,000`), longer
/// ones are separated by a space (`JPY (¥) 4,500,000`).
pub fn format_salary(amount: i64, currency: Currency) -> String {
    let symbol = salary_mapper(currency);
    if symbol.chars().count() == 1 {
        format!("{}{}", symbol, format_number(amount))
    } else {
        format!("{} {}", symbol, format_number(amount))
    }
}

/// Format a tenure given in (possibly fractional) years
pub fn format_duration_years(years: f64) -> String {
    if years < 1.0 {
        let months = (years * 12.0).round().max(1.0) as i64;
        return if months == 1 {
            "1 month".to_string()
        } else {
            format!("{} months", months)
        };
    }
    if (years - years.round()).abs() < f64::EPSILON {
        let whole = years.round() as i64;
        if whole == 1 {
            "1 year".to_string()
        } else {
            format!("{} years", whole)
        }
    } else {
        format!("{:.1} years", years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(45_000), "45,000");
        assert_eq!(format_number(-1_234_567), "-1,234,567");
        assert_eq!(format_number(i64::MIN), "-9,223,372,036,854,775,808");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(950.0), "950");
        assert_eq!(format_compact(1_500.0), "1.5k");
        assert_eq!(format_compact(2_300_000.0), "2.3M");
    }

    #[test]
    fn test_format_compact_rounds_up_into_next_unit() {
        assert_eq!(format_compact(999.4), "999");
        assert_eq!(format_compact(999.6), "1.0k");
        assert_eq!(format_compact(-999.6), "-1.0k");
        assert_eq!(format_compact(999_949.0), "999.9k");
        assert_eq!(format_compact(999_960.0), "1.0M");
    }

    #[test]
    fn test_format_salary() {
        assert_eq!(format_salary(45_000, Currency::Gbp), "£45,000");
        assert_eq!(format_salary(120_000, Currency::Usd), "$120,000");
        assert_eq!(format_salary(4_500_000, Currency::Jpy), "JPY (¥) 4,500,000");
    }

    #[test]
    fn test_format_duration_years() {
        assert_eq!(format_duration_years(0.5), "6 months");
        assert_eq!(format_duration_years(0.05), "1 month");
        assert_eq!(format_duration_years(1.0), "1 year");
        assert_eq!(format_duration_years(3.0), "3 years");
        assert_eq!(format_duration_years(2.5), "2.5 years");
    }
}
