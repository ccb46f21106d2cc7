use chrono::NaiveDate;

use super::super::domain::UNRESOLVED;

/// Amount with thousands separators and at most two decimals, e.g. `1,234,567.5`.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let fraction = fraction.trim_end_matches('0');
    let negative = value < 0.0 && (whole != "0" || !fraction.is_empty());
    let sign = if negative { "-" } else { "" };

    if fraction.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

/// Ringgit amount, e.g. `RM 1,234,567`.
pub fn format_money(value: f64) -> String {
    format!("RM {}", format_amount(value))
}

pub fn format_percent(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{value:.2}%")
}

/// Long English date, e.g. `1 January 2024`; missing dates render as `N/A`.
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%-d %B %Y").to_string(),
        None => UNRESOLVED.to_string(),
    }
}

pub fn format_period(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    format!("{} - {}", format_date(start), format_date(end))
}

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// First `max` characters of `text`, with `...` appended when anything was cut.
pub fn ellipsize(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", truncate_chars(text, max))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands_and_trims_zero_fraction() {
        assert_eq!(format_money(1_234_567.0), "RM 1,234,567");
        assert_eq!(format_money(0.0), "RM 0");
        assert_eq!(format_money(999.0), "RM 999");
        assert_eq!(format_money(1000.5), "RM 1,000.5");
        assert_eq!(format_money(12.346), "RM 12.35");
        assert_eq!(format_money(-2500.0), "RM -2,500");
    }

    #[test]
    fn percentages_use_two_decimals() {
        assert_eq!(format_percent(12.346), "12.35%");
        assert_eq!(format_percent(0.0), "0.00%");
        assert_eq!(format_percent(f64::NAN), "0.00%");
    }

    #[test]
    fn dates_render_long_form_or_placeholder() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        assert_eq!(format_date(Some(date)), "1 January 2024");
        assert_eq!(format_date(None), "N/A");
        assert_eq!(format_period(Some(date), None), "1 January 2024 - N/A");
    }

    #[test]
    fn ellipsis_only_when_cut() {
        assert_eq!(ellipsize("short", 50), "short");
        let long = "x".repeat(51);
        assert_eq!(ellipsize(&long, 50), format!("{}...", "x".repeat(50)));
        assert_eq!(truncate_chars("Tinjauan Pengurusan Zakat", 8), "Tinjauan");
    }
}
