//! Field normalization: raw cell values to display strings and typed fields.

use crate::model::CellValue;
use chrono::{NaiveDateTime, Timelike};

/// Display string for a cell. Absent values give an empty string.
///
/// Dates render as `YYYY-MM-DD`, with ` HH:MM` appended only when the
/// hour or minute is nonzero. Text is trimmed.
pub fn display(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Text(s) => s.trim().to_string(),
        CellValue::Number(n) => format_number(*n),
        CellValue::Bool(true) => "True".to_string(),
        CellValue::Bool(false) => "False".to_string(),
        CellValue::DateTime(dt) => format_datetime(dt),
        CellValue::Error(e) => e.trim().to_string(),
    }
}

/// Render a date/time as `YYYY-MM-DD` or `YYYY-MM-DD HH:MM`.
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    if dt.hour() != 0 || dt.minute() != 0 {
        dt.format("%Y-%m-%d %H:%M").to_string()
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}

/// Render a number, dropping the fractional part when it is zero.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Parse a decimal written with either `,` or `.` and optional spaces as
/// thousands separators (`1 234,5`). Returns `None` instead of failing.
pub fn parse_decimal(value: &CellValue) -> Option<f64> {
    if let CellValue::Number(n) = value {
        return n.is_finite().then_some(*n);
    }

    let cleaned: String = display(value)
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Date cells as `DD/MM/YYYY`, anything else as its display string.
/// Empty cells give `None`.
pub fn short_date(value: &CellValue) -> Option<String> {
    match value {
        CellValue::DateTime(dt) => Some(dt.format("%d/%m/%Y").to_string()),
        other => Some(display(other)).filter(|s| !s.is_empty()),
    }
}

/// Trim and title-case a site name.
pub fn site_name(value: &CellValue) -> String {
    title_case(&display(value))
}

/// Uppercase the first letter of every alphabetic run and lowercase the rest.
///
/// `saint-laurent des eaux` becomes `Saint-Laurent Des Eaux`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
