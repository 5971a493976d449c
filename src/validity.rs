//! Validity classification of calibration and equipment dates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of days ahead, inclusive, during which a date is "expiring soon".
pub const EXPIRING_SOON_DAYS: i64 = 90;

/// Years at or beyond this value mean "never expires".
pub const PERMANENT_YEAR: i32 = 2999;

/// Validity status of a dated item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Validity {
    /// No date, or a date that could not be read
    #[serde(rename = "inconnu")]
    Unknown,
    /// Sentinel year, no expiry
    #[serde(rename = "permanent")]
    Permanent,
    /// Already past
    #[serde(rename = "expire")]
    Expired,
    /// Today or within the next 90 days
    #[serde(rename = "bientot")]
    ExpiringSoon,
    /// More than 90 days ahead
    #[serde(rename = "valide")]
    Valid,
}

impl Validity {
    /// The status code used by the portal page.
    pub fn code(&self) -> &'static str {
        match self {
            Validity::Unknown => "inconnu",
            Validity::Permanent => "permanent",
            Validity::Expired => "expire",
            Validity::ExpiringSoon => "bientot",
            Validity::Valid => "valide",
        }
    }

    /// Classify a displayed date against `today`.
    ///
    /// Only the first ten characters are considered and must read
    /// `YYYY-M-D` with a four-digit year and one or two digits for month and
    /// day, so `2030-01-01 08:00` classifies like `2030-01-01`.
    pub fn classify(date: &str, today: NaiveDate) -> Self {
        let Some(date) = parse_leading_date(date) else {
            return Validity::Unknown;
        };

        if date.year() >= PERMANENT_YEAR {
            return Validity::Permanent;
        }

        let delta = (date - today).num_days();
        if delta < 0 {
            Validity::Expired
        } else if delta <= EXPIRING_SOON_DAYS {
            Validity::ExpiringSoon
        } else {
            Validity::Valid
        }
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn parse_leading_date(s: &str) -> Option<NaiveDate> {
    let head = match s.char_indices().nth(10) {
        Some((end, _)) => &s[..end],
        None => s,
    };

    let mut parts = head.split('-');
    let year = parse_digits(parts.next()?, 4, 4)?;
    let month = parse_digits(parts.next()?, 1, 2)?;
    let day = parse_digits(parts.next()?, 1, 2)?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

fn parse_digits(field: &str, min: usize, max: usize) -> Option<u32> {
    if field.len() < min || field.len() > max || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
