//! XLSX number formats: which cells hold dates.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;

/// Number format information parsed from `xl/styles.xml`.
#[derive(Debug, Default)]
pub struct Styles {
    /// Custom number formats: numFmtId -> formatCode
    num_fmts: HashMap<u32, String>,
    /// Cell formats: style index (`s` attribute) -> numFmtId
    cell_xfs: Vec<u32>,
}

impl Styles {
    /// Parse styles from `xl/styles.xml` content. Malformed XML yields
    /// whatever was read before the error.
    pub fn parse(xml: &str) -> Self {
        let mut styles = Self::default();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut in_num_fmts = false;
        let mut in_cell_xfs = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e)) => match e.name().as_ref() {
                    b"numFmts" => in_num_fmts = true,
                    b"cellXfs" => in_cell_xfs = true,
                    b"xf" if in_cell_xfs => styles.cell_xfs.push(num_fmt_id_of(e)),
                    b"numFmt" if in_num_fmts => styles.push_num_fmt(e),
                    _ => {}
                },
                Ok(quick_xml::events::Event::Empty(ref e)) => match e.name().as_ref() {
                    b"numFmt" if in_num_fmts => styles.push_num_fmt(e),
                    b"xf" if in_cell_xfs => styles.cell_xfs.push(num_fmt_id_of(e)),
                    _ => {}
                },
                Ok(quick_xml::events::Event::End(ref e)) => match e.name().as_ref() {
                    b"numFmts" => in_num_fmts = false,
                    b"cellXfs" => in_cell_xfs = false,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(_) => break,
                _ => {}
            }
            buf.clear();
        }

        styles
    }

    fn push_num_fmt(&mut self, e: &quick_xml::events::BytesStart<'_>) {
        let mut num_fmt_id: Option<u32> = None;
        let mut format_code = String::new();
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"numFmtId" => num_fmt_id = String::from_utf8_lossy(&attr.value).parse().ok(),
                b"formatCode" => {
                    format_code = attr
                        .unescape_value()
                        .map(|v| v.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string());
                }
                _ => {}
            }
        }
        if let Some(id) = num_fmt_id {
            self.num_fmts.insert(id, format_code);
        }
    }

    /// Whether the cell style at `style_index` formats numbers as dates.
    pub fn is_date_style(&self, style_index: usize) -> bool {
        self.cell_xfs
            .get(style_index)
            .is_some_and(|&id| self.is_date_format(id))
    }

    /// Check if a numFmtId represents a date or time format.
    pub fn is_date_format(&self, num_fmt_id: u32) -> bool {
        // Built-in: 14-22 dates, 45-47 times
        if (14..=22).contains(&num_fmt_id) || (45..=47).contains(&num_fmt_id) {
            return true;
        }

        self.num_fmts
            .get(&num_fmt_id)
            .is_some_and(|code| is_date_format_code(code))
    }
}

fn num_fmt_id_of(e: &quick_xml::events::BytesStart<'_>) -> u32 {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"numFmtId")
        .and_then(|attr| String::from_utf8_lossy(&attr.value).parse().ok())
        .unwrap_or(0)
}

/// Check if a format code contains date tokens outside brackets and quotes.
///
/// `m` alone is ambiguous (month or minute), so it only counts when the
/// code also has a day or year token somewhere.
fn is_date_format_code(format_code: &str) -> bool {
    let mut in_bracket = false;
    let mut in_quote = false;
    let mut escaped = false;
    let mut saw_month_or_minute = false;
    let mut saw_hour = false;

    for c in format_code.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if !in_quote => escaped = true,
            '"' => in_quote = !in_quote,
            '[' if !in_quote => in_bracket = true,
            ']' if !in_quote => in_bracket = false,
            _ if in_bracket || in_quote => {}
            _ => match c.to_ascii_lowercase() {
                'd' | 'y' => return true,
                'm' => saw_month_or_minute = true,
                'h' | 's' => saw_hour = true,
                _ => {}
            },
        }
    }

    // "h:mm" and "mm:ss" are pure times, still stored as day fractions
    saw_hour || (saw_month_or_minute && !format_code.contains('#') && !format_code.contains('0'))
}

/// Convert an Excel serial number to a date/time.
///
/// The 1900 system counts from 1899-12-31 and keeps Lotus 1-2-3's
/// nonexistent 1900-02-29 as serial 60; the 1904 system counts from
/// 1904-01-01. Times are rounded to the nearest second.
pub fn serial_to_datetime(serial: f64, date1904: bool) -> Option<NaiveDateTime> {
    // 2958465 is 9999-12-31, the last date Excel can represent
    if !serial.is_finite() || !(0.0..2_958_466.0).contains(&serial) {
        return None;
    }

    let days = serial.floor();
    let seconds = ((serial - days) * 86_400.0).round() as i64;

    let (epoch, offset) = if date1904 {
        (NaiveDate::from_ymd_opt(1904, 1, 1)?, days as i64)
    } else if days >= 61.0 {
        (NaiveDate::from_ymd_opt(1899, 12, 30)?, days as i64)
    } else if days >= 1.0 {
        (NaiveDate::from_ymd_opt(1899, 12, 31)?, days as i64)
    } else {
        // Serial 0 is a pure time of day
        (NaiveDate::from_ymd_opt(1899, 12, 31)?, 0)
    };

    let date = epoch.checked_add_signed(Duration::days(offset))?;
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::seconds(seconds))
}
