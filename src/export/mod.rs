//! Record exporters: worksheet rows to normalized records.
//!
//! Each exporter reads a fixed positional column layout from one sheet,
//! skips rows without an identifier, and classifies validity dates
//! against the day of the run.

mod etalons;
mod materiels;

pub use etalons::{etalon_from_row, etalons_from_sheet, export_etalons, ETALONS_SHEET};
pub use materiels::{export_materiels, materiel_from_row, materiels_from_sheet, MATERIELS_SHEET};

use crate::model::SheetRow;
use crate::normalize;
use std::collections::HashMap;

/// Identifier of a data row, `None` for blank separator rows.
pub(crate) fn row_identifier(row: &SheetRow) -> Option<String> {
    let id = normalize::display(row.cell(0));
    (!id.is_empty()).then_some(id)
}

/// Count records by a key, most frequent first, ties by first appearance.
///
/// Used for the per-category and per-site summaries.
pub fn tally_by<T, F>(records: &[T], key: F) -> Vec<(String, usize)>
where
    F: Fn(&T) -> &str,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        let k = key(record);
        let count = counts.entry(k.to_string()).or_insert_with(|| {
            order.push(k.to_string());
            0
        });
        *count += 1;
    }

    let mut tally: Vec<(String, usize)> = order
        .into_iter()
        .map(|k| {
            let n = counts[&k];
            (k, n)
        })
        .collect();
    // stable sort keeps first-appearance order among equal counts
    tally.sort_by(|a, b| b.1.cmp(&a.1));
    tally
}
