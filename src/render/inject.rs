//! Radioactive source data written into form fragments.

use super::json::to_embedded_json;
use super::template::{Substitutions, Template};
use crate::error::Result;
use crate::forms::list_fragments;
use crate::model::{CalibrationRecord, SOURCE_CATEGORY};
use std::fs;
use std::path::Path;

/// Placeholder replaced in fragments.
pub const DATA_SOURCES: &str = "DATA_SOURCES";

/// The calibration records of the source category, in export order.
pub fn source_records(etalons: &[CalibrationRecord]) -> Vec<&CalibrationRecord> {
    etalons
        .iter()
        .filter(|r| r.is_category(SOURCE_CATEGORY))
        .collect()
}

/// Replace `%%DATA_SOURCES%%` in every fragment of `dir` that contains it.
///
/// Returns the number of files rewritten. Fragments that cannot be read
/// are skipped with a warning; a failed write is an error.
pub fn inject_sources(dir: &Path, etalons: &[CalibrationRecord]) -> Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let sources = source_records(etalons);
    let subs = Substitutions::new().with(DATA_SOURCES, to_embedded_json(&sources)?);

    let mut injected = 0;
    for path in list_fragments(dir)? {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "cannot read form, sources not injected");
                continue;
            }
        };

        let template = Template::new(text);
        if !template.contains(DATA_SOURCES) {
            continue;
        }

        fs::write(&path, template.render(&subs))?;
        tracing::debug!(file = %path.display(), sources = sources.len(), "sources injected");
        injected += 1;
    }

    Ok(injected)
}
