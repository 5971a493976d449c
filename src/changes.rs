//! Change detection across export runs.
//!
//! Each tracked record set gets a short content fingerprint. The "last
//! updated" timestamp shown on the portal only moves when that fingerprint
//! changes, so re-running the export on unchanged data keeps the old date.

use crate::error::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Number of hex characters kept from the digest.
pub const FINGERPRINT_LEN: usize = 12;

/// Display format of change timestamps.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Fingerprint of any serializable value.
///
/// The value is first converted to a JSON tree whose objects keep their
/// keys sorted, so two values that only differ in field or insertion order
/// give the same fingerprint.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let canonical = serde_json::to_value(value)?;
    let bytes = serde_json::to_vec(&canonical)?;
    let digest = hex::encode(Sha256::digest(&bytes));
    Ok(digest[..FINGERPRINT_LEN].to_string())
}

/// Format a timestamp the way it is stored and displayed.
pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// A record collection whose changes are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordSet {
    /// Calibration standards
    Etalons,
    /// Equipment
    Materiels,
    /// Form fragments
    Constats,
}

impl RecordSet {
    /// All tracked sets.
    pub const ALL: [RecordSet; 3] = [RecordSet::Etalons, RecordSet::Materiels, RecordSet::Constats];

    /// Key used in the state file.
    pub fn key(&self) -> &'static str {
        match self {
            RecordSet::Etalons => "etalons",
            RecordSet::Materiels => "materiels",
            RecordSet::Constats => "constats",
        }
    }

    fn date_key(&self) -> String {
        format!("date_{}", self.key())
    }

    fn hash_key(&self) -> String {
        format!("hash_{}", self.key())
    }
}

impl fmt::Display for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Persisted last-changed timestamps and fingerprints.
///
/// Stored as a flat JSON object (`date_etalons`, `hash_etalons`, ...).
/// Keys this version does not know about are kept as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateState {
    entries: BTreeMap<String, String>,
}

impl UpdateState {
    /// Empty state, as on a first run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the state file. A missing or unreadable file is an empty state.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "cannot read update state, starting fresh");
                }
                return Self::default();
            }
        };

        match serde_json::from_str::<BTreeMap<String, serde_json::Value>>(&content) {
            Ok(map) => Self {
                entries: map
                    .into_iter()
                    .filter_map(|(k, v)| match v {
                        serde_json::Value::String(s) => Some((k, s)),
                        _ => None,
                    })
                    .collect(),
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt update state, starting fresh");
                Self::default()
            }
        }
    }

    /// Rewrite the state file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Stored fingerprint of a set.
    pub fn fingerprint(&self, set: RecordSet) -> Option<&str> {
        self.entries.get(&set.hash_key()).map(String::as_str)
    }

    /// Stored last-changed timestamp of a set.
    pub fn last_changed(&self, set: RecordSet) -> Option<&str> {
        self.entries.get(&set.date_key()).map(String::as_str)
    }

    /// Record the current fingerprint of a set.
    ///
    /// When it differs from the stored one, both the fingerprint and the
    /// timestamp are replaced and `true` is returned. Otherwise nothing
    /// changes.
    pub fn track(&mut self, set: RecordSet, fingerprint: &str, now: &NaiveDateTime) -> bool {
        if self.fingerprint(set) == Some(fingerprint) {
            return false;
        }
        self.entries.insert(set.date_key(), format_timestamp(now));
        self.entries.insert(set.hash_key(), fingerprint.to_string());
        true
    }
}
