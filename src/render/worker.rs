//! The service worker script (`sw.js`).

use super::template::{Substitutions, Template};
use crate::changes::fingerprint;
use crate::error::Result;
use crate::model::FormDescriptor;
use serde::Serialize;

/// Placeholder for the cache version.
pub const SW_VERSION: &str = "SW_VERSION";

/// Placeholder for the list of cached fragments.
pub const SW_FILES: &str = "SW_FILES";

const NO_FORMS_LINE: &str = "  // (aucune fiche)";

/// Inputs of the worker version: one fingerprint per record set and the
/// run timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerVersion<'a> {
    #[serde(rename = "e")]
    pub etalons: &'a str,
    #[serde(rename = "m")]
    pub materiels: &'a str,
    #[serde(rename = "c")]
    pub constats: &'a str,
    #[serde(rename = "t")]
    pub timestamp: &'a str,
}

impl WorkerVersion<'_> {
    /// Short version string. Any change of data or run time yields a new
    /// one, which makes browsers drop the old cache.
    pub fn version(&self) -> Result<String> {
        fingerprint(self)
    }
}

/// Cache entries for the fragments, one JavaScript array element per line.
pub fn cache_entries(forms: &[FormDescriptor]) -> String {
    if forms.is_empty() {
        return NO_FORMS_LINE.to_string();
    }
    forms
        .iter()
        .map(|f| format!("  './{}',", f.url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the worker template.
pub fn render_worker(template: &Template, version: &str, forms: &[FormDescriptor]) -> String {
    let subs = Substitutions::new()
        .with(SW_VERSION, version)
        .with(SW_FILES, cache_entries(forms));
    template.render(&subs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::describe;
    use std::collections::BTreeMap;

    #[test]
    fn test_cache_entries() {
        assert_eq!(cache_entries(&[]), "  // (aucune fiche)");

        let forms = vec![
            describe("a.html", &BTreeMap::new()),
            describe("b.html", &BTreeMap::new()),
        ];
        assert_eq!(cache_entries(&forms), "  './forms/a.html',\n  './forms/b.html',");
    }

    #[test]
    fn test_render_worker() {
        let template = Template::new(
            "const CACHE = 'portail-tech-%%SW_VERSION%%';\nconst FILES = [\n%%SW_FILES%%\n];",
        );
        let forms = vec![describe("constat.html", &BTreeMap::new())];
        let js = render_worker(&template, "0123456789ab", &forms);
        assert_eq!(
            js,
            "const CACHE = 'portail-tech-0123456789ab';\nconst FILES = [\n  './forms/constat.html',\n];"
        );
    }

    #[test]
    fn test_version_tracks_inputs() {
        let base = WorkerVersion {
            etalons: "aaaaaaaaaaaa",
            materiels: "bbbbbbbbbbbb",
            constats: "cccccccccccc",
            timestamp: "16/10/2026 10:00",
        };
        let v1 = base.version().unwrap();
        assert_eq!(v1, base.clone().version().unwrap());
        assert_eq!(v1.len(), 12);

        let later = WorkerVersion {
            timestamp: "16/10/2026 10:01",
            ..base
        };
        assert_ne!(v1, later.version().unwrap());
    }
}
