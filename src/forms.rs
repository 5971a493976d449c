//! Form fragment discovery.
//!
//! Fragments are standalone HTML files in the forms directory. Each one may
//! describe itself with `<meta name="fiche-<key>" content="...">` tags near
//! the top of the file.

use crate::error::Result;
use crate::model::FormDescriptor;
use crate::normalize::title_case;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Default number of characters inspected for metadata tags.
pub const DEFAULT_METADATA_WINDOW: usize = 4000;

/// URL prefix of fragments, relative to the page.
pub const FORMS_URL_PREFIX: &str = "forms/";

const DEFAULT_DESCRIPTION: &str = "Formulaire de vérification";
const DEFAULT_CATEGORY: &str = "Général";
const DEFAULT_ICON: &str = "📋";

fn meta_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)<meta\s+name=["']fiche-(\w+)["']\s+content=["']([^"']*)["']"#)
            .expect("valid meta tag pattern")
    })
}

/// Extract `fiche-<key>` metadata from the first `window` characters of a
/// document. Keys keep their case; a repeated key takes the last value.
pub fn extract_metadata(text: &str, window: usize) -> BTreeMap<String, String> {
    let bounded = match text.char_indices().nth(window) {
        Some((end, _)) => &text[..end],
        None => text,
    };

    let mut meta = BTreeMap::new();
    for caps in meta_tag_pattern().captures_iter(bounded) {
        meta.insert(caps[1].to_string(), caps[2].to_string());
    }
    meta
}

/// Title derived from a file stem: `controle_ecm-v2` gives `Controle Ecm V2`.
pub fn title_from_filename(stem: &str) -> String {
    title_case(&stem.replace(['_', '-'], " "))
}

/// Build a descriptor from a file name and its extracted metadata.
///
/// Each field takes the explicit tag when present, else its default.
pub fn describe(filename: &str, meta: &BTreeMap<String, String>) -> FormDescriptor {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let field = |key: &str, default: String| meta.get(key).cloned().unwrap_or(default);

    FormDescriptor {
        filename: filename.to_string(),
        url: format!("{}{}", FORMS_URL_PREFIX, filename),
        title: field("titre", title_from_filename(&stem)),
        description: field("description", DEFAULT_DESCRIPTION.to_string()),
        category: field("categorie", DEFAULT_CATEGORY.to_string()),
        icon: field("icon", DEFAULT_ICON.to_string()),
    }
}

/// List `*.html` fragments in `dir`, sorted by file name.
pub fn list_fragments(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "html"))
        .collect();
    files.sort();
    Ok(files)
}

/// Read the start of a file, enough bytes to hold `window` characters.
fn read_prefix(path: &Path, window: usize) -> io::Result<String> {
    let limit = window.saturating_mul(4) as u64;
    let mut bytes = Vec::new();
    File::open(path)?.take(limit).read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Scan the forms directory and describe every fragment.
///
/// A missing directory is created and yields no descriptors; a path that is
/// not a directory yields none either. A fragment that cannot be read is
/// still listed, with default metadata.
pub fn scan_forms(dir: &Path, window: usize) -> Result<Vec<FormDescriptor>> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        tracing::info!(dir = %dir.display(), "forms directory created");
        return Ok(Vec::new());
    }
    if !dir.is_dir() {
        tracing::warn!(path = %dir.display(), "forms path is not a directory, no form scanned");
        return Ok(Vec::new());
    }

    let mut forms = Vec::new();
    for path in list_fragments(dir)? {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let meta = match read_prefix(&path, window) {
            Ok(text) => extract_metadata(&text, window),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "cannot read form, using defaults");
                BTreeMap::new()
            }
        };

        let form = describe(&filename, &meta);
        tracing::debug!(file = %filename, title = %form.title, "form found");
        forms.push(form);
    }

    Ok(forms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_metadata() {
        let html = r#"<html><head>
<meta name="fiche-titre" content="Contrôle radiamètre">
<META NAME='fiche-icon' CONTENT='☢'>
<meta name="description" content="not a fiche tag">
</head></html>"#;

        let meta = extract_metadata(html, DEFAULT_METADATA_WINDOW);
        assert_eq!(meta.get("titre").map(String::as_str), Some("Contrôle radiamètre"));
        assert_eq!(meta.get("icon").map(String::as_str), Some("☢"));
        assert_eq!(meta.len(), 2);
    }

    #[test]
    fn test_repeated_tag_keeps_last_value() {
        let html = r#"<meta name="fiche-titre" content="Brouillon"><meta name="fiche-titre" content="Finale">"#;
        let meta = extract_metadata(html, DEFAULT_METADATA_WINDOW);
        assert_eq!(meta.get("titre").map(String::as_str), Some("Finale"));
        assert_eq!(meta.len(), 1);
    }

    #[test]
    fn test_key_case_is_preserved() {
        let meta = extract_metadata(r#"<meta name="fiche-Icon" content="☢">"#, DEFAULT_METADATA_WINDOW);
        assert_eq!(meta.get("Icon").map(String::as_str), Some("☢"));
        assert!(meta.get("icon").is_none());
        assert_eq!(describe("x.html", &meta).icon, "📋");
    }

    #[test]
    fn test_metadata_window_is_bounded() {
        let html = format!(
            "{}<meta name=\"fiche-titre\" content=\"late\">",
            "é".repeat(50)
        );
        assert!(extract_metadata(&html, 50).is_empty());
        assert_eq!(extract_metadata(&html, 200).len(), 1);
    }

    #[test]
    fn test_describe_fallbacks() {
        let form = describe("controle_ecm-v2.html", &BTreeMap::new());
        assert_eq!(form.url, "forms/controle_ecm-v2.html");
        assert_eq!(form.title, "Controle Ecm V2");
        assert_eq!(form.description, "Formulaire de vérification");
        assert_eq!(form.category, "Général");
        assert_eq!(form.icon, "📋");

        let mut meta = BTreeMap::new();
        meta.insert("titre".to_string(), "Constat".to_string());
        meta.insert("categorie".to_string(), "RP".to_string());
        let form = describe("x.html", &meta);
        assert_eq!(form.title, "Constat");
        assert_eq!(form.category, "RP");
        assert_eq!(form.description, "Formulaire de vérification");
    }

    #[test]
    fn test_scan_missing_dir_creates_it() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("forms");
        let forms = scan_forms(&dir, DEFAULT_METADATA_WINDOW).unwrap();
        assert!(forms.is_empty());
        assert!(dir.is_dir());
    }

    #[test]
    fn test_scan_reads_bounded_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("long.html");
        let mut html = String::from(r#"<meta name="fiche-titre" content="Début">"#);
        html.push_str(&"x".repeat(10_000));
        html.push_str(r#"<meta name="fiche-categorie" content="Fin">"#);
        fs::write(&path, &html).unwrap();

        let prefix = read_prefix(&path, 100).unwrap();
        assert_eq!(prefix.len(), 400);

        let forms = scan_forms(tmp.path(), 100).unwrap();
        assert_eq!(forms[0].title, "Début");
        assert_eq!(forms[0].category, "Général");
    }

    #[test]
    fn test_scan_file_path_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("forms");
        fs::write(&path, "not a directory").unwrap();

        let forms = scan_forms(&path, DEFAULT_METADATA_WINDOW).unwrap();
        assert!(forms.is_empty());
        assert!(path.is_file());
    }

    #[test]
    fn test_scan_sorted_html_only() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("b_fiche.html"), "<p>b</p>").unwrap();
        fs::write(
            dir.join("a_fiche.html"),
            r#"<meta name="fiche-titre" content="Première">"#,
        )
        .unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();
        fs::write(dir.join("latin1.html"), b"<p>caf\xe9</p>").unwrap();

        let forms = scan_forms(dir, DEFAULT_METADATA_WINDOW).unwrap();
        let names: Vec<_> = forms.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, vec!["a_fiche.html", "b_fiche.html", "latin1.html"]);
        assert_eq!(forms[0].title, "Première");
        assert_eq!(forms[1].title, "B Fiche");
        assert_eq!(forms[2].title, "Latin1");
    }
}
