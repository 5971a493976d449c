//! Static assets: label images and the web app manifest.

use crate::error::Result;
use base64::Engine;
use std::fs;
use std::path::Path;

const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// A JPEG image as a `data:` URI, or `None` when it cannot be read.
pub fn jpeg_data_uri(path: &Path) -> Option<String> {
    match fs::read(path) {
        Ok(bytes) => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
            tracing::debug!(file = %path.display(), bytes = bytes.len(), "label image loaded");
            Some(format!("{}{}", JPEG_DATA_URI_PREFIX, encoded))
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "label image unavailable");
            None
        }
    }
}

/// What happened to the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestCopy {
    /// Written to the output directory
    Copied,
    /// The output already holds the same content
    Unchanged,
    /// Source and destination are the same file
    SamePath,
    /// No manifest in the assets directory
    Missing,
}

/// Copy the manifest verbatim unless the destination already matches.
pub fn copy_manifest(source: &Path, dest: &Path) -> Result<ManifestCopy> {
    if !source.is_file() {
        return Ok(ManifestCopy::Missing);
    }
    if same_file(source, dest) {
        return Ok(ManifestCopy::SamePath);
    }

    let content = fs::read(source)?;
    if fs::read(dest).is_ok_and(|existing| existing == content) {
        return Ok(ManifestCopy::Unchanged);
    }

    fs::write(dest, &content)?;
    Ok(ManifestCopy::Copied)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_data_uri() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("etiq_conforme.jpg");
        fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        assert_eq!(jpeg_data_uri(&path).unwrap(), "data:image/jpeg;base64,/9j/4A==");
        assert!(jpeg_data_uri(&tmp.path().join("missing.jpg")).is_none());
    }

    #[test]
    fn test_copy_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        let assets = tmp.path().join("assets");
        let out = tmp.path().join("out");
        fs::create_dir_all(&assets).unwrap();
        fs::create_dir_all(&out).unwrap();

        let source = assets.join("manifest.json");
        let dest = out.join("manifest.json");
        assert_eq!(copy_manifest(&source, &dest).unwrap(), ManifestCopy::Missing);

        fs::write(&source, r#"{"name":"Portail"}"#).unwrap();
        assert_eq!(copy_manifest(&source, &dest).unwrap(), ManifestCopy::Copied);
        assert_eq!(fs::read_to_string(&dest).unwrap(), r#"{"name":"Portail"}"#);
        assert_eq!(copy_manifest(&source, &dest).unwrap(), ManifestCopy::Unchanged);

        fs::write(&source, r#"{"name":"Portail 2"}"#).unwrap();
        assert_eq!(copy_manifest(&source, &dest).unwrap(), ManifestCopy::Copied);

        assert_eq!(copy_manifest(&source, &source).unwrap(), ManifestCopy::SamePath);
    }
}
