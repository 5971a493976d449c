//! Export options and well-known file names.

use crate::forms::DEFAULT_METADATA_WINDOW;
use crate::model::CategoryConfig;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Page template, in the assets directory.
pub const PAGE_TEMPLATE: &str = "template.html";

/// Service worker template in the assets directory, and its output name.
pub const WORKER_FILE: &str = "sw.js";

/// Rendered page, in the output directory.
pub const PAGE_FILE: &str = "index.html";

/// Web app manifest, copied from assets to output.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Label image for conforming equipment.
pub const LABEL_OK_IMAGE: &str = "etiq_conforme.jpg";

/// Label image for non-conforming equipment.
pub const LABEL_NOT_OK_IMAGE: &str = "etiq_non_conforme.jpg";

/// Default name of the change-tracking state file.
pub const DEFAULT_STATE_FILE: &str = ".portail_dates.json";

/// Default forms subdirectory of the output directory.
pub const DEFAULT_FORMS_DIR: &str = "forms";

/// Options for one export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Source workbook
    pub workbook: PathBuf,

    /// Where `index.html`, `sw.js` and the state file are written
    pub output_dir: PathBuf,

    /// Where templates, label images and the manifest are read from
    pub assets_dir: PathBuf,

    /// Forms subdirectory, relative to `output_dir`
    pub forms_dir: String,

    /// State file name, relative to `output_dir`
    pub state_file: String,

    /// Characters of each fragment inspected for metadata tags
    pub metadata_window: usize,

    /// Attribute labels per category
    pub categories: CategoryConfig,

    /// Fixed clock (None = local time at run start)
    pub now: Option<NaiveDateTime>,
}

impl ExportOptions {
    /// Options for a workbook, with output and assets in the current
    /// directory.
    pub fn new(workbook: impl Into<PathBuf>) -> Self {
        Self {
            workbook: workbook.into(),
            output_dir: PathBuf::from("."),
            assets_dir: PathBuf::from("."),
            forms_dir: DEFAULT_FORMS_DIR.to_string(),
            state_file: DEFAULT_STATE_FILE.to_string(),
            metadata_window: DEFAULT_METADATA_WINDOW,
            categories: CategoryConfig::default(),
            now: None,
        }
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the assets directory.
    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = dir.into();
        self
    }

    /// Set the forms subdirectory name.
    pub fn with_forms_dir(mut self, name: impl Into<String>) -> Self {
        self.forms_dir = name.into();
        self
    }

    /// Set the state file name.
    pub fn with_state_file(mut self, name: impl Into<String>) -> Self {
        self.state_file = name.into();
        self
    }

    /// Set the metadata window (at least one character).
    pub fn with_metadata_window(mut self, chars: usize) -> Self {
        self.metadata_window = chars.max(1);
        self
    }

    /// Replace the category definitions.
    pub fn with_categories(mut self, categories: CategoryConfig) -> Self {
        self.categories = categories;
        self
    }

    /// Run as if the current time were `now`.
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Path of the page template.
    pub fn page_template(&self) -> PathBuf {
        self.assets_dir.join(PAGE_TEMPLATE)
    }

    /// Path of the service worker template.
    pub fn worker_template(&self) -> PathBuf {
        self.assets_dir.join(WORKER_FILE)
    }

    /// Path of an asset file.
    pub fn asset(&self, name: &str) -> PathBuf {
        self.assets_dir.join(name)
    }

    /// Forms directory.
    pub fn forms_path(&self) -> PathBuf {
        self.output_dir.join(&self.forms_dir)
    }

    /// State file.
    pub fn state_path(&self) -> PathBuf {
        self.output_dir.join(&self.state_file)
    }

    /// Path of an output file.
    pub fn output(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    /// The workbook path.
    pub fn workbook(&self) -> &Path {
        &self.workbook
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ExportOptions::new("Base.xlsx");
        assert_eq!(opts.forms_dir, "forms");
        assert_eq!(opts.state_file, ".portail_dates.json");
        assert_eq!(opts.metadata_window, 4000);
        assert_eq!(opts.categories.len(), 6);
        assert!(opts.now.is_none());
    }

    #[test]
    fn test_builder_pattern() {
        let opts = ExportOptions::new("in/Base.xlsx")
            .with_output_dir("out")
            .with_assets_dir("assets")
            .with_forms_dir("fiches")
            .with_metadata_window(0);

        assert_eq!(opts.workbook(), Path::new("in/Base.xlsx"));
        assert_eq!(opts.page_template(), PathBuf::from("assets/template.html"));
        assert_eq!(opts.worker_template(), PathBuf::from("assets/sw.js"));
        assert_eq!(opts.forms_path(), PathBuf::from("out/fiches"));
        assert_eq!(opts.state_path(), PathBuf::from("out/.portail_dates.json"));
        assert_eq!(opts.output(PAGE_FILE), PathBuf::from("out/index.html"));
        assert_eq!(opts.metadata_window, 1);
    }
}
