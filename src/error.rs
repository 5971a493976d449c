//! Error types for the portail library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for portail operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while exporting a workbook.
///
/// Only conditions that stop the export are represented here. Soft
/// degradations (an unreadable form, a missing label image) are logged and
/// collected in the export report instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format could not be determined.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required workbook component is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Error serializing records to JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input workbook does not exist.
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// A required template does not exist.
    #[error("Template not found: {}", .0.display())]
    MissingTemplate(PathBuf),
}

impl Error {
    /// Whether this error comes from a missing or unusable input rather than
    /// a failure while processing it.
    pub fn is_fatal_input(&self) -> bool {
        matches!(
            self,
            Error::MissingInput(_)
                | Error::MissingTemplate(_)
                | Error::UnknownFormat
                | Error::UnsupportedFormat(_)
        )
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}
