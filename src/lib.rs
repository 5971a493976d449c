//! # portail
//!
//! Export a maintenance workbook to an offline technician portal.
//!
//! The library reads the `Etalons` (calibration standards) and `Materiels`
//! (equipment) sheets of an Excel workbook, classifies validity dates,
//! discovers standalone HTML form fragments, and renders an installable
//! single-page portal (`index.html`) with its service worker (`sw.js`).
//! A small state file remembers when each record set last changed.
//!
//! ## Quick Start
//!
//! ```no_run
//! use portail::{run_export, ExportOptions};
//!
//! let options = ExportOptions::new("Base_RPM.xlsm")
//!     .with_output_dir("portail")
//!     .with_assets_dir("assets");
//!
//! let report = run_export(&options)?;
//! println!("{} standards, {} items", report.etalons.count, report.materiels.count);
//! # Ok::<(), portail::Error>(())
//! ```
//!
//! ## Reading records only
//!
//! ```no_run
//! use portail::xlsx::Workbook;
//! use portail::{export_etalons, CategoryConfig};
//!
//! let workbook = Workbook::open("Base_RPM.xlsm")?;
//! let today = chrono::Local::now().date_naive();
//! for record in export_etalons(&workbook, &CategoryConfig::default(), today)? {
//!     println!("{} {} {}", record.id, record.category, record.status);
//! }
//! # Ok::<(), portail::Error>(())
//! ```

pub mod assets;
pub mod changes;
pub mod container;
pub mod detect;
pub mod error;
pub mod export;
pub mod forms;
pub mod model;
pub mod normalize;
pub mod options;
pub mod pipeline;
pub mod render;
pub mod validity;
pub mod xlsx;

// Re-exports
pub use changes::{fingerprint, RecordSet, UpdateState};
pub use container::OoxmlContainer;
pub use detect::{detect_workbook_format, WorkbookFormat};
pub use error::{Error, Result};
pub use export::{export_etalons, export_materiels, tally_by};
pub use forms::{extract_metadata, scan_forms};
pub use model::{
    Attribute, CalibrationRecord, CategoryConfig, CategoryDefinition, CellValue, EquipmentRecord,
    FormDescriptor, Sheet, SheetRow, SourceFields,
};
pub use options::ExportOptions;
pub use pipeline::{run_export, ExportReport, SetReport};
pub use validity::Validity;

use std::path::Path;

/// Export a workbook into `output_dir`, reading templates and images from
/// the same directory.
///
/// # Example
///
/// ```no_run
/// let report = portail::export_workbook("Base_RPM.xlsm", "portail")?;
/// println!("worker v{}", report.worker_version);
/// # Ok::<(), portail::Error>(())
/// ```
pub fn export_workbook(workbook: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Result<ExportReport> {
    let output_dir = output_dir.as_ref();
    let options = ExportOptions::new(workbook.as_ref())
        .with_output_dir(output_dir)
        .with_assets_dir(output_dir);
    run_export(&options)
}

/// Detect the workbook format of a file.
///
/// # Example
///
/// ```no_run
/// let format = portail::detect_format_from_path("Base_RPM.xlsm")?;
/// assert_eq!(format, portail::WorkbookFormat::Xlsm);
/// # Ok::<(), portail::Error>(())
/// ```
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<WorkbookFormat> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }
    let data = std::fs::read(path)?;
    detect_workbook_format(&data)
}
