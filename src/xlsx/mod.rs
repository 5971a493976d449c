//! XLSX / XLSM workbook reading.
//!
//! # Example
//!
//! ```no_run
//! use portail::xlsx::Workbook;
//!
//! let workbook = Workbook::open("RPM.xlsm")?;
//! if let Some(sheet) = workbook.sheet("Etalons")? {
//!     println!("{} rows", sheet.rows.len());
//! }
//! # Ok::<(), portail::Error>(())
//! ```

mod parser;
mod shared_strings;
mod styles;

pub use parser::Workbook;
pub use styles::serial_to_datetime;
