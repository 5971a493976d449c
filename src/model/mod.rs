//! Data model for the exported portal.
//!
//! Cells are what the workbook reader produces; records and form
//! descriptors are what the exporters and the form scanner hand to the
//! renderers. Every record is rebuilt from scratch on each run.

mod category;
mod cell;
mod record;

pub use category::*;
pub use cell::*;
pub use record::*;
