//! Workbook format detection.

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use std::io::{Cursor, Read};

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// OLE2 compound document magic, used by legacy `.xls` workbooks.
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Content type for a plain XLSX workbook part.
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

/// Content type for a macro-enabled XLSM workbook part.
const XLSM_CONTENT_TYPE: &str = "application/vnd.ms-excel.sheet.macroEnabled.main+xml";

/// Detected workbook format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbookFormat {
    /// Excel workbook (.xlsx)
    Xlsx,
    /// Macro-enabled Excel workbook (.xlsm)
    Xlsm,
}

impl WorkbookFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            WorkbookFormat::Xlsx => "xlsx",
            WorkbookFormat::Xlsm => "xlsm",
        }
    }
}

impl std::fmt::Display for WorkbookFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkbookFormat::Xlsx => write!(f, "Excel Workbook"),
            WorkbookFormat::Xlsm => write!(f, "Excel Macro-Enabled Workbook"),
        }
    }
}

/// Detect the workbook format from raw file bytes.
///
/// Macros are never executed, so `.xlsm` files are read exactly like
/// `.xlsx` ones; the distinction is only reported.
pub fn detect_workbook_format(data: &[u8]) -> Result<WorkbookFormat> {
    if data.starts_with(&OLE_MAGIC) {
        return Err(Error::UnsupportedFormat(
            "legacy .xls workbook (save it as .xlsx or .xlsm)".to_string(),
        ));
    }
    if !is_zip_file(data) {
        return Err(Error::UnknownFormat);
    }

    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
    let has_workbook_part = archive.file_names().any(|n| n == "xl/workbook.xml");

    let content_types = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            decode_xml_bytes(&bytes)?
        }
        Err(_) => {
            // Hand-built packages sometimes omit the content types part.
            return if has_workbook_part {
                Ok(WorkbookFormat::Xlsx)
            } else {
                Err(Error::MissingComponent("[Content_Types].xml".to_string()))
            };
        }
    };

    if content_types.contains(XLSM_CONTENT_TYPE) {
        Ok(WorkbookFormat::Xlsm)
    } else if content_types.contains(XLSX_CONTENT_TYPE) {
        Ok(WorkbookFormat::Xlsx)
    } else if has_workbook_part {
        Ok(WorkbookFormat::Xlsx)
    } else {
        Err(Error::UnsupportedFormat(
            "Office document without a workbook part".to_string(),
        ))
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.starts_with(&ZIP_MAGIC)
}
