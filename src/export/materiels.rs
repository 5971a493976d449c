//! Equipment (sheet `Materiels`).

use super::row_identifier;
use crate::error::Result;
use crate::model::{EquipmentRecord, Sheet, SheetRow};
use crate::normalize::{display, site_name};
use crate::validity::Validity;
use crate::xlsx::Workbook;
use chrono::NaiveDate;

/// Name of the equipment sheet.
pub const MATERIELS_SHEET: &str = "Materiels";

const COL_DESCRIPTION: usize = 1;
const COL_SERIAL: usize = 2;
const COL_CONTROL: usize = 3;
const COL_NEXT_CHECK: usize = 4;
const COL_VALIDITY: usize = 5;
const COL_SITE: usize = 6;
const COL_LOCATION: usize = 7;
const COL_CONTROLLER: usize = 8;
const COL_OBSERVATION: usize = 9;

/// Export every piece of equipment from the workbook.
pub fn export_materiels(workbook: &Workbook, today: NaiveDate) -> Result<Vec<EquipmentRecord>> {
    match workbook.sheet(MATERIELS_SHEET)? {
        Some(sheet) => Ok(materiels_from_sheet(&sheet, today)),
        None => {
            tracing::warn!(sheet = MATERIELS_SHEET, "sheet not found, no equipment exported");
            Ok(Vec::new())
        }
    }
}

/// Export the data rows of an already loaded sheet.
pub fn materiels_from_sheet(sheet: &Sheet, today: NaiveDate) -> Vec<EquipmentRecord> {
    sheet
        .data_rows()
        .filter_map(|row| materiel_from_row(row, today))
        .collect()
}

/// Build one record, `None` when the identifier cell is empty.
pub fn materiel_from_row(row: &SheetRow, today: NaiveDate) -> Option<EquipmentRecord> {
    let id = row_identifier(row)?;
    let validity_date = display(row.cell(COL_VALIDITY));

    Some(EquipmentRecord {
        id,
        description: display(row.cell(COL_DESCRIPTION)),
        serial_number: display(row.cell(COL_SERIAL)),
        control_number: display(row.cell(COL_CONTROL)),
        next_check: display(row.cell(COL_NEXT_CHECK)),
        status: Validity::classify(&validity_date, today),
        validity_date,
        site: site_name(row.cell(COL_SITE)),
        location: display(row.cell(COL_LOCATION)),
        controller: display(row.cell(COL_CONTROLLER)),
        observation: display(row.cell(COL_OBSERVATION)),
    })
}
