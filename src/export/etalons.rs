//! Calibration standards (sheet `Etalons`).

use super::row_identifier;
use crate::error::Result;
use crate::model::{Attribute, CalibrationRecord, CategoryConfig, Sheet, SheetRow, SourceFields, SOURCE_CATEGORY};
use crate::normalize::{display, parse_decimal, short_date, site_name};
use crate::validity::Validity;
use crate::xlsx::Workbook;
use chrono::NaiveDate;

/// Name of the calibration standards sheet.
pub const ETALONS_SHEET: &str = "Etalons";

// Column layout, 0-based.
const COL_CATEGORY: usize = 1;
const COL_VALIDITY: usize = 2;
const COL_SITE: usize = 3;
const COL_LOCATION: usize = 4;
const COL_FIRST_ATTRIBUTE: usize = 5;
const ATTRIBUTE_SLOTS: usize = 15;
const COL_CREATED: usize = 20;
const COL_MODIFIED: usize = 21;
const COL_CREATED_BY: usize = 22;
const COL_MODIFIED_BY: usize = 23;

// Source sub-fields share columns with the first attribute slots.
const COL_HALF_LIFE: usize = 5;
const COL_REFERENCE_DATE: usize = 7;
const COL_REFERENCE_ACTIVITY: usize = 8;

/// Export every standard from the workbook. A workbook without an
/// `Etalons` sheet has no standards.
pub fn export_etalons(
    workbook: &Workbook,
    categories: &CategoryConfig,
    today: NaiveDate,
) -> Result<Vec<CalibrationRecord>> {
    match workbook.sheet(ETALONS_SHEET)? {
        Some(sheet) => Ok(etalons_from_sheet(&sheet, categories, today)),
        None => {
            tracing::warn!(sheet = ETALONS_SHEET, "sheet not found, no standards exported");
            Ok(Vec::new())
        }
    }
}

/// Export the data rows of an already loaded sheet.
pub fn etalons_from_sheet(
    sheet: &Sheet,
    categories: &CategoryConfig,
    today: NaiveDate,
) -> Vec<CalibrationRecord> {
    sheet
        .data_rows()
        .filter_map(|row| etalon_from_row(row, categories, today))
        .collect()
}

/// Build one record, `None` when the identifier cell is empty.
pub fn etalon_from_row(
    row: &SheetRow,
    categories: &CategoryConfig,
    today: NaiveDate,
) -> Option<CalibrationRecord> {
    let id = row_identifier(row)?;
    let category = display(row.cell(COL_CATEGORY));
    let validity_date = display(row.cell(COL_VALIDITY));

    let attributes = (0..ATTRIBUTE_SLOTS)
        .filter_map(|slot| {
            let value = display(row.cell(COL_FIRST_ATTRIBUTE + slot));
            (!value.is_empty()).then(|| Attribute::new(categories.slot_label(&category, slot), value))
        })
        .collect();

    let source = if category == SOURCE_CATEGORY {
        SourceFields {
            half_life: parse_decimal(row.cell(COL_HALF_LIFE)),
            reference_activity: parse_decimal(row.cell(COL_REFERENCE_ACTIVITY)),
            reference_date: short_date(row.cell(COL_REFERENCE_DATE)),
        }
    } else {
        SourceFields::default()
    };

    tracing::trace!(row = row.number, %id, %category, "standard exported");

    Some(CalibrationRecord {
        status: Validity::classify(&validity_date, today),
        site: site_name(row.cell(COL_SITE)),
        location: display(row.cell(COL_LOCATION)),
        attributes,
        source,
        created: display(row.cell(COL_CREATED)),
        modified: display(row.cell(COL_MODIFIED)),
        created_by: display(row.cell(COL_CREATED_BY)),
        modified_by: display(row.cell(COL_MODIFIED_BY)),
        id,
        category,
        validity_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> CellValue {
        CellValue::DateTime(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
    }

    fn row(number: u32, cells: &[(usize, CellValue)]) -> SheetRow {
        let mut row = SheetRow::new(number, Vec::new());
        for (col, value) in cells {
            row.set(*col, value.clone());
        }
        row
    }

    #[test]
    fn test_source_row() {
        let r = row(
            2,
            &[
                (0, "E-001".into()),
                (1, "Source".into()),
                (2, date(2030, 1, 1)),
                (3, " PALUEL ".into()),
                (4, "Magasin RP".into()),
                (5, "11 000,5".into()),
                (6, "Cs-137".into()),
                (7, date(2020, 2, 1)),
                (8, CellValue::Number(37000.0)),
                (20, "2024-05-02".into()),
                (22, "jdupont".into()),
            ],
        );

        let record = etalon_from_row(&r, &CategoryConfig::default(), today()).unwrap();
        assert_eq!(record.id, "E-001");
        assert_eq!(record.category, "Source");
        assert_eq!(record.validity_date, "2030-01-01");
        assert_eq!(record.status, Validity::Valid);
        assert_eq!(record.site, "Paluel");
        assert_eq!(record.location, "Magasin RP");
        assert_eq!(
            record.attributes,
            vec![
                Attribute::new("Demi-vie (jours)", "11 000,5"),
                Attribute::new("Isotope", "Cs-137"),
                Attribute::new("Date référence", "2020-02-01"),
                Attribute::new("Activité ref (Bq)", "37000"),
            ]
        );
        assert_eq!(record.source.half_life, Some(11000.5));
        assert_eq!(record.source.reference_activity, Some(37000.0));
        assert_eq!(record.source.reference_date.as_deref(), Some("01/02/2020"));
        assert_eq!(record.created, "2024-05-02");
        assert_eq!(record.created_by, "jdupont");
        assert_eq!(record.modified, "");
    }

    #[test]
    fn test_expired_standard() {
        let r = row(3, &[(0, "E-001".into()), (1, "Source".into()), (2, date(2024, 1, 1))]);
        let record = etalon_from_row(&r, &CategoryConfig::default(), today()).unwrap();
        assert_eq!(record.status, Validity::Expired);
        assert!(record.source.is_empty());
    }

    #[test]
    fn test_generic_labels_and_no_source_fields() {
        let r = row(
            4,
            &[
                (0, "OSC-7".into()),
                (1, "Oscilloscope".into()),
                (5, "Tektronix".into()),
                (7, "200 MHz".into()),
                (19, "dernier".into()),
            ],
        );
        let record = etalon_from_row(&r, &CategoryConfig::default(), today()).unwrap();
        assert_eq!(
            record.attributes,
            vec![
                Attribute::new("Champ 1", "Tektronix"),
                Attribute::new("Champ 3", "200 MHz"),
                Attribute::new("Champ 15", "dernier"),
            ]
        );
        assert!(record.source.is_empty());
        assert_eq!(record.status, Validity::Unknown);
    }

    #[test]
    fn test_unparseable_source_numbers_are_omitted() {
        let r = row(
            5,
            &[(0, "S-2".into()), (1, "Source".into()), (5, "inconnue".into()), (8, "n/a".into())],
        );
        let record = etalon_from_row(&r, &CategoryConfig::default(), today()).unwrap();
        assert_eq!(record.source.half_life, None);
        assert_eq!(record.source.reference_activity, None);
        assert_eq!(record.source.reference_date, None);
        let json = serde_json::to_string(&record.source).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_blank_identifier_skipped() {
        let mut sheet = Sheet::new(ETALONS_SHEET);
        sheet.rows.push(row(1, &[(0, "ID".into())]));
        sheet.rows.push(row(2, &[(0, "E-1".into())]));
        sheet.rows.push(row(3, &[(1, "Source".into())]));
        sheet.rows.push(row(4, &[(0, "E-2".into())]));

        let records = etalons_from_sheet(&sheet, &CategoryConfig::default(), today());
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["E-1", "E-2"]);
    }
}
