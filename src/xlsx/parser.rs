//! XLSX workbook reader.

use crate::container::OoxmlContainer;
use crate::detect::{detect_workbook_format, WorkbookFormat};
use crate::error::{Error, Result};
use crate::model::{CellValue, Sheet, SheetRow};
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::Path;

use super::shared_strings::SharedStrings;
use super::styles::{serial_to_datetime, Styles};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Sheet entry from workbook.xml, with its resolved part path.
#[derive(Debug, Clone)]
struct SheetInfo {
    name: String,
    part: Option<String>,
}

/// Reader for XLSX and XLSM workbooks.
///
/// Only cached cell values are read; formulas are never evaluated and
/// macros are ignored.
pub struct Workbook {
    container: OoxmlContainer,
    format: WorkbookFormat,
    shared_strings: SharedStrings,
    styles: Styles,
    sheets: Vec<SheetInfo>,
    date1904: bool,
}

impl Workbook {
    /// Open a workbook file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        Self::from_bytes(data)
    }

    /// Read a workbook from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let format = detect_workbook_format(&data)?;
        let container = OoxmlContainer::from_bytes(data)?;

        let workbook_xml = container.read_xml(WORKBOOK_PART)?;
        let rels = container.read_relationships(WORKBOOK_PART)?;
        let (entries, date1904) = parse_workbook(&workbook_xml)?;

        let sheets: Vec<SheetInfo> = entries
            .into_iter()
            .map(|(name, rel_id)| SheetInfo {
                part: rels.get(&rel_id).cloned(),
                name,
            })
            .collect();

        let shared_strings = if container.exists(SHARED_STRINGS_PART) {
            SharedStrings::parse(&container.read_xml(SHARED_STRINGS_PART)?)?
        } else {
            SharedStrings::default()
        };

        let styles = container
            .read_xml("xl/styles.xml")
            .map(|xml| Styles::parse(&xml))
            .unwrap_or_default();

        tracing::debug!(
            %format,
            sheets = sheets.len(),
            shared_strings = shared_strings.len(),
            date1904,
            "workbook opened"
        );

        Ok(Self {
            container,
            format,
            shared_strings,
            styles,
            sheets,
            date1904,
        })
    }

    /// The detected workbook format.
    pub fn format(&self) -> WorkbookFormat {
        self.format
    }

    /// Sheet names in tab order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Whether a sheet with this exact name exists.
    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.iter().any(|s| s.name == name)
    }

    /// Read a sheet by name. `Ok(None)` when the workbook has no such sheet.
    pub fn sheet(&self, name: &str) -> Result<Option<Sheet>> {
        let Some(info) = self.sheets.iter().find(|s| s.name == name) else {
            return Ok(None);
        };
        let part = info
            .part
            .as_deref()
            .ok_or_else(|| Error::MissingComponent(format!("worksheet part for sheet '{}'", name)))?;

        let xml = self.container.read_xml(part)?;
        let mut sheet = self.parse_sheet(&xml)?;
        sheet.name = info.name.clone();
        Ok(Some(sheet))
    }

    /// Parse worksheet XML into positional rows.
    fn parse_sheet(&self, xml: &str) -> Result<Sheet> {
        let mut sheet = Sheet::default();
        let mut reader = quick_xml::Reader::from_str(xml);

        let mut buf = Vec::new();
        let mut current_row: Option<SheetRow> = None;
        let mut last_row_number = 0u32;
        let mut next_column = 0usize;

        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_inline = false;
        let mut phonetic_depth = 0usize;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e)) => match e.name().as_ref() {
                    b"row" => {
                        last_row_number = row_number(e).unwrap_or(last_row_number + 1);
                        current_row = Some(SheetRow::new(last_row_number, Vec::new()));
                        next_column = 0;
                    }
                    b"c" if current_row.is_some() => {
                        let pending = PendingCell::from_start(e, next_column);
                        next_column = pending.column + 1;
                        cell = Some(pending);
                    }
                    b"v" if cell.is_some() => in_value = true,
                    b"is" if cell.is_some() => in_inline = true,
                    b"rPh" => phonetic_depth += 1,
                    b"t" if in_inline && phonetic_depth == 0 => in_value = true,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Empty(ref e)) => match e.name().as_ref() {
                    b"row" => {
                        last_row_number = row_number(e).unwrap_or(last_row_number + 1);
                    }
                    b"c" if current_row.is_some() => {
                        next_column = PendingCell::from_start(e, next_column).column + 1;
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::Text(ref e)) => {
                    if in_value {
                        if let Some(pending) = cell.as_mut() {
                            let text = e.unescape().unwrap_or_default();
                            pending.raw.push_str(&text);
                        }
                    }
                }
                Ok(quick_xml::events::Event::CData(ref e)) => {
                    if in_value {
                        if let Some(pending) = cell.as_mut() {
                            pending.raw.push_str(&String::from_utf8_lossy(e));
                        }
                    }
                }
                Ok(quick_xml::events::Event::End(ref e)) => match e.name().as_ref() {
                    b"row" => {
                        if let Some(row) = current_row.take() {
                            if !row.is_blank() {
                                sheet.rows.push(row);
                            }
                        }
                    }
                    b"c" => {
                        if let (Some(pending), Some(row)) = (cell.take(), current_row.as_mut()) {
                            let column = pending.column;
                            let value = self.resolve_cell(pending);
                            if !value.is_empty() {
                                row.set(column, value);
                            }
                        }
                        in_value = false;
                        in_inline = false;
                    }
                    b"v" | b"t" => in_value = false,
                    b"is" => in_inline = false,
                    b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }

    /// Resolve a raw cell value based on its type and style.
    fn resolve_cell(&self, cell: PendingCell) -> CellValue {
        let PendingCell {
            raw,
            cell_type,
            style,
            ..
        } = cell;

        match cell_type.as_deref() {
            Some("s") => match raw.trim().parse::<usize>() {
                Ok(idx) => match self.shared_strings.get(idx) {
                    Some(s) => CellValue::text(s),
                    None => {
                        tracing::debug!(idx, "shared string index out of range");
                        CellValue::Empty
                    }
                },
                Err(_) => CellValue::Text(raw),
            },
            Some("b") => CellValue::Bool(raw.trim() == "1"),
            Some("e") => CellValue::Error(raw),
            Some("str") | Some("inlineStr") => CellValue::Text(raw),
            Some("d") => parse_iso_datetime(raw.trim())
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Text(raw)),
            _ => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return CellValue::Empty;
                }
                match trimmed.parse::<f64>() {
                    Ok(n) if self.styles.is_date_style(style) => {
                        serial_to_datetime(n, self.date1904)
                            .map(CellValue::DateTime)
                            .unwrap_or(CellValue::Number(n))
                    }
                    Ok(n) => CellValue::Number(n),
                    Err(_) => CellValue::Text(raw),
                }
            }
        }
    }
}

impl std::fmt::Debug for Workbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbook")
            .field("format", &self.format)
            .field("sheets", &self.sheet_names())
            .field("date1904", &self.date1904)
            .finish()
    }
}

/// A cell being read: its position, type, style and raw text.
struct PendingCell {
    column: usize,
    cell_type: Option<String>,
    style: usize,
    raw: String,
}

impl PendingCell {
    fn from_start(e: &quick_xml::events::BytesStart<'_>, fallback_column: usize) -> Self {
        let mut column = fallback_column;
        let mut cell_type = None;
        let mut style = 0usize;

        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    if let Some(col) = column_index(&String::from_utf8_lossy(&attr.value)) {
                        column = col;
                    }
                }
                b"t" => cell_type = Some(String::from_utf8_lossy(&attr.value).to_string()),
                b"s" => style = String::from_utf8_lossy(&attr.value).parse().unwrap_or(0),
                _ => {}
            }
        }

        Self {
            column,
            cell_type,
            style,
            raw: String::new(),
        }
    }
}

/// Parse workbook.xml: `(sheet name, relationship id)` pairs and the
/// 1904 date system flag.
fn parse_workbook(xml: &str) -> Result<(Vec<(String, String)>, bool)> {
    let mut sheets = Vec::new();
    let mut date1904 = false;
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Empty(ref e))
            | Ok(quick_xml::events::Event::Start(ref e)) => match e.name().as_ref() {
                b"sheet" => {
                    let mut name = String::new();
                    let mut rel_id = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = attr
                                    .unescape_value()
                                    .map(|v| v.into_owned())
                                    .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string());
                            }
                            b"r:id" => rel_id = String::from_utf8_lossy(&attr.value).to_string(),
                            _ => {}
                        }
                    }

                    if !name.is_empty() {
                        sheets.push((name, rel_id));
                    }
                }
                b"workbookPr" => {
                    date1904 = e.attributes().flatten().any(|attr| {
                        attr.key.as_ref() == b"date1904"
                            && matches!(attr.value.as_ref(), b"1" | b"true")
                    });
                }
                _ => {}
            },
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok((sheets, date1904))
}

fn row_number(e: &quick_xml::events::BytesStart<'_>) -> Option<u32> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"r")
        .and_then(|attr| String::from_utf8_lossy(&attr.value).parse().ok())
}

/// 0-based column index from a cell reference such as `AB12`.
pub(crate) fn column_index(reference: &str) -> Option<usize> {
    let letters: String = reference
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }

    let index = letters
        .bytes()
        .fold(0usize, |acc, b| acc * 26 + (b.to_ascii_uppercase() - b'A' + 1) as usize);
    Some(index - 1)
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    const WORKBOOK: &str = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <workbookPr/>
  <sheets>
    <sheet name="Etalons" sheetId="1" r:id="rId1"/>
    <sheet name="Materiels" sheetId="2" r:id="rId2"/>
  </sheets>
</workbook>"#;

    const RELS: &str = r#"<Relationships>
  <Relationship Id="rId1" Type="worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="worksheet" Target="worksheets/sheet2.xml"/>
</Relationships>"#;

    const STYLES: &str = r#"<styleSheet>
  <numFmts count="1"><numFmt numFmtId="164" formatCode="dd/mm/yyyy\ hh:mm"/></numFmts>
  <cellXfs count="3"><xf numFmtId="0"/><xf numFmtId="14"/><xf numFmtId="164"/></cellXfs>
</styleSheet>"#;

    const SHARED: &str = r#"<sst><si><t>ID</t></si><si><t>Source</t></si></sst>"#;

    fn workbook(sheet1: &str) -> Workbook {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let parts = [
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELS),
            ("xl/styles.xml", STYLES),
            ("xl/sharedStrings.xml", SHARED),
            ("xl/worksheets/sheet1.xml", sheet1),
        ];
        for (name, body) in parts {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        let data = zip.finish().unwrap().into_inner();
        Workbook::from_bytes(data).unwrap()
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("Z9"), Some(25));
        assert_eq!(column_index("AA10"), Some(26));
        assert_eq!(column_index("ab3"), Some(27));
        assert_eq!(column_index("42"), None);
    }

    #[test]
    fn test_sheet_names() {
        let wb = workbook("<worksheet><sheetData/></worksheet>");
        assert_eq!(wb.sheet_names(), vec!["Etalons", "Materiels"]);
        assert!(wb.has_sheet("Materiels"));
        assert!(!wb.has_sheet("Constats"));
        assert_eq!(wb.format(), WorkbookFormat::Xlsx);
    }

    #[test]
    fn test_cell_types_and_positions() {
        let wb = workbook(
            r#"<worksheet><sheetData>
  <row r="1"><c r="A1" t="s"><v>0</v></c></row>
  <row r="2">
    <c r="A2" t="inlineStr"><is><t>E-001</t></is></c>
    <c r="B2" t="s"><v>1</v></c>
    <c r="C2" s="1"><v>47119</v></c>
    <c r="E2" s="2"><v>45292.354166666664</v></c>
    <c r="F2"><v>30.17</v></c>
    <c r="G2" t="b"><v>1</v></c>
    <c r="H2" t="str"><f>A2&amp;"x"</f><v>E-001x</v></c>
    <c r="I2" t="e"><v>#N/A</v></c>
    <c r="J2" s="1"/>
    <c r="K2" t="d"><v>2030-06-01T00:00:00</v></c>
  </row>
  <row r="3"><c r="A3" s="1"/></row>
  <row r="7"><c r="D7"><v>5</v></c></row>
</sheetData></worksheet>"#,
        );

        let sheet = wb.sheet("Etalons").unwrap().unwrap();
        assert_eq!(sheet.name, "Etalons");
        assert_eq!(sheet.rows.len(), 3);

        let header = &sheet.rows[0];
        assert_eq!(header.number, 1);
        assert_eq!(header.cell(0), &CellValue::text("ID"));

        let row = &sheet.rows[1];
        assert_eq!(row.number, 2);
        assert_eq!(row.cell(0), &CellValue::text("E-001"));
        assert_eq!(row.cell(1), &CellValue::text("Source"));
        assert_eq!(
            row.cell(2).as_datetime().map(|d| d.to_string()),
            Some("2029-01-01 00:00:00".to_string())
        );
        assert!(row.cell(3).is_empty());
        assert_eq!(
            row.cell(4).as_datetime().map(|d| d.to_string()),
            Some("2024-01-01 08:30:00".to_string())
        );
        assert_eq!(row.cell(5), &CellValue::Number(30.17));
        assert_eq!(row.cell(6), &CellValue::Bool(true));
        assert_eq!(row.cell(7), &CellValue::text("E-001x"));
        assert_eq!(row.cell(8), &CellValue::Error("#N/A".into()));
        assert!(row.cell(9).is_empty());
        assert_eq!(
            row.cell(10).as_datetime().map(|d| d.to_string()),
            Some("2030-06-01 00:00:00".to_string())
        );

        let sparse = &sheet.rows[2];
        assert_eq!(sparse.number, 7);
        assert_eq!(sparse.cell(3), &CellValue::Number(5.0));
    }

    #[test]
    fn test_cells_without_references() {
        let wb = workbook(
            r#"<worksheet><sheetData>
  <row><c t="inlineStr"><is><t>a</t></is></c><c/><c t="inlineStr"><is><t>c</t></is></c></row>
</sheetData></worksheet>"#,
        );
        let sheet = wb.sheet("Etalons").unwrap().unwrap();
        let row = &sheet.rows[0];
        assert_eq!(row.number, 1);
        assert_eq!(row.cell(0), &CellValue::text("a"));
        assert!(row.cell(1).is_empty());
        assert_eq!(row.cell(2), &CellValue::text("c"));
    }

    #[test]
    fn test_missing_sheet_and_part() {
        let wb = workbook("<worksheet><sheetData/></worksheet>");
        assert!(wb.sheet("Constats").unwrap().is_none());
        // sheet2.xml is referenced but absent from the package
        assert!(matches!(
            wb.sheet("Materiels"),
            Err(Error::MissingComponent(_))
        ));
    }
}
