// Excel import (first worksheet) and report workbook export

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use netrecon_core::{ReportSheet, Table};
use rust_xlsxwriter::{Format, Workbook};

use crate::{table_name, unique_headers};

/// Read the first worksheet of an Excel/ODS file (xlsx, xls, xlsb, ods).
/// The first used row is the header.
pub fn read_table(path: &Path) -> Result<Table, String> {
    let mut workbook = open_workbook_auto(path).map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "Excel file contains no sheets".to_string())?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| format!("Sheet '{}' is empty", sheet_name))?;
    let columns = unique_headers(header.iter().map(|c| cell_text(c).unwrap_or_default().trim().to_string()));
    let mut table = Table::new(table_name(path), columns);

    for row in rows {
        let cells: Vec<Option<String>> = row.iter().map(cell_text).collect();
        if cells.iter().all(Option::is_none) {
            continue;
        }
        table.push_row(cells);
    }

    log::debug!("{}: sheet '{}', {} rows", path.display(), sheet_name, table.rows.len());
    Ok(table)
}

/// Text of one cell. Integral floats print without decimals, booleans as
/// TRUE/FALSE. Empty and error cells are missing.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(n) => Some(if n.fract() == 0.0 && n.abs() < 1e15 {
            format!("{}", *n as i64)
        } else {
            format!("{}", n)
        }),
        Data::Int(n) => Some(n.to_string()),
        Data::Bool(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::DateTime(dt) => Some(format!("{}", dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Write each sheet as a worksheet of text cells. With `bold_header` the
/// first row of every sheet is bold.
pub fn write_sheets(path: &Path, sheets: &[ReportSheet], bold_header: bool) -> Result<(), String> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let plain = Format::new();

    for sheet in sheets {
        let worksheet = workbook
            .add_worksheet()
            .set_name(&sheet.name)
            .map_err(|e| format!("Failed to create sheet '{}': {}", sheet.name, e))?;

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let format = if bold_header && row_idx == 0 { &header_format } else { &plain };
            for (col_idx, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                // rust_xlsxwriter uses 0-based row/col as u32/u16
                worksheet
                    .write_string_with_format(row_idx as u32, col_idx as u16, value, format)
                    .map_err(|e| format!("Failed to write cell: {}", e))?;
            }
        }
    }

    workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sheet(name: &str, rows: &[&[&str]]) -> ReportSheet {
        ReportSheet {
            name: name.to_string(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn cell_text_formats() {
        assert_eq!(cell_text(&Data::Float(1203.0)), Some("1203".to_string()));
        assert_eq!(cell_text(&Data::Float(2.5)), Some("2.5".to_string()));
        assert_eq!(cell_text(&Data::Int(-7)), Some("-7".to_string()));
        assert_eq!(cell_text(&Data::Bool(true)), Some("TRUE".to_string()));
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String(String::new())), None);
    }

    #[test]
    fn written_workbook_reads_back_first_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nr_export.xlsx");
        let sheets = vec![
            sheet("NR", &[&["CSS_USID", "NRCELLDUID", "NOTE"], &["55", "100", ""], &["56", "", "x"]]),
            sheet("Other", &[&["IGNORED"]]),
        ];
        write_sheets(&path, &sheets, true).unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.name, "nr_export.xlsx");
        assert_eq!(table.columns, vec!["CSS_USID", "NRCELLDUID", "NOTE"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0].as_deref(), Some("55"));
        assert_eq!(table.rows[0][2], None);
        assert_eq!(table.rows[1][1], None);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(read_table(&dir.path().join("nope.xlsx")).is_err());
    }
}
