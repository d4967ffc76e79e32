// File I/O operations

pub mod csv;
pub mod xlsx;

use std::path::Path;

use netrecon_core::{ReconError, ReportSheet, Table, TableReader};

/// Extensions read as delimited text; everything else goes through calamine.
const TEXT_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Reads CSV/TSV and Excel/ODS files by extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileReader;

impl TableReader for FileReader {
    fn read(&self, path: &Path) -> Result<Table, ReconError> {
        let result = if is_text(path) {
            csv::read_table(path)
        } else {
            xlsx::read_table(path)
        };
        result.map_err(|message| ReconError::Load {
            file: path.display().to_string(),
            message,
        })
    }
}

fn is_text(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| TEXT_EXTENSIONS.iter().any(|t| e.eq_ignore_ascii_case(t)))
        .unwrap_or(false)
}

/// Write sheets to `path`: a workbook for .xlsx, otherwise the first sheet as CSV.
pub fn write_output(path: &Path, sheets: &[ReportSheet], bold_header: bool) -> Result<(), ReconError> {
    let result = if is_text(path) {
        match sheets.first() {
            Some(sheet) => csv::write_rows(path, &sheet.rows),
            None => csv::write_rows(path, &[]),
        }
    } else {
        xlsx::write_sheets(path, sheets, bold_header)
    };
    result.map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))
}

pub(crate) fn table_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Blank headers become `Unnamed: <i>` and repeats get a `.<n>` suffix, so
/// every column name in a table is distinct.
pub(crate) fn unique_headers<I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for (i, header) in headers.into_iter().enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {i}")
        } else {
            header
        };
        let mut name = base.clone();
        let mut n = 1;
        while out.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        out.push(name);
    }
    out
}
