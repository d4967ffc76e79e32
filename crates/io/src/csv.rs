// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use netrecon_core::Table;

use crate::{table_name, unique_headers};

/// Read a delimited file into a table. The first row is the header; empty
/// cells are missing.
pub fn read_table(path: &Path) -> Result<Table, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    read_table_from_str(&table_name(path), &content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must split the header line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Lines agreeing with the header's field count, weighted by that count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (Windows-1252 exports from Excel).
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match content.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => content,
    })
}

fn read_table_from_str(name: &str, content: &str, delimiter: u8) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(result) => result.map_err(|e| e.to_string())?,
        None => return Err("file is empty".to_string()),
    };
    let columns = unique_headers(header.iter().map(|h| h.trim().to_string()));
    let mut table = Table::new(name, columns);

    for result in records {
        let record = result.map_err(|e| e.to_string())?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        table.push_row(
            record
                .iter()
                .map(|field| (!field.is_empty()).then(|| field.to_string()))
                .collect(),
        );
    }

    Ok(table)
}

/// Write rows as comma-separated text. Rows may differ in width.
pub fn write_rows(path: &Path, rows: &[Vec<String>]) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    for row in rows {
        writer.write_record(row).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn sniffs_semicolon() {
        let content = "SITE;CELLID;USID\nA;1;55\nB;2;56\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn sniffs_tab_over_comma_inside_values() {
        let content = "SITE\tNOTE\nA\tx,y\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn empty_cells_are_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lte.csv");
        fs::write(&path, "SITE,CELLID,CRSGAIN\nA,1,\n\nB,,3\n").unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.name, "lte.csv");
        assert_eq!(table.columns, vec!["SITE", "CELLID", "CRSGAIN"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][2], None);
        assert_eq!(table.rows[1][1], None);
        assert_eq!(table.rows[1][2].as_deref(), Some("3"));
    }

    #[test]
    fn windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sites.csv");
        // "Nîmes" with î as 0xEE
        let mut bytes = b"SITE,USID\nN".to_vec();
        bytes.push(0xEE);
        bytes.extend_from_slice(b"mes,55\n");
        fs::write(&path, bytes).unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.rows[0][0].as_deref(), Some("Nîmes"));
    }

    #[test]
    fn bom_is_stripped_from_first_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        fs::write(&path, "\u{feff}USID,CELLID\n55,1\n").unwrap();
        let table = read_table(&path).unwrap();
        assert_eq!(table.columns[0], "USID");
    }

    #[test]
    fn empty_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "").unwrap();
        assert!(read_table(&path).is_err());
    }

    #[test]
    fn write_rows_keeps_ragged_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![
            vec!["Site".to_string(), "MO Class".to_string()],
            vec!["A".to_string(), "EUtranCellFDD=1,x".to_string(), String::new()],
        ];
        write_rows(&path, &rows).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Site,MO Class\nA,\"EUtranCellFDD=1,x\",\n");
    }
}
