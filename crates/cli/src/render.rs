//! Human and JSON output for CLI commands.

use netrecon_core::{MatchSet, Record, Technology};
use serde::Serialize;

use crate::CliError;

#[derive(Debug, Serialize)]
pub struct ClassifyEntry {
    pub file: String,
    /// `None` when the file is unclassifiable or unreadable.
    pub technology: Option<String>,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An unmerged search hit.
#[derive(Debug, Serialize)]
pub struct RawMatch {
    pub technology: Technology,
    pub record: Record,
}

pub fn raw_matches(matches: &MatchSet<'_>) -> Vec<RawMatch> {
    matches
        .iter()
        .map(|m| RawMatch {
            technology: m.technology,
            record: m.record.clone(),
        })
        .collect()
}

/// Exactly one JSON value on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::general(format!("cannot serialize output: {e}")))?;
    println!("{text}");
    Ok(())
}

pub fn print_classify(entries: &[ClassifyEntry]) {
    for entry in entries {
        match (&entry.technology, &entry.error) {
            (_, Some(err)) => println!("{}\terror: {}", entry.file, err),
            (Some(tech), None) => println!("{}\t{}\t{} rows", entry.file, tech, entry.rows),
            (None, None) => println!("{}\tunknown\t{} rows", entry.file, entry.rows),
        }
    }
}

pub fn print_raw(matches: &[RawMatch]) {
    if matches.is_empty() {
        println!("no matches");
        return;
    }
    for m in matches {
        let fields: Vec<String> = m
            .record
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        println!("{}\t{}", m.technology, fields.join("\t"));
    }
}

/// Header plus rows as tab-separated lines, under a technology banner.
/// Nothing is printed for a view with no data rows.
pub fn print_view(tech: Technology, rows: &[Vec<String>]) {
    if rows.len() <= 1 {
        return;
    }
    println!("== {} ({} record(s)) ==", tech, rows.len() - 1);
    for row in rows {
        println!("{}", row.join("\t"));
    }
    println!();
}

/// LTE and NR site names side by side, as listed on the VDT tab.
pub fn print_site_pairs(pairs: &[[String; 2]]) {
    if pairs.is_empty() {
        return;
    }
    println!("LTE site\tNR site");
    for [lte, nr] in pairs {
        println!("{lte}\t{nr}");
    }
}
