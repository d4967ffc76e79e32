//! Ingestion: read, classify, dedup and pool tables per technology.

use std::path::Path;

use serde::Serialize;

use crate::classify::classify;
use crate::config::ClassifyConfig;
use crate::error::ReconError;
use crate::model::{Pools, Table, Technology};

/// Source of tables. The I/O crate implements this for CSV and spreadsheet
/// files; tests use in-memory readers.
pub trait TableReader {
    fn read(&self, path: &Path) -> Result<Table, ReconError>;
}

/// Counters from the last load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadStats {
    pub files_read: usize,
    /// Files the reader failed on.
    pub files_skipped: usize,
    pub files_unclassified: usize,
    /// Duplicate rows dropped within files plus across files in one pool.
    pub duplicates_removed: usize,
    pub lte_records: usize,
    pub nr_records: usize,
    pub bbu_records: usize,
    pub primary_keys: usize,
    pub composite_keys: usize,
}

impl LoadStats {
    pub fn records(&self, tech: Technology) -> usize {
        match tech {
            Technology::Lte => self.lte_records,
            Technology::Nr => self.nr_records,
            Technology::Bbu => self.bbu_records,
        }
    }
}

/// Read every file through `reader` and pool the results. Unreadable files
/// are logged and skipped.
pub fn ingest<P: AsRef<Path>>(
    files: &[P],
    reader: &dyn TableReader,
    config: &ClassifyConfig,
) -> (Pools, LoadStats) {
    let tables = files.iter().map(|path| {
        let path = path.as_ref();
        reader.read(path).map(|mut table| {
            if table.name.is_empty() {
                table.name = file_name(path);
            }
            table
        })
    });
    ingest_tables(tables, config)
}

/// Pool tables that were already read (or failed to read).
pub fn ingest_tables<I>(tables: I, config: &ClassifyConfig) -> (Pools, LoadStats)
where
    I: IntoIterator<Item = Result<Table, ReconError>>,
{
    let mut pools = Pools::default();
    let mut stats = LoadStats::default();

    for result in tables {
        let mut table = match result {
            Ok(table) => table,
            Err(e) => {
                log::warn!("skipping file: {e}");
                stats.files_skipped += 1;
                continue;
            }
        };
        stats.files_read += 1;
        stats.duplicates_removed += table.dedup_rows();

        let Some(tech) = classify(&table.name, &table.columns, config) else {
            log::warn!("{}: cannot determine technology, not loaded", table.name);
            stats.files_unclassified += 1;
            continue;
        };
        log::debug!("{}: {} rows as {tech}", table.name, table.rows.len());

        let columns = table.columns.clone();
        pools.get_mut(tech).append(&columns, table.into_records());
    }

    for tech in Technology::ALL {
        stats.duplicates_removed += pools.get_mut(tech).finalize();
    }
    stats.lte_records = pools.lte.len();
    stats.nr_records = pools.nr.len();
    stats.bbu_records = pools.bbu.len();

    log::info!(
        "loaded {} file(s): LTE {}, NR {}, BBU {} records ({} skipped, {} unclassified)",
        stats.files_read,
        stats.lte_records,
        stats.nr_records,
        stats.bbu_records,
        stats.files_skipped,
        stats.files_unclassified,
    );

    (pools, stats)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
