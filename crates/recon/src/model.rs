use std::collections::HashSet;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Technology
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Technology {
    Lte,
    Nr,
    Bbu,
}

impl Technology {
    /// Fixed iteration order. Classifier tie-breaks and index build order
    /// both depend on it.
    pub const ALL: [Technology; 3] = [Technology::Lte, Technology::Nr, Technology::Bbu];

    /// Label shown in the `Source` column and report sheet names.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Lte => "LTE",
            Self::Nr => "NR",
            Self::Bbu => "BBU",
        }
    }

    /// Key used in TOML config tables.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Lte => "lte",
            Self::Nr => "nr",
            Self::Bbu => "bbu",
        }
    }

    pub fn parse(name: &str) -> Result<Self, ReconError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "lte" | "4g" => Ok(Self::Lte),
            "nr" | "5g" | "5gnr" => Ok(Self::Nr),
            "bbu" | "5gnr_bbu" => Ok(Self::Bbu),
            _ => Err(ReconError::UnknownTechnology(name.to_string())),
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Input tables
// ---------------------------------------------------------------------------

/// A raw table as handed over by a reader: named columns, rows of
/// present-or-missing cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with missing cells, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Drop rows that are exact duplicates of an earlier row. Returns the
    /// number of rows removed.
    pub fn dedup_rows(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(before);
        self.rows.retain(|row| seen.insert(row.clone()));
        before - self.rows.len()
    }

    /// Convert rows into records. Missing cells become empty strings.
    pub fn into_records(self) -> Vec<Record> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| {
                Record::from_pairs(
                    columns
                        .iter()
                        .cloned()
                        .zip(row.into_iter().map(Option::unwrap_or_default)),
                )
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Ordered raw column → raw value mapping. Empty string means missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Record::default();
        for (k, v) in pairs {
            record.set(k.into(), v.into());
        }
        record
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// A new record laid out over `columns`; columns this record lacks are empty.
    pub fn aligned(&self, columns: &[String]) -> Record {
        Record {
            fields: columns
                .iter()
                .map(|c| (c.clone(), self.get(c).unwrap_or_default().to_string()))
                .collect(),
        }
    }

    /// Insert or overwrite. New columns keep insertion order.
    pub(crate) fn set(&mut self, column: String, value: String) {
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Datasets / pools
// ---------------------------------------------------------------------------

/// All records of one technology, pooled across loaded files.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub technology: Technology,
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(technology: Technology) -> Self {
        Self {
            technology,
            columns: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Union of column names in first-seen order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn append(&mut self, columns: &[String], records: Vec<Record>) {
        for c in columns {
            if !self.columns.contains(c) {
                self.columns.push(c.clone());
            }
        }
        self.records.extend(records);
    }

    /// Align every record to the column union, then drop exact duplicates.
    /// Returns the number of records removed.
    pub(crate) fn finalize(&mut self) -> usize {
        let before = self.records.len();
        let columns = &self.columns;
        let mut seen: HashSet<Record> = HashSet::with_capacity(before);
        let mut kept = Vec::with_capacity(before);
        for record in self.records.drain(..) {
            let aligned = record.aligned(columns);
            if seen.insert(aligned.clone()) {
                kept.push(aligned);
            }
        }
        self.records = kept;
        before - self.records.len()
    }
}

/// One dataset per technology.
#[derive(Debug, Clone)]
pub struct Pools {
    pub lte: Dataset,
    pub nr: Dataset,
    pub bbu: Dataset,
}

impl Default for Pools {
    fn default() -> Self {
        Self {
            lte: Dataset::new(Technology::Lte),
            nr: Dataset::new(Technology::Nr),
            bbu: Dataset::new(Technology::Bbu),
        }
    }
}

impl Pools {
    pub fn get(&self, tech: Technology) -> &Dataset {
        match tech {
            Technology::Lte => &self.lte,
            Technology::Nr => &self.nr,
            Technology::Bbu => &self.bbu,
        }
    }

    pub(crate) fn get_mut(&mut self, tech: Technology) -> &mut Dataset {
        match tech {
            Technology::Lte => &mut self.lte,
            Technology::Nr => &mut self.nr,
            Technology::Bbu => &mut self.bbu,
        }
    }
}

// ---------------------------------------------------------------------------
// Search / merge output
// ---------------------------------------------------------------------------

/// One search hit, borrowed from the pools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub technology: Technology,
    pub record: &'a Record,
}

/// Ordered search result. Empty is a valid outcome.
pub type MatchSet<'a> = Vec<Match<'a>>;

/// Coalesced record for one (technology, cell) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedRecord {
    pub technology: Technology,
    pub cell: String,
    /// Number of matches folded into this record.
    pub sources: usize,
    pub record: Record,
}
