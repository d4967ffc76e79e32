//! Lookup indices built over the loaded pools.

use std::collections::HashMap;

use crate::model::{Match, MatchSet, Pools, Record, Technology};
use crate::resolver::Resolver;

/// Primary key (USID) → hits across LTE and NR, in pool order.
///
/// Entries are (technology, position in that pool) so the index never
/// borrows the pools it was built from.
#[derive(Debug, Clone, Default)]
pub struct PrimaryIndex {
    buckets: HashMap<String, Vec<(Technology, usize)>>,
}

impl PrimaryIndex {
    pub fn build(pools: &Pools, resolver: &Resolver<'_>) -> Self {
        let primary = &resolver.config().keys.primary;
        let mut index = Self::default();
        for tech in [Technology::Lte, Technology::Nr] {
            for (pos, record) in pools.get(tech).records().iter().enumerate() {
                let key = resolver.resolve(record, tech, primary);
                if !key.is_empty() {
                    index.buckets.entry(key).or_default().push((tech, pos));
                }
            }
        }
        log::debug!("primary index: {} keys", index.len());
        index
    }

    /// Hits for `key`, or an empty set.
    pub fn lookup<'a>(&self, key: &str, pools: &'a Pools) -> MatchSet<'a> {
        let Some(bucket) = self.buckets.get(key) else {
            return MatchSet::new();
        };
        bucket
            .iter()
            .filter_map(|&(technology, pos)| {
                pools.get(technology).records().get(pos).map(|record| Match { technology, record })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// (USID, cell) → BBU record. Later records overwrite earlier ones.
#[derive(Debug, Clone, Default)]
pub struct CompositeIndex {
    entries: HashMap<(String, String), Record>,
}

impl CompositeIndex {
    pub fn build(pools: &Pools, resolver: &Resolver<'_>) -> Self {
        let config = resolver.config();
        let cell_field = config.cell_field(Technology::Bbu);
        let mut index = Self::default();
        for record in pools.bbu.records() {
            let usid = resolver.resolve(record, Technology::Bbu, &config.keys.primary);
            let cell = resolver.resolve(record, Technology::Bbu, cell_field);
            index.insert(usid, cell, record.clone());
        }
        log::debug!("composite index: {} keys", index.len());
        index
    }

    /// Store `record` under (usid, cell). Ignored unless both parts are non-empty.
    pub fn insert(&mut self, usid: String, cell: String, record: Record) {
        if usid.is_empty() || cell.is_empty() {
            return;
        }
        self.entries.insert((usid, cell), record);
    }

    pub fn get(&self, usid: &str, cell: &str) -> Option<&Record> {
        self.entries.get(&(usid.to_string(), cell.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
