//! Parameter views: which columns to display for merged records of one
//! technology, and how each display header maps back to a canonical field.

use std::collections::{BTreeSet, HashMap};

use crate::config::ReconConfig;
use crate::merge::of_technology;
use crate::model::{MergedRecord, Technology};
use crate::resolver::Resolver;

/// Header that renders the technology label instead of a field.
pub const SOURCE_COLUMN: &str = "Source";

#[derive(Debug, Clone)]
pub struct ParameterView {
    pub technology: Technology,
    columns: Vec<String>,
    headers: HashMap<String, String>,
}

impl ParameterView {
    pub fn from_config(technology: Technology, config: &ReconConfig) -> Self {
        let view = config.views.get(technology);
        Self {
            technology,
            columns: view.columns.clone(),
            headers: view.headers.clone(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Append a display column. Returns false if it was already shown.
    pub fn add_column(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.columns.iter().any(|c| c == name) {
            return false;
        }
        self.columns.push(name.to_string());
        true
    }

    pub fn remove_column(&mut self, name: &str) -> bool {
        let before = self.columns.len();
        self.columns.retain(|c| c != name);
        self.columns.len() != before
    }

    /// Rename a display header in place. The new header resolves like any
    /// other, so it should name a field or a raw column.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        let to = to.trim();
        if to.is_empty() || self.columns.iter().any(|c| c == to) {
            return false;
        }
        match self.columns.iter_mut().find(|c| *c == from) {
            Some(slot) => {
                *slot = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Canonical field a display header reads from.
    pub fn field_for<'h>(&'h self, header: &'h str) -> &'h str {
        self.headers.get(header).map_or(header, String::as_str)
    }

    /// Value of one display header for a merged record.
    pub fn cell_value(&self, resolver: &Resolver<'_>, merged: &MergedRecord, header: &str) -> String {
        if header == SOURCE_COLUMN {
            return self.technology.label().to_string();
        }
        let field = self.field_for(header);
        if resolver.config().aliases.defines(self.technology, field) {
            resolver.resolve(&merged.record, self.technology, field)
        } else {
            resolver.resolve_candidates(&merged.record, self.technology, &[field.to_string()])
        }
    }

    /// Header row followed by one row per merged record of this technology.
    pub fn project(&self, resolver: &Resolver<'_>, merged: &[MergedRecord]) -> Vec<Vec<String>> {
        let mut rows = vec![self.columns.clone()];
        for m in of_technology(merged, self.technology) {
            rows.push(
                self.columns
                    .iter()
                    .map(|header| self.cell_value(resolver, m, header))
                    .collect(),
            );
        }
        rows
    }
}

/// Distinct non-empty sites per technology, sorted.
pub fn sites(resolver: &Resolver<'_>, merged: &[MergedRecord], tech: Technology) -> Vec<String> {
    let site_field = &resolver.config().keys.site;
    let set: BTreeSet<String> = of_technology(merged, tech)
        .map(|m| resolver.resolve(&m.record, tech, site_field))
        .filter(|s| !s.is_empty())
        .collect();
    set.into_iter().collect()
}

/// LTE and NR sites side by side, padded with `""` to the longer list.
pub fn site_pairs(resolver: &Resolver<'_>, merged: &[MergedRecord]) -> Vec<[String; 2]> {
    let lte = sites(resolver, merged, Technology::Lte);
    let nr = sites(resolver, merged, Technology::Nr);
    (0..lte.len().max(nr.len()))
        .map(|i| {
            [
                lte.get(i).cloned().unwrap_or_default(),
                nr.get(i).cloned().unwrap_or_default(),
            ]
        })
        .collect()
}
