//! Column alias resolution.
//!
//! Vendors name the same quantity differently ("MECONTEXT_ID", "SITE",
//! "OSS_ENodeB"), so a canonical field is resolved against a raw record by
//! trying progressively looser matches, stopping at the first non-empty value:
//!
//! 1. exact column name, candidates in priority order
//! 2. case-insensitive column name
//! 3. column name containing a candidate
//! 4. closest column name by normalized edit distance, above a cutoff
//! 5. NR cell field only: any column whose name contains a fallback marker
//! 6. NR fields also defined for BBU: look up the BBU record sharing this
//!    record's (USID, cell) and resolve there with tiers 1–2
//!
//! Tiers 2, 3 and 5 walk the record's columns in order and test every
//! candidate against each column before moving to the next one.
//!
//! Every value returned has been through [`clean`]. An unresolved field is
//! the empty string, never an error.

use crate::config::ReconConfig;
use crate::index::CompositeIndex;
use crate::model::{Record, Technology};
use crate::normalize::clean_str;

/// Resolves canonical fields on raw records. Cheap to construct; borrows
/// the config and, once built, the BBU composite index.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    config: &'a ReconConfig,
    composite: Option<&'a CompositeIndex>,
}

impl<'a> Resolver<'a> {
    /// Resolver without cross-dataset enrichment (tiers 1–5).
    pub fn new(config: &'a ReconConfig) -> Self {
        Self {
            config,
            composite: None,
        }
    }

    /// Resolver that can backfill NR fields from the BBU composite index.
    pub fn with_enrichment(config: &'a ReconConfig, composite: &'a CompositeIndex) -> Self {
        Self {
            config,
            composite: Some(composite),
        }
    }

    pub fn config(&self) -> &'a ReconConfig {
        self.config
    }

    /// Resolve a canonical field. Unknown fields resolve to `""`.
    pub fn resolve(&self, record: &Record, tech: Technology, field: &str) -> String {
        match self.config.aliases.candidates(tech, field) {
            Some(candidates) => self.resolve_field(record, tech, Some(field), candidates),
            None => {
                log::trace!("{tech}: no aliases for field '{field}'");
                String::new()
            }
        }
    }

    /// Resolve an ad hoc candidate list that belongs to no canonical field
    /// (tiers 1–4 only).
    pub fn resolve_candidates(&self, record: &Record, tech: Technology, candidates: &[String]) -> String {
        self.resolve_field(record, tech, None, candidates)
    }

    fn resolve_field(
        &self,
        record: &Record,
        tech: Technology,
        field: Option<&str>,
        candidates: &[String],
    ) -> String {
        if let Some(value) = match_columns(record, candidates, self.config.resolver.fuzzy_cutoff) {
            return value;
        }

        let Some(field) = field else {
            return String::new();
        };

        if tech == Technology::Nr && field == self.config.cell_field(Technology::Nr) {
            if let Some(value) = match_markers(record, &self.config.resolver.fallback_markers) {
                log::trace!("NR cell resolved through column-name fallback");
                return value;
            }
        }

        if tech == Technology::Nr && self.config.enrichable(field) {
            if let Some(value) = self.enrich(record, field) {
                return value;
            }
        }

        String::new()
    }

    /// Tier 6: pull `field` from the BBU record joined on (USID, cell).
    fn enrich(&self, record: &Record, field: &str) -> Option<String> {
        let index = self.composite?;
        let keys = &self.config.keys;
        let usid = self.resolve(record, Technology::Nr, &keys.primary);
        let cell = self.resolve(record, Technology::Nr, self.config.cell_field(Technology::Nr));
        if usid.is_empty() || cell.is_empty() {
            return None;
        }

        let bbu = index.get(&usid, &cell)?;
        let candidates = self.config.aliases.candidates(Technology::Bbu, field)?;
        let value = match_exact(bbu, candidates).or_else(|| match_case_insensitive(bbu, candidates));
        if value.is_some() {
            log::trace!("NR field '{field}' enriched from BBU ({usid}, {cell})");
        }
        value
    }
}

/// Tiers 1–4.
fn match_columns(record: &Record, candidates: &[String], cutoff: f64) -> Option<String> {
    match_exact(record, candidates)
        .or_else(|| match_case_insensitive(record, candidates))
        .or_else(|| match_substring(record, candidates))
        .or_else(|| match_approximate(record, candidates, cutoff))
}

fn non_empty(raw: &str) -> Option<String> {
    let value = clean_str(raw);
    (!value.is_empty()).then_some(value)
}

fn match_exact(record: &Record, candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|name| record.get(name))
        .find_map(non_empty)
}

fn match_case_insensitive(record: &Record, candidates: &[String]) -> Option<String> {
    let lowered = lowercase_all(candidates);
    record.iter().find_map(|(column, raw)| {
        let column = column.trim().to_lowercase();
        lowered
            .iter()
            .any(|name| *name == column)
            .then(|| non_empty(raw))
            .flatten()
    })
}

fn match_substring(record: &Record, candidates: &[String]) -> Option<String> {
    let lowered = lowercase_all(candidates);
    record.iter().find_map(|(column, raw)| {
        let column = column.trim().to_lowercase();
        lowered
            .iter()
            .any(|name| column.contains(name.as_str()))
            .then(|| non_empty(raw))
            .flatten()
    })
}

/// For each candidate in priority order, take the single most similar column
/// (first wins on ties) if it clears `cutoff`.
fn match_approximate(record: &Record, candidates: &[String], cutoff: f64) -> Option<String> {
    candidates.iter().find_map(|name| {
        let name = name.to_lowercase();
        let mut best: Option<(f64, &str)> = None;
        for (column, raw) in record.iter() {
            let score = similarity(&name, &column.to_lowercase());
            if score >= cutoff && best.map_or(true, |(s, _)| score > s) {
                best = Some((score, raw));
            }
        }
        best.and_then(|(_, raw)| non_empty(raw))
    })
}

fn match_markers(record: &Record, markers: &[String]) -> Option<String> {
    let lowered = lowercase_all(markers);
    record.iter().find_map(|(column, raw)| {
        let column = column.trim().to_lowercase();
        lowered
            .iter()
            .any(|m| column.contains(m.as_str()))
            .then(|| non_empty(raw))
            .flatten()
    })
}

fn lowercase_all(names: &[String]) -> Vec<String> {
    names.iter().map(|n| n.to_lowercase()).collect()
}

/// Normalized Levenshtein similarity in [0, 1].
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::CompositeIndex;

    fn rec(pairs: &[(&str, &str)]) -> Record {
        Record::from_pairs(pairs.iter().copied())
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_match_in_priority_order() {
        let config = ReconConfig::builtin();
        let r = Resolver::new(&config);
        let record = rec(&[("SITE", "B"), ("MECONTEXT_ID", "A")]);
        assert_eq!(r.resolve(&record, Technology::Lte, "Site"), "A");
    }

    #[test]
    fn empty_exact_value_falls_through_to_next_candidate() {
        let config = ReconConfig::builtin();
        let r = Resolver::new(&config);
        let record = rec(&[("MECONTEXT_ID", ""), ("SITE", "B")]);
        assert_eq!(r.resolve(&record, Technology::Lte, "Site"), "B");
    }

    #[test]
    fn exact_ignores_non_matching_candidate_order() {
        let config = ReconConfig::builtin();
        let r = Resolver::new(&config);
        let record = rec(&[("OSS_ENodeB", "X")]);
        assert_eq!(r.resolve(&record, Technology::Lte, "Site"), "X");
    }

    #[test]
    fn case_insensitive_match() {
        let config = ReconConfig::builtin();
        let r = Resolver::new(&config);
        let record = rec(&[("crsgain", "3")]);
        assert_eq!(r.resolve(&record, Technology::Lte, "CRSGAIN"), "3");
    }

    #[test]
    fn exact_beats_substring() {
        let config = ReconConfig::builtin();
        let r = Resolver::new(&config);
        // "ENBID_OLD" contains ENBID (substring tier), but "ENBID" exists exactly.
        let record = rec(&[("ENBID_OLD", "1"), ("ENBID", "2")]);
        assert_eq!(r.resolve(&record, Technology::Lte, "ENBID"), "2");
    }

    #[test]
    fn exact_on_later_candidate_beats_substring_on_earlier_one() {
        let config = ReconConfig::builtin();
        let r = Resolver::new(&config);
        // MECONTEXT_ID (first candidate) only appears as a substring,
        // OSS_ENodeB (last candidate) matches exactly.
        let record = rec(&[("MECONTEXT_ID_OLD", "Y"), ("OSS_ENodeB", "X")]);
        assert_eq!(r.resolve(&record, Technology::Lte, "Site"), "X");
    }

    #[test]
    fn substring_match() {
        let config = ReconConfig::builtin();
        let r = Resolver::new(&config);
        let record = rec(&[("LTE_QRXLEVMIN_DBM", "-124")]);
        assert_eq!(r.resolve(&record, Technology::Lte, "QRXLEVMIN"), "-124");
    }

    #[test]
    fn approximate_match_above_cutoff() {
        let config = ReconConfig::builtin();
        let r = Resolver::new(&config);
        // one substitution in 9 chars: similarity 0.89
        let record = rec(&[("CELLRANGX", "15")]);
        assert_eq!(r.resolve(&record, Technology::Lte, "CELLRANGE"), "15");
    }

    #[test]
    fn approximate_match_below_cutoff_is_rejected() {
        let config = ReconConfig::builtin();
        let r = Resolver::new(&config);
        let record = rec(&[("CRANGE", "15")]);
        assert_eq!(r.resolve(&record, Technology::Lte, "CELLRANGE"), "");
    }

    #[test]
    fn values_are_cleaned() {
        let config = ReconConfig::builtin();
        let r = Resolver::new(&config);
        let record = rec(&[("ENBID", "1203.0")]);
        assert_eq!(r.resolve(&record, Technology::Lte, "ENBID"), "1203");
    }

    #[test]
    fn nan_placeholder_is_unresolved() {
        let config = ReconConfig::builtin();
        let r = Resolver::new(&config);
        let record = rec(&[("ENBID", "nan")]);
        assert_eq!(r.resolve(&record, Technology::Lte, "ENBID"), "");
    }

    #[test]
    fn nr_cell_fallback_scans_marker_columns() {
        let config = ReconConfig::builtin();
        let r = Resolver::new(&config);
        let record = rec(&[("GNBID", "7"), ("DU_NAME", "C-7-1")]);
        assert_eq!(r.resolve(&record, Technology::Nr, "cell"), "C-7-1");
        // LTE gets no such fallback
        assert_eq!(r.resolve(&record, Technology::Lte, "cell"), "");
    }

    #[test]
    fn unknown_field_is_empty() {
        let config = ReconConfig::builtin();
        let r = Resolver::new(&config);
        let record = rec(&[("X", "1")]);
        assert_eq!(r.resolve(&record, Technology::Lte, "NOPE"), "");
    }

    #[test]
    fn ad_hoc_candidates() {
        let config = ReconConfig::builtin();
        let r = Resolver::new(&config);
        let record = rec(&[("VENDOR_X", "on")]);
        assert_eq!(r.resolve_candidates(&record, Technology::Lte, &names(&["vendor_x"])), "on");
    }

    #[test]
    fn enrichment_from_bbu() {
        let config = ReconConfig::builtin();
        let mut index = CompositeIndex::default();
        index.insert(
            "55".into(),
            "100".into(),
            rec(&[("USID", "55"), ("NRCELL_NAME", "100"), ("configuration", "FDD")]),
        );
        let r = Resolver::with_enrichment(&config, &index);
        let nr = rec(&[("CSS_USID", "55"), ("NRCELLDUID", "100")]);
        assert_eq!(r.resolve(&nr, Technology::Nr, "CONFIGURATION"), "FDD");

        // Without the index, nothing to enrich from
        let plain = Resolver::new(&config);
        assert_eq!(plain.resolve(&nr, Technology::Nr, "CONFIGURATION"), "");
    }

    #[test]
    fn enrichment_requires_both_keys() {
        let config = ReconConfig::builtin();
        let mut index = CompositeIndex::default();
        index.insert("55".into(), "100".into(), rec(&[("CONFIGURATION", "FDD")]));
        let r = Resolver::with_enrichment(&config, &index);
        let nr = rec(&[("CSS_USID", "55"), ("PCI", "1")]);
        assert_eq!(r.resolve(&nr, Technology::Nr, "CONFIGURATION"), "");
    }

    #[test]
    fn own_value_wins_over_enrichment() {
        let config = ReconConfig::builtin();
        let mut index = CompositeIndex::default();
        index.insert("55".into(), "100".into(), rec(&[("CONFIGURATION", "FDD")]));
        let r = Resolver::with_enrichment(&config, &index);
        let nr = rec(&[("CSS_USID", "55"), ("NRCELLDUID", "100"), ("CONFIGURATION", "TDD")]);
        assert_eq!(r.resolve(&nr, Technology::Nr, "CONFIGURATION"), "TDD");
    }

    #[test]
    fn similarity_bounds() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert!(similarity("abc", "xyz") < 0.1);
    }
}
