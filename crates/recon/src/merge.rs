use crate::model::{Match, MergedRecord, Record, Technology};
use crate::resolver::Resolver;

/// Coalesce matches into one record per (technology, cell).
///
/// The first match of a group seeds the record; later matches only fill
/// values the seed has empty, so the first non-empty value wins. The seed's
/// column set is fixed: columns only a later match carries are ignored. An
/// unresolved cell (`""`) is a group of its own. Groups come out in
/// first-encounter order.
pub fn merge(matches: &[Match<'_>], resolver: &Resolver<'_>) -> Vec<MergedRecord> {
    let config = resolver.config();
    let mut groups: Vec<MergedRecord> = Vec::new();

    for m in matches {
        let cell = resolver.resolve(m.record, m.technology, config.cell_field(m.technology));
        match groups
            .iter_mut()
            .find(|g| g.technology == m.technology && g.cell == cell)
        {
            Some(group) => {
                backfill(&mut group.record, m.record);
                group.sources += 1;
            }
            None => groups.push(MergedRecord {
                technology: m.technology,
                cell,
                sources: 1,
                record: m.record.clone(),
            }),
        }
    }

    log::debug!("merged {} match(es) into {} record(s)", matches.len(), groups.len());
    groups
}

fn backfill(seed: &mut Record, other: &Record) {
    let empty: Vec<String> = seed
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(column, _)| column.to_string())
        .collect();
    for column in empty {
        if let Some(value) = other.get(&column).filter(|v| !v.is_empty()) {
            let value = value.to_string();
            seed.set(column, value);
        }
    }
}

/// Merged records of one technology, in merge order.
pub fn of_technology(merged: &[MergedRecord], tech: Technology) -> impl Iterator<Item = &MergedRecord> {
    merged.iter().filter(move |m| m.technology == tech)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconConfig;

    fn lte(record: &Record) -> Match<'_> {
        Match {
            technology: Technology::Lte,
            record,
        }
    }

    #[test]
    fn backfill_takes_first_non_empty_value() {
        let config = ReconConfig::builtin();
        let resolver = Resolver::new(&config);
        let a = Record::from_pairs([("CELLID", "1"), ("CRSGAIN", "")]);
        let b = Record::from_pairs([("CELLID", "1"), ("CRSGAIN", "7")]);
        let c = Record::from_pairs([("CELLID", "1"), ("CRSGAIN", "9")]);
        let merged = merge(&[lte(&a), lte(&b), lte(&c)], &resolver);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].record.get("CRSGAIN"), Some("7"));
        assert_eq!(merged[0].sources, 3);
        // Inputs untouched
        assert_eq!(a.get("CRSGAIN"), Some(""));
    }

    #[test]
    fn columns_missing_from_seed_are_not_added() {
        let config = ReconConfig::builtin();
        let resolver = Resolver::new(&config);
        let a = Record::from_pairs([("CELLID", "1"), ("CRSGAIN", "")]);
        let b = Record::from_pairs([("CELLID", "1"), ("CRSGAIN", "7"), ("QRXLEVMIN", "-120")]);
        let merged = merge(&[lte(&a), lte(&b)], &resolver);
        let record = &merged[0].record;
        assert_eq!(record.get("CRSGAIN"), Some("7"));
        assert_eq!(record.get("QRXLEVMIN"), None);
        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, vec!["CELLID", "CRSGAIN"]);
    }

    #[test]
    fn both_empty_stays_empty() {
        let config = ReconConfig::builtin();
        let resolver = Resolver::new(&config);
        let a = Record::from_pairs([("CELLID", "1"), ("CRSGAIN", "")]);
        let b = Record::from_pairs([("CELLID", "1"), ("CRSGAIN", "")]);
        let merged = merge(&[lte(&a), lte(&b)], &resolver);
        assert_eq!(merged[0].record.get("CRSGAIN"), Some(""));
    }

    #[test]
    fn groups_by_technology_and_cell_in_encounter_order() {
        let config = ReconConfig::builtin();
        let resolver = Resolver::new(&config);
        let a = Record::from_pairs([("CELLID", "2")]);
        let b = Record::from_pairs([("CELLID", "1")]);
        let c = Record::from_pairs([("CELLID", "2")]);
        let nr = Record::from_pairs([("NRCELLDUID", "2")]);
        let matches = [
            lte(&a),
            lte(&b),
            Match {
                technology: Technology::Nr,
                record: &nr,
            },
            lte(&c),
        ];
        let merged = merge(&matches, &resolver);
        let keys: Vec<(Technology, &str)> = merged.iter().map(|m| (m.technology, m.cell.as_str())).collect();
        assert_eq!(
            keys,
            vec![(Technology::Lte, "2"), (Technology::Lte, "1"), (Technology::Nr, "2")]
        );
        assert_eq!(of_technology(&merged, Technology::Lte).count(), 2);
    }

    #[test]
    fn unresolved_cell_is_its_own_group() {
        let config = ReconConfig::builtin();
        let resolver = Resolver::new(&config);
        let a = Record::from_pairs([("FOO", "x")]);
        let b = Record::from_pairs([("FOO", "y")]);
        let c = Record::from_pairs([("CELLID", "1")]);
        let merged = merge(&[lte(&a), lte(&c), lte(&b)], &resolver);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].cell, "");
        assert_eq!(merged[0].sources, 2);
    }

    #[test]
    fn empty_input() {
        let config = ReconConfig::builtin();
        let resolver = Resolver::new(&config);
        assert!(merge(&[], &resolver).is_empty());
    }
}
