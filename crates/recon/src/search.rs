use crate::error::ReconError;
use crate::index::PrimaryIndex;
use crate::model::{Match, MatchSet, Pools, Technology};
use crate::normalize::clean_str;
use crate::resolver::Resolver;

/// Technologies a non-primary search scans, in result order.
const SEARCHABLE: [Technology; 2] = [Technology::Lte, Technology::Nr];

/// Find records whose canonical `field` equals `value` after normalization.
///
/// The primary key goes through the index; any other field is a linear scan
/// over the pools that list it under `[search.fields]`. No match is an empty
/// set, not an error.
pub fn search<'a>(
    field: &str,
    value: &str,
    pools: &'a Pools,
    primary: &PrimaryIndex,
    resolver: &Resolver<'_>,
) -> Result<MatchSet<'a>, ReconError> {
    let query = clean_str(value.trim());
    if query.is_empty() {
        return Err(ReconError::EmptyQuery);
    }

    let config = resolver.config();
    if field == config.keys.primary {
        let hits = primary.lookup(&query, pools);
        log::debug!("{field} = {query}: {} hit(s) from index", hits.len());
        return Ok(hits);
    }

    let techs: Vec<Technology> = SEARCHABLE
        .into_iter()
        .filter(|&t| config.search.fields.get(t).iter().any(|f| f == field))
        .collect();
    if techs.is_empty() {
        return Err(ReconError::UnknownField {
            technology: SEARCHABLE.map(|t| t.key()).join("/"),
            field: field.to_string(),
        });
    }

    let mut hits = MatchSet::new();
    for technology in techs {
        for record in pools.get(technology).records() {
            if resolver.resolve(record, technology, field) == query {
                hits.push(Match { technology, record });
            }
        }
    }
    log::debug!("{field} = {query}: {} hit(s) from scan", hits.len());
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconConfig;
    use crate::ingest::ingest_tables;
    use crate::model::Table;

    fn table(name: &str, columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::new(name, columns.iter().map(|s| s.to_string()).collect());
        for row in rows {
            t.push_row(row.iter().map(|s| Some(s.to_string())).collect());
        }
        t
    }

    fn pools(config: &ReconConfig) -> Pools {
        let tables = vec![
            Ok(table(
                "lte.csv",
                &["USID", "MECONTEXT_ID", "CELLID", "ENBID"],
                &[&["55", "SiteA", "100", "7.0"], &["56", "SiteB", "200", "8"]],
            )),
            Ok(table(
                "nr.csv",
                &["CSS_USID", "GNB_NAME", "NCI", "GNBID"],
                &[&["55", "SiteA", "9001", "7"]],
            )),
        ];
        ingest_tables(tables, &config.classify).0
    }

    #[test]
    fn primary_key_uses_index_across_technologies() {
        let config = ReconConfig::builtin();
        let resolver = Resolver::new(&config);
        let pools = pools(&config);
        let index = PrimaryIndex::build(&pools, &resolver);
        let hits = search("USID", " 55.0 ", &pools, &index, &resolver).unwrap();
        let techs: Vec<Technology> = hits.iter().map(|m| m.technology).collect();
        assert_eq!(techs, vec![Technology::Lte, Technology::Nr]);
    }

    #[test]
    fn site_scans_lte_then_nr() {
        let config = ReconConfig::builtin();
        let resolver = Resolver::new(&config);
        let pools = pools(&config);
        let index = PrimaryIndex::build(&pools, &resolver);
        let hits = search("Site", "SiteA", &pools, &index, &resolver).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].technology, Technology::Lte);
        assert_eq!(hits[1].technology, Technology::Nr);
    }

    #[test]
    fn technology_specific_field_scans_one_pool() {
        let config = ReconConfig::builtin();
        let resolver = Resolver::new(&config);
        let pools = pools(&config);
        let index = PrimaryIndex::build(&pools, &resolver);
        let hits = search("ENBID", "7", &pools, &index, &resolver).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.get("CELLID"), Some("100"));
    }

    #[test]
    fn no_match_is_empty_not_error() {
        let config = ReconConfig::builtin();
        let resolver = Resolver::new(&config);
        let pools = pools(&config);
        let index = PrimaryIndex::build(&pools, &resolver);
        assert!(search("USID", "999", &pools, &index, &resolver).unwrap().is_empty());
        assert!(search("cell ID", "999", &pools, &index, &resolver).unwrap().is_empty());
    }

    #[test]
    fn empty_query_is_rejected() {
        let config = ReconConfig::builtin();
        let resolver = Resolver::new(&config);
        let pools = Pools::default();
        let index = PrimaryIndex::default();
        let err = search("USID", "   ", &pools, &index, &resolver).unwrap_err();
        assert!(matches!(err, ReconError::EmptyQuery));
        assert!(err.is_usage());
    }

    #[test]
    fn unsearchable_field_is_rejected() {
        let config = ReconConfig::builtin();
        let resolver = Resolver::new(&config);
        let pools = Pools::default();
        let index = PrimaryIndex::default();
        let err = search("PCI", "1", &pools, &index, &resolver).unwrap_err();
        assert!(matches!(err, ReconError::UnknownField { .. }));
    }
}
