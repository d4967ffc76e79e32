use crate::config::ClassifyConfig;
use crate::model::Technology;

/// Filename hints are checked in this order so that "5GNR_BBU" exports are
/// not taken for NR.
const HINT_ORDER: [Technology; 3] = [Technology::Lte, Technology::Bbu, Technology::Nr];

/// Assign a table to a technology from its filename, falling back to column
/// keywords. `None` means the table is unclassifiable.
///
/// Keyword scoring counts, per technology, how many of its keywords appear
/// in any upper-cased column name. Technologies are scored in
/// [`Technology::ALL`] order and the first to reach the maximum wins.
pub fn classify(filename: &str, columns: &[String], config: &ClassifyConfig) -> Option<Technology> {
    if let Some(tech) = classify_by_filename(filename, config) {
        return Some(tech);
    }

    let upper: Vec<String> = columns.iter().map(|c| c.to_uppercase()).collect();
    let mut best: Option<(Technology, usize)> = None;
    for tech in Technology::ALL {
        let score = keyword_score(&upper, config.keywords.get(tech));
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((tech, score));
        }
    }
    best.map(|(tech, _)| tech)
}

fn classify_by_filename(filename: &str, config: &ClassifyConfig) -> Option<Technology> {
    let name = filename.to_uppercase();
    HINT_ORDER.into_iter().find(|&tech| {
        config
            .filename_hints
            .get(tech)
            .iter()
            .any(|hint| name.contains(&hint.to_uppercase()))
    })
}

fn keyword_score(upper_columns: &[String], keywords: &[String]) -> usize {
    keywords
        .iter()
        .filter(|kw| {
            let kw = kw.to_uppercase();
            upper_columns.iter().any(|c| c.contains(&kw))
        })
        .count()
}
