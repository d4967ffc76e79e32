//! Tabular outputs handed to the writers: the per-technology VDT site
//! sheets and change-request lists.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::ReconError;
use crate::merge::of_technology;
use crate::model::{MergedRecord, Technology};
use crate::resolver::Resolver;
use crate::views::sites;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const TIME_HINT: &str = "Use exact format. Add \" ' \" before";
const BUFFER_HINT: &str = "Default keep it 0.01. Can increase it to accommodate TA Plot";
const DEFAULT_BUFFER: &str = "0.01";
const DEFAULT_ZOOM: &str = "0";

const SITE_LIST_HEADER: &str = "Site Name List";
const ZOOM_HEADER: &str = "ZOOM (Default = 0 for automatic zoom, enter integer value for manual zoom\n\
Eg. value: 5 will fetch plots up to 5 km diagonally from site in both directions.";
const NEIGHBOUR_HEADER: &str =
    "Neighbour list (comma separated), if blank first tier neighbours will be considered";
const CARRIER_HEADER: &str = "Carrier List(comma separated)";
const LTE_CARRIER_SOURCE: &[&str] = &["EARFCN DL from lte parameter data source"];
const NR_CARRIER_SOURCE: &[&str] = &["ARFCNDL", "from data source"];
const NO_CELLS: &[&str] = &[];

/// Metadata block plus the site-table header row.
pub const SITE_REPORT_HEADER_ROWS: usize = 5;

/// One named sheet of string cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

/// Row width per technology; the NR template carries one extra blank column.
fn sheet_width(tech: Technology) -> usize {
    match tech {
        Technology::Nr => 6,
        _ => 5,
    }
}

/// Cells after the carrier list: the site-table header labels and the
/// matching trailer repeated on every NR site row.
fn carrier_source(tech: Technology) -> (&'static [&'static str], &'static [&'static str]) {
    match tech {
        Technology::Nr => (NR_CARRIER_SOURCE, NR_CARRIER_SOURCE),
        _ => (LTE_CARRIER_SOURCE, NO_CELLS),
    }
}

fn padded(cells: &[&str], width: usize) -> Vec<String> {
    let mut row: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
    row.resize(width, String::new());
    row
}

/// Site sheet for one technology: four metadata rows, the site-table
/// header, then one row per distinct site with its sorted, de-duplicated
/// frequency values.
pub fn build_site_report(
    resolver: &Resolver<'_>,
    tech: Technology,
    merged: &[MergedRecord],
    project: &str,
    now: NaiveDateTime,
) -> ReportSheet {
    let config = resolver.config();
    let width = sheet_width(tech);
    let stamp = now.format(TIMESTAMP_FORMAT).to_string();

    let mut rows = vec![
        padded(&["Type", "Value", "Remarks", "Buffer"], width),
        padded(&["projectName", project, "", DEFAULT_BUFFER], width),
        padded(&["startTime", stamp.as_str(), TIME_HINT, BUFFER_HINT], width),
        padded(&["endTime", stamp.as_str(), TIME_HINT], width),
    ];
    let (header_tail, row_tail) = carrier_source(tech);
    let mut site_header = vec![SITE_LIST_HEADER, ZOOM_HEADER, NEIGHBOUR_HEADER, CARRIER_HEADER];
    site_header.extend_from_slice(header_tail);
    rows.push(padded(&site_header, width));

    let site_field = &config.keys.site;
    let freq_field = config.report.frequency.get(tech);
    for site in sites(resolver, merged, tech) {
        let freqs: BTreeSet<String> = of_technology(merged, tech)
            .filter(|m| resolver.resolve(&m.record, tech, site_field) == site)
            .map(|m| resolver.resolve(&m.record, tech, freq_field))
            .filter(|f| !f.is_empty())
            .collect();
        let joined = freqs.into_iter().collect::<Vec<_>>().join(",");
        let mut row = vec![site.as_str(), DEFAULT_ZOOM, "", joined.as_str()];
        row.extend_from_slice(row_tail);
        rows.push(padded(&row, width));
    }

    ReportSheet {
        name: tech.label().to_string(),
        rows,
    }
}

/// The LTE sheet then the NR sheet. Both are written as soon as either
/// technology has a site; no sites at all gives no sheets.
pub fn build_vdt_report(
    resolver: &Resolver<'_>,
    merged: &[MergedRecord],
    project: &str,
    now: NaiveDateTime,
) -> Vec<ReportSheet> {
    const TECHS: [Technology; 2] = [Technology::Lte, Technology::Nr];
    if TECHS.iter().all(|&tech| sites(resolver, merged, tech).is_empty()) {
        return Vec::new();
    }
    TECHS
        .into_iter()
        .map(|tech| build_site_report(resolver, tech, merged, project, now))
        .collect()
}

/// One change-request line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRequestRow {
    #[serde(rename = "Site")]
    pub site: String,
    #[serde(rename = "MO Class")]
    pub mo_class: String,
    #[serde(rename = "Parameter")]
    pub parameter: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "CurrentValue")]
    pub current_value: String,
}

pub const CHANGE_REQUEST_HEADER: [&str; 5] = ["Site", "MO Class", "Parameter", "Value", "CurrentValue"];

impl ChangeRequestRow {
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.site.clone(),
            self.mo_class.clone(),
            self.parameter.clone(),
            self.value.clone(),
            self.current_value.clone(),
        ]
    }
}

/// One change request per merged record of `tech` for a configured parameter.
pub fn build_change_requests(
    resolver: &Resolver<'_>,
    tech: Technology,
    parameter: &str,
    merged: &[MergedRecord],
) -> Result<Vec<ChangeRequestRow>, ReconError> {
    let config = resolver.config();
    let template = config
        .change_request(tech, parameter)
        .ok_or_else(|| ReconError::UnknownParameter {
            technology: tech.key().to_string(),
            parameter: parameter.to_string(),
        })?;

    let rows = of_technology(merged, tech)
        .map(|m| {
            let cell = resolver.resolve(&m.record, tech, config.cell_field(tech));
            ChangeRequestRow {
                site: resolver.resolve(&m.record, tech, &config.keys.site),
                mo_class: template.mo_class_for(&cell),
                parameter: template.parameter.clone(),
                value: resolver.resolve(&m.record, tech, &template.field),
                current_value: String::new(),
            }
        })
        .collect();
    Ok(rows)
}

/// Header plus rows, ready for a writer.
pub fn change_request_table(rows: &[ChangeRequestRow]) -> Vec<Vec<String>> {
    let mut table = vec![CHANGE_REQUEST_HEADER.iter().map(|h| h.to_string()).collect()];
    table.extend(rows.iter().map(ChangeRequestRow::cells));
    table
}
