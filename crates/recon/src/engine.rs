use std::path::Path;

use chrono::NaiveDateTime;

use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::index::{CompositeIndex, PrimaryIndex};
use crate::ingest::{ingest, ingest_tables, LoadStats, TableReader};
use crate::merge::merge;
use crate::model::{Match, MatchSet, MergedRecord, Pools, Table, Technology};
use crate::report::{build_change_requests, build_vdt_report, ChangeRequestRow, ReportSheet};
use crate::resolver::Resolver;
use crate::search::search;
use crate::views::ParameterView;

/// One reconciliation session: the loaded pools and the indices built over
/// them. Every load replaces both wholesale.
#[derive(Debug, Clone)]
pub struct Engine {
    config: ReconConfig,
    pools: Pools,
    primary: PrimaryIndex,
    composite: CompositeIndex,
    stats: LoadStats,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(ReconConfig::builtin())
    }
}

impl Engine {
    pub fn new(config: ReconConfig) -> Self {
        Self {
            config,
            pools: Pools::default(),
            primary: PrimaryIndex::default(),
            composite: CompositeIndex::default(),
            stats: LoadStats::default(),
        }
    }

    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// Read `files` through `reader`, replacing whatever was loaded before.
    pub fn load<P: AsRef<Path>>(&mut self, files: &[P], reader: &dyn TableReader) -> &LoadStats {
        let (pools, stats) = ingest(files, reader, &self.config.classify);
        self.install(pools, stats)
    }

    /// Same as [`Engine::load`] for tables the caller already read.
    pub fn load_tables<I>(&mut self, tables: I) -> &LoadStats
    where
        I: IntoIterator<Item = Result<Table, ReconError>>,
    {
        let (pools, stats) = ingest_tables(tables, &self.config.classify);
        self.install(pools, stats)
    }

    fn install(&mut self, pools: Pools, mut stats: LoadStats) -> &LoadStats {
        let resolver = Resolver::new(&self.config);
        let primary = PrimaryIndex::build(&pools, &resolver);
        let composite = CompositeIndex::build(&pools, &resolver);
        stats.primary_keys = primary.len();
        stats.composite_keys = composite.len();

        self.pools = pools;
        self.primary = primary;
        self.composite = composite;
        self.stats = stats;
        &self.stats
    }

    /// Resolver with BBU enrichment over the current composite index.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::with_enrichment(&self.config, &self.composite)
    }

    pub fn pools(&self) -> &Pools {
        &self.pools
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    pub fn primary_index(&self) -> &PrimaryIndex {
        &self.primary
    }

    pub fn composite_index(&self) -> &CompositeIndex {
        &self.composite
    }

    pub fn search(&self, field: &str, value: &str) -> Result<MatchSet<'_>, ReconError> {
        search(field, value, &self.pools, &self.primary, &self.resolver())
    }

    pub fn merge(&self, matches: &[Match<'_>]) -> Vec<MergedRecord> {
        merge(matches, &self.resolver())
    }

    /// Search, then merge the hits.
    pub fn search_merged(&self, field: &str, value: &str) -> Result<Vec<MergedRecord>, ReconError> {
        let matches = self.search(field, value)?;
        Ok(self.merge(&matches))
    }

    /// Default display view for a technology.
    pub fn view(&self, tech: Technology) -> ParameterView {
        ParameterView::from_config(tech, &self.config)
    }

    /// Site sheets for LTE and NR. `project` falls back to the configured name.
    pub fn vdt_report(
        &self,
        merged: &[MergedRecord],
        project: Option<&str>,
        now: NaiveDateTime,
    ) -> Vec<ReportSheet> {
        let project = project.unwrap_or(&self.config.report.project_name);
        build_vdt_report(&self.resolver(), merged, project, now)
    }

    pub fn change_requests(
        &self,
        tech: Technology,
        parameter: &str,
        merged: &[MergedRecord],
    ) -> Result<Vec<ChangeRequestRow>, ReconError> {
        build_change_requests(&self.resolver(), tech, parameter, merged)
    }
}
