use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ReconError;
use crate::model::Technology;

/// Built-in mappings, used when no config file is supplied.
const DEFAULT_CONFIG: &str = include_str!("defaults.toml");

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub aliases: AliasTable,
    pub keys: KeyConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub classify: ClassifyConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub views: PerTechnology<ViewConfig>,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub change_requests: PerTechnology<Vec<ChangeRequestTemplate>>,
}

fn default_name() -> String {
    "custom".into()
}

/// One value per technology. Missing tables deserialize to `T::default()`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerTechnology<T: Default> {
    #[serde(default)]
    pub lte: T,
    #[serde(default)]
    pub nr: T,
    #[serde(default)]
    pub bbu: T,
}

impl<T: Default> PerTechnology<T> {
    pub fn get(&self, tech: Technology) -> &T {
        match tech {
            Technology::Lte => &self.lte,
            Technology::Nr => &self.nr,
            Technology::Bbu => &self.bbu,
        }
    }
}

// ---------------------------------------------------------------------------
// Alias table
// ---------------------------------------------------------------------------

/// Canonical field → raw column candidates, highest priority first.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldAliases {
    pub field: String,
    pub columns: Vec<String>,
}

/// Per-technology alias lists. Field order is the order given in config.
pub type AliasTable = PerTechnology<Vec<FieldAliases>>;

impl AliasTable {
    pub fn fields(&self, tech: Technology) -> &[FieldAliases] {
        self.get(tech)
    }

    pub fn candidates(&self, tech: Technology, field: &str) -> Option<&[String]> {
        self.get(tech)
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.columns.as_slice())
    }

    pub fn defines(&self, tech: Technology, field: &str) -> bool {
        self.candidates(tech, field).is_some()
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct KeyConfig {
    /// Cross-technology join key (USID).
    pub primary: String,
    /// Site-name field used by reports and change requests.
    pub site: String,
    /// Cell identifier field per technology; groups merges and keys BBU enrichment.
    pub cell: PerTechnology<String>,
}

// ---------------------------------------------------------------------------
// Resolver / classifier / search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    /// Minimum normalized edit-distance similarity for an approximate column match.
    #[serde(default = "default_fuzzy_cutoff")]
    pub fuzzy_cutoff: f64,
    /// Substrings that mark a column as a likely NR cell name when nothing else matched.
    #[serde(default = "default_fallback_markers")]
    pub fallback_markers: Vec<String>,
}

fn default_fuzzy_cutoff() -> f64 {
    0.8
}

fn default_fallback_markers() -> Vec<String> {
    vec!["cell".into(), "name".into()]
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fuzzy_cutoff: default_fuzzy_cutoff(),
            fallback_markers: default_fallback_markers(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifyConfig {
    #[serde(default)]
    pub keywords: PerTechnology<Vec<String>>,
    #[serde(default)]
    pub filename_hints: PerTechnology<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchConfig {
    /// Non-primary fields searchable per technology (linear scan).
    #[serde(default)]
    pub fields: PerTechnology<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Views / report / change requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub columns: Vec<String>,
    /// Display header → canonical field, for headers that differ from the field name.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default)]
    pub frequency: PerTechnology<String>,
}

fn default_project_name() -> String {
    "ATT_STX_253".into()
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            project_name: default_project_name(),
            frequency: PerTechnology::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangeRequestTemplate {
    pub parameter: String,
    pub field: String,
    /// Managed-object class; `{cell}` is replaced with the resolved cell id.
    pub mo_class: String,
}

impl ChangeRequestTemplate {
    pub fn mo_class_for(&self, cell: &str) -> String {
        self.mo_class.replace("{cell}", cell)
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl Default for ReconConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReconConfig {
    /// The embedded default mappings.
    pub fn builtin() -> Self {
        Self::from_toml(DEFAULT_CONFIG).expect("embedded defaults.toml is valid")
    }

    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self, ReconError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| ReconError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    /// Cell identifier field for a technology.
    pub fn cell_field(&self, tech: Technology) -> &str {
        self.keys.cell.get(tech)
    }

    /// Fields of an NR record that may be backfilled from the BBU composite index:
    /// those the BBU table also defines, minus the join keys themselves.
    pub fn enrichable(&self, field: &str) -> bool {
        field != self.keys.primary
            && field != self.cell_field(Technology::Nr)
            && field != self.cell_field(Technology::Bbu)
            && self.aliases.defines(Technology::Bbu, field)
    }

    pub fn change_request(&self, tech: Technology, parameter: &str) -> Option<&ChangeRequestTemplate> {
        self.change_requests
            .get(tech)
            .iter()
            .find(|t| t.parameter == parameter)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if !(self.resolver.fuzzy_cutoff > 0.0 && self.resolver.fuzzy_cutoff <= 1.0) {
            return Err(ReconError::ConfigValidation(format!(
                "resolver.fuzzy_cutoff must be in (0, 1], got {}",
                self.resolver.fuzzy_cutoff
            )));
        }

        for tech in Technology::ALL {
            let fields = self.aliases.fields(tech);

            // Field names must be unique and every field needs at least one candidate
            for (i, f) in fields.iter().enumerate() {
                if f.columns.is_empty() {
                    return Err(ReconError::ConfigValidation(format!(
                        "aliases.{}: field '{}' has no columns",
                        tech.key(),
                        f.field
                    )));
                }
                if fields[..i].iter().any(|other| other.field == f.field) {
                    return Err(ReconError::ConfigValidation(format!(
                        "aliases.{}: duplicate field '{}'",
                        tech.key(),
                        f.field
                    )));
                }
            }

            // An empty BBU table just disables enrichment
            if tech == Technology::Bbu && fields.is_empty() {
                continue;
            }

            for key in [self.keys.primary.as_str(), self.cell_field(tech)] {
                if !self.aliases.defines(tech, key) {
                    return Err(ReconError::ConfigValidation(format!(
                        "aliases.{}: key field '{key}' is not defined",
                        tech.key()
                    )));
                }
            }

            for field in self.search.fields.get(tech) {
                if !self.aliases.defines(tech, field) {
                    return Err(ReconError::UnknownField {
                        technology: tech.key().into(),
                        field: field.clone(),
                    });
                }
            }

            for template in self.change_requests.get(tech) {
                if !self.aliases.defines(tech, &template.field) {
                    return Err(ReconError::ConfigValidation(format!(
                        "change_requests.{}: parameter '{}' uses unknown field '{}'",
                        tech.key(),
                        template.parameter,
                        template.field
                    )));
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
name = "Minimal"

[keys]
primary = "USID"
site = "Site"

[keys.cell]
lte = "cell"
nr = "cell"
bbu = "cell"

[[aliases.lte]]
field = "USID"
columns = ["USID"]

[[aliases.lte]]
field = "cell"
columns = ["CELL"]

[[aliases.nr]]
field = "USID"
columns = ["USID"]

[[aliases.nr]]
field = "cell"
columns = ["NRCELL"]
"#;

    #[test]
    fn builtin_parses() {
        let config = ReconConfig::builtin();
        assert_eq!(config.name, "default");
        assert_eq!(config.keys.primary, "USID");
        assert_eq!(config.resolver.fuzzy_cutoff, 0.8);
        assert_eq!(
            config.aliases.candidates(Technology::Lte, "Site").unwrap(),
            &["MECONTEXT_ID", "SITE", "OSS_ENodeB"]
        );
        assert_eq!(config.cell_field(Technology::Bbu), "NRCELL_NAME");
        assert_eq!(config.report.frequency.nr, "SSBFREQUENCY");
    }

    #[test]
    fn builtin_field_order_preserved() {
        let config = ReconConfig::builtin();
        let first: Vec<&str> = config
            .aliases
            .fields(Technology::Nr)
            .iter()
            .take(3)
            .map(|f| f.field.as_str())
            .collect();
        assert_eq!(first, vec!["USID", "NIC", "gnb ID"]);
    }

    #[test]
    fn enrichable_fields_exclude_join_keys() {
        let config = ReconConfig::builtin();
        assert!(config.enrichable("CONFIGURATION"));
        assert!(config.enrichable("ED_Market"));
        assert!(!config.enrichable("USID"));
        assert!(!config.enrichable("NRCELL_NAME"));
        assert!(!config.enrichable("cell"));
        assert!(!config.enrichable("PCI"));
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = ReconConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.name, "Minimal");
        assert_eq!(config.resolver.fallback_markers, vec!["cell", "name"]);
        assert_eq!(config.report.project_name, "ATT_STX_253");
        assert!(config.aliases.fields(Technology::Bbu).is_empty());
        assert!(!config.enrichable("CONFIGURATION"));
    }

    #[test]
    fn change_request_template_substitutes_cell() {
        let config = ReconConfig::builtin();
        let t = config.change_request(Technology::Nr, "digitalTilt").unwrap();
        assert_eq!(t.field, "Digital Tilt");
        assert_eq!(t.mo_class_for("C1"), "NRSectorCarrier=C1,CommonBeamforming=1");
        assert!(config.change_request(Technology::Lte, "digitalTilt").is_none());
    }

    #[test]
    fn reject_missing_key_field() {
        let input = MINIMAL.replace("[[aliases.nr]]\nfield = \"cell\"", "[[aliases.nr]]\nfield = \"other\"");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("key field 'cell'"), "{err}");
    }

    #[test]
    fn reject_bad_cutoff() {
        let input = format!("{MINIMAL}\n[resolver]\nfuzzy_cutoff = 1.5\n");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("fuzzy_cutoff"));
    }

    #[test]
    fn reject_duplicate_field() {
        let input = format!("{MINIMAL}\n[[aliases.lte]]\nfield = \"USID\"\ncolumns = [\"X\"]\n");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("duplicate field 'USID'"));
    }

    #[test]
    fn reject_unknown_search_field() {
        let input = format!("{MINIMAL}\n[search.fields]\nlte = [\"ENBID\"]\n");
        let err = ReconConfig::from_toml(&input).unwrap_err();
        assert!(matches!(err, ReconError::UnknownField { .. }));
    }

    #[test]
    fn reject_malformed_toml() {
        let err = ReconConfig::from_toml("name = ").unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
    }
}
