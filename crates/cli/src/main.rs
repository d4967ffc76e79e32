// netrecon CLI - reconcile radio-network exports from the command line

mod exit_codes;
mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use netrecon_core::report::{change_request_table, SITE_REPORT_HEADER_ROWS};
use netrecon_core::views::site_pairs;
use netrecon_core::{Engine, ParameterView, ReconConfig, ReconError, ReportSheet, TableReader, Technology};
use netrecon_io::FileReader;
use tracing_subscriber::EnvFilter;

use exit_codes::{recon_exit_code, EXIT_CONFIG, EXIT_ERROR, EXIT_NO_DATA, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "netrecon")]
#[command(about = "Reconcile LTE / NR / BBU configuration exports")]
#[command(version)]
struct Cli {
    /// TOML file replacing the built-in alias table and settings
    #[arg(long, global = true, env = "NETRECON_CONFIG")]
    config: Option<PathBuf>,

    /// Increase log output (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show which technology each file would be pooled as
    #[command(after_help = "\
Examples:
  netrecon classify dumps/*.csv
  netrecon classify 5GNR_BBU.xlsx --json")]
    Classify {
        /// Input files (CSV/TSV/TXT or Excel/ODS)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Load files, search by a field and print the merged records
    #[command(after_help = "\
Examples:
  netrecon search --value 55 lte.csv nr.csv bbu.xlsx
  netrecon search --by Site --value SITE_A lte.csv --json
  netrecon search --by \"cell ID\" --value 100 lte.csv --no-merge
  netrecon search --value 55 -o params.xlsx --add-column PCI --add-column nr:NRTAC lte.csv nr.csv")]
    Search {
        #[command(flatten)]
        query: Query,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Print raw matches instead of merged records
        #[arg(long)]
        no_merge: bool,

        /// Write the parameter views, one sheet per technology (.xlsx), or the first view as CSV
        #[arg(short, long, conflicts_with = "no_merge")]
        output: Option<PathBuf>,

        #[command(flatten)]
        columns: ViewColumns,
    },

    /// Write the VDT site report (LTE and NR sheets) for the matched sites
    #[command(after_help = "\
Examples:
  netrecon report --value 55 --project ATT_STX_253 -o VDT_Report.xlsx lte.csv nr.csv")]
    Report {
        #[command(flatten)]
        query: Query,

        /// Project name for the header block (default from config)
        #[arg(long)]
        project: Option<String>,

        /// Output workbook (.xlsx) or CSV (first sheet only)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write change requests for one parameter of the matched cells
    #[command(after_help = "\
Examples:
  netrecon cr --tech lte --parameter crsGain --value 55 -o LTE_CR.xlsx lte.csv
  netrecon cr --tech nr --parameter digitalTilt --by Site --value SITE_A -o 5G_CR.csv nr.csv")]
    Cr {
        /// Technology: lte or nr
        #[arg(long)]
        tech: String,

        /// Parameter name as configured under [[change_requests.<tech>]]
        #[arg(long)]
        parameter: String,

        #[command(flatten)]
        query: Query,

        /// Output workbook (.xlsx) or CSV
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Display-column edits. `lte:` or `nr:` in front of a name limits the edit
/// to one view; otherwise it applies to both.
#[derive(clap::Args)]
struct ViewColumns {
    /// Show an extra column: a canonical field or a raw column name (repeatable)
    #[arg(long = "add-column", value_name = "[TECH:]NAME")]
    add: Vec<String>,

    /// Hide a display column (repeatable)
    #[arg(long = "remove-column", value_name = "[TECH:]NAME")]
    remove: Vec<String>,

    /// Rename a display header; the new header resolves like any other (repeatable)
    #[arg(long = "rename-column", value_name = "[TECH:]OLD=NEW")]
    rename: Vec<String>,
}

#[derive(clap::Args)]
struct Query {
    /// Canonical field to search (USID, Site, "cell ID", ENBID, NIC, "gnb ID")
    #[arg(long, default_value = "USID")]
    by: String,

    /// Value to look for
    #[arg(long)]
    value: String,

    /// Input files (CSV/TSV/TXT or Excel/ODS)
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Classify { files, json } => cmd_classify(&config, &files, json),
        Commands::Search { query, json, no_merge, output, columns } => {
            cmd_search(config, &query, json, no_merge, output.as_deref(), &columns)
        }
        Commands::Report { query, project, output } => cmd_report(config, &query, project, &output),
        Commands::Cr { tech, parameter, query, output } => cmd_cr(config, &tech, &parameter, &query, &output),
    });

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::UnknownField { .. } => {
                Some("searchable fields are listed under [search.fields] in the config".to_string())
            }
            ReconError::EmptyQuery => Some("pass a non-empty --value".to_string()),
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }
}

// ============================================================================
// Shared
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    match path {
        None => Ok(ReconConfig::builtin()),
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            ReconConfig::from_file(path).map_err(|e| CliError {
                code: EXIT_CONFIG,
                message: e.to_string(),
                hint: None,
            })
        }
    }
}

/// Load files into a fresh engine. Fails when nothing could be pooled.
fn load_engine(config: ReconConfig, files: &[PathBuf]) -> Result<Engine, CliError> {
    let mut engine = Engine::new(config);
    let stats = engine.load(files, &FileReader);
    if Technology::ALL.iter().all(|&t| stats.records(t) == 0) {
        return Err(CliError {
            code: EXIT_NO_DATA,
            message: format!(
                "no records loaded from {} file(s) ({} unreadable, {} unclassified)",
                files.len(),
                stats.files_skipped,
                stats.files_unclassified
            ),
            hint: Some("run `netrecon classify` on the inputs, or -v for details".to_string()),
        });
    }
    Ok(engine)
}

fn write_sheets(path: &Path, sheets: &[ReportSheet], bold_header: bool) -> Result<(), CliError> {
    netrecon_io::write_output(path, sheets, bold_header).map_err(CliError::from)
}

// ============================================================================
// classify
// ============================================================================

fn cmd_classify(config: &ReconConfig, files: &[PathBuf], json: bool) -> Result<(), CliError> {
    let mut entries = Vec::new();
    for path in files {
        let entry = match FileReader.read(path) {
            Ok(table) => {
                let tech = netrecon_core::classify::classify(&table.name, &table.columns, &config.classify);
                render::ClassifyEntry {
                    file: path.display().to_string(),
                    technology: tech.map(|t| t.label().to_string()),
                    rows: table.rows.len(),
                    error: None,
                }
            }
            Err(e) => render::ClassifyEntry {
                file: path.display().to_string(),
                technology: None,
                rows: 0,
                error: Some(e.to_string()),
            },
        };
        entries.push(entry);
    }

    if json {
        render::print_json(&entries)
    } else {
        render::print_classify(&entries);
        Ok(())
    }
}

// ============================================================================
// search
// ============================================================================

/// Views to display, after applying `--add-column` / `--remove-column` /
/// `--rename-column` in that order.
fn build_views(config: &ReconConfig, columns: &ViewColumns) -> Result<Vec<ParameterView>, CliError> {
    let mut views: Vec<ParameterView> = [Technology::Lte, Technology::Nr]
        .into_iter()
        .map(|tech| ParameterView::from_config(tech, config))
        .collect();

    for arg in &columns.add {
        let (tech, name) = split_view_arg(arg)?;
        if name.is_empty() {
            return Err(CliError::args(format!("--add-column {arg:?}: empty column name")));
        }
        for view in targeted(&mut views, tech) {
            view.add_column(name);
        }
    }

    for arg in &columns.remove {
        let (tech, name) = split_view_arg(arg)?;
        let removed = targeted(&mut views, tech)
            .map(|view| view.remove_column(name))
            .filter(|&hit| hit)
            .count();
        if removed == 0 {
            return Err(CliError::args(format!("--remove-column {arg:?}: no view shows '{name}'"))
                .with_hint(shown_columns(&views)));
        }
    }

    for arg in &columns.rename {
        let (tech, pair) = split_view_arg(arg)?;
        let Some((from, to)) = pair.split_once('=') else {
            return Err(CliError::args(format!("--rename-column {arg:?}: expected OLD=NEW")));
        };
        let (from, to) = (from.trim(), to.trim());
        let renamed = targeted(&mut views, tech)
            .map(|view| view.rename_column(from, to))
            .filter(|&hit| hit)
            .count();
        if renamed == 0 {
            return Err(CliError::args(format!("--rename-column {arg:?}: cannot rename '{from}' to '{to}'"))
                .with_hint(shown_columns(&views)));
        }
    }

    Ok(views)
}

/// Split an optional `lte:` / `nr:` prefix off a view argument.
fn split_view_arg(arg: &str) -> Result<(Option<Technology>, &str), CliError> {
    if let Some((prefix, rest)) = arg.split_once(':') {
        if let Ok(tech) = Technology::parse(prefix) {
            if tech == Technology::Bbu {
                return Err(CliError::args(format!("{arg:?}: BBU records have no view")));
            }
            return Ok((Some(tech), rest.trim()));
        }
    }
    Ok((None, arg.trim()))
}

fn targeted(views: &mut [ParameterView], tech: Option<Technology>) -> impl Iterator<Item = &mut ParameterView> {
    views
        .iter_mut()
        .filter(move |view| tech.map_or(true, |t| view.technology == t))
}

fn shown_columns(views: &[ParameterView]) -> String {
    views
        .iter()
        .map(|view| format!("{}: {}", view.technology, view.columns().join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

fn cmd_search(
    config: ReconConfig,
    query: &Query,
    json: bool,
    no_merge: bool,
    output: Option<&Path>,
    columns: &ViewColumns,
) -> Result<(), CliError> {
    let views = build_views(&config, columns)?;
    let engine = load_engine(config, &query.files)?;
    let matches = engine.search(&query.by, &query.value)?;

    if no_merge {
        let raw = render::raw_matches(&matches);
        return if json {
            render::print_json(&raw)
        } else {
            render::print_raw(&raw);
            Ok(())
        };
    }

    let merged = engine.merge(&matches);
    let resolver = engine.resolver();
    let tables: Vec<(Technology, Vec<Vec<String>>)> = views
        .iter()
        .map(|view| (view.technology, view.project(&resolver, &merged)))
        .collect();

    if let Some(path) = output {
        let sheets: Vec<ReportSheet> = tables
            .iter()
            .filter(|(_, rows)| rows.len() > 1)
            .map(|(tech, rows)| ReportSheet {
                name: tech.label().to_string(),
                rows: rows.clone(),
            })
            .collect();
        if sheets.is_empty() {
            tracing::warn!("no records to write, {} not created", path.display());
        } else {
            write_sheets(path, &sheets, true)?;
            let summary: Vec<String> = sheets
                .iter()
                .map(|s| format!("{}: {} record(s)", s.name, s.rows.len() - 1))
                .collect();
            if !json {
                println!("wrote {} ({})", path.display(), summary.join(", "));
                return Ok(());
            }
            tracing::info!("wrote {} ({})", path.display(), summary.join(", "));
        }
    }

    if json {
        return render::print_json(&merged);
    }
    if merged.is_empty() {
        println!("no records match {} = {}", query.by, query.value.trim());
        return Ok(());
    }
    for (tech, rows) in &tables {
        render::print_view(*tech, rows);
    }
    Ok(())
}

// ============================================================================
// report
// ============================================================================

fn cmd_report(config: ReconConfig, query: &Query, project: Option<String>, output: &Path) -> Result<(), CliError> {
    let engine = load_engine(config, &query.files)?;
    let merged = engine.search_merged(&query.by, &query.value)?;
    let now = chrono::Local::now().naive_local();
    let sheets = engine.vdt_report(&merged, project.as_deref(), now);
    if sheets.is_empty() {
        return Err(CliError::general(format!("no sites found for {} = {}", query.by, query.value.trim()))
            .with_hint("the report needs at least one LTE or NR record with a resolvable Site"));
    }

    write_sheets(output, &sheets, false)?;
    println!(
        "wrote {} ({})",
        output.display(),
        sheets
            .iter()
            .map(|s| format!("{}: {} site(s)", s.name, s.rows.len().saturating_sub(SITE_REPORT_HEADER_ROWS)))
            .collect::<Vec<_>>()
            .join(", ")
    );
    render::print_site_pairs(&site_pairs(&engine.resolver(), &merged));
    Ok(())
}

// ============================================================================
// cr
// ============================================================================

fn cmd_cr(
    config: ReconConfig,
    tech: &str,
    parameter: &str,
    query: &Query,
    output: &Path,
) -> Result<(), CliError> {
    let tech = Technology::parse(tech)?;
    if tech == Technology::Bbu {
        return Err(CliError::args("change requests are generated for lte or nr only"));
    }
    if config.change_request(tech, parameter).is_none() {
        let known: Vec<&str> = config.change_requests.get(tech).iter().map(|t| t.parameter.as_str()).collect();
        return Err(CliError::from(ReconError::UnknownParameter {
            technology: tech.key().to_string(),
            parameter: parameter.to_string(),
        })
        .with_hint(format!("configured for {}: {}", tech.label(), known.join(", "))));
    }

    let engine = load_engine(config, &query.files)?;
    let merged = engine.search_merged(&query.by, &query.value)?;
    let rows = engine.change_requests(tech, parameter, &merged)?;
    if rows.is_empty() {
        return Err(CliError::general(format!(
            "no {} records match {} = {}",
            tech.label(),
            query.by,
            query.value.trim()
        )));
    }

    let sheet = ReportSheet {
        name: format!("{} CR", tech.label()),
        rows: change_request_table(&rows),
    };
    write_sheets(output, std::slice::from_ref(&sheet), true)?;
    println!("wrote {} {} change request(s) for {} to {}", rows.len(), tech.label(), parameter, output.display());
    Ok(())
}
