//! TOML configuration of a benchmark run.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use gap_core::{DeferredWarnings, ErrorInfo, Experiment, ExperimentKind, GapError, Scenario};
use serde::Deserialize;

/// Default upper bound on the rows taken from every dataset.
pub const DEFAULT_ROW_LIMIT: usize = 1000;

fn default_true() -> bool {
    true
}

fn default_row_limit() -> usize {
    DEFAULT_ROW_LIMIT
}

fn default_python() -> String {
    "python".to_string()
}

fn default_gnuplot() -> String {
    "gnuplot".to_string()
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    datasets_root: Option<String>,
    algorithms_root: Option<String>,
    output_root: Option<String>,
    #[serde(default)]
    datasets: Vec<String>,
    #[serde(default)]
    scenarios: Vec<String>,
    #[serde(default)]
    enable_continuous: bool,
    #[serde(default = "default_true")]
    enable_recovery: bool,
    #[serde(default)]
    enable_streaming: bool,
    #[serde(default)]
    enabled_algorithms: Vec<String>,
    #[serde(default)]
    disable_precision: bool,
    #[serde(default)]
    disable_runtime: bool,
    #[serde(default = "default_row_limit")]
    row_limit: usize,
    #[serde(default)]
    row_caps: BTreeMap<String, usize>,
    manifests_dir: Option<String>,
    templates_dir: Option<String>,
    #[serde(default)]
    plot: bool,
    #[serde(default = "default_python")]
    python: String,
    #[serde(default = "default_gnuplot")]
    gnuplot: String,
    ledger: Option<String>,
    #[serde(flatten)]
    unknown: BTreeMap<String, toml::Value>,
}

/// Validated run configuration, built once and passed by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Folder holding `<code>/<code>_normal.txt`.
    pub datasets_root: PathBuf,
    /// Folder the algorithm environments live under.
    pub algorithms_root: PathBuf,
    /// Root of the result tree.
    pub output_root: PathBuf,
    /// Dataset codes, in run order.
    pub datasets: Vec<String>,
    /// Scenarios to run, in catalogue order when left unspecified.
    pub scenarios: Vec<Scenario>,
    /// Run Continuous experiments.
    pub enable_continuous: bool,
    /// Run Recovery experiments.
    pub enable_recovery: bool,
    /// Run Streaming experiments.
    pub enable_streaming: bool,
    /// Algorithm codes to keep; empty keeps every registered algorithm.
    pub enabled_algorithms: Vec<String>,
    /// Skip precision runs.
    pub disable_precision: bool,
    /// Skip runtime runs.
    pub disable_runtime: bool,
    /// Rows taken from every dataset at most.
    pub row_limit: usize,
    /// Per-dataset row caps applied on top of `row_limit`.
    pub row_caps: BTreeMap<String, usize>,
    /// Manifests replacing the built-in catalog.
    pub manifests_dir: Option<PathBuf>,
    /// Folder whose plot templates replace the built-in ones, file by file.
    pub templates_dir: Option<PathBuf>,
    /// Invoke the plotting tools after each combination.
    pub plot: bool,
    /// Python interpreter.
    pub python: String,
    /// Gnuplot binary.
    pub gnuplot: String,
    /// Result ledger, `.csv` or `.sqlite`.
    pub ledger: Option<PathBuf>,
}

/// Expands a leading `~` to the user's home folder.
pub fn expand_home(path: &str) -> PathBuf {
    let trimmed = path.trim();
    match (trimmed.strip_prefix('~'), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => {
            let mut expanded = PathBuf::from(home);
            let rest = rest.trim_start_matches('/');
            if !rest.is_empty() {
                expanded.push(rest);
            }
            expanded
        }
        _ => PathBuf::from(trimmed),
    }
}

fn required(value: Option<String>, key: &str) -> Result<PathBuf, GapError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| expand_home(&v))
        .ok_or_else(|| {
            GapError::Config(
                ErrorInfo::new("gap_exp.config_missing", format!("{key} has to be supplied"))
                    .with_context("key", key),
            )
        })
}

impl BenchConfig {
    /// Reads and validates the configuration at `path`.
    pub fn load(path: &Path, warnings: &DeferredWarnings) -> Result<Self, GapError> {
        let text = fs::read_to_string(path).map_err(|err| {
            GapError::Config(
                ErrorInfo::new("gap_exp.config_read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::parse(&text, warnings)
    }

    /// Parses a configuration; unknown keys are queued as warnings.
    pub fn parse(text: &str, warnings: &DeferredWarnings) -> Result<Self, GapError> {
        let raw: RawConfig = toml::from_str(text)
            .map_err(|err| GapError::Config(ErrorInfo::new("gap_exp.config_parse", err.to_string())))?;

        for key in raw.unknown.keys() {
            warnings.push(format!("Warning: unknown config entry with the key {key}"));
        }

        let datasets: Vec<String> = raw
            .datasets
            .iter()
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect();
        if datasets.is_empty() {
            return Err(GapError::Config(ErrorInfo::new(
                "gap_exp.config_datasets",
                "datasets are not supplied or the list is empty",
            )));
        }

        let scenarios = if raw.scenarios.is_empty() {
            Scenario::ALL.to_vec()
        } else {
            raw.scenarios
                .iter()
                .map(|name| name.trim().to_lowercase().parse::<Scenario>())
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self {
            datasets_root: required(raw.datasets_root, "datasets_root")?,
            algorithms_root: required(raw.algorithms_root, "algorithms_root")?,
            output_root: required(raw.output_root, "output_root")?,
            datasets,
            scenarios,
            enable_continuous: raw.enable_continuous,
            enable_recovery: raw.enable_recovery,
            enable_streaming: raw.enable_streaming,
            enabled_algorithms: raw
                .enabled_algorithms
                .iter()
                .map(|code| code.trim().to_lowercase())
                .collect(),
            disable_precision: raw.disable_precision,
            disable_runtime: raw.disable_runtime,
            row_limit: raw.row_limit,
            row_caps: raw.row_caps,
            manifests_dir: raw.manifests_dir.as_deref().map(expand_home),
            templates_dir: raw.templates_dir.as_deref().map(expand_home),
            plot: raw.plot,
            python: raw.python,
            gnuplot: raw.gnuplot,
            ledger: raw.ledger.as_deref().map(expand_home),
        })
    }

    /// `<datasets_root>/<code>/<code>_normal.txt`.
    pub fn dataset_path(&self, code: &str) -> PathBuf {
        self.datasets_root.join(code).join(format!("{code}_normal.txt"))
    }

    /// Folder holding truncated dataset copies.
    pub fn scratch_dir(&self) -> PathBuf {
        self.datasets_root.join("_.temp")
    }

    /// Row limit for `code` after per-dataset caps.
    pub fn row_limit_for(&self, code: &str) -> usize {
        self.row_caps
            .get(code)
            .map_or(self.row_limit, |cap| (*cap).min(self.row_limit))
    }

    /// Enabled kinds, in execution order.
    pub fn kinds(&self) -> Vec<ExperimentKind> {
        ExperimentKind::ALL
            .into_iter()
            .filter(|kind| match kind {
                ExperimentKind::Continuous => self.enable_continuous,
                ExperimentKind::Recovery => self.enable_recovery,
                ExperimentKind::Streaming => self.enable_streaming,
            })
            .collect()
    }

    /// Enabled experiments, in execution order.
    pub fn experiments(&self) -> Vec<Experiment> {
        Experiment::ALL
            .into_iter()
            .filter(|experiment| match experiment {
                Experiment::Precision => !self.disable_precision,
                Experiment::Runtime => !self.disable_runtime,
            })
            .collect()
    }
}
