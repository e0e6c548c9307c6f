use std::collections::BTreeMap;

use gap_core::{ErrorInfo, GapError};
use serde::{Deserialize, Serialize};

use crate::capability::{Capabilities, Capability};

/// Truncation rank used when a native runner declares no ranks.
pub const TYPICAL_TRUNCATION: usize = 3;

const DEFAULT_STYLE: &str = "linespoints lt 8 dt 1 lw 2 pt 1 lc rgbcolor \"black\" pointsize 1.2";

/// How an algorithm process is started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RunnerSpec {
    /// Compiled executable speaking the `-alg ... -in ... -out ...` CLI.
    Native {
        /// Executable path, relative to the algorithm's environment folder.
        binary: String,
        /// Value passed as `-alg`.
        name: String,
        /// Truncation ranks; more than one produces one output per rank.
        #[serde(default)]
        ranks: Vec<usize>,
    },
    /// Function inside an interpreted module, called through `-c`.
    Interpreter {
        /// Interpreter binary, e.g. `python`.
        program: String,
        /// Module imported from the environment folder.
        module: String,
        /// Function called with input path, output path and mode.
        function: String,
    },
}

/// On-disk description of one algorithm under test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmManifest {
    /// Unique code, also the output file prefix.
    pub code: String,
    /// Working folder, relative to the algorithms root.
    pub env_path: String,
    /// Input folder, relative to the environment.
    pub input_dir: String,
    /// Output folder, relative to the environment.
    pub output_dir: String,
    /// Capability names; see [`Capability`](crate::Capability).
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Smallest series the algorithm runs stably on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rows: Option<usize>,
    /// Largest series the algorithm finishes on in reasonable time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
    /// Gnuplot style of the plotted series.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Per-rank plot styles, keyed by the rank's decimal spelling.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rank_styles: BTreeMap<String, String>,
    /// How the algorithm is invoked.
    pub runner: RunnerSpec,
}

fn is_root_like(folder: &str) -> bool {
    matches!(folder.trim(), "" | "." | "/" | "./")
}

fn normalize(folder: &str) -> &str {
    let trimmed = folder.trim().trim_start_matches("./");
    trimmed.trim_end_matches('/')
}

impl AlgorithmManifest {
    /// Rejects empty codes and unusable or shared folders.
    pub fn validate(&self) -> Result<(), GapError> {
        if self.code.trim().is_empty() {
            return Err(GapError::Config(ErrorInfo::new(
                "gap_algo.manifest_code",
                "algorithm manifest missing code",
            )));
        }
        for (role, folder) in [("input", &self.input_dir), ("output", &self.output_dir)] {
            if is_root_like(folder) {
                return Err(GapError::Config(
                    ErrorInfo::new(
                        "gap_algo.invalid_folder",
                        format!("{role} folder of {} cannot be the environment folder", self.code),
                    )
                    .with_context("folder", folder.clone()),
                ));
            }
        }
        if normalize(&self.input_dir) == normalize(&self.output_dir) {
            return Err(GapError::Config(
                ErrorInfo::new(
                    "gap_algo.conflicting_folders",
                    format!("input and output folders of {} coincide", self.code),
                )
                .with_context("folder", self.input_dir.clone()),
            ));
        }
        if let RunnerSpec::Native { ranks, .. } = &self.runner {
            if ranks.iter().any(|k| *k == 0) {
                return Err(GapError::Config(
                    ErrorInfo::new("gap_algo.invalid_rank", "truncation rank must be positive")
                        .with_context("code", self.code.clone()),
                ));
            }
        }
        self.capability_flags()?;
        Ok(())
    }

    /// Parses the capability names into a bitset.
    pub fn capability_flags(&self) -> Result<Capabilities, GapError> {
        self.capabilities
            .iter()
            .map(|name| Capability::parse(name))
            .collect()
    }

    /// Ranks the runner is invoked with; one entry per invocation.
    pub fn ranks(&self) -> Vec<usize> {
        match &self.runner {
            RunnerSpec::Native { ranks, .. } if !ranks.is_empty() => ranks.clone(),
            _ => vec![TYPICAL_TRUNCATION],
        }
    }

    /// Whether outputs carry a `_k<k>` suffix.
    pub fn is_ranked(&self) -> bool {
        matches!(&self.runner, RunnerSpec::Native { ranks, .. } if ranks.len() > 1)
    }

    /// Style of the series of `rank`, falling back to the base style.
    pub fn style_for(&self, rank: Option<usize>) -> String {
        rank.and_then(|k| self.rank_styles.get(&k.to_string()))
            .or(self.style.as_ref())
            .cloned()
            .unwrap_or_else(|| DEFAULT_STYLE.to_string())
    }
}
