use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::process::Command;

use gap_core::{DataDescription, ErrorInfo, Experiment, ExperimentKind, GapError, MissingBlock};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::capability::{Capabilities, Capability};
use crate::manifest::{AlgorithmManifest, RunnerSpec};
use crate::matrix;

const PLACEHOLDER_FILE: &str = ".gitkeep";

/// One plotted series of an algorithm: the algorithm itself, or one of its
/// truncation ranks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubAlgorithm {
    /// Series name, `<code>` or `<code>_k<k>`.
    pub code: String,
    /// Output file of the test case, when bound to one.
    pub case_file: Option<String>,
    /// Gnuplot style string.
    pub style: String,
}

/// A fully assembled process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to spawn.
    pub program: PathBuf,
    /// Arguments, without the program.
    pub args: Vec<String>,
    /// Folder the process runs in.
    pub working_dir: PathBuf,
}

impl Invocation {
    /// Argument string as reported in warnings.
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

/// Output files gathered by [`Algorithm::collect_results`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collected {
    /// `(sub-algorithm code, copied file)` pairs.
    pub files: Vec<(String, PathBuf)>,
    /// Expected output files the algorithm did not produce.
    pub missing: Vec<String>,
}

/// Validated algorithm bound to its working folder.
///
/// Instances are only handed out by [`AlgorithmRegistry`](crate::AlgorithmRegistry),
/// which keeps at most one per code. They cannot be cloned:
///
/// ```compile_fail
/// use gap_algo::{builtin_manifests, AlgorithmRegistry};
///
/// let registry = AlgorithmRegistry::from_manifests("algos", builtin_manifests()).unwrap();
/// let cdrec = registry.get("cdrec").unwrap();
/// let _copy: gap_algo::Algorithm = cdrec.clone();
/// ```
#[derive(Debug)]
pub struct Algorithm {
    manifest: AlgorithmManifest,
    capabilities: Capabilities,
    env_dir: PathBuf,
}

fn folder_name(folder: &str) -> &str {
    folder.trim().trim_start_matches("./").trim_end_matches('/')
}

impl Algorithm {
    /// Validates `manifest` and resolves its folders under `algorithms_root`.
    pub(crate) fn new(algorithms_root: &Path, manifest: AlgorithmManifest) -> Result<Self, GapError> {
        manifest.validate()?;
        let capabilities = manifest.capability_flags()?;
        let env_dir = algorithms_root.join(&manifest.env_path);
        Ok(Self {
            manifest,
            capabilities,
            env_dir,
        })
    }

    /// Unique algorithm code.
    pub fn code(&self) -> &str {
        &self.manifest.code
    }

    /// Manifest the instance was built from.
    pub fn manifest(&self) -> &AlgorithmManifest {
        &self.manifest
    }

    /// Parsed capability flags.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Whether the manifest declares `capability`.
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// Shortest series the algorithm is stable on.
    pub fn min_rows(&self) -> Option<usize> {
        self.manifest.min_rows
    }

    /// Longest series the algorithm finishes in reasonable time.
    pub fn max_rows(&self) -> Option<usize> {
        self.manifest.max_rows
    }

    /// Working folder of every invocation.
    pub fn env_dir(&self) -> &Path {
        &self.env_dir
    }

    /// Folder receiving generated input files.
    pub fn input_dir(&self) -> PathBuf {
        self.env_dir.join(folder_name(&self.manifest.input_dir))
    }

    /// Folder the algorithm writes its outputs to.
    pub fn output_dir(&self) -> PathBuf {
        self.env_dir.join(folder_name(&self.manifest.output_dir))
    }

    /// Creates the input and output folders if they are missing.
    pub fn prepare(&self) -> Result<(), GapError> {
        for dir in [self.input_dir(), self.output_dir()] {
            fs::create_dir_all(&dir).map_err(|err| GapError::io("gap_algo.folder_io", &dir, err))?;
        }
        Ok(())
    }

    /// `<dataset>_m<test_case>.txt`.
    pub fn input_file(&self, dataset: &str, test_case: usize) -> String {
        format!("{dataset}_m{test_case}.txt")
    }

    /// Output file names produced for `test_case`, one per rank when ranked.
    pub fn output_files(&self, test_case: usize) -> Vec<String> {
        self.sub_algorithms_for(test_case)
            .into_iter()
            .filter_map(|sub| sub.case_file)
            .collect()
    }

    fn output_file(&self, test_case: usize, rank: Option<usize>) -> String {
        match rank {
            Some(k) if self.manifest.is_ranked() => format!("{}{test_case}_k{k}.txt", self.code()),
            _ => format!("{}{test_case}.txt", self.code()),
        }
    }

    fn series_code(&self, rank: usize) -> String {
        if self.manifest.is_ranked() {
            format!("{}_k{rank}", self.code())
        } else {
            self.code().to_string()
        }
    }

    /// Plotted series, without binding to a test case.
    pub fn sub_algorithms(&self) -> Vec<SubAlgorithm> {
        self.sub_algorithms_inner(None)
    }

    /// Plotted series with the output file of `test_case`.
    pub fn sub_algorithms_for(&self, test_case: usize) -> Vec<SubAlgorithm> {
        self.sub_algorithms_inner(Some(test_case))
    }

    fn sub_algorithms_inner(&self, test_case: Option<usize>) -> Vec<SubAlgorithm> {
        let ranked = self.manifest.is_ranked();
        self.manifest
            .ranks()
            .into_iter()
            .map(|k| SubAlgorithm {
                code: self.series_code(k),
                case_file: test_case.map(|tc| self.output_file(tc, Some(k))),
                style: self.manifest.style_for(ranked.then_some(k)),
            })
            .collect()
    }

    /// Writes the algorithm's input file for one test case.
    ///
    /// `source` is the dataset (or its truncated copy); the window selects
    /// what the algorithm sees and `blocks` are relative to it.
    pub fn generate_data(
        &self,
        source: &Path,
        dataset: &str,
        test_case: usize,
        blocks: &[MissingBlock],
        rows: Range<usize>,
        columns: Range<usize>,
    ) -> Result<PathBuf, GapError> {
        let destination = self.input_dir().join(self.input_file(dataset, test_case));
        let written = matrix::write_window(source, &destination, rows, columns, blocks)?;
        debug!(
            algorithm = self.code(),
            path = %destination.display(),
            rows = written,
            "generated input"
        );
        Ok(destination)
    }

    /// Process invocations for one test case, in execution order.
    pub fn invocations(
        &self,
        experiment: Experiment,
        kind: ExperimentKind,
        data: &DataDescription,
        test_case: usize,
    ) -> Vec<Invocation> {
        let input = format!(
            "./{}/{}",
            folder_name(&self.manifest.input_dir),
            self.input_file(&data.dataset, test_case)
        );
        let output_dir = folder_name(&self.manifest.output_dir);
        match &self.manifest.runner {
            RunnerSpec::Native { binary, name, .. } => self
                .manifest
                .ranks()
                .into_iter()
                .map(|k| {
                    let mut args = vec![
                        "-alg".to_string(),
                        name.clone(),
                        "-test".to_string(),
                        experiment.test_flag().to_string(),
                        "-n".to_string(),
                        data.rows.to_string(),
                        "-m".to_string(),
                        data.columns.to_string(),
                        "-k".to_string(),
                        k.to_string(),
                        "-in".to_string(),
                        input.clone(),
                        "-out".to_string(),
                        format!("./{output_dir}/{}", self.output_file(test_case, Some(k))),
                    ];
                    if kind == ExperimentKind::Streaming {
                        args.push("-xtra".to_string());
                        args.push("stream".to_string());
                    }
                    Invocation {
                        program: self.env_dir.join(binary),
                        args,
                        working_dir: self.env_dir.clone(),
                    }
                })
                .collect(),
            RunnerSpec::Interpreter {
                program,
                module,
                function,
            } => {
                let call = format!(
                    "from {module} import {function}; {function}(\"{}\", \"{}/{}\", {})",
                    input.trim_start_matches("./"),
                    output_dir,
                    self.output_file(test_case, None),
                    experiment.runtime_mode()
                );
                vec![Invocation {
                    program: PathBuf::from(program),
                    args: vec!["-c".to_string(), call],
                    working_dir: self.env_dir.clone(),
                }]
            }
        }
    }

    /// Runs every invocation of one test case to completion.
    ///
    /// Failures are returned as recoverable execution errors instead of
    /// stopping at the first one; the caller decides how to report them.
    pub fn run_experiment(
        &self,
        experiment: Experiment,
        kind: ExperimentKind,
        data: &DataDescription,
        test_case: usize,
    ) -> Vec<GapError> {
        self.invocations(experiment, kind, data, test_case)
            .iter()
            .filter_map(|invocation| self.invoke(invocation).err())
            .collect()
    }

    fn invoke(&self, invocation: &Invocation) -> Result<(), GapError> {
        debug!(
            algorithm = self.code(),
            program = %invocation.program.display(),
            args = %invocation.command_line(),
            "invoking algorithm"
        );
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .status()
            .map_err(|err| {
                GapError::Execution(
                    ErrorInfo::new(
                        "gap_algo.spawn_failed",
                        format!("{} could not be started: {err}", self.code()),
                    )
                    .with_context("program", invocation.program.display().to_string()),
                )
            })?;
        if status.success() {
            return Ok(());
        }
        let exit = status
            .code()
            .map_or_else(|| "a signal".to_string(), |code| code.to_string());
        let message = format!(
            "{} returned code {exit} on exit.\nCLI args: {}",
            self.code(),
            invocation.command_line()
        );
        warn!(algorithm = self.code(), exit = %exit, "algorithm exited with failure");
        Err(GapError::Execution(
            ErrorInfo::new("gap_algo.nonzero_exit", message)
                .with_context("program", invocation.program.display().to_string()),
        ))
    }

    /// Copies the outputs of `test_case` into `destination`.
    pub fn collect_results(&self, test_case: usize, destination: &Path) -> Result<Collected, GapError> {
        fs::create_dir_all(destination)
            .map_err(|err| GapError::io("gap_algo.collect_io", destination, err))?;
        let mut collected = Collected::default();
        for sub in self.sub_algorithms_for(test_case) {
            let Some(file) = sub.case_file else {
                continue;
            };
            let source = self.output_dir().join(&file);
            if !source.is_file() {
                collected.missing.push(file);
                continue;
            }
            let target = destination.join(&file);
            fs::copy(&source, &target)
                .map_err(|err| GapError::io("gap_algo.collect_io", &source, err))?;
            collected.files.push((sub.code, target));
        }
        Ok(collected)
    }

    /// Removes transient files from the input and output folders.
    pub fn cleanup(&self) -> Result<(), GapError> {
        purge_folder(&self.input_dir())?;
        purge_folder(&self.output_dir())
    }

    /// Removes outputs left behind by an interrupted run.
    pub fn clean_outputs(&self) -> Result<(), GapError> {
        purge_folder(&self.output_dir())
    }
}

fn purge_folder(dir: &Path) -> Result<(), GapError> {
    if !dir.is_dir() {
        return Ok(());
    }
    let entries = fs::read_dir(dir).map_err(|err| GapError::io("gap_algo.cleanup_io", dir, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| GapError::io("gap_algo.cleanup_io", dir, err))?;
        let path = entry.path();
        if !path.is_file() || entry.file_name() == PLACEHOLDER_FILE {
            continue;
        }
        fs::remove_file(&path).map_err(|err| GapError::io("gap_algo.cleanup_io", &path, err))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn ranked() -> AlgorithmManifest {
        AlgorithmManifest {
            code: "cdrec".into(),
            env_path: "AlgoCollection/_data/".into(),
            input_dir: "in/".into(),
            output_dir: "out/".into(),
            capabilities: vec!["streaming".into(), "multicolumn".into()],
            min_rows: None,
            max_rows: None,
            style: None,
            rank_styles: BTreeMap::from([("2".to_string(), "blue".to_string())]),
            runner: RunnerSpec::Native {
                binary: "../cmake-build-debug/incCD".into(),
                name: "cd".into(),
                ranks: vec![3, 2],
            },
        }
    }

    #[test]
    fn ranked_outputs_carry_suffix() {
        let algo = Algorithm::new(Path::new("/algos"), ranked()).expect("algorithm");
        assert_eq!(
            algo.output_files(400),
            vec!["cdrec400_k3.txt".to_string(), "cdrec400_k2.txt".to_string()]
        );
        let subs = algo.sub_algorithms();
        assert_eq!(subs[1].code, "cdrec_k2");
        assert_eq!(subs[1].style, "blue");
        assert!(subs[0].case_file.is_none());
    }

    #[test]
    fn streaming_invocation_adds_stream_flag() {
        let algo = Algorithm::new(Path::new("/algos"), ranked()).expect("algorithm");
        let data = DataDescription::new(1000, 4, Vec::new(), "airq");
        let calls = algo.invocations(Experiment::Runtime, ExperimentKind::Streaming, &data, 200);
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[0].command_line(),
            "-alg cd -test rt -n 1000 -m 4 -k 3 -in ./in/airq_m200.txt \
             -out ./out/cdrec200_k3.txt -xtra stream"
        );
        assert_eq!(calls[0].working_dir, PathBuf::from("/algos/AlgoCollection/_data/"));
    }

    #[test]
    fn interpreter_call_passes_runtime_mode() {
        let manifest = AlgorithmManifest {
            code: "m-rnn".into(),
            env_path: "M-RNN/".into(),
            input_dir: "data_in/".into(),
            output_dir: "data_out/".into(),
            capabilities: vec!["streaming".into()],
            min_rows: None,
            max_rows: None,
            style: None,
            rank_styles: BTreeMap::new(),
            runner: RunnerSpec::Interpreter {
                program: "python".into(),
                module: "testerMRNN".into(),
                function: "mrnn_recov".into(),
            },
        };
        let algo = Algorithm::new(Path::new("algos"), manifest).expect("algorithm");
        let data = DataDescription::new(100, 4, Vec::new(), "bball");
        let calls = algo.invocations(Experiment::Precision, ExperimentKind::Recovery, &data, 10);
        assert_eq!(calls[0].program, PathBuf::from("python"));
        assert_eq!(
            calls[0].args[1],
            "from testerMRNN import mrnn_recov; mrnn_recov(\"data_in/bball_m10.txt\", \"data_out/m-rnn10.txt\", 0)"
        );
    }
}
