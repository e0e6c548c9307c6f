//! Drives the benchmark matrix: dataset x kind x scenario x experiment.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gap_algo::{matrix, Algorithm, AlgorithmRegistry, Capability, SubAlgorithm};
use gap_core::{DeferredWarnings, ErrorInfo, Experiment, ExperimentKind, GapError, Scenario};
use gap_scenario::{data_window, describe, materialize, series_offset, uses_truncated_source, TestCase};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::BenchConfig;
use crate::filter::{apply, filters_for};
use crate::layout::{clean_uncollected, ResultLayout};
use crate::ledger::{Ledger, LedgerRow};
use crate::metrics::{error_metrics, write_recovered_cells, write_series};
use crate::plot::{self, Axis};
use crate::report::{CombinationKey, CombinationReport};
use crate::token::{scratch_path, scratch_token};

/// One cell of the benchmark matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    /// Dataset code.
    pub dataset: String,
    /// Measured quantity.
    pub experiment: Experiment,
    /// Experiment kind.
    pub kind: ExperimentKind,
    /// Missing-value scenario.
    pub scenario: Scenario,
}

impl Combination {
    /// `<experiment> / <kind> / <scenario> for <dataset>`.
    pub fn label(&self) -> String {
        format!(
            "{} / {} / {} for {}",
            self.experiment.long_name(),
            self.kind.long_name(),
            self.scenario.long_name(),
            self.dataset
        )
    }
}

/// How a combination ended when it did not abort the run.
#[derive(Debug, Clone, PartialEq)]
pub enum CombinationOutcome {
    /// Every applicable algorithm ran; the report was written.
    Completed(CombinationReport),
    /// The combination does not apply; nothing was run.
    Skipped {
        /// Why the combination does not apply.
        reason: String,
    },
}

/// Dataset dimensions after the row limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shape {
    rows: usize,
    columns: usize,
}

/// Sequences generation, invocation, collection and aggregation.
pub struct Orchestrator {
    config: BenchConfig,
    registry: Arc<AlgorithmRegistry>,
    warnings: DeferredWarnings,
    ledger: Option<Ledger>,
}

impl Orchestrator {
    /// Takes the registry by value or already shared.
    pub fn new(
        config: BenchConfig,
        registry: impl Into<Arc<AlgorithmRegistry>>,
        warnings: DeferredWarnings,
    ) -> Self {
        let ledger = config.ledger.clone().map(Ledger::from_path);
        Self {
            config,
            registry: registry.into(),
            warnings,
            ledger,
        }
    }

    /// Run configuration.
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Live algorithm instances.
    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// Another handle on the same live instances, e.g. for an interrupt
    /// handler that has to purge them.
    pub fn shared_registry(&self) -> Arc<AlgorithmRegistry> {
        Arc::clone(&self.registry)
    }

    /// Queue of deferred warnings.
    pub fn warnings(&self) -> &DeferredWarnings {
        &self.warnings
    }

    fn defer(&self, warning: String) {
        warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Every combination of the configured matrix, in execution order.
    pub fn plan(&self) -> Vec<Combination> {
        let mut plan = Vec::new();
        for dataset in &self.config.datasets {
            for kind in self.config.kinds() {
                for scenario in &self.config.scenarios {
                    for experiment in self.config.experiments() {
                        plan.push(Combination {
                            dataset: dataset.clone(),
                            experiment,
                            kind,
                            scenario: *scenario,
                        });
                    }
                }
            }
        }
        plan
    }

    /// Runs the whole plan. Configuration errors abort; everything else is
    /// reported through the outcome list and the deferred warnings.
    pub fn run_all(&self) -> Result<Vec<(Combination, CombinationOutcome)>, GapError> {
        self.registry.clean_staging()?;
        clean_uncollected(&self.config.output_root)?;
        let mut outcomes = Vec::new();
        for combination in self.plan() {
            let outcome = self.run_combination(&combination)?;
            if let CombinationOutcome::Skipped { reason } = &outcome {
                info!(combination = %combination.label(), reason = %reason, "skipped");
            }
            outcomes.push((combination, outcome));
        }
        clean_uncollected(&self.config.output_root)?;
        Ok(outcomes)
    }

    fn skip(reason: impl Into<String>) -> CombinationOutcome {
        CombinationOutcome::Skipped {
            reason: reason.into(),
        }
    }

    fn shape(&self, dataset: &str) -> Result<(PathBuf, Shape), GapError> {
        let path = self.config.dataset_path(dataset);
        if !path.is_file() {
            return Err(GapError::Config(
                ErrorInfo::new(
                    "gap_exp.missing_dataset",
                    format!("dataset {dataset} not found in the expected location"),
                )
                .with_context("path", path.display().to_string()),
            ));
        }
        let (rows, columns) = matrix::dimensions(&path)?;
        let rows = rows.min(self.config.row_limit_for(dataset));
        Ok((path, Shape { rows, columns }))
    }

    fn algorithms_for(&self, kind: ExperimentKind, scenario: Scenario, rows: usize) -> Vec<&Algorithm> {
        apply(&filters_for(kind, scenario, rows), self.registry.iter())
    }

    /// Runs one combination to completion.
    pub fn run_combination(&self, combination: &Combination) -> Result<CombinationOutcome, GapError> {
        let Combination {
            dataset,
            experiment,
            kind,
            scenario,
        } = combination;
        let (experiment, kind, scenario) = (*experiment, *kind, *scenario);

        if experiment == Experiment::Precision && kind == ExperimentKind::Streaming {
            return Ok(Self::skip("streaming is unsupported for precision runs"));
        }
        if !scenario.supports(kind) {
            return Ok(Self::skip(format!(
                "{} cannot be generated for {}",
                scenario.long_name(),
                kind.long_name()
            )));
        }

        let (source, shape) = self.shape(dataset)?;
        let cases = materialize(kind, scenario, shape.rows, shape.columns)?;
        if cases.is_empty() {
            return Ok(Self::skip(format!(
                "no test case fits {dataset} ({} rows, {} columns)",
                shape.rows, shape.columns
            )));
        }
        let algorithms = self.algorithms_for(kind, scenario, shape.rows);
        if algorithms.is_empty() {
            return Ok(Self::skip("no applicable algorithm"));
        }

        info!(combination = %combination.label(), cases = cases.len(), algorithms = algorithms.len(), "starting");
        let warnings_before = self.warnings.len();
        let layout = ResultLayout::new(&self.config.output_root, experiment, kind, scenario, dataset);
        let sources = self.prepare_sources(dataset, kind, scenario, shape, &source, &cases)?;

        for algorithm in &algorithms {
            self.run_algorithm(algorithm, combination, shape, &sources, &cases, &layout)?;
        }

        info!("copying over results");
        layout.ensure()?;
        let case_values: Vec<usize> = cases.iter().map(|case| case.value).collect();
        let series: Vec<SubAlgorithm> = algorithms
            .iter()
            .filter(|algorithm| algorithm.supports(Capability::Plottable))
            .flat_map(|algorithm| algorithm.sub_algorithms())
            .collect();
        let key = CombinationKey {
            dataset: dataset.clone(),
            experiment,
            kind,
            scenario,
            rows: shape.rows,
            columns: shape.columns,
            test_cases: case_values.clone(),
            algorithms: algorithms.iter().map(|a| a.code().to_string()).collect(),
        };
        let run_id = crate::hash::stable_hash_string(&key)?;

        let ledger_rows = match experiment {
            Experiment::Precision => {
                self.aggregate_precision(combination, shape, &algorithms, &sources, &cases, &layout, &run_id)?
            }
            Experiment::Runtime => self.aggregate_runtime(combination, &algorithms, &cases, &layout, &run_id)?,
        };
        if let Some(ledger) = &self.ledger {
            ledger.append(&ledger_rows)?;
        }

        info!("plotting results");
        if let Some(axis) = Axis::from_cases(&case_values) {
            self.write_plots(combination, shape, &algorithms, &cases, axis, &layout)?;
        }

        info!("starting cleanup");
        for algorithm in &algorithms {
            algorithm.cleanup()?;
        }
        layout.clear_staging()?;
        for path in sources.values() {
            if *path != source && path.exists() {
                fs::remove_file(path).map_err(|err| GapError::io("gap_exp.scratch_io", path, err))?;
            }
        }
        info!("cleanup finished");

        let warnings: Vec<String> = self.warnings_since(warnings_before);
        let report = CombinationReport::build(
            key,
            series.iter().map(|sub| sub.code.clone()).collect(),
            warnings,
        )?;
        report.write(&layout.report_file())?;
        info!(combination = %combination.label(), id = %report.id, "sequence completed");
        Ok(CombinationOutcome::Completed(report))
    }

    fn warnings_since(&self, before: usize) -> Vec<String> {
        self.warnings.snapshot().into_iter().skip(before).collect()
    }

    /// Source file of every test case: the dataset itself, or a truncated
    /// tail copy for Continuous length runs.
    fn prepare_sources(
        &self,
        dataset: &str,
        kind: ExperimentKind,
        scenario: Scenario,
        shape: Shape,
        source: &Path,
        cases: &[TestCase],
    ) -> Result<BTreeMap<usize, PathBuf>, GapError> {
        let mut sources = BTreeMap::new();
        if !uses_truncated_source(kind, scenario) {
            for case in cases {
                sources.insert(case.value, source.to_path_buf());
            }
            return Ok(sources);
        }
        let scratch = self.config.scratch_dir();
        fs::create_dir_all(&scratch).map_err(|err| GapError::io("gap_exp.scratch_io", &scratch, err))?;
        let token = scratch_token(dataset, kind, scenario);
        for case in cases {
            let path = scratch_path(&scratch, token, dataset, case.value);
            let from = shape.rows.saturating_sub(case.value);
            matrix::write_row_range(source, &path, from, shape.rows)?;
            debug!(path = %path.display(), from, "truncated source");
            sources.insert(case.value, path);
        }
        Ok(sources)
    }

    fn run_algorithm(
        &self,
        algorithm: &Algorithm,
        combination: &Combination,
        shape: Shape,
        sources: &BTreeMap<usize, PathBuf>,
        cases: &[TestCase],
        layout: &ResultLayout,
    ) -> Result<(), GapError> {
        algorithm.prepare()?;
        for case in cases {
            let source = sources.get(&case.value).ok_or_else(|| {
                GapError::Environment(ErrorInfo::new(
                    "gap_exp.missing_source",
                    format!("no source prepared for test case {}", case.value),
                ))
            })?;
            let window = data_window(combination.scenario, shape.rows, shape.columns, case.value);
            let description = describe(
                combination.scenario,
                &combination.dataset,
                shape.rows,
                shape.columns,
                case.value,
                case.blocks.clone(),
            );
            algorithm.generate_data(
                source,
                &combination.dataset,
                case.value,
                &case.blocks,
                window.rows,
                window.columns,
            )?;
            for failure in algorithm.run_experiment(combination.experiment, combination.kind, &description, case.value) {
                self.defer(format!("[WARNING] {}", failure.info().message));
            }
            let collected = algorithm.collect_results(case.value, &layout.staging_case(case.value))?;
            for file in collected.missing {
                self.defer(format!(
                    "[WARNING] {} produced no output {file} for {}",
                    algorithm.code(),
                    combination.label()
                ));
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn aggregate_precision(
        &self,
        combination: &Combination,
        shape: Shape,
        algorithms: &[&Algorithm],
        sources: &BTreeMap<usize, PathBuf>,
        cases: &[TestCase],
        layout: &ResultLayout,
        run_id: &str,
    ) -> Result<Vec<LedgerRow>, GapError> {
        let mut mse: BTreeMap<String, Vec<(usize, f64)>> = BTreeMap::new();
        let mut rmse: BTreeMap<String, Vec<(usize, f64)>> = BTreeMap::new();
        let mut rows = Vec::new();

        for case in cases {
            let Some(source) = sources.get(&case.value) else {
                continue;
            };
            let window = data_window(combination.scenario, shape.rows, shape.columns, case.value);
            let reference: Vec<Vec<f64>> = matrix::read_matrix(source, Some(window.rows.end))?
                .into_iter()
                .skip(window.rows.start)
                .map(|row| {
                    row.into_iter()
                        .skip(window.columns.start)
                        .take(window.width())
                        .collect()
                })
                .collect();

            let staged = layout.staging_case(case.value);
            let data_dir = layout.data_case(case.value);
            fs::create_dir_all(&data_dir).map_err(|err| GapError::io("gap_exp.layout_io", &data_dir, err))?;
            let mut recovered_series = Vec::new();

            for sub in algorithms.iter().flat_map(|a| a.sub_algorithms_for(case.value)) {
                let Some(file) = sub.case_file.as_deref() else {
                    continue;
                };
                let staged_file = staged.join(file);
                if !staged_file.is_file() {
                    continue;
                }
                fs::copy(&staged_file, data_dir.join(file))
                    .map_err(|err| GapError::io("gap_exp.layout_io", &staged_file, err))?;
                let recovered = match matrix::read_matrix(&staged_file, None) {
                    Ok(recovered) => recovered,
                    Err(err) => {
                        self.defer(format!("[WARNING] unreadable output of {}: {err}", sub.code));
                        continue;
                    }
                };
                match error_metrics(&reference, &recovered, &case.blocks) {
                    Ok(metrics) => {
                        mse.entry(sub.code.clone()).or_default().push((case.value, metrics.mse));
                        rmse.entry(sub.code.clone()).or_default().push((case.value, metrics.rmse));
                        for (metric, value) in [("mse", metrics.mse), ("rmse", metrics.rmse)] {
                            rows.push(self.ledger_row(combination, run_id, &sub.code, case.value, metric, value));
                        }
                    }
                    Err(err) => {
                        self.defer(format!("[WARNING] output of {} has the wrong shape: {err}", sub.code));
                        continue;
                    }
                }
                recovered_series.push((sub.code.clone(), recovered));
            }
            write_recovered_cells(
                &layout.recovered_matrix(case.value),
                &case.blocks,
                &reference,
                &recovered_series,
            )?;
        }

        for (series, points) in &mse {
            write_series(&layout.mse_file(series), points)?;
        }
        for (series, points) in &rmse {
            write_series(&layout.rmse_file(series), points)?;
        }
        let reference_path = layout.reference_file();
        let full = self.config.dataset_path(&combination.dataset);
        matrix::write_row_range(&full, &reference_path, 0, shape.rows)?;
        Ok(rows)
    }

    fn aggregate_runtime(
        &self,
        combination: &Combination,
        algorithms: &[&Algorithm],
        cases: &[TestCase],
        layout: &ResultLayout,
        run_id: &str,
    ) -> Result<Vec<LedgerRow>, GapError> {
        let mut series: BTreeMap<String, Vec<(usize, f64)>> = BTreeMap::new();
        let mut rows = Vec::new();
        for case in cases {
            let staged = layout.staging_case(case.value);
            for sub in algorithms.iter().flat_map(|a| a.sub_algorithms_for(case.value)) {
                let Some(file) = sub.case_file.as_deref() else {
                    continue;
                };
                let path = staged.join(file);
                if !path.is_file() {
                    continue;
                }
                match matrix::read_runtime(&path) {
                    Ok(value) => {
                        series.entry(sub.code.clone()).or_default().push((case.value, value));
                        rows.push(self.ledger_row(combination, run_id, &sub.code, case.value, "runtime", value));
                    }
                    Err(err) => self.defer(format!("[WARNING] {err}")),
                }
            }
        }
        for (code, points) in &series {
            write_series(&layout.runtime_series(code), points)?;
        }
        Ok(rows)
    }

    fn ledger_row(
        &self,
        combination: &Combination,
        run_id: &str,
        series: &str,
        test_case: usize,
        metric: &str,
        value: f64,
    ) -> LedgerRow {
        LedgerRow {
            run_id: run_id.to_string(),
            dataset: combination.dataset.clone(),
            experiment: combination.experiment.long_name().to_string(),
            kind: combination.kind.long_name().to_string(),
            scenario: combination.scenario.long_name().to_string(),
            series: series.to_string(),
            test_case,
            metric: metric.to_string(),
            value,
        }
    }

    fn write_plots(
        &self,
        combination: &Combination,
        shape: Shape,
        algorithms: &[&Algorithm],
        cases: &[TestCase],
        axis: Axis,
        layout: &ResultLayout,
    ) -> Result<(), GapError> {
        let Combination {
            dataset,
            experiment,
            kind,
            scenario,
        } = combination;
        let plottable: Vec<&Algorithm> = algorithms
            .iter()
            .copied()
            .filter(|algorithm| algorithm.supports(Capability::Plottable))
            .collect();
        let series: Vec<SubAlgorithm> = plottable.iter().flat_map(|a| a.sub_algorithms()).collect();
        match experiment {
            Experiment::Precision => {
                let script = layout.mse_script(dataset);
                plot::write_script(&script, &plot::mse_script(dataset, *kind, *scenario, &series, axis))?;
                for case in cases {
                    let bound: Vec<SubAlgorithm> = plottable
                        .iter()
                        .flat_map(|a| a.sub_algorithms_for(case.value))
                        .collect();
                    let offset = series_offset(*kind, *scenario, shape.rows, case.value);
                    plot::write_script(
                        &layout.recovery_script(dataset, case.value),
                        &plot::recovery_script(dataset, case.value, &bound, offset, shape.rows),
                    )?;
                }
                let values = [
                    ("code", dataset.clone()),
                    ("start", axis.start.to_string()),
                    ("end", axis.end.to_string()),
                    ("tick", axis.tick.to_string()),
                    ("allAlgos", plot::all_algos(&series)),
                    ("nlimit", shape.rows.to_string()),
                    ("gnuplot", self.config.gnuplot.clone()),
                ];
                let templates = self.config.templates_dir.as_deref();
                plot::ERROR_CALCULATION.render(templates, &layout.error_calculation_script(), &values)?;
                plot::PLOT_ALL.render(templates, &layout.plot_all_script(), &values)?;
                plot::Template::reference_plot(shape.columns).render(
                    templates,
                    &layout.reference_plot_script(),
                    &values,
                )?;
                if self.config.plot {
                    self.run_plot_tool(&self.config.python, layout.root(), &layout.plot_all_script());
                }
            }
            Experiment::Runtime => {
                let script = layout.runtime_script(dataset);
                plot::write_script(&script, &plot::runtime_script(dataset, *kind, *scenario, &series, axis))?;
                if self.config.plot {
                    self.run_plot_tool(&self.config.gnuplot, layout.root(), &script);
                }
            }
        }
        Ok(())
    }

    fn run_plot_tool(&self, program: &str, dir: &Path, script: &Path) {
        let name = script
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if let Err(err) = plot::run_tool(program, dir, &name) {
            self.defer(format!("[WARNING] {}", err.info().message));
        }
    }

    /// Re-renders the runtime plot of a finished combination without
    /// re-running any algorithm.
    pub fn replot_runtime(
        &self,
        kind: ExperimentKind,
        scenario: Scenario,
        dataset: &str,
    ) -> Result<PathBuf, GapError> {
        let layout = ResultLayout::new(&self.config.output_root, Experiment::Runtime, kind, scenario, dataset);
        if !layout.exists() {
            return Err(GapError::Environment(
                ErrorInfo::new("gap_exp.missing_results", "no runtime results to replot")
                    .with_context("path", layout.root().display().to_string())
                    .with_hint("run the runtime experiment for this combination first"),
            ));
        }
        let (_, shape) = self.shape(dataset)?;
        let setup = gap_scenario::setup(kind, scenario, shape.rows, shape.columns)?;
        let axis = Axis::from_cases(&setup.test_cases).ok_or_else(|| {
            GapError::Environment(ErrorInfo::new(
                "gap_exp.missing_results",
                "combination has no test cases to replot",
            ))
        })?;
        let series: Vec<SubAlgorithm> = self
            .algorithms_for(kind, scenario, shape.rows)
            .into_iter()
            .filter(|algorithm| algorithm.supports(Capability::Plottable))
            .flat_map(|algorithm| algorithm.sub_algorithms())
            .filter(|sub| layout.runtime_series(&sub.code).is_file())
            .collect();
        let script = layout.runtime_script(dataset);
        plot::write_script(&script, &plot::runtime_script(dataset, kind, scenario, &series, axis))?;
        if self.config.plot {
            self.run_plot_tool(&self.config.gnuplot, layout.root(), &script);
        }
        info!(dataset, kind = %kind, scenario = %scenario, "replot completed");
        Ok(script)
    }
}

