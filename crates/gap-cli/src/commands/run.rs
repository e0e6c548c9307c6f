use std::error::Error;
use std::path::Path;

use clap::Args;
use gap_core::DeferredWarnings;
use gap_exp::{CombinationOutcome, Orchestrator};
use tracing::info;

use crate::context;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Only run this dataset code, even when the configuration lists more.
    #[arg(long)]
    pub dataset: Option<String>,
    /// Invoke the configured plotting tool after each combination.
    #[arg(long)]
    pub plot: bool,
}

pub fn run(config_path: &Path, args: &RunArgs, warnings: &DeferredWarnings) -> Result<(), Box<dyn Error>> {
    let (mut config, registry) = context::load(config_path, warnings)?;
    if let Some(dataset) = &args.dataset {
        if !config.datasets.contains(dataset) {
            return Err(format!("dataset {dataset} is not part of the configuration").into());
        }
        config.datasets = vec![dataset.clone()];
    }
    config.plot |= args.plot;
    let orchestrator = Orchestrator::new(config, registry, warnings.clone());
    context::install_interrupt_handler(orchestrator.shared_registry(), warnings.clone());
    let outcomes = orchestrator.run_all();
    orchestrator.registry().purge_all()?;
    let outcomes = outcomes?;

    let completed = outcomes
        .iter()
        .filter(|(_, outcome)| matches!(outcome, CombinationOutcome::Completed(_)))
        .count();
    info!(completed, skipped = outcomes.len() - completed, "benchmark finished");
    for (combination, outcome) in &outcomes {
        match outcome {
            CombinationOutcome::Completed(report) => {
                println!("done    {} [{}]", combination.label(), &report.id[..12.min(report.id.len())])
            }
            CombinationOutcome::Skipped { reason } => println!("skipped {}: {reason}", combination.label()),
        }
    }
    Ok(())
}
