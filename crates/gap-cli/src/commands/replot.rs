use std::error::Error;
use std::path::Path;

use clap::Args;
use gap_core::{DeferredWarnings, ExperimentKind, Scenario};
use gap_exp::Orchestrator;

use crate::context;

#[derive(Args, Debug)]
pub struct ReplotArgs {
    /// Experiment kind, long or short name.
    #[arg(long)]
    pub kind: String,
    /// Scenario, long or short name.
    #[arg(long)]
    pub scenario: String,
    /// Dataset code.
    #[arg(long)]
    pub dataset: String,
    /// Also run the plotting tool on the regenerated script.
    #[arg(long)]
    pub plot: bool,
}

pub fn run(config_path: &Path, args: &ReplotArgs, warnings: &DeferredWarnings) -> Result<(), Box<dyn Error>> {
    let kind: ExperimentKind = args.kind.parse()?;
    let scenario: Scenario = args.scenario.parse()?;
    let (mut config, registry) = context::load(config_path, warnings)?;
    config.plot |= args.plot;
    let orchestrator = Orchestrator::new(config, registry, warnings.clone());
    let script = orchestrator.replot_runtime(kind, scenario, &args.dataset)?;
    println!("{}", script.display());
    Ok(())
}
