use std::error::Error;
use std::path::Path;

use clap::Args;
use gap_algo::{builtin_manifests, AlgorithmRegistry, RunnerSpec};
use gap_core::DeferredWarnings;

use crate::context;

#[derive(Args, Debug)]
pub struct AlgorithmsArgs {
    /// List the built-in catalog without reading a configuration.
    #[arg(long)]
    pub builtin: bool,
}

pub fn run(config_path: &Path, args: &AlgorithmsArgs, warnings: &DeferredWarnings) -> Result<(), Box<dyn Error>> {
    let registry = if args.builtin {
        AlgorithmRegistry::from_manifests(".", builtin_manifests())?
    } else {
        context::load(config_path, warnings)?.1
    };
    println!("{:<10} {:<46} {:<12} series", "code", "capabilities", "runner");
    for algorithm in registry.iter() {
        let runner = match &algorithm.manifest().runner {
            RunnerSpec::Native { .. } => "native",
            RunnerSpec::Interpreter { .. } => "interpreter",
        };
        let series: Vec<String> = algorithm.sub_algorithms().into_iter().map(|sub| sub.code).collect();
        println!(
            "{:<10} {:<46} {:<12} {}",
            algorithm.code(),
            algorithm.capabilities().to_string(),
            runner,
            series.join(",")
        );
    }
    Ok(())
}
