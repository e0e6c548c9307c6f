use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use commands::{
    algorithms::{self, AlgorithmsArgs},
    plan::{self, PlanArgs},
    replot::{self, ReplotArgs},
    run::{self, RunArgs},
};
use gap_core::DeferredWarnings;
use tracing_subscriber::prelude::*;

mod commands;
mod context;

#[derive(Parser, Debug)]
#[command(name = "gapbench", about = "Missing-value recovery benchmark driver")]
struct Cli {
    /// TOML configuration of the benchmark run.
    #[arg(long, global = true, default_value = "gapbench.toml")]
    config: PathBuf,
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every configured combination.
    Run(RunArgs),
    /// Re-render the runtime plot of a finished combination.
    Replot(ReplotArgs),
    /// Print the missing-block layouts of one scenario as JSON.
    Plan(PlanArgs),
    /// List the registered algorithms and their capabilities.
    Algorithms(AlgorithmsArgs),
}

const DEFAULT_FILTER: &str = "gapbench=info,gap_exp=info,gap_algo=info";
const VERBOSE_FILTER: &str = "gapbench=debug,gap_exp=debug,gap_algo=debug";

fn init_tracing(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let warnings = DeferredWarnings::new();
    let result: Result<(), Box<dyn Error>> = match &cli.command {
        Command::Run(args) => run::run(&cli.config, args, &warnings),
        Command::Replot(args) => replot::run(&cli.config, args, &warnings),
        Command::Plan(args) => plan::run(args),
        Command::Algorithms(args) => algorithms::run(&cli.config, args, &warnings),
    };

    let code = match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    };
    context::final_sequence(&warnings);
    process::exit(code);
}
