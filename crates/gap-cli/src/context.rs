use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use gap_algo::{builtin_manifests, load_manifest_dir, AlgorithmManifest, AlgorithmRegistry, RunnerSpec};
use gap_core::DeferredWarnings;
use gap_exp::BenchConfig;
use tracing::{info, warn};

/// Exit status after an interrupt.
pub const INTERRUPTED: i32 = 130;

/// Loads the configuration and the algorithm registry it selects.
pub fn load(
    config_path: &Path,
    warnings: &DeferredWarnings,
) -> Result<(BenchConfig, AlgorithmRegistry), Box<dyn Error>> {
    let config = BenchConfig::load(config_path, warnings)?;
    let manifests = match &config.manifests_dir {
        Some(dir) => load_manifest_dir(dir)?,
        None => builtin_manifests(),
    };
    let manifests = manifests
        .into_iter()
        .map(|manifest| with_interpreter(manifest, &config.python));
    let mut registry = AlgorithmRegistry::from_manifests(&config.algorithms_root, manifests)?;
    if !config.enabled_algorithms.is_empty() {
        for code in registry.retain_enabled(&config.enabled_algorithms) {
            let warning = format!("Warning: enabled algorithm {code} is not registered");
            warn!("{warning}");
            warnings.push(warning);
        }
    }
    info!(
        algorithms = registry.len(),
        datasets = config.datasets.len(),
        "configuration loaded"
    );
    Ok((config, registry))
}

/// Points manifests that call the default `python` at the configured one.
fn with_interpreter(mut manifest: AlgorithmManifest, python: &str) -> AlgorithmManifest {
    if let RunnerSpec::Interpreter { program, .. } = &mut manifest.runner {
        if program == "python" {
            *program = python.to_string();
        }
    }
    manifest
}

/// Prints queued warnings followed by the end marker.
pub fn final_sequence(warnings: &DeferredWarnings) {
    if let Some(report) = warnings.report() {
        print!("{report}");
    }
    println!("--- END ---");
}

/// Installs the Ctrl+C handler: purge algorithm folders, flush warnings,
/// exit with [`INTERRUPTED`]. The handler shares the run's registry.
pub fn install_interrupt_handler(registry: Arc<AlgorithmRegistry>, warnings: DeferredWarnings) {
    if let Err(err) = ctrlc::set_handler(move || {
        println!("--- Ctrl+C received ---");
        if let Err(err) = registry.purge_all() {
            eprintln!("cleanup after interrupt failed: {err}");
        }
        final_sequence(&warnings);
        std::process::exit(INTERRUPTED);
    }) {
        eprintln!("Warning: Failed to install Ctrl+C handler: {err}");
    }
}
