#![deny(missing_docs)]
//! Algorithms under test: manifests, the live-instance registry and the
//! subprocess contract used to feed them data and collect their outputs.

mod algorithm;
mod capability;
mod catalog;
mod loader;
mod manifest;
pub mod matrix;
mod registry;

pub use algorithm::{Algorithm, Collected, Invocation, SubAlgorithm};
pub use capability::{Capabilities, Capability};
pub use catalog::builtin_manifests;
pub use loader::{load_manifest, load_manifest_dir};
pub use manifest::{AlgorithmManifest, RunnerSpec, TYPICAL_TRUNCATION};
pub use registry::AlgorithmRegistry;
