#![deny(missing_docs)]
#![doc = "Core types for the gapbench imputation benchmark driver: missing-block triples, experiment axes, data descriptions, errors and deterministic randomness."]

pub mod block;
pub mod data;
pub mod errors;
pub mod kind;
pub mod rng;
pub mod warnings;

pub use block::{is_missing, MissingBlock};
pub use data::DataDescription;
pub use errors::{ErrorInfo, GapError};
pub use kind::{Experiment, ExperimentKind, Scenario};
pub use rng::{RngHandle, SCENARIO_SEED};
pub use warnings::DeferredWarnings;
