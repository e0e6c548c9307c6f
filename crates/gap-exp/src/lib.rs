#![deny(missing_docs)]
//! Benchmark orchestration: configuration, per-combination sequencing,
//! result aggregation and reporting.

pub mod config;
pub mod filter;
pub mod hash;
pub mod layout;
pub mod ledger;
pub mod metrics;
pub mod orchestrator;
pub mod plot;
pub mod report;
pub mod token;

pub use config::{BenchConfig, DEFAULT_ROW_LIMIT};
pub use filter::{apply as apply_filters, filters_for, Filter};
pub use hash::{stable_hash_string, to_canonical_json_bytes};
pub use layout::{clean_uncollected, ResultLayout, STAGING_DIR};
pub use ledger::{Ledger, LedgerRow, Query};
pub use metrics::{error_metrics, ErrorMetrics};
pub use orchestrator::{Combination, CombinationOutcome, Orchestrator};
pub use report::{CombinationKey, CombinationReport};
pub use token::{scratch_path, scratch_token};
