#![deny(missing_docs)]
//! Deterministic generation of missing-value layouts.
//!
//! A scenario turns into a template plus an ordered list of test cases;
//! every test case is then advanced into concrete, compacted blocks.

mod compactor;
mod mcar;
mod params;
mod window;

pub use compactor::{compact, expand};
pub use mcar::{generate as generate_mcar, sample_cells as sample_mcar_cells, McarSpec};
pub use params::{
    advance, anchor, block_size, materialize, setup, ScenarioSetup, TestCase, MCAR_PERCENTAGE,
    MCAR_RUN,
};
pub use window::{data_window, describe, series_offset, uses_truncated_source, DataWindow};
