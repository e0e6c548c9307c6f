pub mod algorithms;
pub mod plan;
pub mod replot;
pub mod run;
