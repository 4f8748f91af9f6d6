//! Glue over `fundament`: textual request specs and collect-into-`Vec` runs bounded by a
//! wall-clock deadline.

mod run;
mod spec;

pub use run::{expand_collect, run_collect, RunConfig, RunOutput};
pub use spec::EnumerationSpec;
