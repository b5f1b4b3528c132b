//! Run summary types and helpers.

mod outputs;
mod run_summary;

pub use outputs::{github_output_path, write_github_output, GITHUB_OUTPUT_ENV};
pub use run_summary::RunSummary;
