//! Pull request orchestration for extension updates.
//!
//! Each [`crate::updates::UpdateGroup`] becomes one branch, one commit and one
//! pull request. Groups are processed sequentially; a failure in one group
//! aborts the run, while failures of individual updates inside a group are
//! recorded as [`SkippedUpdate`]s.

mod commit;
mod error;
mod orchestrator;
mod result;
mod status;

pub use commit::commit_changes;
pub use error::PrError;
pub use orchestrator::{requirement_satisfied, Orchestrator};
pub use result::{PrResult, SkippedUpdate};
pub use status::PrAction;
