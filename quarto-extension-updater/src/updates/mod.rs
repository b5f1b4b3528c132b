//! Update resolution, classification and grouping.

mod classify;
mod group;
mod resolve;
mod update;

pub use classify::{classify_updates, UpdateClassification};
pub use group::{group_updates, UpdateGroup};
pub use resolve::resolve_updates;
pub use update::Update;
