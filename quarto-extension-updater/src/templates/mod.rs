//! Template rendering using Handlebars.
//!
//! Branch names, pull request titles and commit titles come from the formats
//! in [`crate::config::UpdaterConfig`]; the pull request body uses a built-in
//! markdown template.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, TemplateRenderer};
