//! Template rendering error types.

use thiserror::Error;

/// A branch name, title, commit message or body failed to render.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to render {what}: {source}")]
    Render {
        /// Which output was being rendered, e.g. `branch name`.
        what: &'static str,
        #[source]
        source: handlebars::RenderError,
    },
}
