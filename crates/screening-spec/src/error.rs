use thiserror::Error;

/// Failures while ingesting descriptors or materializing them.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("question {index} has a malformed dependency '{raw}' (expected \"<index>,<value>\")")]
    InvalidDependency { index: usize, raw: String },
    #[error("failed to decode question batch: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("template registration failed: {0}")]
    Template(#[from] handlebars::TemplateError),
    #[error("template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),
}
