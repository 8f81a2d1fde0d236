use thiserror::Error;

/// Rejected owner input. The action is aborted and nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("no image file selected")]
    EmptyFile,
    #[error("could not read image: {0}")]
    UnreadableImage(String),
    #[error("not a CSS color: {0}")]
    InvalidColor(String),
    #[error("unsafe image source: {0}")]
    UnsafeSource(String),
    #[error("no local photo with source {0}")]
    NotFound(String),
}
