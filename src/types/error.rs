use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("invalid section count: {0}")]
    InvalidSectionCount(String),
    #[error("invalid bounds: {0}")]
    InvalidBounds(String),
}
