use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Precondition violated: {0}")]
    Precondition(String),

    #[error("Repository error: {0}")]
    Repository(String),
}
