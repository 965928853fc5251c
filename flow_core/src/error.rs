use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlowError {
    #[error("timestamp went backwards: {current} after {previous}")]
    DataOrdering { previous: i64, current: i64 },
    #[error("collaborator {operation} failed: {status}")]
    Collaborator {
        operation: &'static str,
        status: String,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("run cancelled")]
    Cancelled,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
