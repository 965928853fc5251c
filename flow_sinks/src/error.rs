use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    /// The tool splits commands on whitespace; such a token cannot be sent.
    #[error("invalid {field}: {value:?} contains whitespace or is empty")]
    InvalidToken { field: &'static str, value: String },
    #[error("non-finite value {0} for channel sample")]
    NonFinite(f64),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SinkError>;
