use thiserror::Error;

pub type Result<T> = std::result::Result<T, CalError>;

#[derive(Debug, Error)]
pub enum CalError {
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("missing score for trial ({enroll}, {test}) required by the key")]
    MissingEntry { enroll: String, test: String },

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("malformed calibration model: {0}")]
    MalformedModel(String),

    #[error("invalid prior {0}; expected a value strictly between 0 and 1")]
    InvalidPrior(f64),

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CalError {
    pub fn shape(expected: &[usize], actual: &[usize]) -> Self {
        CalError::ShapeMismatch {
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }
}
