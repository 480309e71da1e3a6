use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScorecardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not read {file}: {message}")]
    Import { file: String, message: String },

    #[error("Unknown scheme category: {0}")]
    UnknownCategory(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, ScorecardError>;
