use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Fatal set-up problems. These abort the current stage before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "{var} not found.\n\n\
        To fix this, export it or add it to ~/.config/space-weekly-report/.env:\n  \
        {var}=your_key_here"
    )]
    MissingCredential { var: &'static str },

    #[error("{} not found. {hint}", path.display())]
    MissingInput { path: PathBuf, hint: &'static str },

    #[error("{var} must be a date in YYYY-MM-DD format, got {value:?}")]
    InvalidDate { var: &'static str, value: String },

    #[error("Collection window start {start} is after end {end}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
}

/// Model output that could not be turned into slide records at all.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array of slides, got {0}")]
    NotAnArray(&'static str),
}
