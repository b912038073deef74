//! History error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Invalid history state: {0}")]
    InvalidState(#[from] serde_json::Error),
}
