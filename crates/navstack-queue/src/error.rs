//! Queue error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Task queue requires a running tokio runtime")]
    NoRuntime,

    #[error("Unknown drain order: {0}")]
    UnknownDrainOrder(String),
}
