//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Navigator error: {0}")]
    Navigator(#[from] navstack_navigator::NavigatorError),

    #[error("Queue error: {0}")]
    Queue(#[from] navstack_queue::QueueError),

    #[error("History error: {0}")]
    History(#[from] navstack_history::HistoryError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Browser history is only available on the web platform")]
    NotWeb,
}
