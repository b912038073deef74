//! Navigator error types

use navstack_history::NavigatorId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavigatorError {
    #[error("Nothing to pop: {navigator} is at its root and has no parent")]
    NothingToPop { navigator: NavigatorId },

    #[error("Navigator {0} is unmounted")]
    Unmounted(NavigatorId),

    #[error("Route result is not a {expected}")]
    ResultTypeMismatch { expected: &'static str },

    #[error("Route was dropped before it could complete")]
    Abandoned,
}
