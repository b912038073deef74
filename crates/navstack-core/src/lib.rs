//! navstack Core
//!
//! Application-level entry point: configuration, logging and the
//! `Navigation` container that owns the coordinator for one application.

mod config;
mod error;
mod navigation;

pub use config::{Config, Platform};
pub use error::CoreError;
pub use navigation::Navigation;

// Re-export the navigation building blocks
pub use navstack_history::{
    ActivityLedger, HistoryApi, HistoryMutation, HistoryState, LedgerEntry, MemoryHistory,
    NavigatorId, PopStateEvent,
};
pub use navstack_navigator::{
    BridgeOutcome, Coordinator, HistoryBridge, Navigator, NavigatorError, Presentation,
    RouteFuture, RouteKey, StackSnapshot,
};
pub use navstack_queue::{DrainOrder, TaskQueue};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if fmt().with_env_filter(filter).with_target(true).try_init().is_err() {
        tracing::debug!("Logging already initialized");
    }
}
