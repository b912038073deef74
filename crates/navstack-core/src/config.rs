//! Navigation configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use navstack_queue::DrainOrder;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Stacks only, no browser history
    #[default]
    Native,
    /// Stacks mirrored into browser history
    Web,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Native => "native",
            Platform::Web => "web",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "native" => Ok(Platform::Native),
            "web" => Ok(Platform::Web),
            _ => Err(CoreError::Config(format!("Unknown platform: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub platform: Platform,
    /// Pause between two history mutations
    pub queue_delay_ms: u64,
    /// Which queued history mutation runs next
    pub drain_order: DrainOrder,
}

impl Config {
    pub const DEFAULT_QUEUE_DELAY_MS: u64 = 100;

    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            queue_delay_ms: Self::DEFAULT_QUEUE_DELAY_MS,
            drain_order: DrainOrder::Fifo,
        }
    }

    pub fn web() -> Self {
        Self::new(Platform::Web)
    }

    pub fn queue_delay(&self) -> Duration {
        Duration::from_millis(self.queue_delay_ms)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CoreError::Config(format!("Invalid configuration JSON: {}", e)))
    }

    /// Defaults overridden by `NAVSTACK_PLATFORM`, `NAVSTACK_QUEUE_DELAY_MS`
    /// and `NAVSTACK_DRAIN_ORDER`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(platform) = lookup("NAVSTACK_PLATFORM") {
            config.platform = platform.parse()?;
        }

        if let Some(delay) = lookup("NAVSTACK_QUEUE_DELAY_MS") {
            config.queue_delay_ms = delay.trim().parse().map_err(|_| {
                CoreError::Config(format!("Invalid NAVSTACK_QUEUE_DELAY_MS: {}", delay))
            })?;
        }

        if let Some(order) = lookup("NAVSTACK_DRAIN_ORDER") {
            config.drain_order = order.parse()?;
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Platform::Native)
    }
}
