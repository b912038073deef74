//! Navigator identity

use serde::{Deserialize, Serialize};

/// Identity of one navigator, unique for the lifetime of its coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigatorId(u64);

impl NavigatorId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NavigatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "nav-{}", self.0)
    }
}

impl From<u64> for NavigatorId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
