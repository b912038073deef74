//! Serializing task queue
//!
//! ```text
//! execute(X)  ──▶ idle? ── yes ──▶ busy, sleep(delay), run X ──▶ backlog empty? ── yes ──▶ idle
//!                  │                                                   │
//!                  no ──▶ backlog.push(X)                              no ──▶ schedule next
//! ```

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

use crate::error::QueueError;
use crate::Result;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Order in which the backlog is drained once the in-flight action fires
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrainOrder {
    /// Oldest queued action runs next
    #[default]
    Fifo,
    /// Most recently queued action runs next
    Lifo,
}

impl DrainOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrainOrder::Fifo => "fifo",
            DrainOrder::Lifo => "lifo",
        }
    }
}

impl std::fmt::Display for DrainOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DrainOrder {
    type Err = QueueError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fifo" => Ok(DrainOrder::Fifo),
            "lifo" => Ok(DrainOrder::Lifo),
            _ => Err(QueueError::UnknownDrainOrder(s.to_string())),
        }
    }
}

#[derive(Default)]
struct QueueState {
    backlog: VecDeque<Task>,
    busy: bool,
}

struct QueueInner {
    delay: Duration,
    order: DrainOrder,
    runtime: Handle,
    state: Mutex<QueueState>,
}

/// Runs queued actions one at a time, each after `delay`
pub struct TaskQueue {
    inner: Arc<QueueInner>,
}

impl TaskQueue {
    /// Create a queue bound to the current tokio runtime
    pub fn new(delay: Duration, order: DrainOrder) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| QueueError::NoRuntime)?;
        Ok(Self::with_runtime(runtime, delay, order))
    }

    pub fn with_runtime(runtime: Handle, delay: Duration, order: DrainOrder) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                delay,
                order,
                runtime,
                state: Mutex::new(QueueState::default()),
            }),
        }
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }

    pub fn order(&self) -> DrainOrder {
        self.inner.order
    }

    /// True while an action is scheduled but has not yet fired
    pub fn is_busy(&self) -> bool {
        self.inner.state.lock().busy
    }

    /// Number of actions waiting behind the in-flight one
    pub fn backlog_len(&self) -> usize {
        self.inner.state.lock().backlog.len()
    }

    /// Queue an action. Returns immediately; the action runs after the
    /// in-flight one (if any) and the configured delay.
    pub fn execute<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut state = self.inner.state.lock();
            if state.busy {
                state.backlog.push_back(Box::new(action));
                tracing::trace!(backlog = state.backlog.len(), "Queued action behind in-flight one");
                return;
            }
            state.busy = true;
        }

        self.schedule(Box::new(action));
    }

    fn schedule(&self, task: Task) {
        let queue = self.clone();
        self.inner.runtime.spawn(async move {
            tokio::time::sleep(queue.inner.delay).await;

            // busy stays set while the action runs so that anything it
            // queues lands in the backlog instead of starting a second timer
            if catch_unwind(AssertUnwindSafe(task)).is_err() {
                tracing::error!("Queued action panicked, continuing with backlog");
            }

            let next = {
                let mut state = queue.inner.state.lock();
                let next = match queue.inner.order {
                    DrainOrder::Fifo => state.backlog.pop_front(),
                    DrainOrder::Lifo => state.backlog.pop_back(),
                };
                if next.is_none() {
                    state.busy = false;
                }
                next
            };

            if let Some(next) = next {
                queue.schedule(next);
            }
        });
    }
}

impl Clone for TaskQueue {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("delay", &self.inner.delay)
            .field("order", &self.inner.order)
            .field("busy", &self.is_busy())
            .field("backlog", &self.backlog_len())
            .finish()
    }
}
