//! Bus configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Queue processing limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Stop draining the queue once `queue_budget_ms` has elapsed in a tick
    pub limit_queue_processing: bool,

    /// Per-tick drain budget in milliseconds. At least one queued event is
    /// always dispatched per tick, so a zero budget means "one per tick".
    pub queue_budget_ms: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            limit_queue_processing: false,
            queue_budget_ms: 0,
        }
    }
}

impl BusConfig {
    /// A limited configuration with the given per-tick budget
    pub fn budgeted(budget: Duration) -> Self {
        Self {
            limit_queue_processing: true,
            queue_budget_ms: budget.as_millis() as u64,
        }
    }

    /// The per-tick budget, `None` when unlimited
    pub fn budget(&self) -> Option<Duration> {
        self.limit_queue_processing
            .then(|| Duration::from_millis(self.queue_budget_ms))
    }
}
