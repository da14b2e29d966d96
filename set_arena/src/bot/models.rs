//! Bot pacing models.

use crate::table::config::GameConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Minimum delay between two bot key presses
pub const MIN_THINK_TIME_MS: u64 = 1;

/// How fast a bot presses keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotPacing {
    /// Average thinking time in milliseconds (base)
    pub base_think_time_ms: u64,

    /// Random variance in thinking time (±milliseconds)
    pub think_time_variance_ms: u64,
}

impl Default for BotPacing {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

impl BotPacing {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            base_think_time_ms: config.bot_think_time_ms,
            think_time_variance_ms: config.bot_think_time_variance_ms,
        }
    }

    /// Get thinking delay (with randomization)
    pub fn think_time<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let variance = rng.random_range(0..=self.think_time_variance_ms) as i64;
        let sign = if rng.random_bool(0.5) { 1 } else { -1 };

        let delay = self.base_think_time_ms as i64 + variance * sign;
        Duration::from_millis(delay.max(MIN_THINK_TIME_MS as i64) as u64)
    }
}
