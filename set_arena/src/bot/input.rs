//! Key press sources for bot-driven players.

use super::models::BotPacing;
use crate::game::entities::SlotIndex;
use async_trait::async_trait;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::VecDeque;
use std::time::Duration;

/// Produces slot selections for a player
#[async_trait]
pub trait InputSource: Send {
    /// Wait for the next slot selection; `None` ends the source
    async fn next_slot(&mut self) -> Option<SlotIndex>;
}

/// Presses uniformly random slots at a human-like pace
pub struct RandomKeyPresser {
    table_size: usize,
    pacing: BotPacing,
    rng: StdRng,
}

impl RandomKeyPresser {
    pub fn new(table_size: usize, pacing: BotPacing, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            table_size,
            pacing,
            rng,
        }
    }
}

#[async_trait]
impl InputSource for RandomKeyPresser {
    async fn next_slot(&mut self) -> Option<SlotIndex> {
        if self.table_size == 0 {
            return None;
        }
        let delay = self.pacing.think_time(&mut self.rng);
        tokio::time::sleep(delay).await;
        Some(self.rng.random_range(0..self.table_size))
    }
}

/// Replays a fixed sequence of slots
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    slots: VecDeque<SlotIndex>,
    delay: Duration,
}

impl ScriptedInput {
    pub fn new(slots: impl IntoIterator<Item = SlotIndex>) -> Self {
        Self {
            slots: slots.into_iter().collect(),
            delay: Duration::ZERO,
        }
    }

    /// Pause before each press
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn next_slot(&mut self) -> Option<SlotIndex> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.slots.pop_front()
    }
}
