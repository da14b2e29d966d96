//! Fire-and-forget notifications for the presentation layer.

use super::messages::{Scoreboard, Verdict};
use crate::game::entities::{Card, PlayerId, SlotIndex};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;

/// State change observed by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableEvent {
    CardPlaced {
        slot: SlotIndex,
        card: Card,
    },
    CardRemoved {
        slot: SlotIndex,
        card: Card,
    },
    TokenPlaced {
        player: PlayerId,
        slot: SlotIndex,
    },
    TokenRemoved {
        player: PlayerId,
        slot: SlotIndex,
    },
    /// Remaining freeze time, published once per second and once with 0 at the end
    Freeze {
        player: PlayerId,
        remaining_ms: u64,
    },
    Score {
        player: PlayerId,
        score: u32,
    },
    ClaimJudged {
        player: PlayerId,
        verdict: Verdict,
    },
    /// Time left until the next reshuffle
    Countdown {
        remaining_ms: u64,
        warn: bool,
    },
    Reshuffled {
        cards_on_board: usize,
        cards_in_deck: usize,
    },
    GameOver {
        winners: Vec<PlayerId>,
        scores: Scoreboard,
    },
}

/// Broadcasts [`TableEvent`]s to subscribers without ever blocking.
///
/// Full subscribers miss the event; closed subscribers are dropped.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<TableEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber with a bounded buffer of `capacity` events.
    pub fn subscribe(&self, capacity: usize) -> mpsc::Receiver<TableEvent> {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        self.subscribers.lock().push(sender);
        receiver
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn publish(&self, event: TableEvent) {
        self.subscribers
            .lock()
            .retain(|sender| match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("Event subscriber full, dropping {:?}", event);
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Event subscriber disconnected, removing");
                    false
                }
            });
    }
}
