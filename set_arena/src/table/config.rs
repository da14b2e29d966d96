//! Game configuration models.

use super::errors::{TableError, TableResult};
use crate::game::rules::{DEFAULT_FEATURE_COUNT, MAX_FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Order in which the dealer adjudicates claims that are waiting at the same time.
///
/// Claims are always adjudicated one at a time; the policy only decides
/// which waiting claim goes next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimOrdering {
    /// Arrival order
    #[default]
    Fifo,
    /// Random order within each batch of waiting claims
    Shuffled,
}

impl std::fmt::Display for ClaimOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimOrdering::Fifo => write!(f, "fifo"),
            ClaimOrdering::Shuffled => write!(f, "shuffled"),
        }
    }
}

impl std::str::FromStr for ClaimOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fifo" => Ok(ClaimOrdering::Fifo),
            "shuffled" => Ok(ClaimOrdering::Shuffled),
            other => Err(format!("unknown claim ordering '{}'", other)),
        }
    }
}

/// Game configuration, read once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of board slots (default: 12)
    pub table_size: usize,

    /// Total number of players (default: 2)
    pub players: usize,

    /// How many of the players are driven by a human; the rest are bots
    pub human_players: usize,

    /// Freeze after an accepted claim
    pub point_freeze_ms: u64,

    /// Freeze after a rejected claim
    pub penalty_freeze_ms: u64,

    /// Time between forced reshuffles; `None` disables the timer
    pub reshuffle_interval_ms: Option<u64>,

    /// Countdown events are flagged as warnings below this many milliseconds
    pub reshuffle_warning_ms: u64,

    /// Claim adjudication order
    pub claim_ordering: ClaimOrdering,

    /// Card features for the classic rules; the deck holds 3^n cards
    pub feature_count: u32,

    /// Log the sets available on the board after every deal
    pub hints: bool,

    /// Average bot delay between key presses
    pub bot_think_time_ms: u64,

    /// Random variance in bot delay (±milliseconds)
    pub bot_think_time_variance_ms: u64,

    /// Seed for shuffling and bots; random when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            table_size: 12,
            players: 2,
            human_players: 0,
            point_freeze_ms: 1_000,
            penalty_freeze_ms: 3_000,
            reshuffle_interval_ms: Some(60_000),
            reshuffle_warning_ms: 5_000,
            claim_ordering: ClaimOrdering::Fifo,
            feature_count: DEFAULT_FEATURE_COUNT,
            hints: false,
            bot_think_time_ms: 50,
            bot_think_time_variance_ms: 25,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Validate configuration
    pub fn validate(&self) -> TableResult<()> {
        if self.table_size == 0 {
            return Err(invalid("table_size", "Must be greater than 0"));
        }

        if self.feature_count == 0 || self.feature_count > MAX_FEATURE_COUNT {
            return Err(invalid(
                "feature_count",
                format!("Must be between 1 and {}", MAX_FEATURE_COUNT),
            ));
        }

        if self.table_size > self.deck_size() {
            return Err(invalid(
                "table_size",
                format!("Cannot exceed deck size ({})", self.deck_size()),
            ));
        }

        if self.players == 0 {
            return Err(invalid("players", "Must be at least 1"));
        }

        if self.human_players > self.players {
            return Err(invalid(
                "human_players",
                format!("Cannot exceed players ({})", self.players),
            ));
        }

        if self.reshuffle_interval_ms == Some(0) {
            return Err(invalid(
                "reshuffle_interval_ms",
                "Must be greater than 0, or absent to disable reshuffling",
            ));
        }

        Ok(())
    }

    /// Number of cards in a full deck
    pub fn deck_size(&self) -> usize {
        3usize.pow(self.feature_count.min(MAX_FEATURE_COUNT))
    }

    pub fn point_freeze(&self) -> Duration {
        Duration::from_millis(self.point_freeze_ms)
    }

    pub fn penalty_freeze(&self) -> Duration {
        Duration::from_millis(self.penalty_freeze_ms)
    }

    pub fn reshuffle_interval(&self) -> Option<Duration> {
        self.reshuffle_interval_ms.map(Duration::from_millis)
    }

    pub fn reshuffle_warning(&self) -> Duration {
        Duration::from_millis(self.reshuffle_warning_ms)
    }

    /// Whether `player` takes input from a human rather than a bot
    pub fn is_human(&self, player: usize) -> bool {
        player < self.human_players
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TableError {
    TableError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}
