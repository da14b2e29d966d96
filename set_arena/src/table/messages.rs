//! Dealer and player actor message types.

use crate::game::entities::{Claim, FreezeKind, PlayerId, SlotIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tokio::sync::oneshot;

/// Final or current score per player
pub type Scoreboard = BTreeMap<PlayerId, u32>;

/// Messages that can be sent to the DealerActor
#[derive(Debug)]
pub enum DealerMessage {
    /// Adjudicate a claim; the verdict goes back to exactly the claimant
    Claim {
        claim: Claim,
        response: oneshot::Sender<Verdict>,
    },

    /// Get current scores
    GetScores {
        response: oneshot::Sender<Scoreboard>,
    },

    /// Force an immediate reshuffle
    Reshuffle { response: oneshot::Sender<()> },
}

/// Notices the dealer sends to players without waiting on them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerNotice {
    /// The player's tokens on these slots were removed by the dealer
    TokensCleared { slots: Vec<SlotIndex> },
}

/// Why a claim was neither rewarded nor penalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeutralReason {
    /// The board changed under the claim before it was adjudicated
    StaleBoard,
    /// The dealer is shutting down
    ShuttingDown,
}

/// Outcome of a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Point,
    Penalty,
    Neutral(NeutralReason),
}

impl Verdict {
    /// Freeze to apply to the claimant, if any.
    pub fn freeze_kind(&self) -> Option<FreezeKind> {
        match self {
            Verdict::Point => Some(FreezeKind::Point),
            Verdict::Penalty => Some(FreezeKind::Penalty),
            Verdict::Neutral(_) => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Point => write!(f, "point"),
            Verdict::Penalty => write!(f, "penalty"),
            Verdict::Neutral(NeutralReason::StaleBoard) => write!(f, "ignored (stale board)"),
            Verdict::Neutral(NeutralReason::ShuttingDown) => write!(f, "ignored (shutting down)"),
        }
    }
}
