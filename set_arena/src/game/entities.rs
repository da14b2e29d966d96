//! Core game entities: cards, tokens, claims and player dispositions.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::Instant;
use uuid::Uuid;

/// Player identifier, starting from 0.
pub type PlayerId = usize;

/// Index of a slot on the board.
pub type SlotIndex = usize;

/// Unique identifier of a submitted claim.
pub type ClaimId = Uuid;

/// Maximum number of tokens a player can hold at once (and the size of a set).
pub const MAX_TOKENS: usize = 3;

/// Opaque card identity.
///
/// The coordination core never looks inside a card; only a
/// [`SetValidator`](super::rules::SetValidator) interprets it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub u16);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bounded set of slots carrying one player's tokens.
///
/// Backed by a fixed array, so a fourth token cannot be represented.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TokenSet {
    slots: [Option<SlotIndex>; MAX_TOKENS],
}

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn is_full(&self) -> bool {
        self.len() == MAX_TOKENS
    }

    pub fn contains(&self, slot: SlotIndex) -> bool {
        self.slots.contains(&Some(slot))
    }

    /// Insert a slot. Returns false if it is already present or the set is full.
    pub fn insert(&mut self, slot: SlotIndex) -> bool {
        if self.contains(slot) {
            return false;
        }
        match self.slots.iter_mut().find(|entry| entry.is_none()) {
            Some(entry) => {
                *entry = Some(slot);
                true
            }
            None => false,
        }
    }

    /// Remove a slot. Returns false if it was absent.
    pub fn remove(&mut self, slot: SlotIndex) -> bool {
        match self.slots.iter_mut().find(|entry| **entry == Some(slot)) {
            Some(entry) => {
                *entry = None;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.slots = [None; MAX_TOKENS];
    }

    /// Keep only the slots for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(SlotIndex) -> bool,
    {
        for entry in &mut self.slots {
            if let Some(slot) = *entry
                && !keep(slot)
            {
                *entry = None;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        self.slots.iter().flatten().copied()
    }

    /// The three slots in ascending order, if the set is full.
    pub fn as_triple(&self) -> Option<[SlotIndex; MAX_TOKENS]> {
        let [Some(a), Some(b), Some(c)] = self.slots else {
            return None;
        };
        let mut triple = [a, b, c];
        triple.sort_unstable();
        Some(triple)
    }

    /// Slots in ascending order.
    pub fn to_sorted_vec(&self) -> Vec<SlotIndex> {
        let mut slots: Vec<_> = self.iter().collect();
        slots.sort_unstable();
        slots
    }
}

/// A player's assertion that three slots hold a matching set.
///
/// Only the board can build one, from a full [`TokenSet`] whose tokens were
/// all present at the same instant. It is consumed exactly once by the dealer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Claim {
    id: ClaimId,
    player: PlayerId,
    slots: [SlotIndex; MAX_TOKENS],
    cards: [Card; MAX_TOKENS],
}

impl Claim {
    pub(crate) fn new(
        player: PlayerId,
        slots: [SlotIndex; MAX_TOKENS],
        cards: [Card; MAX_TOKENS],
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            player,
            slots,
            cards,
        }
    }

    pub fn id(&self) -> ClaimId {
        self.id
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn slots(&self) -> &[SlotIndex; MAX_TOKENS] {
        &self.slots
    }

    /// Cards observed on [`Self::slots`] when the claim was formed.
    pub fn cards(&self) -> &[Card; MAX_TOKENS] {
        &self.cards
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "claim {} by player {} on slots {:?}",
            self.id, self.player, self.slots
        )
    }
}

/// Why a player is frozen.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FreezeKind {
    Point,
    Penalty,
}

impl fmt::Display for FreezeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreezeKind::Point => write!(f, "point"),
            FreezeKind::Penalty => write!(f, "penalty"),
        }
    }
}

/// Player state machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Disposition {
    /// No tokens placed
    Idle,
    /// One or two tokens placed
    Collecting,
    /// Claim submitted, blocked on the dealer
    AwaitingVerdict,
    /// Ignoring input until the deadline passes
    Frozen { kind: FreezeKind, until: Instant },
    Terminated,
}

impl Disposition {
    pub fn accepts_input(&self) -> bool {
        matches!(self, Disposition::Idle | Disposition::Collecting)
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self, Disposition::Frozen { .. })
    }

    /// Deadline of the current freeze, if any.
    pub fn frozen_until(&self) -> Option<Instant> {
        match self {
            Disposition::Frozen { until, .. } => Some(*until),
            _ => None,
        }
    }
}
