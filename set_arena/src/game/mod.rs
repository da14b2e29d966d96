//! Game model: cards, the shared board and set rules.
//!
//! This module provides:
//! - Entities shared by every actor (cards, token sets, claims, dispositions)
//! - The shared [`Board`] with per-slot locking
//! - The [`Deck`] draw pile
//! - Set validation through the [`SetValidator`] trait

pub mod board;
pub mod deck;
pub mod entities;
pub mod rules;

pub use board::{Board, ClearedSlot, SlotGroup};
pub use deck::Deck;
pub use entities::{
    Card, Claim, ClaimId, Disposition, FreezeKind, MAX_TOKENS, PlayerId, SlotIndex, TokenSet,
};
pub use rules::{ClassicRules, SetValidator, find_sets};
