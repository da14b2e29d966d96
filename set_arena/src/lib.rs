//! # Set Arena
//!
//! A real-time, multi-player implementation of the card game Set.
//!
//! Cards lie face up on a shared board. Every player, human or bot, places
//! up to three tokens on board slots; three tokens form a claim that a single
//! dealer judges against the current board. A valid set scores a point and
//! the claimed cards are replaced. An invalid one costs the player a freeze.
//!
//! ## Concurrency
//!
//! - The board is guarded per slot and touched by every actor
//! - The dealer adjudicates claims strictly one at a time and is the only
//!   actor that moves cards or changes scores
//! - Players block on the verdict of their own claim and nothing else
//! - One cancellation token stops everything, including players mid-claim
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, the shared board, the deck and set rules
//! - [`table`]: Dealer and player actors and the game manager
//! - [`bot`]: Simulated key presses for computer players
//!
//! ## Example
//!
//! ```
//! use set_arena::game::{Card, ClassicRules, SetValidator};
//!
//! let rules = ClassicRules::default();
//! assert!(rules.is_set(Card(0), Card(1), Card(2)));
//! assert!(!rules.is_set(Card(0), Card(1), Card(3)));
//! ```

/// Simulated players.
pub mod bot;

/// Cards, board, deck and rules.
pub mod game;
pub use game::{Board, Card, Claim, ClassicRules, Deck, PlayerId, SetValidator, SlotIndex, TokenSet};

/// Dealer and player actors.
pub mod table;
pub use table::{GameConfig, GameManager, TableError, TableEvent, TableResult, Verdict};
