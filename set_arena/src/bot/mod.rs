//! Bot module driving computer players with simulated key presses.
//!
//! This module implements:
//! - InputSource: anything that yields slot selections
//! - RandomKeyPresser: uniformly random presses with human-like pacing
//! - ScriptedInput: a fixed sequence, used for tests and replays
//! - BotDriver: feeds a source into a player while it accepts input
//!
//! Bots know nothing about sets. They press random slots and rely on the
//! dealer to reject bad claims, which makes them useful for load and
//! shutdown testing.

pub mod driver;
pub mod input;
pub mod models;

pub use driver::BotDriver;
pub use input::{InputSource, RandomKeyPresser, ScriptedInput};
pub use models::BotPacing;
