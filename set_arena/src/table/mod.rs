//! Table module running one game as a set of async actors.
//!
//! This module implements:
//! - DealerActor: the only writer of cards and scores, adjudicates claims one at a time
//! - PlayerActor: collects up to three tokens from input and submits claims
//! - GameManager: spawns the actors and bots and shuts them all down
//! - EventBus: non-blocking notifications for the presentation layer
//!
//! ## Architecture
//!
//! Every actor runs in its own Tokio task. Players talk to the dealer over an
//! mpsc inbox and wait for the verdict on a oneshot channel; the dealer sends
//! notices back without ever waiting on a player. The board itself is shared
//! and guarded per slot, so token placement never goes through the dealer.
//!
//! ## Example
//!
//! ```no_run
//! use set_arena::game::ClassicRules;
//! use set_arena::table::{GameConfig, GameManager};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = GameConfig::default();
//!     let manager = GameManager::start(config, Arc::new(ClassicRules::default())).unwrap();
//!
//!     manager.wait_finished().await;
//!     let scores = manager.shutdown(Duration::from_secs(5)).await.unwrap();
//!     println!("{:?}", scores);
//! }
//! ```

pub mod config;
pub mod dealer;
pub mod errors;
pub mod events;
pub mod manager;
pub mod messages;
pub mod player;

pub use config::{ClaimOrdering, GameConfig};
pub use dealer::{DealerActor, DealerHandle};
pub use errors::{TableError, TableResult};
pub use events::{EventBus, TableEvent};
pub use manager::GameManager;
pub use messages::{DealerMessage, NeutralReason, PlayerNotice, Scoreboard, Verdict};
pub use player::{PlayerActor, PlayerHandle, PlayerStatus};
