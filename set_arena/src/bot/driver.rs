//! Feeds an [`InputSource`] into a player while the player accepts input.

use super::input::InputSource;
use crate::table::player::PlayerHandle;
use tokio_util::sync::CancellationToken;

/// Drives one player from an input source until shutdown
pub struct BotDriver<S> {
    handle: PlayerHandle,
    source: S,
    shutdown: CancellationToken,
}

impl<S: InputSource> BotDriver<S> {
    pub fn new(handle: PlayerHandle, source: S, shutdown: CancellationToken) -> Self {
        Self {
            handle,
            source,
            shutdown,
        }
    }

    /// Run until shutdown, the player stops, or the source is exhausted
    ///
    /// # Returns
    ///
    /// * `usize` - Number of presses the player accepted
    pub async fn run(mut self) -> usize {
        let player = self.handle.id();
        let mut accepted = 0;

        loop {
            // Presses made while frozen would be dropped anyway
            let mut status = self.handle.watch();
            let ready = async {
                status
                    .wait_for(|s| s.disposition.accepts_input())
                    .await
                    .is_ok()
            };
            let ready = tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => false,

                ready = ready => ready,
            };
            if !ready {
                break;
            }

            let slot = tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => None,

                slot = self.source.next_slot() => slot,
            };
            let Some(slot) = slot else {
                break;
            };

            if self.handle.submit_input(slot) {
                accepted += 1;
            } else {
                log::trace!("Bot for player {} dropped press on {}", player, slot);
            }
        }

        log::debug!("Bot for player {} stopped after {} presses", player, accepted);
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::input::ScriptedInput;
    use crate::game::{board::Board, entities::Card};
    use crate::table::{
        config::GameConfig, dealer::DealerHandle, events::EventBus, player::PlayerActor,
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_driver_feeds_script_to_player() {
        let config = GameConfig {
            table_size: 4,
            ..GameConfig::default()
        };
        let events = EventBus::new();
        let board = Arc::new(Board::new(4, events.clone()));
        for slot in 0..4 {
            board.place_card(slot, Card(slot as u16));
        }
        let (sender, _dealer_inbox) = mpsc::channel(4);
        let shutdown = CancellationToken::new();
        let (actor, handle, _notices) = PlayerActor::new(
            0,
            &config,
            board.clone(),
            DealerHandle::new(sender),
            events,
            shutdown.clone(),
        );
        tokio::spawn(actor.run());

        let script = ScriptedInput::new([3, 1]).with_delay(Duration::from_millis(5));
        let driver = BotDriver::new(handle.clone(), script, shutdown.clone());
        let accepted = timeout(Duration::from_secs(5), driver.run())
            .await
            .unwrap();

        assert_eq!(accepted, 2);
        let mut status = handle.watch();
        timeout(
            Duration::from_secs(5),
            status.wait_for(|s| s.tokens == vec![1, 3]),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(board.tokens_of(0), vec![1, 3]);
        shutdown.cancel();
    }

    #[tokio::test]
    async fn test_driver_stops_on_shutdown() {
        let config = GameConfig::default();
        let events = EventBus::new();
        let board = Arc::new(Board::new(config.table_size, events.clone()));
        let (sender, _dealer_inbox) = mpsc::channel(4);
        let shutdown = CancellationToken::new();
        let (actor, handle, _notices) = PlayerActor::new(
            0,
            &config,
            board,
            DealerHandle::new(sender),
            events,
            shutdown.clone(),
        );
        tokio::spawn(actor.run());

        let script = ScriptedInput::new([0; 1000]).with_delay(Duration::from_secs(60));
        let driver = tokio::spawn(BotDriver::new(handle, script, shutdown.clone()).run());

        shutdown.cancel();
        let accepted = timeout(Duration::from_secs(5), driver)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(accepted, 0);
    }
}
