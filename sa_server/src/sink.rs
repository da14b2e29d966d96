//! Presentation sink writing table events to the log as JSON.

use set_arena::TableEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Log level for an event; board traffic is noisy
fn level(event: &TableEvent) -> log::Level {
    match event {
        TableEvent::CardPlaced { .. }
        | TableEvent::CardRemoved { .. }
        | TableEvent::TokenPlaced { .. }
        | TableEvent::TokenRemoved { .. }
        | TableEvent::Freeze { .. } => log::Level::Debug,
        TableEvent::Countdown { warn: false, .. } => log::Level::Trace,
        TableEvent::Countdown { warn: true, .. }
        | TableEvent::Score { .. }
        | TableEvent::ClaimJudged { .. }
        | TableEvent::Reshuffled { .. }
        | TableEvent::GameOver { .. } => log::Level::Info,
    }
}

fn write(event: &TableEvent) {
    match serde_json::to_string(event) {
        Ok(json) => log::log!(level(event), "{}", json),
        Err(e) => log::warn!("Failed to serialize event {:?}: {}", event, e),
    }
}

/// Log events until the bus closes or shutdown, then drain what is buffered
///
/// # Returns
///
/// * `usize` - Number of events written
pub async fn run_event_log(
    mut events: mpsc::Receiver<TableEvent>,
    shutdown: CancellationToken,
) -> usize {
    let mut written = 0;

    loop {
        tokio::select! {
            biased;

            event = events.recv() => match event {
                Some(event) => {
                    write(&event);
                    written += 1;
                }
                None => return written,
            },

            _ = shutdown.cancelled() => break,
        }
    }

    while let Ok(event) = events.try_recv() {
        write(&event);
        written += 1;
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use set_arena::table::{EventBus, Verdict};

    #[test]
    fn test_levels() {
        assert_eq!(
            level(&TableEvent::TokenPlaced { player: 0, slot: 1 }),
            log::Level::Debug
        );
        assert_eq!(
            level(&TableEvent::Countdown {
                remaining_ms: 900,
                warn: true
            }),
            log::Level::Info
        );
        assert_eq!(
            level(&TableEvent::ClaimJudged {
                player: 0,
                verdict: Verdict::Point
            }),
            log::Level::Info
        );
    }

    #[tokio::test]
    async fn test_drains_buffered_events_on_shutdown() {
        let bus = EventBus::new();
        let events = bus.subscribe(8);
        bus.publish(TableEvent::Score {
            player: 0,
            score: 1,
        });
        bus.publish(TableEvent::TokenRemoved { player: 0, slot: 2 });

        let shutdown = CancellationToken::new();
        shutdown.cancel();

        assert_eq!(run_event_log(events, shutdown).await, 2);
    }

    #[tokio::test]
    async fn test_stops_when_bus_dropped() {
        let bus = EventBus::new();
        let events = bus.subscribe(8);
        bus.publish(TableEvent::Reshuffled {
            cards_on_board: 12,
            cards_in_deck: 69,
        });
        drop(bus);

        assert_eq!(run_event_log(events, CancellationToken::new()).await, 1);
    }
}
