//! Player actor: collects tokens from input and hands completed claims to the dealer.

use super::{
    config::GameConfig,
    dealer::DealerHandle,
    events::{EventBus, TableEvent},
    messages::{PlayerNotice, Verdict},
};
use crate::game::{
    board::Board,
    entities::{Disposition, FreezeKind, MAX_TOKENS, PlayerId, SlotIndex, TokenSet},
};
use std::sync::Arc;
use tokio::{
    sync::{mpsc, watch},
    time::{self, Duration, Instant},
};
use tokio_util::sync::CancellationToken;

/// Capacity of the pending input queue
pub const INPUT_QUEUE_CAPACITY: usize = MAX_TOKENS;

/// Capacity of the dealer notice queue
const NOTICE_CAPACITY: usize = 16;

/// Interval between freeze countdown events
const FREEZE_TICK: Duration = Duration::from_secs(1);

/// Externally visible player state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStatus {
    pub disposition: Disposition,
    pub score: u32,
    /// Slots carrying this player's tokens, ascending
    pub tokens: Vec<SlotIndex>,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        Self {
            disposition: Disposition::Idle,
            score: 0,
            tokens: Vec::new(),
        }
    }
}

/// Player handle used by input sources
#[derive(Clone, Debug)]
pub struct PlayerHandle {
    id: PlayerId,
    human: bool,
    inputs: mpsc::Sender<SlotIndex>,
    status: watch::Receiver<PlayerStatus>,
}

impl PlayerHandle {
    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn is_human(&self) -> bool {
        self.human
    }

    /// Queue a slot selection.
    ///
    /// The input is dropped, and false returned, when the player is frozen,
    /// waiting for a verdict, terminated, or already has a full queue.
    pub fn submit_input(&self, slot: SlotIndex) -> bool {
        if !self.status.borrow().disposition.accepts_input() {
            log::trace!("Player {} not accepting input, dropping {}", self.id, slot);
            return false;
        }
        self.inputs.try_send(slot).is_ok()
    }

    pub fn status(&self) -> PlayerStatus {
        self.status.borrow().clone()
    }

    pub fn score(&self) -> u32 {
        self.status.borrow().score
    }

    pub fn disposition(&self) -> Disposition {
        self.status.borrow().disposition
    }

    /// Subscribe to status changes
    pub fn watch(&self) -> watch::Receiver<PlayerStatus> {
        self.status.clone()
    }
}

enum Flow {
    Continue,
    Stop,
}

/// Player actor owning the player's token bookkeeping
pub struct PlayerActor {
    id: PlayerId,
    point_freeze: Duration,
    penalty_freeze: Duration,
    board: Arc<Board>,
    dealer: DealerHandle,
    inputs: mpsc::Receiver<SlotIndex>,
    notices: mpsc::Receiver<PlayerNotice>,
    tokens: TokenSet,
    score: u32,
    disposition: Disposition,
    status: watch::Sender<PlayerStatus>,
    events: EventBus,
    shutdown: CancellationToken,
}

impl PlayerActor {
    /// Create a new player actor
    ///
    /// # Returns
    ///
    /// * `(PlayerActor, PlayerHandle, mpsc::Sender<PlayerNotice>)` - Actor, input
    ///   handle, and the notice sender to register with the dealer
    pub fn new(
        id: PlayerId,
        config: &GameConfig,
        board: Arc<Board>,
        dealer: DealerHandle,
        events: EventBus,
        shutdown: CancellationToken,
    ) -> (Self, PlayerHandle, mpsc::Sender<PlayerNotice>) {
        let (input_sender, inputs) = mpsc::channel(INPUT_QUEUE_CAPACITY);
        let (notice_sender, notices) = mpsc::channel(NOTICE_CAPACITY);
        let (status, status_receiver) = watch::channel(PlayerStatus::default());

        let actor = Self {
            id,
            point_freeze: config.point_freeze(),
            penalty_freeze: config.penalty_freeze(),
            board,
            dealer,
            inputs,
            notices,
            tokens: TokenSet::new(),
            score: 0,
            disposition: Disposition::Idle,
            status,
            events,
            shutdown,
        };

        let handle = PlayerHandle {
            id,
            human: config.is_human(id),
            inputs: input_sender,
            status: status_receiver,
        };

        (actor, handle, notice_sender)
    }

    /// Run the player event loop until shutdown
    ///
    /// # Returns
    ///
    /// * `u32` - Final score
    pub async fn run(mut self) -> u32 {
        log::info!("Player {} starting", self.id);

        loop {
            let flow = tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => Flow::Stop,

                Some(notice) = self.notices.recv() => {
                    self.handle_notice(notice);
                    Flow::Continue
                }

                input = self.inputs.recv() => match input {
                    Some(slot) => self.handle_input(slot).await,
                    None => Flow::Stop,
                },
            };

            if let Flow::Stop = flow {
                break;
            }
        }

        self.set_disposition(Disposition::Terminated);
        log::info!("Player {} terminated with score {}", self.id, self.score);
        self.score
    }

    fn handle_notice(&mut self, notice: PlayerNotice) {
        match notice {
            PlayerNotice::TokensCleared { slots } => {
                // The slot may already hold a new card carrying a fresh token
                let (board, id) = (&self.board, self.id);
                self.tokens
                    .retain(|slot| !slots.contains(&slot) || board.has_token(id, slot));
                self.settle();
            }
        }
    }

    /// Toggle the token on `slot`, claiming once three are placed
    async fn handle_input(&mut self, slot: SlotIndex) -> Flow {
        if self.tokens.contains(slot) {
            // The dealer may already have removed it; local state follows either way
            self.board.remove_token(self.id, slot);
            self.tokens.remove(slot);
            self.settle();
            return Flow::Continue;
        }

        if self.board.place_token(self.id, slot) && !self.tokens.insert(slot) {
            // Local set full; keep the board consistent with it
            self.board.remove_token(self.id, slot);
        }
        self.settle();

        if self.tokens.is_full() {
            return self.claim().await;
        }
        Flow::Continue
    }

    /// Submit the current three tokens as a claim and apply the verdict
    async fn claim(&mut self) -> Flow {
        let Some(claim) = self.board.snapshot_claim(self.id, &self.tokens) else {
            self.resync_tokens();
            log::debug!(
                "Player {}: token vanished before claiming, still holding {:?}",
                self.id,
                self.tokens.to_sorted_vec()
            );
            return Flow::Continue;
        };

        log::debug!("Player {} submitting {}", self.id, claim);
        self.set_disposition(Disposition::AwaitingVerdict);

        let verdict = tokio::select! {
            biased;

            verdict = self.dealer.submit_claim(claim) => verdict,

            _ = self.shutdown.cancelled() => return Flow::Stop,
        };

        match verdict {
            Ok(verdict) => self.apply_verdict(verdict).await,
            Err(e) => {
                log::debug!("Player {}: {}", self.id, e);
                Flow::Stop
            }
        }
    }

    async fn apply_verdict(&mut self, verdict: Verdict) -> Flow {
        let Some(kind) = verdict.freeze_kind() else {
            log::debug!("Player {}: claim {}", self.id, verdict);
            self.discard_pending_inputs();
            self.resync_tokens();
            return Flow::Continue;
        };

        let duration = match kind {
            FreezeKind::Point => {
                self.tokens.clear();
                self.score += 1;
                self.events.publish(TableEvent::Score {
                    player: self.id,
                    score: self.score,
                });
                self.point_freeze
            }
            FreezeKind::Penalty => {
                self.drop_vanished_tokens();
                self.penalty_freeze
            }
        };
        self.freeze(kind, duration).await
    }

    /// Ignore input for `duration`, publishing the remaining time once per tick
    async fn freeze(&mut self, kind: FreezeKind, duration: Duration) -> Flow {
        let until = Instant::now() + duration;
        self.set_disposition(Disposition::Frozen { kind, until });
        self.discard_pending_inputs();

        loop {
            let remaining = until.saturating_duration_since(Instant::now());
            self.events.publish(TableEvent::Freeze {
                player: self.id,
                remaining_ms: remaining.as_millis() as u64,
            });
            if remaining.is_zero() {
                break;
            }

            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => return Flow::Stop,

                _ = time::sleep(remaining.min(FREEZE_TICK)) => {}
            }
        }

        self.discard_pending_inputs();
        self.resync_tokens();
        Flow::Continue
    }

    /// Drop inputs queued before the current verdict
    fn discard_pending_inputs(&mut self) {
        let mut dropped = 0;
        while self.inputs.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            log::trace!("Player {} discarded {} queued input(s)", self.id, dropped);
        }
    }

    /// Keep only the tokens the board still carries
    fn drop_vanished_tokens(&mut self) {
        let (board, id) = (&self.board, self.id);
        self.tokens.retain(|slot| board.has_token(id, slot));
    }

    fn resync_tokens(&mut self) {
        self.drop_vanished_tokens();
        self.settle();
    }

    /// Derive Idle/Collecting from the token set and publish
    fn settle(&mut self) {
        let disposition = if self.tokens.is_empty() {
            Disposition::Idle
        } else {
            Disposition::Collecting
        };
        self.set_disposition(disposition);
    }

    fn set_disposition(&mut self, disposition: Disposition) {
        self.disposition = disposition;
        self.status.send_replace(PlayerStatus {
            disposition,
            score: self.score,
            tokens: self.tokens.to_sorted_vec(),
        });
    }
}
