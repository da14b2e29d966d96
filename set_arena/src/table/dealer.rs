//! Dealer actor: the single serializer for claims, card replacement and reshuffles.

use super::{
    config::{ClaimOrdering, GameConfig},
    errors::{TableError, TableResult},
    events::{EventBus, TableEvent},
    messages::{DealerMessage, NeutralReason, PlayerNotice, Scoreboard, Verdict},
};
use crate::game::{
    board::{Board, ClearedSlot},
    deck::Deck,
    entities::{Claim, PlayerId, SlotIndex},
    rules::{SetValidator, find_sets},
};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot},
    time::{self, Duration, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

/// Dealer inbox capacity
const DEALER_INBOX_CAPACITY: usize = 64;

/// Interval between reshuffle countdown events
const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Dealer handle for sending messages
///
/// This is the coordination channel: [`DealerHandle::submit_claim`] returns
/// only once the dealer has fully processed the claim.
#[derive(Clone, Debug)]
pub struct DealerHandle {
    sender: mpsc::Sender<DealerMessage>,
}

impl DealerHandle {
    /// Create a new dealer handle
    pub fn new(sender: mpsc::Sender<DealerMessage>) -> Self {
        Self { sender }
    }

    /// Send a message to the dealer
    pub async fn send(&self, message: DealerMessage) -> TableResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| TableError::DealerClosed)
    }

    /// Submit a claim and wait for its verdict
    pub async fn submit_claim(&self, claim: Claim) -> TableResult<Verdict> {
        let claim_id = claim.id();
        let (response, verdict) = oneshot::channel();
        self.send(DealerMessage::Claim { claim, response }).await?;
        verdict
            .await
            .map_err(|_| TableError::VerdictDropped(claim_id))
    }

    /// Current scores
    pub async fn scores(&self) -> TableResult<Scoreboard> {
        let (response, scores) = oneshot::channel();
        self.send(DealerMessage::GetScores { response }).await?;
        scores.await.map_err(|_| TableError::DealerClosed)
    }

    /// Force a reshuffle and wait until the new board is dealt
    pub async fn reshuffle(&self) -> TableResult<()> {
        let (response, done) = oneshot::channel();
        self.send(DealerMessage::Reshuffle { response }).await?;
        done.await.map_err(|_| TableError::DealerClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Dealer actor owning the deck, the scores and all card movement
pub struct DealerActor {
    /// Game configuration
    config: GameConfig,

    /// Shared board
    board: Arc<Board>,

    /// Set predicate
    rules: Arc<dyn SetValidator>,

    /// Cards not on the board
    deck: Deck,

    /// Message inbox
    inbox: mpsc::Receiver<DealerMessage>,

    /// Messages taken from the inbox but not yet handled
    backlog: VecDeque<DealerMessage>,

    /// Notice channels for every player
    players: HashMap<PlayerId, mpsc::Sender<PlayerNotice>>,

    /// Authoritative scores
    scores: Scoreboard,

    /// Shuffling and claim ordering randomness
    rng: StdRng,

    /// Presentation events
    events: EventBus,

    /// Global shutdown signal
    shutdown: CancellationToken,

    /// Next forced reshuffle
    reshuffle_at: Option<Instant>,

    /// No set remains on board and deck
    finished: bool,
}

impl DealerActor {
    /// Create a new dealer actor
    ///
    /// # Returns
    ///
    /// * `(DealerActor, DealerHandle)` - Actor and handle for sending messages
    pub fn new(
        config: GameConfig,
        board: Arc<Board>,
        rules: Arc<dyn SetValidator>,
        deck: Deck,
        events: EventBus,
        shutdown: CancellationToken,
    ) -> (Self, DealerHandle) {
        let (sender, inbox) = mpsc::channel(DEALER_INBOX_CAPACITY);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let actor = Self {
            config,
            board,
            rules,
            deck,
            inbox,
            backlog: VecDeque::new(),
            players: HashMap::new(),
            scores: BTreeMap::new(),
            rng,
            events,
            shutdown,
            reshuffle_at: None,
            finished: false,
        };

        (actor, DealerHandle::new(sender))
    }

    /// Register a player's notice channel before the dealer starts
    pub fn add_player(&mut self, player: PlayerId, notices: mpsc::Sender<PlayerNotice>) {
        self.players.insert(player, notices);
        self.scores.entry(player).or_insert(0);
    }

    /// Run the dealer event loop until shutdown or game over
    ///
    /// # Returns
    ///
    /// * `Scoreboard` - Final scores
    pub async fn run(mut self) -> Scoreboard {
        log::info!(
            "Dealer starting: {} slots, {} cards, {} players, {} ordering",
            self.board.len(),
            self.deck.len(),
            self.players.len(),
            self.config.claim_ordering
        );

        self.deal_board();
        self.reset_reshuffle_deadline();

        let mut countdown = time::interval(COUNTDOWN_TICK);
        countdown.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !self.finished {
            if let Some(message) = self.backlog.pop_front() {
                self.handle_message(message);
                continue;
            }

            let reshuffle_at = self.reshuffle_at;
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => break,

                message = self.inbox.recv() => match message {
                    Some(message) => self.enqueue(message),
                    None => break,
                },

                _ = sleep_until_deadline(reshuffle_at) => self.reshuffle(),

                _ = countdown.tick() => self.publish_countdown(),
            }
        }

        self.terminate();
        log::info!("Dealer closed with scores {:?}", self.scores);
        self.scores
    }

    /// Move a received message, and under shuffled ordering every other
    /// waiting message, into the backlog
    fn enqueue(&mut self, message: DealerMessage) {
        self.backlog.push_back(message);
        if self.config.claim_ordering == ClaimOrdering::Shuffled {
            while let Ok(message) = self.inbox.try_recv() {
                self.backlog.push_back(message);
            }
            self.backlog.make_contiguous().shuffle(&mut self.rng);
        }
    }

    /// Handle a dealer message
    fn handle_message(&mut self, message: DealerMessage) {
        match message {
            DealerMessage::Claim { claim, response } => {
                let player = claim.player();
                let claim_id = claim.id();
                let verdict = self.adjudicate(&claim);
                log::debug!("Dealer: {} judged {}", claim, verdict);
                self.events
                    .publish(TableEvent::ClaimJudged { player, verdict });
                if response.send(verdict).is_err() {
                    log::debug!(
                        "Dealer: player {} stopped waiting for claim {}",
                        player,
                        claim_id
                    );
                }
            }

            DealerMessage::GetScores { response } => {
                let _ = response.send(self.scores.clone());
            }

            DealerMessage::Reshuffle { response } => {
                self.reshuffle();
                let _ = response.send(());
            }
        }
    }

    /// Re-validate a claim against the board and apply its consequences
    fn adjudicate(&mut self, claim: &Claim) -> Verdict {
        let player = claim.player();
        let Some(mut group) = self.board.lock_slots(claim.slots()) else {
            return Verdict::Neutral(NeutralReason::StaleBoard);
        };

        let still_valid = claim
            .slots()
            .iter()
            .zip(claim.cards())
            .all(|(&slot, &card)| group.card(slot) == Some(card) && group.has_token(player, slot));
        if !still_valid {
            return Verdict::Neutral(NeutralReason::StaleBoard);
        }

        let [a, b, c] = *claim.cards();
        if !self.rules.is_set(a, b, c) {
            group.remove_tokens_of(player);
            return Verdict::Penalty;
        }

        let cleared = group.clear();
        drop(group);

        let score = self.scores.entry(player).or_insert(0);
        *score += 1;
        log::info!("Player {} scored, now at {}", player, score);

        self.notify_displaced(player, &cleared);
        self.refill(claim.slots());
        self.reset_reshuffle_deadline();
        self.check_game_over();

        Verdict::Point
    }

    /// Deal cards onto the given empty slots while the deck lasts
    fn refill(&mut self, slots: &[SlotIndex]) {
        for &slot in slots {
            let Some(card) = self.deck.deal() else {
                break;
            };
            if !self.board.place_card(slot, card) {
                self.deck.return_cards([card]);
            }
        }
        self.log_hints();
    }

    /// Fill every empty slot from the deck
    fn deal_board(&mut self) {
        let empty = self.board.empty_slots();
        self.refill(&empty);
    }

    /// Replace the whole board with a fresh arrangement
    fn reshuffle(&mut self) {
        let (cards, displaced) = self.board.take_all_cards();
        for (player, slots) in displaced {
            self.notify(player, slots);
        }

        self.deck.return_cards(cards);
        self.deck.shuffle(&mut self.rng);
        self.deal_board();

        log::info!(
            "Dealer reshuffled: {} cards on board, {} in deck",
            self.board.count_cards(),
            self.deck.len()
        );
        self.events.publish(TableEvent::Reshuffled {
            cards_on_board: self.board.count_cards(),
            cards_in_deck: self.deck.len(),
        });

        self.reset_reshuffle_deadline();
        self.check_game_over();
    }

    /// Tell every non-claimant whose tokens were on cleared slots
    fn notify_displaced(&mut self, claimant: PlayerId, cleared: &[ClearedSlot]) {
        let mut displaced: BTreeMap<PlayerId, Vec<SlotIndex>> = BTreeMap::new();
        for slot in cleared {
            for &player in slot.displaced.iter().filter(|&&p| p != claimant) {
                displaced.entry(player).or_default().push(slot.slot);
            }
        }
        for (player, slots) in displaced {
            self.notify(player, slots);
        }
    }

    /// Send a notice without blocking; players resync from the board anyway
    fn notify(&mut self, player: PlayerId, slots: Vec<SlotIndex>) {
        let Some(sender) = self.players.get(&player) else {
            return;
        };
        match sender.try_send(PlayerNotice::TokensCleared { slots }) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!("Player {} notice channel full, dropping notice", player);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                log::debug!("Player {} gone, removing notice channel", player);
                self.players.remove(&player);
            }
        }
    }

    fn reset_reshuffle_deadline(&mut self) {
        self.reshuffle_at = self
            .config
            .reshuffle_interval()
            .map(|interval| Instant::now() + interval);
    }

    fn publish_countdown(&self) {
        if let Some(deadline) = self.reshuffle_at {
            let remaining = deadline.saturating_duration_since(Instant::now());
            self.events.publish(TableEvent::Countdown {
                remaining_ms: remaining.as_millis() as u64,
                warn: remaining <= self.config.reshuffle_warning(),
            });
        }
    }

    fn log_hints(&self) {
        if self.config.hints {
            let sets = find_sets(self.rules.as_ref(), &self.board.cards(), usize::MAX);
            log::info!("Hint: {} set(s) on board: {:?}", sets.len(), sets);
        }
    }

    /// End the game once no set is left among board and deck cards
    fn check_game_over(&mut self) {
        let mut cards = self.board.cards();
        cards.extend(self.deck.iter());
        if !find_sets(self.rules.as_ref(), &cards, 1).is_empty() {
            return;
        }

        let best = self.scores.values().copied().max().unwrap_or(0);
        let winners: Vec<PlayerId> = self
            .scores
            .iter()
            .filter(|(_, score)| **score == best)
            .map(|(player, _)| *player)
            .collect();

        log::info!("Game over: no sets left, winners {:?}", winners);
        self.events.publish(TableEvent::GameOver {
            winners,
            scores: self.scores.clone(),
        });
        self.finished = true;
    }

    /// Stop accepting messages, release every waiting claimant and signal shutdown
    fn terminate(&mut self) {
        self.inbox.close();

        let mut pending: Vec<DealerMessage> = self.backlog.drain(..).collect();
        while let Ok(message) = self.inbox.try_recv() {
            pending.push(message);
        }

        let mut dismissed = 0;
        for message in pending {
            match message {
                DealerMessage::Claim { response, .. } => {
                    let _ = response.send(Verdict::Neutral(NeutralReason::ShuttingDown));
                    dismissed += 1;
                }
                DealerMessage::GetScores { response } => {
                    let _ = response.send(self.scores.clone());
                }
                DealerMessage::Reshuffle { .. } => {}
            }
        }
        if dismissed > 0 {
            log::debug!("Dealer dismissed {} pending claim(s) on shutdown", dismissed);
        }

        self.shutdown.cancel();
    }
}

/// Sleep until `deadline`, or forever when there is none
async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
