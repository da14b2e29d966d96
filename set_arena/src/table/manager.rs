//! Game manager for spawning and stopping the actors of one game.

use super::{
    config::GameConfig,
    dealer::{DealerActor, DealerHandle},
    errors::{TableError, TableResult},
    events::{EventBus, TableEvent},
    messages::Scoreboard,
    player::{PlayerActor, PlayerHandle},
};
use crate::bot::{BotDriver, BotPacing, RandomKeyPresser};
use crate::game::{
    board::Board,
    deck::Deck,
    entities::{PlayerId, SlotIndex},
    rules::SetValidator,
};
use rand::{SeedableRng, rngs::StdRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::{
    sync::mpsc,
    task::{AbortHandle, JoinHandle},
};
use tokio_util::sync::CancellationToken;

/// Owns every task of a running game
pub struct GameManager {
    /// Shared board
    board: Arc<Board>,

    /// Presentation events
    events: EventBus,

    /// Dealer handle
    dealer: DealerHandle,

    /// Player handles, indexed by player id
    players: Vec<PlayerHandle>,

    /// Cancelled on shutdown and on game over
    shutdown: CancellationToken,

    dealer_task: JoinHandle<Scoreboard>,
    player_tasks: Vec<JoinHandle<u32>>,
    bot_tasks: Vec<JoinHandle<usize>>,
}

impl GameManager {
    /// Start a game with a freshly shuffled full deck
    pub fn start(config: GameConfig, rules: Arc<dyn SetValidator>) -> TableResult<Self> {
        Self::launch(config, rules, None, EventBus::new())
    }

    /// Start a game dealing from `deck` in order
    pub fn start_with_deck(
        config: GameConfig,
        rules: Arc<dyn SetValidator>,
        deck: Deck,
    ) -> TableResult<Self> {
        Self::launch(config, rules, Some(deck), EventBus::new())
    }

    /// Start a game publishing to an existing event bus
    ///
    /// Subscribe to `events` beforehand to observe the initial deal.
    /// Without a `deck`, a full deck is shuffled.
    pub fn launch(
        config: GameConfig,
        rules: Arc<dyn SetValidator>,
        deck: Option<Deck>,
        events: EventBus,
    ) -> TableResult<Self> {
        config.validate()?;

        let deck = match deck {
            Some(deck) => deck,
            None => {
                let mut rng = match config.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_os_rng(),
                };
                let mut deck = Deck::full(config.deck_size());
                deck.shuffle(&mut rng);
                deck
            }
        };

        let shutdown = CancellationToken::new();
        let board = Arc::new(Board::new(config.table_size, events.clone()));

        let (mut dealer, dealer_handle) = DealerActor::new(
            config.clone(),
            board.clone(),
            rules,
            deck,
            events.clone(),
            shutdown.clone(),
        );

        let mut players = Vec::with_capacity(config.players);
        let mut actors = Vec::with_capacity(config.players);
        for id in 0..config.players {
            let (actor, handle, notices) = PlayerActor::new(
                id,
                &config,
                board.clone(),
                dealer_handle.clone(),
                events.clone(),
                shutdown.clone(),
            );
            dealer.add_player(id, notices);
            players.push(handle);
            actors.push(actor);
        }

        let dealer_task = tokio::spawn(dealer.run());
        let player_tasks = actors
            .into_iter()
            .map(|actor| tokio::spawn(actor.run()))
            .collect();

        let pacing = BotPacing::from_config(&config);
        let bot_tasks = players
            .iter()
            .filter(|handle| !handle.is_human())
            .map(|handle| {
                let seed = config
                    .seed
                    .map(|seed| seed.wrapping_add(handle.id() as u64 + 1));
                let source = RandomKeyPresser::new(config.table_size, pacing, seed);
                tokio::spawn(BotDriver::new(handle.clone(), source, shutdown.clone()).run())
            })
            .collect::<Vec<_>>();

        log::info!(
            "Started game: {} players ({} human, {} bots), {} slots, {} event subscriber(s)",
            config.players,
            config.human_players,
            bot_tasks.len(),
            config.table_size,
            events.subscriber_count()
        );

        Ok(Self {
            board,
            events,
            dealer: dealer_handle,
            players,
            shutdown,
            dealer_task,
            player_tasks,
            bot_tasks,
        })
    }

    pub fn players(&self) -> &[PlayerHandle] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> TableResult<&PlayerHandle> {
        self.players.get(id).ok_or(TableError::UnknownPlayer(id))
    }

    /// Route a human key press to a player
    ///
    /// # Returns
    ///
    /// * `TableResult<bool>` - Whether the player accepted the press
    pub fn submit_input(&self, player: PlayerId, slot: SlotIndex) -> TableResult<bool> {
        Ok(self.player(player)?.submit_input(slot))
    }

    pub fn dealer(&self) -> &DealerHandle {
        &self.dealer
    }

    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }

    /// Receive presentation events from now on
    pub fn subscribe(&self, capacity: usize) -> mpsc::Receiver<TableEvent> {
        self.events.subscribe(capacity)
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Whether the game ended or shutdown was requested
    pub fn is_finished(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Wait until the game ends or shutdown is requested
    pub async fn wait_finished(&self) {
        self.shutdown.cancelled().await;
    }

    /// Current scores
    pub async fn scores(&self) -> TableResult<Scoreboard> {
        self.dealer.scores().await
    }

    /// Stop every actor and wait for them within `grace`
    ///
    /// # Returns
    ///
    /// * `TableResult<Scoreboard>` - Final scores from the dealer
    pub async fn shutdown(self, grace: Duration) -> TableResult<Scoreboard> {
        log::info!("Shutting down game");
        self.shutdown.cancel();

        let aborts: Vec<AbortHandle> = self
            .bot_tasks
            .iter()
            .map(|task| task.abort_handle())
            .chain(self.player_tasks.iter().map(|task| task.abort_handle()))
            .chain(std::iter::once(self.dealer_task.abort_handle()))
            .collect();

        let joined = tokio::time::timeout(grace, async move {
            for task in self.bot_tasks {
                task.await.map_err(task_failed)?;
            }
            for task in self.player_tasks {
                task.await.map_err(task_failed)?;
            }
            self.dealer_task.await.map_err(task_failed)
        })
        .await;

        match joined {
            Ok(scores) => {
                let scores = scores?;
                log::info!("Game shut down with scores {:?}", scores);
                Ok(scores)
            }
            Err(_) => {
                log::error!("Shutdown did not complete within {:?}, aborting tasks", grace);
                for abort in aborts {
                    abort.abort();
                }
                Err(TableError::ShutdownTimeout(grace))
            }
        }
    }
}

fn task_failed(e: tokio::task::JoinError) -> TableError {
    TableError::TaskFailed(e.to_string())
}
