//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use set_arena::table::{ClaimOrdering, GameConfig, TableError};
use std::time::Duration;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Game rules and timing
    pub game: GameConfig,
    /// Capacity of the event log subscription
    pub event_buffer: usize,
    /// How long shutdown may take before tasks are aborted
    pub shutdown_grace_ms: u64,
}

/// Values given on the command line, taking priority over the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub players: Option<usize>,
    pub humans: Option<usize>,
    pub seed: Option<u64>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `overrides` - Values from CLI args
    ///
    /// # Returns
    ///
    /// * `Result<ServerConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if a variable that cannot fall back to a default is invalid
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let defaults = GameConfig::default();

        let claim_ordering = match std::env::var("SA_CLAIM_ORDERING") {
            Ok(value) => value.parse().map_err(|reason| ConfigError::Invalid {
                var: "SA_CLAIM_ORDERING".to_string(),
                reason,
            })?,
            Err(_) => ClaimOrdering::default(),
        };

        // "off" disables the reshuffle timer
        let reshuffle_interval_ms = match std::env::var("SA_RESHUFFLE_INTERVAL_MS") {
            Ok(value) if value.eq_ignore_ascii_case("off") => None,
            Ok(value) => Some(value.parse().map_err(|_| ConfigError::Invalid {
                var: "SA_RESHUFFLE_INTERVAL_MS".to_string(),
                reason: format!("Expected milliseconds or 'off', got '{}'", value),
            })?),
            Err(_) => defaults.reshuffle_interval_ms,
        };

        let seed = overrides
            .seed
            .or_else(|| std::env::var("SA_SEED").ok().and_then(|v| v.parse().ok()));

        let game = GameConfig {
            table_size: parse_env_or("SA_TABLE_SIZE", defaults.table_size),
            players: overrides
                .players
                .unwrap_or_else(|| parse_env_or("SA_PLAYERS", defaults.players)),
            human_players: overrides
                .humans
                .unwrap_or_else(|| parse_env_or("SA_HUMAN_PLAYERS", defaults.human_players)),
            point_freeze_ms: parse_env_or("SA_POINT_FREEZE_MS", defaults.point_freeze_ms),
            penalty_freeze_ms: parse_env_or("SA_PENALTY_FREEZE_MS", defaults.penalty_freeze_ms),
            reshuffle_interval_ms,
            reshuffle_warning_ms: parse_env_or(
                "SA_RESHUFFLE_WARNING_MS",
                defaults.reshuffle_warning_ms,
            ),
            claim_ordering,
            feature_count: parse_env_or("SA_FEATURE_COUNT", defaults.feature_count),
            hints: parse_env_or("SA_HINTS", defaults.hints),
            bot_think_time_ms: parse_env_or("SA_BOT_THINK_TIME_MS", defaults.bot_think_time_ms),
            bot_think_time_variance_ms: parse_env_or(
                "SA_BOT_THINK_TIME_VARIANCE_MS",
                defaults.bot_think_time_variance_ms,
            ),
            seed,
        };

        Ok(ServerConfig {
            game,
            event_buffer: parse_env_or("SA_EVENT_BUFFER", 256),
            shutdown_grace_ms: parse_env_or("SA_SHUTDOWN_GRACE_MS", 5_000),
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game.validate()?;

        if self.event_buffer == 0 {
            return Err(ConfigError::Invalid {
                var: "SA_EVENT_BUFFER".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error(transparent)]
    Game(#[from] TableError),
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
