//! Line-based stdin commands for human players.
//!
//! Each line is one command:
//!
//! - `<slot>` presses a slot for the first human player
//! - `<player> <slot>` presses a slot for a given human player
//! - `scores` logs the current scores
//! - `reshuffle` forces a reshuffle
//! - `quit` stops the game

use set_arena::table::{DealerHandle, PlayerHandle};
use set_arena::{PlayerId, SlotIndex};
use std::io::BufRead;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Press { player: PlayerId, slot: SlotIndex },
    Scores,
    Reshuffle,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty command")]
    Empty,

    #[error("Not a number: '{0}'")]
    NotANumber(String),

    #[error("Player {player} is not a human player (0..{humans})")]
    NotHuman { player: PlayerId, humans: usize },

    #[error("Unknown command: '{0}'")]
    Unknown(String),
}

/// Parse one input line
pub fn parse_command(line: &str, humans: usize) -> Result<Command, ParseError> {
    let mut words = line.split_whitespace();
    let first = words.next().ok_or(ParseError::Empty)?;

    match first.to_lowercase().as_str() {
        "scores" => return Ok(Command::Scores),
        "reshuffle" => return Ok(Command::Reshuffle),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    let number = |word: &str| {
        word.parse::<usize>()
            .map_err(|_| ParseError::NotANumber(word.to_string()))
    };

    let (player, slot) = match (words.next(), words.next()) {
        (None, _) => (0, number(first)?),
        (Some(second), None) => (number(first)?, number(second)?),
        (Some(_), Some(_)) => return Err(ParseError::Unknown(line.trim().to_string())),
    };

    if player >= humans {
        return Err(ParseError::NotHuman { player, humans });
    }

    Ok(Command::Press { player, slot })
}

/// Read commands from stdin until EOF, `quit` or shutdown
pub async fn run_stdin(
    humans: Vec<PlayerHandle>,
    dealer: DealerHandle,
    shutdown: CancellationToken,
) {
    // A detached reader thread keeps a blocked read from holding up exit
    let (sender, mut lines) = mpsc::channel::<String>(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if sender.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
    });

    loop {
        let line = tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,

            line = lines.recv() => line,
        };

        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line, humans.len()) {
            Ok(Command::Press { player, slot }) => {
                if !humans[player].submit_input(slot) {
                    log::info!("Player {} ignored press on {}", player, slot);
                }
            }
            Ok(Command::Scores) => match dealer.scores().await {
                Ok(scores) => log::info!("Scores: {:?}", scores),
                Err(e) => log::warn!("{}", e),
            },
            Ok(Command::Reshuffle) => {
                if let Err(e) = dealer.reshuffle().await {
                    log::warn!("{}", e);
                }
            }
            Ok(Command::Quit) => {
                shutdown.cancel();
                break;
            }
            Err(e) => log::warn!("{}", e),
        }
    }

    log::debug!("Stdin input closed");
}
