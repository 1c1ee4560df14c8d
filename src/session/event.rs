use serde::Serialize;

use crate::error::domain_error::DomainError;
use crate::oracle::Mode;
use crate::player::{PlayerId, PlayerView};

/// One-way notification from a session, in the order the session produced it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "type")]
pub enum SessionEvent {
    PlayerJoined {
        player: PlayerView,
        players: usize,
        capacity: usize,
    },
    ModeSelected {
        mode: Mode,
    },
    CountdownStarted {
        seconds: u64,
    },
    CountdownTick {
        remaining_seconds: u64,
    },
    CountdownPaused,
    TurnStarted {
        player: PlayerView,
        prompt: String,
        mode: Mode,
        deadline_seconds: u64,
        turn: u32,
    },
    AnswerAccepted {
        player: PlayerView,
        word: String,
    },
    AnswerRejected {
        player: PlayerView,
        word: String,
        reason: Rejection,
    },
    PlayerEliminated {
        player: PlayerView,
    },
    Winner {
        player: PlayerView,
    },
    /// `by` is empty when the session was shut down from outside, e.g. by a registry reset.
    Cancelled {
        by: Option<PlayerId>,
    },
    Refused {
        player: Option<PlayerId>,
        error: DomainError,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rejection {
    AlreadyUsed,
    WrongAnswer,
}
