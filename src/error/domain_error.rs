use serde::Serialize;
use thiserror::Error;

use crate::oracle::Mode;
use crate::player::PlayerId;
use crate::session::ChatKey;

#[derive(Clone, Debug, Error, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "detail")]
pub enum DomainError {
    #[error("A session already exists for this chat. ChatKey: '{0}'.")]
    SessionAlreadyExists(ChatKey),
    #[error("There is no session for this chat. ChatKey: '{0}'.")]
    SessionDoesNotExist(ChatKey),
    #[error("The game has already started.")]
    AlreadyStarted,
    #[error("The player already joined the session. PlayerId: '{0}'.")]
    AlreadyJoined(PlayerId),
    #[error("The session is full. MaximumPlayers: '{0}'.")]
    SessionFull(usize),
    #[error("Not enough players to start the game. ActualPlayers: '{0}', MinimumPlayers: '{1}'.")]
    NotEnoughPlayers(usize, usize),
    #[error("The player is not allowed to do this. PlayerId: '{0}'.")]
    NotPermitted(PlayerId),
    #[error("A session accepts a single automated player.")]
    AutomatedPlayerLimit,
    #[error("The vocabulary is empty. Mode: '{0}'.")]
    VocabularyExhausted(Mode),
}
