pub mod actor;
pub mod actor_client;
pub mod leaderboard;
mod store;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::player::PlayerId;

pub use self::store::{JsonFileScoreStore, MemoryScoreStore};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreRecord {
    pub wins: u64,
    pub losses: u64,
}

/// Score update produced by a session when a game event settles a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreChange {
    Win(PlayerId),
    Loss(PlayerId),
}

impl ScoreChange {
    pub fn player(&self) -> PlayerId {
        match self {
            ScoreChange::Win(player) | ScoreChange::Loss(player) => *player,
        }
    }
}

/// Cumulative wins and losses per player.
///
/// The in-memory view is updated even when persisting fails, a failed write is retried with
/// the next one.
pub trait ScoreStore: Send {
    fn record_win(&mut self, player: PlayerId) -> Result<(), Error>;

    fn record_loss(&mut self, player: PlayerId) -> Result<(), Error>;

    fn get_all(&self) -> BTreeMap<PlayerId, ScoreRecord>;

    fn reset(&mut self) -> Result<(), Error>;

    fn apply(&mut self, change: ScoreChange) -> Result<(), Error> {
        match change {
            ScoreChange::Win(player) => self.record_win(player),
            ScoreChange::Loss(player) => self.record_loss(player),
        }
    }
}
