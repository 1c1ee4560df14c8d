use std::collections::BTreeMap;

use wordclash::error::Error;
use wordclash::player::PlayerId;
use wordclash::scores::{ScoreRecord, ScoreStore};

/// Keeps the board in memory but fails every write.
#[derive(Default)]
pub struct UnwritableScoreStore {
    board: BTreeMap<PlayerId, ScoreRecord>,
}

impl ScoreStore for UnwritableScoreStore {
    fn record_win(&mut self, player: PlayerId) -> Result<(), Error> {
        self.board.entry(player).or_default().wins += 1;
        Err(Error::Persistence("Disk is read only.".to_string()))
    }

    fn record_loss(&mut self, player: PlayerId) -> Result<(), Error> {
        self.board.entry(player).or_default().losses += 1;
        Err(Error::Persistence("Disk is read only.".to_string()))
    }

    fn get_all(&self) -> BTreeMap<PlayerId, ScoreRecord> {
        self.board.clone()
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.board.clear();
        Err(Error::Persistence("Disk is read only.".to_string()))
    }
}
