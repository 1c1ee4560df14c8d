use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;
use crate::player::PlayerId;
use crate::scores::{ScoreRecord, ScoreStore};

/// Shape of a record on disk. Early versions only counted wins as a bare integer.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredScore {
    Record(ScoreRecord),
    Legacy(u64),
}

impl From<StoredScore> for ScoreRecord {
    fn from(stored: StoredScore) -> Self {
        match stored {
            StoredScore::Record(record) => record,
            StoredScore::Legacy(wins) => ScoreRecord { wins, losses: 0 },
        }
    }
}

fn parse_board(content: &str) -> Result<BTreeMap<PlayerId, ScoreRecord>, Error> {
    let stored: BTreeMap<String, StoredScore> = serde_json::from_str(content)
        .map_err(|error| Error::Persistence(format!("Could not parse the scores. Error: '{error}'.")))?;

    let mut board = BTreeMap::new();
    for (key, score) in stored {
        match key.trim().parse::<i64>() {
            Ok(id) => {
                board.insert(PlayerId(id), score.into());
            }
            Err(error) => {
                log::warn!("Skipping a score with an invalid player id. PlayerId: '{key}', Error: '{error}'.")
            }
        }
    }
    Ok(board)
}

fn serialize_board(board: &BTreeMap<PlayerId, ScoreRecord>) -> Result<String, Error> {
    let stored: BTreeMap<String, &ScoreRecord> = board
        .iter()
        .map(|(player, record)| (player.to_string(), record))
        .collect();
    serde_json::to_string_pretty(&stored)
        .map_err(|error| Error::Persistence(format!("Could not serialize the scores. Error: '{error}'.")))
}

/// Scores kept in a single JSON document keyed by the stringified player id.
pub struct JsonFileScoreStore {
    path: PathBuf,
    board: BTreeMap<PlayerId, ScoreRecord>,
}

impl JsonFileScoreStore {
    /// A missing file is an empty board; it gets created on the first write.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let board = if path.exists() {
            let content = fs::read_to_string(path).map_err(|error| {
                Error::Persistence(format!(
                    "Could not read the scores. File: '{}', Error: '{error}'.",
                    path.display()
                ))
            })?;
            parse_board(&content)?
        } else {
            BTreeMap::new()
        };
        log::info!(
            "Scores loaded. File: '{}', Players: '{}'.",
            path.display(),
            board.len()
        );

        Ok(JsonFileScoreStore {
            path: path.to_path_buf(),
            board,
        })
    }

    /// Blocking file I/O, the ScoreKeeper runs it on the blocking pool.
    fn save(&self) -> Result<(), Error> {
        let content = serialize_board(&self.board)?;
        if let Some(directory) = self.path.parent() {
            if !directory.as_os_str().is_empty() {
                fs::create_dir_all(directory).map_err(|error| {
                    Error::log_and_create_persistence(&format!(
                        "Could not create the scores directory. Directory: '{}', Error: '{error}'.",
                        directory.display()
                    ))
                })?;
            }
        }
        fs::write(&self.path, content).map_err(|error| {
            Error::log_and_create_persistence(&format!(
                "Could not write the scores. File: '{}', Error: '{error}'.",
                self.path.display()
            ))
        })
    }
}

impl ScoreStore for JsonFileScoreStore {
    fn record_win(&mut self, player: PlayerId) -> Result<(), Error> {
        self.board.entry(player).or_default().wins += 1;
        self.save()
    }

    fn record_loss(&mut self, player: PlayerId) -> Result<(), Error> {
        self.board.entry(player).or_default().losses += 1;
        self.save()
    }

    fn get_all(&self) -> BTreeMap<PlayerId, ScoreRecord> {
        self.board.clone()
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.board.clear();
        self.save()
    }
}

#[derive(Default)]
pub struct MemoryScoreStore {
    board: BTreeMap<PlayerId, ScoreRecord>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        MemoryScoreStore::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn record_win(&mut self, player: PlayerId) -> Result<(), Error> {
        self.board.entry(player).or_default().wins += 1;
        Ok(())
    }

    fn record_loss(&mut self, player: PlayerId) -> Result<(), Error> {
        self.board.entry(player).or_default().losses += 1;
        Ok(())
    }

    fn get_all(&self) -> BTreeMap<PlayerId, ScoreRecord> {
        self.board.clone()
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.board.clear();
        Ok(())
    }
}
