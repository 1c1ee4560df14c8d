mod dictionary;

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use self::dictionary::{normalize, Dictionary};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Synonym,
    Antonym,
}

impl Display for Mode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Synonym => write!(formatter, "synonym"),
            Mode::Antonym => write!(formatter, "antonym"),
        }
    }
}

impl TryFrom<&str> for Mode {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "synonym" | "synonyms" | "synonyme" | "synonymes" => Ok(Mode::Synonym),
            "antonym" | "antonyms" | "antonyme" | "antonymes" => Ok(Mode::Antonym),
            other => Err(format!(
                "{other} is not a supported mode. Use either `synonym` or `antonym`."
            )),
        }
    }
}

/// Read-only source of prompts and of the answers accepted for them.
///
/// Implementations are expected to be in-memory: sessions query them while applying a command.
pub trait WordOracle: Send + Sync {
    /// Picks a prompt outside `excluded`. When every prompt is excluded the exclusion is
    /// ignored, so this only fails when the vocabulary of `mode` is empty.
    fn get_prompt(&self, mode: Mode, excluded: &HashSet<String>) -> Result<String, Error>;

    fn get_valid_answers(&self, mode: Mode, prompt: &str) -> HashSet<String>;
}
