mod policy;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub use self::policy::AnswerPolicy;

/// Stable identifier of a chat user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

impl Display for PlayerId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<i64> for PlayerId {
    fn from(value: i64) -> Self {
        PlayerId(value)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Player {
    Human {
        id: PlayerId,
        name: String,
    },
    /// A competitor whose move is produced by its policy when its turn begins.
    Automated {
        id: PlayerId,
        name: String,
        policy: AnswerPolicy,
    },
}

impl Player {
    pub fn human(id: impl Into<PlayerId>, name: &str) -> Self {
        Player::Human {
            id: id.into(),
            name: name.to_string(),
        }
    }

    pub fn automated(id: impl Into<PlayerId>, name: &str, policy: AnswerPolicy) -> Self {
        Player::Automated {
            id: id.into(),
            name: name.to_string(),
            policy,
        }
    }

    pub fn id(&self) -> PlayerId {
        match self {
            Player::Human { id, .. } | Player::Automated { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Player::Human { name, .. } | Player::Automated { name, .. } => name,
        }
    }

    pub fn is_automated(&self) -> bool {
        matches!(self, Player::Automated { .. })
    }

    pub fn policy(&self) -> Option<&AnswerPolicy> {
        match self {
            Player::Human { .. } => None,
            Player::Automated { policy, .. } => Some(policy),
        }
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id(),
            name: self.name().to_string(),
            is_automated: self.is_automated(),
        }
    }
}

/// What the transport gets to see about a player.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub is_automated: bool,
}
