use std::collections::BTreeMap;

use serde::Serialize;

use crate::player::PlayerId;
use crate::scores::ScoreRecord;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub position: usize,
    pub player: PlayerId,
    pub record: ScoreRecord,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Title {
    Newcomer,
    LivingLegend,
    Champion,
    Veteran,
    Rising,
}

impl Title {
    fn for_position(position: Option<usize>) -> Self {
        match position {
            None => Title::Newcomer,
            Some(1) => Title::LivingLegend,
            Some(position) if position <= 3 => Title::Champion,
            Some(position) if position <= 10 => Title::Veteran,
            Some(_) => Title::Rising,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub player: PlayerId,
    pub wins: u64,
    pub losses: u64,
    /// Percentage of games won, 0 when nothing was played yet.
    pub win_rate: f64,
    pub position: Option<usize>,
    pub title: Title,
}

/// Most wins first; ties go to the player with fewer losses, then to the lower id.
pub fn ranking(scores: &BTreeMap<PlayerId, ScoreRecord>) -> Vec<Standing> {
    let mut entries: Vec<(&PlayerId, &ScoreRecord)> = scores.iter().collect();
    entries.sort_by(|(left_id, left), (right_id, right)| {
        right
            .wins
            .cmp(&left.wins)
            .then(left.losses.cmp(&right.losses))
            .then(left_id.cmp(right_id))
    });
    entries
        .into_iter()
        .enumerate()
        .map(|(index, (player, record))| Standing {
            position: index + 1,
            player: *player,
            record: *record,
        })
        .collect()
}

pub fn registered_players(scores: &BTreeMap<PlayerId, ScoreRecord>) -> usize {
    scores.len()
}

pub fn summary(scores: &BTreeMap<PlayerId, ScoreRecord>, player: PlayerId) -> PlayerSummary {
    let record = scores.get(&player).copied().unwrap_or_default();
    let played = record.wins + record.losses;
    let win_rate = if played == 0 {
        0.0
    } else {
        record.wins as f64 / played as f64 * 100.0
    };
    let position = ranking(scores)
        .into_iter()
        .find(|standing| standing.player == player)
        .map(|standing| standing.position);

    PlayerSummary {
        player,
        wins: record.wins,
        losses: record.losses,
        win_rate,
        position,
        title: Title::for_position(position),
    }
}
