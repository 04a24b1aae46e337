//! Read-only snapshot API for the presentation layer.

use serde::{Deserialize, Serialize};

use crate::state::{Match, PlayerSlot, TurnIndicator};

/// Serializable view of one player's statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub name: String,
    pub score: u32,
    pub races_won: u32,
    pub break_dishes: u32,
    pub reverse_dishes: u32,
}

/// Everything the rendering layer needs to draw the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub p1: PlayerSnapshot,
    pub p2: PlayerSnapshot,
    pub race_to: u32,
    pub total_frames_played: u32,
    /// `None` while the lag has not been decided.
    pub possession: Option<PlayerSlot>,
}

impl Match {
    /// Capture a read-only snapshot of the current state.
    pub fn snapshot(&self) -> MatchSnapshot {
        let player_snapshot = |slot: PlayerSlot| {
            let stats = self.player(slot);
            PlayerSnapshot {
                name: stats.name.clone(),
                score: stats.score,
                races_won: stats.races_won,
                break_dishes: stats.break_dishes,
                reverse_dishes: stats.reverse_dishes,
            }
        };
        MatchSnapshot {
            p1: player_snapshot(PlayerSlot::One),
            p2: player_snapshot(PlayerSlot::Two),
            race_to: self.race_to(),
            total_frames_played: self.total_frames_played(),
            possession: match self.turn_indicator() {
                TurnIndicator::Undetermined => None,
                TurnIndicator::Possession(slot) => Some(slot),
            },
        }
    }

    /// Snapshot serialized as JSON, for hosts embedding the engine behind a
    /// string-based boundary.
    pub fn snapshot_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }
}
