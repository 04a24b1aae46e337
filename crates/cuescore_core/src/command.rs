//! Operator commands.
//!
//! The presentation layer translates UI events into [`Command`] values and
//! dispatches them through [`Match::apply`]; it reacts to the returned
//! [`CommandOutcome`] (publish the news line, show a win screen). This keeps
//! all scoring logic out of the rendering code.

use serde::{Deserialize, Serialize};

use crate::models::FrameType;
use crate::state::{Match, PlayerSlot, WinOutcome};

/// A discrete operator action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Save match setup. Raw input strings; normalization is the engine's job.
    Configure {
        p1_name: String,
        p2_name: String,
        race_to: String,
    },
    RecordLag {
        winner: PlayerSlot,
    },
    RecordFrame {
        player: PlayerSlot,
        frame_type: FrameType,
    },
    StartNewRace,
    ResetHistory,
    FullReset,
}

/// What the presentation layer needs after a command: a ticker line, and the
/// race winner when the command closed out a race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub news: String,
    pub race_won: Option<String>,
}

impl CommandOutcome {
    fn news(news: String) -> Self {
        Self {
            news,
            race_won: None,
        }
    }
}

impl Match {
    /// Dispatch one operator command.
    pub fn apply(&mut self, command: Command) -> CommandOutcome {
        log::debug!("applying command: {:?}", command);
        match command {
            Command::Configure {
                p1_name,
                p2_name,
                race_to,
            } => CommandOutcome::news(self.configure(&p1_name, &p2_name, &race_to)),
            Command::RecordLag { winner } => CommandOutcome::news(self.record_lag(winner)),
            Command::RecordFrame { player, frame_type } => {
                match self.record_frame(player, frame_type) {
                    WinOutcome::RaceWon { winner } => CommandOutcome {
                        news: format!("CHAMPION: {} WINS THE MATCH!", winner),
                        race_won: Some(winner),
                    },
                    WinOutcome::Continue { news } => CommandOutcome::news(news),
                }
            }
            Command::StartNewRace => {
                self.start_new_race();
                CommandOutcome::news("NEW RACE STARTED!".to_string())
            }
            Command::ResetHistory => {
                self.reset_history();
                CommandOutcome::news("HISTORY RESET".to_string())
            }
            Command::FullReset => {
                self.full_reset();
                CommandOutcome::news("SCOREBOARD RESET".to_string())
            }
        }
    }
}
