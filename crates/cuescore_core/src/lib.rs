//! # cuescore_core - Cue-Sports Scoreboard Match Engine
//!
//! This library provides the match engine behind a pool scoreboard:
//! configuration, live scoring toward a race target, the append-only frame
//! ledger, break-order tracking, and plain-text match reports.
//!
//! ## Features
//! - Silent input normalization (a live scoring tool never blocks on bad input)
//! - Append-only frame ledger with sequential numbering
//! - Command dispatch so the rendering layer stays a thin adapter
//! - JSON snapshot API for embedding hosts

pub mod api;
pub mod command;
pub mod error;
pub mod models;
pub mod report;
pub mod state;

pub use api::{MatchSnapshot, PlayerSnapshot};
pub use command::{Command, CommandOutcome};
pub use error::{CoreError, Result};
pub use models::{FrameRecord, FrameType, MatchConfig};
pub use report::{export_report, format_report, report_filename, ticker_line};
pub use state::{Match, PlayerSlot, PlayerStats, TurnIndicator, WinOutcome};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_match_flow() {
        let mut m = Match::new();
        m.apply(Command::Configure {
            p1_name: "Ann".to_string(),
            p2_name: "Kim".to_string(),
            race_to: "2".to_string(),
        });
        m.apply(Command::RecordLag {
            winner: PlayerSlot::One,
        });

        m.apply(Command::RecordFrame {
            player: PlayerSlot::One,
            frame_type: FrameType::Normal,
        });
        m.apply(Command::RecordFrame {
            player: PlayerSlot::Two,
            frame_type: FrameType::BreakDish,
        });
        let outcome = m.apply(Command::RecordFrame {
            player: PlayerSlot::One,
            frame_type: FrameType::Normal,
        });
        assert_eq!(outcome.race_won.as_deref(), Some("ANN"));

        m.apply(Command::StartNewRace);
        let snapshot = m.snapshot();
        assert_eq!(snapshot.p1.score, 0);
        assert_eq!(snapshot.p1.races_won, 1);
        assert_eq!(snapshot.total_frames_played, 3);

        let report = format_report(&m, chrono::Local::now());
        assert!(report.contains("RACES WON:  ANN [1] | KIM [0]"));
    }
}
