//! Match Engine State
//!
//! This module owns the live match state: per-player statistics, the race
//! target, the lag winner, and the append-only frame ledger. All transitions
//! are short synchronous steps driven by discrete operator actions; recording
//! a frame and checking for a race win form one logical unit, so no caller
//! can observe an incremented score without a completed win check.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::models::{FrameRecord, FrameType, MatchConfig};

/// Selector for one of the two players.
///
/// Replaces stringly-typed `"p1"`/`"p2"` lookups with an exhaustive enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerSlot {
    #[serde(rename = "p1")]
    One,
    #[serde(rename = "p2")]
    Two,
}

impl PlayerSlot {
    pub fn other(self) -> Self {
        match self {
            PlayerSlot::One => PlayerSlot::Two,
            PlayerSlot::Two => PlayerSlot::One,
        }
    }
}

/// Live statistics for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Display name, uppercased at configuration time.
    pub name: String,
    /// Frames won in the current race.
    pub score: u32,
    /// Completed races won.
    pub races_won: u32,
    /// Frames won by clearing the table off the break.
    pub break_dishes: u32,
    /// Frames won by a reverse clearance.
    pub reverse_dishes: u32,
}

impl PlayerStats {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            score: 0,
            races_won: 0,
            break_dishes: 0,
            reverse_dishes: 0,
        }
    }
}

/// Who breaks the next frame, derived from frames played and the lag winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnIndicator {
    /// No lag has been recorded yet.
    Undetermined,
    Possession(PlayerSlot),
}

/// Result of recording a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WinOutcome {
    /// The frame closed out the race.
    RaceWon { winner: String },
    /// The race continues; `news` describes the frame just played.
    Continue { news: String },
}

/// The match engine: one in-memory match at a time, owned by its caller.
#[derive(Debug, Clone)]
pub struct Match {
    config: MatchConfig,
    p1: PlayerStats,
    p2: PlayerStats,
    lag_winner: Option<PlayerSlot>,
    start_time: Option<DateTime<Local>>,
    total_frames_played: u32,
    ledger: Vec<FrameRecord>,
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

impl Match {
    /// Create an unconfigured match with default names and race target.
    pub fn new() -> Self {
        let config = MatchConfig::default();
        let p1 = PlayerStats::new(&config.p1_name);
        let p2 = PlayerStats::new(&config.p2_name);
        Self {
            config,
            p1,
            p2,
            lag_winner: None,
            start_time: None,
            total_frames_played: 0,
            ledger: Vec::new(),
        }
    }

    // ========================
    // Setup
    // ========================

    /// Apply operator setup input and reset the match to its starting state.
    ///
    /// Input is normalized, never rejected: blank names take positional
    /// defaults, a non-positive or non-numeric race target takes the default
    /// of 3. Records the start timestamp and returns the setup news line.
    pub fn configure(&mut self, p1_name: &str, p2_name: &str, race_to: &str) -> String {
        let config = MatchConfig::normalized(p1_name, p2_name, race_to);
        self.p1 = PlayerStats::new(&config.p1_name);
        self.p2 = PlayerStats::new(&config.p2_name);
        self.config = config;
        self.lag_winner = None;
        self.start_time = Some(Local::now());
        self.total_frames_played = 0;
        self.ledger.clear();
        format!("SETTING UP: {} VS {}", self.p1.name, self.p2.name)
    }

    /// Record which player won the opening lag.
    ///
    /// Not guarded against reassignment; calling it again simply moves the
    /// break order. Returns the match-started news line.
    pub fn record_lag(&mut self, winner: PlayerSlot) -> String {
        self.lag_winner = Some(winner);
        format!("MATCH STARTED! {} WON THE LAG.", self.player(winner).name)
    }

    // ========================
    // Scoring
    // ========================

    /// Record one completed frame for `player` and run the win check.
    ///
    /// Appends the ledger entry (next sequential frame number, winner name
    /// snapshotted now), bumps the score and the matching dish counter, then
    /// checks the race target. The whole sequence is one synchronous step.
    pub fn record_frame(&mut self, player: PlayerSlot, frame_type: FrameType) -> WinOutcome {
        let winner_name = self.player(player).name.clone();
        if self.p1.score >= self.config.race_to || self.p2.score >= self.config.race_to {
            // Caller discipline: start_new_race() should have been called.
            log::warn!("frame recorded after a race already ended; scores not reset");
        }

        self.ledger.push(FrameRecord {
            frame: self.total_frames_played + 1,
            winner: winner_name.clone(),
            frame_type,
        });

        let stats = self.player_mut(player);
        stats.score += 1;
        match frame_type {
            FrameType::BreakDish => stats.break_dishes += 1,
            FrameType::ReverseDish => stats.reverse_dishes += 1,
            FrameType::Normal => {}
        }
        self.total_frames_played += 1;

        let news = match frame_type {
            FrameType::Normal => format!("{} WON THE FRAME", winner_name),
            other => format!("{} {}!", winner_name, other.label()),
        };
        self.check_win(news)
    }

    /// Check whether either player has reached the race target.
    ///
    /// On a win, credits that player's race tally and names them; otherwise
    /// passes `news` through. Player one is checked first. Called exactly
    /// once per recorded frame.
    pub fn check_win(&mut self, news: String) -> WinOutcome {
        if self.p1.score >= self.config.race_to {
            self.p1.races_won += 1;
            WinOutcome::RaceWon {
                winner: self.p1.name.clone(),
            }
        } else if self.p2.score >= self.config.race_to {
            self.p2.races_won += 1;
            WinOutcome::RaceWon {
                winner: self.p2.name.clone(),
            }
        } else {
            WinOutcome::Continue { news }
        }
    }

    // ========================
    // Resets
    // ========================

    /// Start the next race: zero both live scores.
    ///
    /// Race tallies, dish counters, the ledger, and the lag winner are all
    /// kept; the break order carries over from the previous race.
    pub fn start_new_race(&mut self) {
        self.p1.score = 0;
        self.p2.score = 0;
    }

    /// Discard everything and return to the unconfigured starting state.
    pub fn full_reset(&mut self) {
        *self = Match::new();
    }

    /// Clear the frame ledger and the frame counter, nothing else.
    ///
    /// Scores and race tallies earned by those frames stay as they are;
    /// numbering restarts from 1 on the next recorded frame.
    pub fn reset_history(&mut self) {
        self.ledger.clear();
        self.total_frames_played = 0;
    }

    // ========================
    // Derived state
    // ========================

    /// Who breaks the next frame.
    ///
    /// Possession alternates every frame: with an even number of frames
    /// played it follows the lag winner, with an odd number it is the other
    /// player. Undetermined until a lag is recorded.
    pub fn turn_indicator(&self) -> TurnIndicator {
        match self.lag_winner {
            None => TurnIndicator::Undetermined,
            Some(lag) => {
                if self.total_frames_played % 2 == 0 {
                    TurnIndicator::Possession(lag)
                } else {
                    TurnIndicator::Possession(lag.other())
                }
            }
        }
    }

    // ========================
    // Accessors
    // ========================

    pub fn player(&self, slot: PlayerSlot) -> &PlayerStats {
        match slot {
            PlayerSlot::One => &self.p1,
            PlayerSlot::Two => &self.p2,
        }
    }

    fn player_mut(&mut self, slot: PlayerSlot) -> &mut PlayerStats {
        match slot {
            PlayerSlot::One => &mut self.p1,
            PlayerSlot::Two => &mut self.p2,
        }
    }

    pub fn race_to(&self) -> u32 {
        self.config.race_to
    }

    pub fn lag_winner(&self) -> Option<PlayerSlot> {
        self.lag_winner
    }

    pub fn start_time(&self) -> Option<DateTime<Local>> {
        self.start_time
    }

    pub fn total_frames_played(&self) -> u32 {
        self.total_frames_played
    }

    pub fn ledger(&self) -> &[FrameRecord] {
        &self.ledger
    }
}
