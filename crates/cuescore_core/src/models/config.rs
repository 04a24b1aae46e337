//! Match configuration with silent input normalization.
//!
//! A live scoreboard must never block the operator mid-match on a validation
//! error, so malformed setup input is substituted with defaults rather than
//! rejected.

use serde::{Deserialize, Serialize};

pub const DEFAULT_P1_NAME: &str = "PLAYER 1";
pub const DEFAULT_P2_NAME: &str = "PLAYER 2";
pub const DEFAULT_RACE_TO: u32 = 3;

/// Immutable match setup: display names and the race target.
///
/// Set once at match start via [`MatchConfig::normalized`]; replaced wholesale
/// on a full reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub p1_name: String,
    pub p2_name: String,
    pub race_to: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            p1_name: DEFAULT_P1_NAME.to_string(),
            p2_name: DEFAULT_P2_NAME.to_string(),
            race_to: DEFAULT_RACE_TO,
        }
    }
}

impl MatchConfig {
    /// Build a config from raw operator input.
    ///
    /// Blank names fall back to the positional default and are uppercased;
    /// a race target that does not parse as a positive integer falls back
    /// to [`DEFAULT_RACE_TO`]. No input is ever rejected.
    pub fn normalized(p1_name: &str, p2_name: &str, race_to: &str) -> Self {
        Self {
            p1_name: normalize_name(p1_name, DEFAULT_P1_NAME),
            p2_name: normalize_name(p2_name, DEFAULT_P2_NAME),
            race_to: normalize_race_to(race_to),
        }
    }
}

fn normalize_name(raw: &str, default: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_uppercase()
    }
}

fn normalize_race_to(raw: &str) -> u32 {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n > 0)
        .map(|n| n as u32)
        .unwrap_or(DEFAULT_RACE_TO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_invalid_input() {
        let config = MatchConfig::normalized("", "  ", "-5");
        assert_eq!(config.p1_name, "PLAYER 1");
        assert_eq!(config.p2_name, "PLAYER 2");
        assert_eq!(config.race_to, 3);
    }

    #[test]
    fn test_names_are_uppercased_and_trimmed() {
        let config = MatchConfig::normalized("  alice ", "Bob", "7");
        assert_eq!(config.p1_name, "ALICE");
        assert_eq!(config.p2_name, "BOB");
        assert_eq!(config.race_to, 7);
    }

    #[test]
    fn test_non_numeric_race_target_falls_back() {
        assert_eq!(MatchConfig::normalized("a", "b", "five").race_to, 3);
        assert_eq!(MatchConfig::normalized("a", "b", "").race_to, 3);
        assert_eq!(MatchConfig::normalized("a", "b", "0").race_to, 3);
    }
}
