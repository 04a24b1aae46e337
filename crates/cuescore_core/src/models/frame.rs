//! Frame ledger entry types.

use serde::{Deserialize, Serialize};

/// How a frame was won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameType {
    /// Ordinary frame win.
    #[serde(rename = "normal")]
    Normal,
    /// Table cleared directly off the opening break.
    #[serde(rename = "break-dish")]
    BreakDish,
    /// Table cleared in reverse order.
    #[serde(rename = "reverse-dish")]
    ReverseDish,
}

impl FrameType {
    /// Human-readable label used in reports and ticker messages.
    pub fn label(&self) -> &'static str {
        match self {
            FrameType::Normal => "NORMAL",
            FrameType::BreakDish => "BREAK DISH",
            FrameType::ReverseDish => "REVERSE DISH",
        }
    }
}

/// One entry in the append-only frame ledger.
///
/// `winner` is a snapshot of the display name at record time, not a live
/// reference; renaming players later must not rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// 1-based sequential frame number.
    pub frame: u32,
    pub winner: String,
    #[serde(rename = "type")]
    pub frame_type: FrameType,
}
