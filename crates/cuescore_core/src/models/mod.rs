//! Core data model: match configuration and the frame ledger entry types.

pub mod config;
pub mod frame;

pub use config::{MatchConfig, DEFAULT_P1_NAME, DEFAULT_P2_NAME, DEFAULT_RACE_TO};
pub use frame::{FrameRecord, FrameType};
