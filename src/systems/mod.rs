pub mod bout;
pub mod combat;
pub mod movement;

pub use bout::{Bout, BoutReport, FighterSnapshot, FighterStats, LoggedAction, LoggedStrike};
pub use combat::{resolve_strike, StrikeOutcome};
pub use movement::{movement_system, RING_HALF_WIDTH};
