//! Parkour Horde - an endless side-scrolling runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, obstacles, collisions, the chasing horde)
//! - `tuning`: Data-driven game balance
//! - `highscores`: Best-distance ratchet
//! - `persistence`: Key-value storage seam
//! - `platform`: Browser/native storage and logging setup

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use highscores::HighScore;
pub use tuning::Tuning;

/// Simulation clock constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one step per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta accepted by `advance` (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
}
