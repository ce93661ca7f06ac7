//! Shape Burst - A 3D shape-bursting arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, hit resolution, scoring, levels)
//! - `session`: Top-level session wrapper (simulation + leaderboard)
//! - `platform`: Frame pacing, camera projection and pointer rays
//! - `persistence`: Storage collaborator (LocalStorage on web, files natively)
//! - `tuning`: Data-driven game balance
//! - `audio`/`music`: Burst sounds and the background playlist

pub mod audio;
pub mod highscores;
pub mod music;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::Leaderboard;
pub use session::Session;
pub use settings::{Settings, Theme};
pub use tuning::{Tuning, TuningError};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Target frame rate of the external frame callback
    pub const TARGET_FPS: f64 = 60.0;
    /// Frame interval in milliseconds (frames thinner than this are skipped)
    pub const FRAME_INTERVAL_MS: f64 = 1000.0 / TARGET_FPS;
    /// Nominal simulation step (used by headless drivers)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest delta handed to the simulation in one frame
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Camera defaults
    pub const CAMERA_Z: f32 = 20.0;
    pub const CAMERA_FOV_DEG: f32 = 75.0;
    pub const CAMERA_NEAR: f32 = 0.1;
    pub const CAMERA_FAR: f32 = 1000.0;

    /// Leaderboard
    pub const MAX_LEADERBOARD_ENTRIES: usize = 5;
    pub const MAX_NAME_CHARS: usize = 10;
    pub const DEFAULT_PLAYER_NAME: &str = "Anonymous";
}

/// Uniform value in [-0.5, 0.5) scaled by `spread`
#[inline]
pub fn centered_jitter(unit: f32, spread: f32) -> f32 {
    (unit - 0.5) * spread
}

/// Random position inside an axis-aligned cube of side `extent` centred on the origin
#[inline]
pub fn point_in_cube(units: [f32; 3], extent: f32) -> Vec3 {
    Vec3::new(
        centered_jitter(units[0], extent),
        centered_jitter(units[1], extent),
        centered_jitter(units[2], extent),
    )
}

/// Score as shown to the player (internal score may dip below zero)
#[inline]
pub fn display_score(score: i64) -> u64 {
    score.max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_jitter_bounds() {
        assert_eq!(centered_jitter(0.5, 2.0), 0.0);
        assert_eq!(centered_jitter(0.0, 2.0), -1.0);
        assert!(centered_jitter(0.999, 50.0) < 25.0);
    }

    #[test]
    fn test_display_score_clamps() {
        assert_eq!(display_score(-15), 0);
        assert_eq!(display_score(42), 42);
    }
}
