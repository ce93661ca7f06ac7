//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame pacing (requestAnimationFrame fires faster than the game wants)
//! - Camera projection and pointer rays

pub mod camera;
pub mod time;

pub use camera::Camera;
pub use time::FramePacer;
