//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - Time only comes in through `tick`
//! - No rendering or platform dependencies

pub mod autoplay;
pub mod constellation;
pub mod entity;
pub mod hit;
pub mod level;
pub mod scoring;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod timers;

pub use autoplay::Autoplay;
pub use constellation::ConstellationAward;
pub use entity::{Entity, EntityKind, PowerUpKind, ShapeVariant};
pub use hit::{Intersect, Ray, RayHit, SphereIntersector, pointer_action, resolve_hit};
pub use scoring::{BurstOutcome, apply_burst};
pub use spawn::{SpawnDecision, SpawnScheduler};
pub use state::{BurstRecord, DespawnReason, GameEvent, GamePhase, GameState, Popup, RoundState};
pub use tick::{
    TickInput, end_game, pause_game, restart_game, resume_game, start_game, tick, toggle_pause,
};
pub use timers::{TimerKind, TimerToken, Timers};
