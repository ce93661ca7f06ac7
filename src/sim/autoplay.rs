//! Demo/attract mode - the game plays itself
//!
//! The bot only reads state and produces pointer rays, so it drives the game
//! through the same path as a real player.

use glam::Vec3;

use super::entity::Entity;
use super::hit::Ray;
use super::state::{GamePhase, GameState};
use crate::consts::CAMERA_Z;

/// Idle-mode player
#[derive(Debug, Clone)]
pub struct Autoplay {
    /// Seconds between clicks
    pub reaction_secs: f32,
    /// Where rays are fired from
    pub eye: Vec3,
    cooldown: f32,
}

impl Default for Autoplay {
    fn default() -> Self {
        Self::new(0.35)
    }
}

impl Autoplay {
    pub fn new(reaction_secs: f32) -> Self {
        Self {
            reaction_secs,
            eye: Vec3::new(0.0, 0.0, CAMERA_Z),
            cooldown: reaction_secs,
        }
    }

    /// Priority of an entity; higher goes first, None is never clicked
    fn priority(state: &GameState, entity: &Entity) -> Option<u8> {
        if entity.kind.is_power_up() {
            Some(3)
        } else if entity.kind.is_boss() && entity.is_target_match(state.round.target) {
            Some(2)
        } else if entity.is_target_match(state.round.target) {
            Some(1)
        } else {
            None
        }
    }

    /// Entity the bot wants to burst next
    pub fn pick_target<'a>(&self, state: &'a GameState) -> Option<&'a Entity> {
        state
            .entities
            .iter()
            .filter_map(|e| Self::priority(state, e).map(|p| (p, e)))
            // Highest priority, then the one closest to expiring
            .max_by(|(pa, a), (pb, b)| {
                pa.cmp(pb).then(
                    b.lifespan
                        .partial_cmp(&a.lifespan)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
            })
            .map(|(_, e)| e)
    }

    /// Advance the reaction timer and return a ray to fire, if any
    pub fn next_ray(&mut self, state: &GameState, dt: f32) -> Option<Ray> {
        if state.phase != GamePhase::Running {
            return None;
        }
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return None;
        }
        let target = self.pick_target(state)?;
        self.cooldown = self.reaction_secs;
        Some(Ray::through(self.eye, target.pos))
    }
}
