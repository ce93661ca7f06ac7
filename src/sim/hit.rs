//! Pointer hit resolution
//!
//! The renderer owns the real geometry, so picking is delegated to an
//! `Intersect` collaborator. `SphereIntersector` is the headless stand-in
//! that tests entities against their bounding spheres.

use glam::Vec3;

use super::entity::Entity;
use super::scoring::{BurstOutcome, apply_burst};
use super::state::{GamePhase, GameState};
use crate::tuning::Tuning;

/// A pointer ray in scene space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    /// Ray from `origin` through `point`
    pub fn through(origin: Vec3, point: Vec3) -> Self {
        Self::new(origin, point - origin)
    }
}

/// Result of a successful pick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub id: u32,
    /// Distance along the ray to the first intersection
    pub distance: f32,
}

/// Picking collaborator supplied by the rendering layer
pub trait Intersect {
    /// Nearest entity intersected by `ray`, if any
    fn intersect(&self, ray: &Ray, entities: &[Entity]) -> Option<RayHit>;
}

/// Distance along `ray` to the first intersection with a sphere
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_d = disc.sqrt();
    let near = -b - sqrt_d;
    if near >= 0.0 {
        return Some(near);
    }
    // Origin inside the sphere
    let far = -b + sqrt_d;
    (far >= 0.0).then_some(0.0)
}

/// Bounding-sphere picker
#[derive(Debug, Clone, Copy)]
pub struct SphereIntersector {
    /// Radius used for power-up orbs
    pub power_up_radius: f32,
}

impl SphereIntersector {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            power_up_radius: tuning.power_up_radius,
        }
    }
}

impl Default for SphereIntersector {
    fn default() -> Self {
        Self::from_tuning(&Tuning::default())
    }
}

impl Intersect for SphereIntersector {
    fn intersect(&self, ray: &Ray, entities: &[Entity]) -> Option<RayHit> {
        entities
            .iter()
            .filter_map(|e| {
                ray_sphere(ray, e.pos, e.hit_radius(self.power_up_radius)).map(|distance| RayHit {
                    id: e.id,
                    distance,
                })
            })
            // Ties keep the earlier (lower id) entity
            .min_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

/// Pick and remove at most one entity. No-op unless the game is running.
pub fn resolve_hit(state: &mut GameState, ray: &Ray, picker: &dyn Intersect) -> Option<Entity> {
    if state.phase != GamePhase::Running {
        return None;
    }
    let hit = picker.intersect(ray, &state.entities)?;
    state.take_entity(hit.id)
}

/// Full pointer handling: resolve the hit and score it
pub fn pointer_action(state: &mut GameState, ray: &Ray, picker: &dyn Intersect) -> Option<BurstOutcome> {
    let entity = resolve_hit(state, ray, picker)?;
    Some(apply_burst(state, entity))
}
