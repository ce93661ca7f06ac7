//! Spawnable scene objects
//!
//! Entities are plain data owned by `GameState::entities`. Everything visual
//! (mesh, trail, colour cycling) belongs to the presentation layer.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// The four burstable shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeVariant {
    Circle,
    Cube,
    Triangle,
    Torus,
}

impl ShapeVariant {
    pub const ALL: [ShapeVariant; 4] = [
        ShapeVariant::Circle,
        ShapeVariant::Cube,
        ShapeVariant::Triangle,
        ShapeVariant::Torus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeVariant::Circle => "circle",
            ShapeVariant::Cube => "cube",
            ShapeVariant::Triangle => "triangle",
            ShapeVariant::Torus => "torus",
        }
    }

    /// Objective banner shown when this shape becomes the target
    pub fn objective(&self) -> &'static str {
        match self {
            ShapeVariant::Circle => "Burst Circles!",
            ShapeVariant::Cube => "Burst Cubes!",
            ShapeVariant::Triangle => "Burst Triangles!",
            ShapeVariant::Torus => "Burst Toruses!",
        }
    }

    /// The three variants that are not `self`, in declaration order
    pub fn others(&self) -> [ShapeVariant; 3] {
        let mut out = [ShapeVariant::Circle; 3];
        let mut i = 0;
        for v in Self::ALL {
            if v != *self {
                out[i] = v;
                i += 1;
            }
        }
        out
    }

    /// Bounding radius relative to the entity size
    fn radius_factor(&self) -> f32 {
        match self {
            ShapeVariant::Circle => 1.0,
            // Half the cube diagonal
            ShapeVariant::Cube => 0.87,
            ShapeVariant::Triangle => 1.0,
            // Ring radius + tube radius
            ShapeVariant::Torus => 0.7,
        }
    }
}

/// Power-up effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Adds seconds to the round clock
    Time,
    /// Temporary score multiplier
    Multiplier,
}

/// What an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Shape(ShapeVariant),
    PowerUp(PowerUpKind),
    /// Multi-hit entity drawn as the given shape
    Boss(ShapeVariant),
}

impl EntityKind {
    pub fn is_boss(&self) -> bool {
        matches!(self, EntityKind::Boss(_))
    }

    pub fn is_power_up(&self) -> bool {
        matches!(self, EntityKind::PowerUp(_))
    }
}

/// A live scene object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec3,
    pub size: f32,
    pub rotation_speed: f32,
    /// Seconds until auto-expiry
    pub lifespan: f32,
    pub initial_lifespan: f32,
    /// Resolutions left before the entity is destroyed
    pub hits_left: u8,
    /// Seconds alive (drives presentation pulse)
    #[serde(default)]
    pub age: f32,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, pos: Vec3, size: f32, rotation_speed: f32, lifespan: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            size,
            rotation_speed,
            lifespan,
            initial_lifespan: lifespan,
            hits_left: 1,
            age: 0.0,
        }
    }

    /// Age the entity by `dt`. Returns false once it has expired.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.age += dt;
        self.lifespan -= dt;
        self.lifespan > 0.0
    }

    /// Remaining fraction of the lifespan, 0..=1
    pub fn life_ratio(&self) -> f32 {
        if self.initial_lifespan <= 0.0 {
            return 0.0;
        }
        (self.lifespan / self.initial_lifespan).clamp(0.0, 1.0)
    }

    /// Whether bursting this entity counts as hitting the target
    pub fn is_target_match(&self, target: ShapeVariant) -> bool {
        match self.kind {
            EntityKind::Shape(v) | EntityKind::Boss(v) => v == target,
            EntityKind::PowerUp(_) => false,
        }
    }

    /// Bounding-sphere radius used for headless hit testing
    pub fn hit_radius(&self, power_up_radius: f32) -> f32 {
        match self.kind {
            EntityKind::Shape(v) | EntityKind::Boss(v) => self.size * v.radius_factor(),
            EntityKind::PowerUp(_) => power_up_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(variant: ShapeVariant) -> Entity {
        Entity::new(1, EntityKind::Shape(variant), Vec3::ZERO, 2.0, 0.6, 1.0)
    }

    #[test]
    fn test_tick_expires_at_zero() {
        let mut e = shape(ShapeVariant::Cube);
        assert!(e.tick(0.5));
        assert!((e.life_ratio() - 0.5).abs() < 1e-6);
        assert!(!e.tick(0.5));
        assert_eq!(e.life_ratio(), 0.0);
    }

    #[test]
    fn test_target_match() {
        assert!(shape(ShapeVariant::Torus).is_target_match(ShapeVariant::Torus));
        assert!(!shape(ShapeVariant::Torus).is_target_match(ShapeVariant::Circle));
        let orb = Entity::new(2, EntityKind::PowerUp(PowerUpKind::Time), Vec3::ZERO, 1.0, 0.5, 3.0);
        for v in ShapeVariant::ALL {
            assert!(!orb.is_target_match(v));
        }
    }

    #[test]
    fn test_others_excludes_self() {
        for v in ShapeVariant::ALL {
            let others = v.others();
            assert!(!others.contains(&v));
            assert_eq!(others.len(), 3);
        }
    }

    #[test]
    fn test_hit_radius() {
        let orb = Entity::new(2, EntityKind::PowerUp(PowerUpKind::Multiplier), Vec3::ZERO, 1.2, 0.5, 3.0);
        assert_eq!(orb.hit_radius(2.0), 2.0);
        assert_eq!(shape(ShapeVariant::Circle).hit_radius(2.0), 2.0);
    }
}
