//! Spawn scheduling
//!
//! Decides when something appears and what it is. Difficulty ramps by
//! shrinking the interval per level; a sine term on the wall clock keeps the
//! cadence from being fully predictable.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, PowerUpKind, ShapeVariant};
use super::state::{GameEvent, GameState};
use crate::tuning::Tuning;
use crate::{centered_jitter, point_in_cube};

/// What the scheduler decided to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnDecision {
    Boss(ShapeVariant),
    PowerUp(PowerUpKind),
    Shape(ShapeVariant),
}

/// Seconds between spawns at `level`, jittered by the wall clock
pub fn spawn_interval(tuning: &Tuning, level: u32, clock_secs: f32) -> f32 {
    let base = tuning.spawn_base_interval - level as f32 * tuning.spawn_level_step;
    (base + clock_secs.sin() * tuning.spawn_jitter).max(tuning.spawn_min_interval)
}

/// Spawn cadence accumulator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnScheduler {
    /// Seconds since the last spawn
    pub accumulator: f32,
}

impl SpawnScheduler {
    /// Advance by `dt`; true when a spawn is due. A frozen scheduler
    /// (slow time) neither accumulates nor fires.
    pub fn should_spawn(&mut self, tuning: &Tuning, dt: f32, level: u32, clock_secs: f32, frozen: bool) -> bool {
        if frozen {
            return false;
        }
        self.accumulator += dt;
        if self.accumulator >= spawn_interval(tuning, level, clock_secs) {
            self.accumulator = 0.0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Pick a plain shape, biased toward the current target
pub fn choose_shape(rng: &mut Pcg32, tuning: &Tuning, target: ShapeVariant) -> ShapeVariant {
    if rng.random_bool(tuning.target_bias) {
        target
    } else {
        let others = target.others();
        others[rng.random_range(0..others.len())]
    }
}

/// Decide what the next spawn is
pub fn choose_spawn_kind(
    rng: &mut Pcg32,
    tuning: &Tuning,
    level: u32,
    target: ShapeVariant,
    power_up_active: bool,
    boss_present: bool,
) -> SpawnDecision {
    if tuning.is_boss_level(level) && !boss_present && rng.random_bool(tuning.boss_chance) {
        return SpawnDecision::Boss(choose_shape(rng, tuning, target));
    }
    if !power_up_active && rng.random_bool(tuning.power_up_chance) {
        let kind = if rng.random_bool(0.5) {
            PowerUpKind::Time
        } else {
            PowerUpKind::Multiplier
        };
        return SpawnDecision::PowerUp(kind);
    }
    SpawnDecision::Shape(choose_shape(rng, tuning, target))
}

/// Build an entity for `decision` at `pos`
fn build_entity(state: &mut GameState, decision: SpawnDecision, pos: Vec3) -> Entity {
    let tuning = &state.tuning;
    let level = state.round.level as f32;
    let size = tuning.size_min + state.rng.random::<f32>() * tuning.size_range;
    let lifespan = (tuning.lifespan_base + state.rng.random::<f32>() * tuning.lifespan_jitter
        - level * tuning.lifespan_level_decay)
        .max(tuning.lifespan_min);
    let rotation_speed = tuning.rotation_base + level * tuning.rotation_level_step;
    let boss_hits = tuning.boss_hits;
    let boss_scale = tuning.boss_size_scale;

    let id = state.next_entity_id();
    match decision {
        SpawnDecision::Boss(variant) => {
            let mut boss = Entity::new(id, EntityKind::Boss(variant), pos, size * boss_scale, rotation_speed, lifespan);
            boss.hits_left = boss_hits.max(1);
            boss
        }
        SpawnDecision::PowerUp(kind) => Entity::new(id, EntityKind::PowerUp(kind), pos, size, rotation_speed, lifespan),
        SpawnDecision::Shape(variant) => Entity::new(id, EntityKind::Shape(variant), pos, size, rotation_speed, lifespan),
    }
}

fn insert_spawned(state: &mut GameState, entity: Entity) -> u32 {
    let id = entity.id;
    if entity.kind.is_power_up() {
        state.round.power_up_active = true;
    }
    log::debug!("Spawned {:?} #{} at {:?}", entity.kind, id, entity.pos);
    state.emit(GameEvent::Spawned {
        id,
        kind: entity.kind,
        pos: entity.pos,
    });
    state.insert_entity(entity);
    id
}

/// Insert exactly one new entity for `decision` at a random scene position
pub fn spawn(state: &mut GameState, decision: SpawnDecision) -> u32 {
    let units = [state.rng.random::<f32>(), state.rng.random::<f32>(), state.rng.random::<f32>()];
    let pos = point_in_cube(units, state.tuning.spawn_extent);
    let entity = build_entity(state, decision, pos);
    insert_spawned(state, entity)
}

/// Release plain shapes around a wounded boss
pub fn spawn_minions(state: &mut GameState, origin: Vec3) -> Vec<u32> {
    let count = state.tuning.boss_minions;
    let spread = state.tuning.boss_minion_spread;
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        let variant = choose_shape(&mut state.rng, &state.tuning, state.round.target);
        let dx = centered_jitter(state.rng.random::<f32>(), spread);
        let dy = centered_jitter(state.rng.random::<f32>(), spread);
        let entity = build_entity(state, SpawnDecision::Shape(variant), origin + Vec3::new(dx, dy, 0.0));
        ids.push(insert_spawned(state, entity));
    }
    ids
}

/// Run the scheduler for one tick, spawning at most one entity
pub fn update(state: &mut GameState, dt: f32) -> Option<u32> {
    let frozen = state.round.slow_time.is_some();
    let clock_secs = state.clock_secs();
    let level = state.round.level;
    if !state.spawner.should_spawn(&state.tuning, dt, level, clock_secs, frozen) {
        return None;
    }
    let boss_present = state.boss_present();
    let decision = choose_spawn_kind(
        &mut state.rng,
        &state.tuning,
        level,
        state.round.target,
        state.round.power_up_active,
        boss_present,
    );
    Some(spawn(state, decision))
}
