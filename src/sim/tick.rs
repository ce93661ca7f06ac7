//! Per-frame simulation step and session phase machine
//!
//! `tick` is called once per accepted frame. The wall clock (timers, combo
//! window, spawn jitter) always advances; round time, spawning and entity
//! ageing only advance while running.

use super::level;
use super::spawn;
use super::state::{DespawnReason, GameEvent, GamePhase, GameState, RoundState};
use super::timers::TimerKind;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pause toggle
    pub pause: bool,
    /// Skip to next level (debug/testing)
    pub skip_level: bool,
}

/// Advance the game state by `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.clock_ms += dt as f64 * 1000.0;
    fire_timers(state);

    if input.pause {
        toggle_pause(state);
    }

    // Don't simulate unless running
    if state.phase != GamePhase::Running {
        return;
    }

    if input.skip_level {
        level::advance_level(state);
        return;
    }

    let time_up = level::countdown(&mut state.round, dt);

    spawn::update(state, dt);
    age_entities(state, dt);

    if time_up {
        end_game(state);
    } else if level::target_reached(&state.round) {
        level::advance_level(state);
    }

    // Ensure deterministic ordering
    state.normalize_order();
}

/// Age every live entity and drop the expired ones without scoring
fn age_entities(state: &mut GameState, dt: f32) {
    let mut expired = Vec::new();
    state.entities.retain_mut(|e| {
        let alive = e.tick(dt);
        if !alive {
            expired.push((e.id, e.kind));
        }
        alive
    });
    for (id, kind) in expired {
        if kind.is_power_up() {
            state.round.power_up_active = false;
        }
        state.emit(GameEvent::Despawned {
            id,
            reason: DespawnReason::Expired,
        });
    }
}

/// Apply every deferred effect that is due, skipping stale activations
fn fire_timers(state: &mut GameState) {
    for task in state.timers.take_due(state.clock_ms) {
        match task.kind {
            TimerKind::MultiplierExpiry => {
                if state.round.multiplier_boost != Some(task.token) {
                    continue;
                }
                state.round.multiplier_boost = None;
                state.round.combo_multiplier = 1.0;
                log::info!("Multiplier expired");
                state.emit(GameEvent::MultiplierExpired);
                state.emit(GameEvent::Objective("Multiplier Expired!".to_string()));
            }
            TimerKind::SlowTimeEnd => {
                if state.round.slow_time != Some(task.token) {
                    continue;
                }
                state.round.slow_time = None;
                state.spawner.reset();
                state.emit(GameEvent::SlowTime { active: false });
            }
        }
    }
}

/// Fresh round state with a new random target
fn reset_round(state: &mut GameState) {
    state.clear_entities();
    state.timers.cancel_all();
    state.spawner.reset();
    let target = state.random_target();
    state.round = RoundState::new(&state.tuning, target);
    state.final_score = None;
}

fn announce_target(state: &mut GameState) {
    let objective = state.round.target.objective().to_string();
    state.emit(GameEvent::Objective(objective));
}

/// Start screen -> running
pub fn start_game(state: &mut GameState) -> bool {
    if state.phase != GamePhase::NotStarted {
        log::debug!("start ignored in {:?}", state.phase);
        return false;
    }
    reset_round(state);
    state.phase = GamePhase::Running;
    log::info!("Game started (seed {}, burst {})", state.seed, state.round.target.as_str());
    announce_target(state);
    true
}

pub fn pause_game(state: &mut GameState) -> bool {
    if state.phase != GamePhase::Running {
        return false;
    }
    state.phase = GamePhase::Paused;
    true
}

pub fn resume_game(state: &mut GameState) -> bool {
    if state.phase != GamePhase::Paused {
        return false;
    }
    state.phase = GamePhase::Running;
    true
}

pub fn toggle_pause(state: &mut GameState) -> bool {
    match state.phase {
        GamePhase::Running => pause_game(state),
        GamePhase::Paused => resume_game(state),
        _ => false,
    }
}

/// Game over -> running with a fresh round
pub fn restart_game(state: &mut GameState) -> bool {
    if state.phase != GamePhase::GameOver {
        log::debug!("restart ignored in {:?}", state.phase);
        return false;
    }
    reset_round(state);
    state.phase = GamePhase::Running;
    log::info!("Game restarted (burst {})", state.round.target.as_str());
    announce_target(state);
    true
}

/// Round clock ran out
pub fn end_game(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    state.clear_entities();
    state.timers.cancel_all();
    state.round.multiplier_boost = None;
    state.round.slow_time = None;
    state.round.power_up_active = false;
    let final_score = state.round.score;
    state.final_score = Some(final_score);
    log::info!("Game over: score {} at level {}", final_score, state.round.level);
    state.emit(GameEvent::GameOver { final_score });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::entity::{Entity, EntityKind, PowerUpKind};
    use crate::sim::hit::{Ray, SphereIntersector, pointer_action};
    use crate::sim::scoring::BurstOutcome;
    use glam::Vec3;
    use proptest::prelude::*;

    fn started(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        assert!(start_game(&mut state));
        state
    }

    #[test]
    fn test_nothing_happens_before_start() {
        let mut state = GameState::new(12345);
        for _ in 0..600 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert!(state.entities.is_empty());
        assert_eq!(state.round.time_left, 30.0);
    }

    #[test]
    fn test_tick_spawns_and_counts_down() {
        let mut state = started(12345);
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!((state.round.time_left - 28.0).abs() < 0.01);
        assert!(!state.entities.is_empty());
        assert!(state.entities.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_skip_level_keeps_score() {
        let mut state = started(12345);
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        state.round.score = 7;
        let skip = TickInput {
            skip_level: true,
            ..Default::default()
        };
        tick(&mut state, &skip, SIM_DT);
        assert_eq!(state.round.level, 2);
        assert_eq!(state.round.target_score, 45);
        assert_eq!(state.round.time_left, 30.0);
        assert_eq!(state.round.score, 7);
        assert!(state.entities.is_empty());

        // Ignored unless running
        assert!(pause_game(&mut state));
        tick(&mut state, &skip, SIM_DT);
        assert_eq!(state.round.level, 2);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = started(12345);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let time_left = state.round.time_left;
        let count = state.entities.len();
        for _ in 0..300 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.round.time_left, time_left);
        assert_eq!(state.entities.len(), count);

        // Unpause
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_no_hits_while_paused() {
        let mut state = started(1);
        let id = state.next_entity_id();
        state.insert_entity(Entity::new(id, EntityKind::Shape(state.round.target), Vec3::ZERO, 2.0, 0.5, 5.0));
        assert!(pause_game(&mut state));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 20.0), Vec3::NEG_Z);
        assert!(pointer_action(&mut state, &ray, &SphereIntersector::default()).is_none());
        assert!(state.entity(id).is_some());
    }

    #[test]
    fn test_time_out_ends_game() {
        let mut state = started(77);
        state.round.score = 15;
        state.round.time_left = 0.01;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.final_score, Some(15));
        assert!(state.entities.is_empty());
        assert!(state.timers.is_empty());
        assert!(state.drain_events().contains(&GameEvent::GameOver { final_score: 15 }));

        // Game over is sticky until restart
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(!start_game(&mut state));
        assert!(!resume_game(&mut state));
    }

    #[test]
    fn test_time_out_beats_level_up() {
        let mut state = started(77);
        state.round.score = 500;
        state.round.time_left = 0.001;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.round.level, 1);
    }

    #[test]
    fn test_level_up_on_tick() {
        let mut state = started(5);
        state.round.score = 20;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.round.level, 2);
        assert_eq!(state.round.target_score, 45);
        assert_eq!(state.round.time_left, 30.0);
    }

    #[test]
    fn test_restart_resets_round() {
        let mut state = started(9);
        state.round.score = 80;
        state.round.level = 3;
        end_game(&mut state);
        assert!(restart_game(&mut state));
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.round.score, 0);
        assert_eq!(state.round.level, 1);
        assert_eq!(state.round.target_score, 20);
        assert_eq!(state.round.time_left, 30.0);
        assert!(state.final_score.is_none());
        assert!(!restart_game(&mut state));
    }

    #[test]
    fn test_multiplier_expires_after_ten_seconds() {
        let mut state = started(3);
        state.tuning.spawn_min_interval = 1000.0;
        state.round.time_left = 100.0;
        let id = state.next_entity_id();
        let orb = Entity::new(id, EntityKind::PowerUp(PowerUpKind::Multiplier), Vec3::ZERO, 1.0, 0.5, 5.0);
        crate::sim::scoring::apply_burst(&mut state, orb);
        assert_eq!(state.round.combo_multiplier, 2.0);

        for _ in 0..(9 * 60) {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.round.combo_multiplier, 2.0);
        for _ in 0..(2 * 60) {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.round.combo_multiplier, 1.0);
        assert!(state.round.multiplier_boost.is_none());
    }

    #[test]
    fn test_second_boost_not_cut_short_by_first_expiry() {
        let mut state = started(3);
        state.tuning.spawn_min_interval = 1000.0;
        state.round.time_left = 100.0;
        let burst_orb = |state: &mut GameState| {
            let id = state.next_entity_id();
            let orb = Entity::new(id, EntityKind::PowerUp(PowerUpKind::Multiplier), Vec3::ZERO, 1.0, 0.5, 5.0);
            crate::sim::scoring::apply_burst(state, orb);
        };
        burst_orb(&mut state);
        for _ in 0..(6 * 60) {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        burst_orb(&mut state);
        // Past the first activation's deadline, inside the second's
        for _ in 0..(6 * 60) {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.round.combo_multiplier, 2.0);
        assert!(state.round.multiplier_boost.is_some());
    }

    #[test]
    fn test_timers_keep_running_while_paused() {
        let mut state = started(3);
        let id = state.next_entity_id();
        let orb = Entity::new(id, EntityKind::PowerUp(PowerUpKind::Multiplier), Vec3::ZERO, 1.0, 0.5, 5.0);
        crate::sim::scoring::apply_burst(&mut state, orb);
        pause_game(&mut state);
        for _ in 0..(11 * 60) {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.round.combo_multiplier, 1.0);
    }

    #[test]
    fn test_slow_time_freezes_spawning() {
        let mut state = started(21);
        state.round.time_left = 100.0;
        crate::sim::scoring::start_slow_time(&mut state);
        let before = state.entities.len();
        for _ in 0..(4 * 60) {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.entities.len() <= before);
        assert_eq!(state.spawner.accumulator, 0.0);
        for _ in 0..(3 * 60) {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.round.slow_time.is_none());
        assert!(state.spawner.accumulator > 0.0 || !state.entities.is_empty());
    }

    #[test]
    fn test_expired_power_up_frees_slot() {
        let mut state = started(4);
        state.tuning.spawn_min_interval = 1000.0;
        let id = state.next_entity_id();
        state.insert_entity(Entity::new(id, EntityKind::PowerUp(PowerUpKind::Time), Vec3::ZERO, 1.0, 0.5, 0.05));
        state.round.power_up_active = true;
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.entity(id).is_none());
        assert!(!state.round.power_up_active);
        assert!(state.drain_events().contains(&GameEvent::Despawned {
            id,
            reason: DespawnReason::Expired
        }));
        assert_eq!(state.round.score, 0);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = started(99999);
        let mut state2 = started(99999);
        for _ in 0..600 {
            tick(&mut state1, &TickInput::default(), SIM_DT);
            tick(&mut state2, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state1.entities, state2.entities);
        assert_eq!(state1.round, state2.round);
    }

    #[test]
    fn test_matching_scenario_via_pointer() {
        let mut state = started(2024);
        state.tuning.spawn_min_interval = 1000.0;
        let target = state.round.target;
        let id = state.next_entity_id();
        state.insert_entity(Entity::new(id, EntityKind::Shape(target), Vec3::ZERO, 2.3, 0.6, 5.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 20.0), Vec3::NEG_Z);
        let outcome = pointer_action(&mut state, &ray, &SphereIntersector::default()).unwrap();
        assert!(matches!(outcome, BurstOutcome::Matched { points: 12, .. }));
        assert_eq!(state.round.score, 12);
    }

    fn boss_heavy_state(seed: u64) -> GameState {
        let mut state = started(seed);
        state.tuning.boss_chance = 0.5;
        state.tuning.power_up_chance = 0.5;
        state.tuning.spawn_min_interval = 0.05;
        state.tuning.spawn_base_interval = 0.05;
        state.round.level = 5;
        state.round.target_score = i64::MAX;
        state.round.time_left = 1.0e6;
        state
    }

    proptest! {
        #[test]
        fn prop_spawn_and_combo_invariants(
            seed in any::<u64>(),
            ops in prop::collection::vec((0.001f32..0.1, any::<bool>(), -1.0f32..1.0, -1.0f32..1.0), 1..300),
        ) {
            let mut state = boss_heavy_state(seed);
            let picker = SphereIntersector::default();
            for (dt, click, x, y) in ops {
                tick(&mut state, &TickInput::default(), dt);
                if click {
                    let ray = Ray::through(Vec3::new(0.0, 0.0, 20.0), Vec3::new(x * 25.0, y * 25.0, 0.0));
                    if let Some(BurstOutcome::Matched { .. }) = pointer_action(&mut state, &ray, &picker) {
                        let now = state.clock_ms;
                        prop_assert!(state.round.burst_sequence.iter().all(|b| now - b.at_ms < 3000.0));
                    }
                }
                let bosses = state.entities.iter().filter(|e| e.kind.is_boss()).count();
                prop_assert!(bosses <= 1);
                prop_assert!(state.live_power_ups() <= 1);
                prop_assert_eq!(state.round.power_up_active, state.live_power_ups() == 1);
                prop_assert!((1.0..=3.0).contains(&state.round.combo_multiplier));
                prop_assert!(state.entities.iter().all(|e| e.hits_left >= 1));
            }
        }

        #[test]
        fn prop_mismatch_always_costs_five(seed in any::<u64>(), score in -100i64..1000, mult_steps in 0u32..5) {
            let mut state = started(seed);
            state.round.score = score;
            state.round.combo_multiplier = 1.0 + mult_steps as f32 * 0.5;
            state.round.combo_count = mult_steps;
            let wrong = state.round.target.others()[0];
            let id = state.next_entity_id();
            let e = Entity::new(id, EntityKind::Shape(wrong), Vec3::ZERO, 2.0, 0.5, 3.0);
            crate::sim::scoring::apply_burst(&mut state, e);
            prop_assert_eq!(state.round.score, score - 5);
            prop_assert_eq!(state.round.combo_multiplier, 1.0);
            prop_assert_eq!(state.round.combo_count, 0);
        }
    }

    #[test]
    fn test_boss_only_on_boss_levels() {
        let mut state = boss_heavy_state(8);
        state.round.level = 4;
        for _ in 0..2000 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            assert!(!state.boss_present());
        }
    }
}
