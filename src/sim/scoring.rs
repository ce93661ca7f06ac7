//! Burst outcome rules
//!
//! Rules are checked in order: wounded boss, time power-up, multiplier
//! power-up, matching shape, mismatching shape.

use super::constellation::{self, ConstellationAward};
use super::entity::{Entity, EntityKind, PowerUpKind};
use super::spawn::spawn_minions;
use super::state::{BurstRecord, DespawnReason, GameEvent, GameState, Popup, RoundState};
use super::timers::{TimerKind, TimerToken};
use crate::tuning::Tuning;

/// What a burst did
#[derive(Debug, Clone, PartialEq)]
pub enum BurstOutcome {
    /// Boss survived the hit and released minions
    BossWounded { hits_left: u8, minions: Vec<u32> },
    TimeBonus { seconds: f32 },
    MultiplierBoost { multiplier: f32, token: TimerToken },
    Matched {
        points: i64,
        /// Multiplier after the combo update
        multiplier: f32,
        constellation: Option<ConstellationAward>,
    },
    Mismatched { penalty: i64 },
}

/// Points for a matching burst at the given multiplier
pub fn match_points(tuning: &Tuning, size: f32, rotation_speed: f32, multiplier: f32) -> i64 {
    let base = tuning.match_base_points + size.floor() as i64 + rotation_speed.floor() as i64;
    (base as f32 * multiplier).floor() as i64
}

/// Score a matching burst and advance the combo. Returns the points earned.
pub fn score_match(round: &mut RoundState, tuning: &Tuning, entity: &Entity, now_ms: f64) -> i64 {
    let points = match_points(tuning, entity.size, entity.rotation_speed, round.combo_multiplier);
    round.score += points;
    round.combo_count += 1;

    let in_window = match round.last_match_ms {
        Some(last) => now_ms - last < tuning.combo_window_ms,
        None => false,
    };
    round.combo_multiplier = if in_window {
        (round.combo_multiplier + tuning.combo_step).min(tuning.combo_max)
    } else {
        1.0
    };
    round.last_match_ms = Some(now_ms);

    round.burst_sequence.push(BurstRecord {
        at_ms: now_ms,
        pos: entity.pos,
    });
    points
}

/// Penalize a wrong burst and break the streak
pub fn score_mismatch(round: &mut RoundState, tuning: &Tuning) -> i64 {
    round.score -= tuning.mismatch_penalty;
    round.reset_combo();
    tuning.mismatch_penalty
}

/// Start (or restart) the multiplier power-up window
fn activate_multiplier(state: &mut GameState) -> TimerToken {
    if let Some(previous) = state.round.multiplier_boost.take() {
        state.timers.cancel(previous);
    }
    let fire_at = state.clock_ms + state.tuning.multiplier_boost_secs * 1000.0;
    let token = state.timers.schedule(TimerKind::MultiplierExpiry, fire_at);
    state.round.combo_multiplier = state.tuning.multiplier_boost;
    state.round.multiplier_boost = Some(token);
    token
}

/// Start (or extend) a slow-time window that freezes spawning
pub fn start_slow_time(state: &mut GameState) {
    if let Some(previous) = state.round.slow_time.take() {
        state.timers.cancel(previous);
    }
    let fire_at = state.clock_ms + state.tuning.slow_time_secs * 1000.0;
    let token = state.timers.schedule(TimerKind::SlowTimeEnd, fire_at);
    state.round.slow_time = Some(token);
    state.spawner.reset();
    log::info!("Slow time for {}s", state.tuning.slow_time_secs);
    state.emit(GameEvent::SlowTime { active: true });
    state.emit(GameEvent::Objective("Slow Time!".to_string()));
}

/// Apply a resolved burst to the game state
pub fn apply_burst(state: &mut GameState, mut entity: Entity) -> BurstOutcome {
    let now = state.clock_ms;

    if entity.kind.is_boss() {
        entity.hits_left = entity.hits_left.saturating_sub(1);
        if entity.hits_left > 0 {
            let hits_left = entity.hits_left;
            let pos = entity.pos;
            log::debug!("Boss #{} wounded, {} hits left", entity.id, hits_left);
            state.emit(GameEvent::Popup {
                pos,
                popup: Popup::HitsLeft(hits_left),
            });
            state.insert_entity(entity);
            let minions = spawn_minions(state, pos);
            return BurstOutcome::BossWounded { hits_left, minions };
        }
    }

    let outcome = match entity.kind {
        EntityKind::PowerUp(PowerUpKind::Time) => {
            let seconds = state.tuning.time_bonus_secs;
            state.round.time_left += seconds;
            state.round.power_up_active = false;
            state.emit(GameEvent::Popup {
                pos: entity.pos,
                popup: Popup::TimeBonus(seconds),
            });
            BurstOutcome::TimeBonus { seconds }
        }
        EntityKind::PowerUp(PowerUpKind::Multiplier) => {
            let token = activate_multiplier(state);
            state.round.power_up_active = false;
            let multiplier = state.round.combo_multiplier;
            state.emit(GameEvent::Popup {
                pos: entity.pos,
                popup: Popup::MultiplierBoost(multiplier),
            });
            BurstOutcome::MultiplierBoost { multiplier, token }
        }
        EntityKind::Shape(_) | EntityKind::Boss(_) => {
            if entity.is_target_match(state.round.target) {
                let points = score_match(&mut state.round, &state.tuning, &entity, now);
                let multiplier = state.round.combo_multiplier;
                state.emit(GameEvent::Popup {
                    pos: entity.pos,
                    popup: Popup::Points { points, multiplier },
                });
                let award = constellation::evaluate(&mut state.round, &state.tuning, now, &mut state.rng);
                if let Some(award) = &award {
                    state.emit(GameEvent::Popup {
                        pos: entity.pos,
                        popup: Popup::Constellation(award.bonus),
                    });
                    for &(from, to) in &award.links {
                        state.emit(GameEvent::ConstellationLink { from, to });
                    }
                    if award.slow_time {
                        start_slow_time(state);
                    }
                }
                BurstOutcome::Matched {
                    points,
                    multiplier,
                    constellation: award,
                }
            } else {
                let penalty = score_mismatch(&mut state.round, &state.tuning);
                state.emit(GameEvent::Popup {
                    pos: entity.pos,
                    popup: Popup::Penalty(penalty),
                });
                BurstOutcome::Mismatched { penalty }
            }
        }
    };

    log::debug!("Burst #{} {:?} -> {:?}", entity.id, entity.kind, outcome);
    state.emit(GameEvent::BurstSound {
        id: entity.id,
        kind: entity.kind,
    });
    state.emit(GameEvent::Despawned {
        id: entity.id,
        reason: DespawnReason::Burst,
    });
    outcome
}
