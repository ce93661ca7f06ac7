//! Constellation bonus
//!
//! Three or more matching bursts inside a trailing window form a
//! constellation: bonus score, a line between each consecutive pair, and a
//! fresh window. Long streaks can also trigger a slow-time spawn pause.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{BurstRecord, RoundState};
use crate::tuning::Tuning;

/// Result of a completed constellation
#[derive(Debug, Clone, PartialEq)]
pub struct ConstellationAward {
    pub bonus: i64,
    /// Consecutive burst positions to connect
    pub links: Vec<(Vec3, Vec3)>,
    /// Roll succeeded for a slow-time window
    pub slow_time: bool,
}

/// Drop records older than the trailing window
pub fn prune(sequence: &mut Vec<BurstRecord>, now_ms: f64, window_ms: f64) {
    sequence.retain(|b| now_ms - b.at_ms < window_ms);
}

/// Check the burst sequence and award a constellation if it is complete.
/// Adds the bonus to the round score and clears the sequence on success.
pub fn evaluate(round: &mut RoundState, tuning: &Tuning, now_ms: f64, rng: &mut Pcg32) -> Option<ConstellationAward> {
    prune(&mut round.burst_sequence, now_ms, tuning.constellation_window_ms);
    if round.burst_sequence.len() < tuning.constellation_min_bursts {
        return None;
    }

    let bonus = (tuning.constellation_bonus * round.combo_multiplier).floor() as i64;
    round.score += bonus;

    let links = round
        .burst_sequence
        .windows(2)
        .map(|pair| (pair[0].pos, pair[1].pos))
        .collect();
    round.burst_sequence.clear();

    let slow_time = round.combo_count >= tuning.slow_time_min_combo && rng.random_bool(tuning.slow_time_chance);

    Some(ConstellationAward {
        bonus,
        links,
        slow_time,
    })
}
