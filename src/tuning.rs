//! Data-driven game balance
//!
//! Every gameplay number lives here so a JSON file can override any subset
//! of them. Missing keys fall back to `Tuning::default()`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a tuning override was rejected
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tuning value {field} = {value} is out of range ({expected})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// Gameplay balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Spawning ===
    /// Spawn interval at level 0 (seconds)
    pub spawn_base_interval: f32,
    /// Interval reduction per level (seconds)
    pub spawn_level_step: f32,
    /// Interval floor (seconds)
    pub spawn_min_interval: f32,
    /// Amplitude of the sinusoidal cadence jitter (seconds)
    pub spawn_jitter: f32,
    /// Side length of the spawn cube (scene units)
    pub spawn_extent: f32,
    /// Probability that a plain shape is the current target
    pub target_bias: f64,

    // === Entities ===
    pub size_min: f32,
    pub size_range: f32,
    pub lifespan_base: f32,
    pub lifespan_jitter: f32,
    pub lifespan_level_decay: f32,
    pub lifespan_min: f32,
    pub rotation_base: f32,
    pub rotation_level_step: f32,
    /// Fixed bounding radius of power-up orbs
    pub power_up_radius: f32,

    // === Bosses ===
    /// Bosses only appear on levels divisible by this
    pub boss_level_period: u32,
    pub boss_chance: f64,
    pub boss_hits: u8,
    pub boss_size_scale: f32,
    /// Plain shapes released per non-lethal boss hit
    pub boss_minions: usize,
    /// Jitter spread for minion placement (scene units)
    pub boss_minion_spread: f32,

    // === Power-ups ===
    pub power_up_chance: f64,
    pub time_bonus_secs: f32,
    pub multiplier_boost: f32,
    pub multiplier_boost_secs: f64,

    // === Scoring ===
    pub match_base_points: i64,
    pub mismatch_penalty: i64,
    pub combo_window_ms: f64,
    pub combo_step: f32,
    pub combo_max: f32,

    // === Constellations ===
    pub constellation_window_ms: f64,
    pub constellation_min_bursts: usize,
    pub constellation_bonus: f32,
    pub slow_time_min_combo: u32,
    pub slow_time_chance: f64,
    pub slow_time_secs: f64,

    // === Levels ===
    pub level_start_target: i64,
    pub level_target_step: i64,
    pub round_secs: f32,
    /// HUD warning threshold (seconds)
    pub time_low_secs: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            spawn_base_interval: 1.0,
            spawn_level_step: 0.07,
            spawn_min_interval: 0.4,
            spawn_jitter: 0.2,
            spawn_extent: 50.0,
            target_bias: 0.7,

            size_min: 1.0,
            size_range: 2.0,
            lifespan_base: 2.5,
            lifespan_jitter: 2.0,
            lifespan_level_decay: 0.06,
            lifespan_min: 1.5,
            rotation_base: 0.5,
            rotation_level_step: 0.1,
            power_up_radius: 2.0,

            boss_level_period: 5,
            boss_chance: 0.1,
            boss_hits: 3,
            boss_size_scale: 2.0,
            boss_minions: 2,
            boss_minion_spread: 2.0,

            power_up_chance: 0.06,
            time_bonus_secs: 15.0,
            multiplier_boost: 2.0,
            multiplier_boost_secs: 10.0,

            match_base_points: 10,
            mismatch_penalty: 5,
            combo_window_ms: 1000.0,
            combo_step: 0.5,
            combo_max: 3.0,

            constellation_window_ms: 3000.0,
            constellation_min_bursts: 3,
            constellation_bonus: 20.0,
            slow_time_min_combo: 5,
            slow_time_chance: 0.3,
            slow_time_secs: 5.0,

            level_start_target: 20,
            level_target_step: 25,
            round_secs: 30.0,
            time_low_secs: 10.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let chances = [
            ("target_bias", self.target_bias),
            ("boss_chance", self.boss_chance),
            ("power_up_chance", self.power_up_chance),
            ("slow_time_chance", self.slow_time_chance),
        ];
        for (field, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::OutOfRange {
                    field,
                    value,
                    expected: "0.0..=1.0",
                });
            }
        }

        let lower_bounds = [
            ("combo_max", self.combo_max, 1.0, ">= 1"),
            ("combo_step", self.combo_step, 0.0, ">= 0"),
            ("multiplier_boost", self.multiplier_boost, 1.0, ">= 1"),
            ("round_secs", self.round_secs, f32::MIN_POSITIVE, "> 0"),
            ("spawn_min_interval", self.spawn_min_interval, f32::MIN_POSITIVE, "> 0"),
            ("power_up_radius", self.power_up_radius, 0.0, ">= 0"),
        ];
        for (field, value, min, expected) in lower_bounds {
            // NaN fails this check too
            if !(value >= min) {
                return Err(TuningError::OutOfRange {
                    field,
                    value: value as f64,
                    expected,
                });
            }
        }
        Ok(())
    }

    /// Score needed to clear a given level (1-based)
    pub fn target_for_level(&self, level: u32) -> i64 {
        self.level_start_target + self.level_target_step * (level.saturating_sub(1) as i64)
    }

    /// Whether bosses may appear on this level
    pub fn is_boss_level(&self, level: u32) -> bool {
        self.boss_level_period > 0 && level % self.boss_level_period == 0
    }
}
