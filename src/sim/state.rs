//! Game state and core simulation types
//!
//! Everything the simulation mutates lives in one owned `GameState` that is
//! passed by `&mut` into each component.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind, ShapeVariant};
use super::spawn::SpawnScheduler;
use super::timers::{TimerToken, Timers};
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Start screen, nothing simulated yet
    NotStarted,
    /// Active gameplay
    Running,
    /// Game is paused
    Paused,
    /// Round clock ran out
    GameOver,
}

/// One matching burst remembered for constellation detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurstRecord {
    pub at_ms: f64,
    pub pos: Vec3,
}

/// Round-local scoring and progression state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    /// Internal score (may go negative from mismatches)
    pub score: i64,
    pub level: u32,
    pub target_score: i64,
    /// Seconds left on the round clock
    pub time_left: f32,
    /// Shape the player is rewarded for bursting
    pub target: ShapeVariant,
    pub combo_count: u32,
    pub combo_multiplier: f32,
    /// Wall clock time of the last matching burst
    pub last_match_ms: Option<f64>,
    pub burst_sequence: Vec<BurstRecord>,
    /// A power-up entity is live
    pub power_up_active: bool,
    /// Live multiplier power-up activation
    pub multiplier_boost: Option<TimerToken>,
    /// Live slow-time window
    pub slow_time: Option<TimerToken>,
}

impl RoundState {
    pub fn new(tuning: &Tuning, target: ShapeVariant) -> Self {
        Self {
            score: 0,
            level: 1,
            target_score: tuning.target_for_level(1),
            time_left: tuning.round_secs,
            target,
            combo_count: 0,
            combo_multiplier: 1.0,
            last_match_ms: None,
            burst_sequence: Vec::new(),
            power_up_active: false,
            multiplier_boost: None,
            slow_time: None,
        }
    }

    /// Drop the streak and multiplier back to (1, 0)
    pub fn reset_combo(&mut self) {
        self.combo_multiplier = 1.0;
        self.combo_count = 0;
    }

    /// Score as shown on the HUD
    pub fn display_score(&self) -> u64 {
        crate::display_score(self.score)
    }

    /// Whether the HUD should warn about the clock
    pub fn is_time_low(&self, tuning: &Tuning) -> bool {
        self.time_left <= tuning.time_low_secs && self.time_left > 0.0
    }
}

/// Why an entity left the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DespawnReason {
    /// Lifespan ran out
    Expired,
    /// Player burst it
    Burst,
    /// Level change, restart or game over
    Cleared,
}

/// Floating text shown at an entity's screen position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Popup {
    HitsLeft(u8),
    TimeBonus(f32),
    MultiplierBoost(f32),
    Points { points: i64, multiplier: f32 },
    Penalty(i64),
    Constellation(i64),
}

impl Popup {
    pub fn text(&self) -> String {
        match self {
            Popup::HitsLeft(n) => format!("Hits Left: {}", n),
            Popup::TimeBonus(secs) => format!("+{} Time", secs),
            Popup::MultiplierBoost(m) => format!("x{} Multiplier!", m),
            Popup::Points { points, multiplier } => format!("+{} x{:.1}", points, multiplier),
            Popup::Penalty(p) => format!("-{}", p),
            Popup::Constellation(bonus) => format!("+{} Constellation!", bonus),
        }
    }
}

/// Outbound notifications for the presentation layer (fire-and-forget)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned { id: u32, kind: EntityKind, pos: Vec3 },
    Despawned { id: u32, reason: DespawnReason },
    BurstSound { id: u32, kind: EntityKind },
    Popup { pos: Vec3, popup: Popup },
    ConstellationLink { from: Vec3, to: Vec3 },
    /// Centre-screen flash message
    Objective(String),
    LevelUp { level: u32, target_score: i64 },
    GameOver { final_score: i64 },
    MultiplierExpired,
    SlowTime { active: bool },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub round: RoundState,
    /// Live entities (sorted by id)
    pub entities: Vec<Entity>,
    pub spawner: SpawnScheduler,
    pub timers: Timers,
    /// Wall clock (ms); advances on every tick, including while paused
    pub clock_ms: f64,
    /// Final score of the last finished game
    pub final_score: Option<i64>,
    /// Pending presentation events
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed and default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let target = ShapeVariant::ALL[rng.random_range(0..ShapeVariant::ALL.len())];
        Self {
            seed,
            rng,
            round: RoundState::new(&tuning, target),
            tuning,
            phase: GamePhase::NotStarted,
            entities: Vec::new(),
            spawner: SpawnScheduler::default(),
            timers: Timers::new(),
            clock_ms: 0.0,
            final_score: None,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand pending events to the presentation layer
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Wall clock in seconds
    pub fn clock_secs(&self) -> f32 {
        (self.clock_ms / 1000.0) as f32
    }

    /// Uniformly random target shape
    pub fn random_target(&mut self) -> ShapeVariant {
        ShapeVariant::ALL[self.rng.random_range(0..ShapeVariant::ALL.len())]
    }

    pub fn entity(&self, id: u32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn boss_present(&self) -> bool {
        self.entities.iter().any(|e| e.kind.is_boss())
    }

    pub fn live_power_ups(&self) -> usize {
        self.entities.iter().filter(|e| e.kind.is_power_up()).count()
    }

    /// Insert an entity keeping id order
    pub fn insert_entity(&mut self, entity: Entity) {
        let idx = self.entities.partition_point(|e| e.id < entity.id);
        self.entities.insert(idx, entity);
    }

    /// Remove an entity by id
    pub fn take_entity(&mut self, id: u32) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(idx))
    }

    /// Destroy every live entity without scoring
    pub fn clear_entities(&mut self) {
        for entity in std::mem::take(&mut self.entities) {
            self.events.push(GameEvent::Despawned {
                id: entity.id,
                reason: DespawnReason::Cleared,
            });
        }
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.entities.sort_by_key(|e| e.id);
    }
}
