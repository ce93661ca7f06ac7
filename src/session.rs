//! Session wrapper
//!
//! Owns the simulation plus everything that outlives a single game: the
//! leaderboard, player settings and the one-submission-per-game guard.
//! Front ends (browser loop, native demo) talk to this type only.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::highscores::Leaderboard;
use crate::persistence::{Storage, StorageError};
use crate::settings::{Settings, Theme};
use crate::sim::hit::{Intersect, Ray, pointer_action};
use crate::sim::scoring::BurstOutcome;
use crate::sim::state::{GameEvent, GamePhase, GameState};
use crate::sim::tick::{self, TickInput};
use crate::tuning::Tuning;

/// Values shown on the HUD
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: u64,
    pub combo: u32,
    pub multiplier: f32,
    pub level: u32,
    pub target_score: i64,
    /// Whole seconds left, never negative
    pub time_left: u32,
    /// Clock warning glow
    pub time_low: bool,
    pub objective: &'static str,
}

pub struct Session {
    pub state: GameState,
    pub leaderboard: Leaderboard,
    pub settings: Settings,
    score_submitted: bool,
}

impl Session {
    pub fn new(seed: u64, tuning: Tuning, leaderboard: Leaderboard, settings: Settings) -> Self {
        Self {
            state: GameState::with_tuning(seed, tuning),
            leaderboard,
            settings,
            score_submitted: false,
        }
    }

    /// Session with persisted leaderboard and settings. A first launch gets a
    /// random theme.
    pub fn load(seed: u64, tuning: Tuning, storage: &dyn Storage) -> Self {
        let first_launch = matches!(storage.get(Settings::STORAGE_KEY), Ok(None));
        let mut settings = Settings::load(storage);
        if first_launch {
            let mut rng = Pcg32::seed_from_u64(seed ^ 0x7e3e);
            settings.theme = Theme::random(&mut rng);
        }
        Self::new(seed, tuning, Leaderboard::load(storage), settings)
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn start(&mut self) -> bool {
        tick::start_game(&mut self.state)
    }

    pub fn pause(&mut self) -> bool {
        tick::pause_game(&mut self.state)
    }

    pub fn resume(&mut self) -> bool {
        tick::resume_game(&mut self.state)
    }

    pub fn toggle_pause(&mut self) -> bool {
        tick::toggle_pause(&mut self.state)
    }

    /// End the current game early (quit). Only a game in progress can end.
    pub fn end(&mut self) -> bool {
        if !matches!(self.state.phase, GamePhase::Running | GamePhase::Paused) {
            log::debug!("end ignored (phase {:?})", self.state.phase);
            return false;
        }
        tick::end_game(&mut self.state);
        true
    }

    /// New game after game over; a fresh seed keeps runs from repeating
    pub fn restart(&mut self) -> bool {
        if self.state.phase != GamePhase::GameOver {
            return false;
        }
        let reseed = self.state.rng.random::<u64>();
        self.state.rng = Pcg32::seed_from_u64(reseed);
        self.score_submitted = false;
        tick::restart_game(&mut self.state)
    }

    /// Frame callback
    pub fn on_tick(&mut self, dt: f32) {
        self.on_tick_with(&TickInput::default(), dt);
    }

    pub fn on_tick_with(&mut self, input: &TickInput, dt: f32) {
        tick::tick(&mut self.state, input, dt);
    }

    /// Pointer click/tap already converted into a scene ray
    pub fn on_pointer_action(&mut self, ray: &Ray, picker: &dyn Intersect) -> Option<BurstOutcome> {
        pointer_action(&mut self.state, ray, picker)
    }

    /// Cosmetic only; the simulation never reads the theme
    pub fn set_theme(&mut self, theme: Theme) {
        log::info!("Theme set to {}", theme.as_str());
        self.settings.theme = theme;
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    /// Final score as displayed, once the game is over
    pub fn final_score(&self) -> Option<u64> {
        self.state.final_score.map(crate::display_score)
    }

    pub fn can_submit_score(&self) -> bool {
        self.state.phase == GamePhase::GameOver && !self.score_submitted
    }

    /// Record the finished game's score. Returns the rank achieved, or
    /// None when there is nothing to submit or the score missed the board.
    pub fn submit_score(&mut self, name: &str, storage: &mut dyn Storage) -> Result<Option<usize>, StorageError> {
        if !self.can_submit_score() {
            log::debug!("score submission ignored (phase {:?})", self.state.phase);
            return Ok(None);
        }
        let Some(score) = self.final_score() else {
            return Ok(None);
        };
        self.score_submitted = true;
        let rank = self.leaderboard.add_score(name, score);
        if let Some(rank) = rank {
            log::info!("Score {} entered the leaderboard at #{}", score, rank);
        }
        self.leaderboard.save(storage)?;
        Ok(rank)
    }

    pub fn clear_leaderboard(&mut self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        self.leaderboard.clear();
        self.leaderboard.save(storage)
    }

    pub fn save_settings(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        self.settings.save(storage)
    }

    pub fn hud(&self) -> Hud {
        let round = &self.state.round;
        Hud {
            score: round.display_score(),
            combo: round.combo_count,
            multiplier: round.combo_multiplier,
            level: round.level,
            target_score: round.target_score,
            time_left: round.time_left.max(0.0).round() as u32,
            time_low: round.is_time_low(&self.state.tuning),
            objective: round.target.objective(),
        }
    }
}
