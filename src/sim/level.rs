//! Level progression and the round clock

use super::state::{GameEvent, GameState, RoundState};

/// Run the round clock down. Returns true once time is up.
pub fn countdown(round: &mut RoundState, dt: f32) -> bool {
    round.time_left -= dt;
    round.time_left <= 0.0
}

/// Whether the current level's score target has been met
pub fn target_reached(round: &RoundState) -> bool {
    round.score >= round.target_score
}

/// Move to the next level, resetting everything round-local
pub fn advance_level(state: &mut GameState) {
    let round = &mut state.round;
    round.level += 1;
    round.target_score += state.tuning.level_target_step;
    round.time_left = state.tuning.round_secs;
    round.power_up_active = false;
    round.burst_sequence.clear();
    round.reset_combo();
    if let Some(token) = round.multiplier_boost.take() {
        state.timers.cancel(token);
    }

    state.clear_entities();
    let target = state.random_target();
    state.round.target = target;

    let (level, target_score) = (state.round.level, state.round.target_score);
    log::info!("Level {} (target {}, burst {})", level, target_score, target.as_str());
    state.emit(GameEvent::LevelUp { level, target_score });
    state.emit(GameEvent::Objective(target.objective().to_string()));
}
