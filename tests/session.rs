//! Full-session tests driven through the public API

use glam::Vec3;

use shape_burst::consts::SIM_DT;
use shape_burst::persistence::{FileStorage, MemoryStorage};
use shape_burst::platform::Camera;
use shape_burst::sim::{
    Autoplay, BurstOutcome, Entity, EntityKind, GameEvent, GamePhase, ShapeVariant, SphereIntersector,
};
use shape_burst::{Leaderboard, Session, Settings, Tuning};

/// Tuning with spawning effectively disabled so only placed entities exist
fn quiet_tuning() -> Tuning {
    Tuning {
        spawn_base_interval: 1.0e6,
        spawn_min_interval: 1.0e6,
        ..Tuning::default()
    }
}

fn quiet_session(target: ShapeVariant) -> Session {
    let mut session = Session::new(2024, quiet_tuning(), Leaderboard::new(), Settings::default());
    assert!(session.start());
    session.state.round.target = target;
    session
}

fn place(session: &mut Session, kind: EntityKind, pos: Vec3, size: f32, rotation_speed: f32) -> u32 {
    let id = session.state.next_entity_id();
    session
        .state
        .insert_entity(Entity::new(id, kind, pos, size, rotation_speed, 5.0));
    id
}

/// Click on whatever is drawn at `pos`
fn click_at(session: &mut Session, camera: &Camera, pos: Vec3) -> Option<BurstOutcome> {
    let ndc = camera.project(pos)?;
    let ray = camera.ray_from_ndc(ndc);
    session.on_pointer_action(&ray, &SphereIntersector::default())
}

#[test]
fn test_matching_circle_scores_twelve() {
    let mut session = quiet_session(ShapeVariant::Circle);
    let camera = Camera::new(16.0 / 9.0);
    let pos = Vec3::new(4.0, 2.0, -6.0);
    place(&mut session, EntityKind::Shape(ShapeVariant::Circle), pos, 2.3, 0.6);

    let outcome = click_at(&mut session, &camera, pos);
    assert!(matches!(outcome, Some(BurstOutcome::Matched { points: 12, .. })));
    assert_eq!(session.hud().score, 12);
    assert!(session.state.entities.is_empty());
}

#[test]
fn test_combo_ramp_over_real_ticks() {
    let mut session = quiet_session(ShapeVariant::Cube);
    // Keep the level (and its combo) alive across all six bursts
    session.state.round.target_score = 1_000;
    let camera = Camera::new(1.0);
    let burst_after = |session: &mut Session, gap_secs: f32| {
        session.on_tick(gap_secs);
        let pos = Vec3::new(0.0, 0.0, -2.0);
        place(session, EntityKind::Shape(ShapeVariant::Cube), pos, 1.0, 0.5);
        click_at(session, &camera, pos);
        session.state.round.combo_multiplier
    };

    assert_eq!(burst_after(&mut session, 0.0), 1.0);
    assert_eq!(burst_after(&mut session, 0.8), 1.5);
    assert_eq!(burst_after(&mut session, 0.4), 2.0);
    assert_eq!(burst_after(&mut session, 0.1), 2.5);
    assert_eq!(burst_after(&mut session, 0.1), 3.0);
    assert_eq!(burst_after(&mut session, 0.1), 3.0);
}

#[test]
fn test_time_out_then_leaderboard_names() {
    let mut storage = MemoryStorage::new();
    let mut session = quiet_session(ShapeVariant::Torus);
    session.state.round.score = 15;
    // Run the clock out
    for _ in 0..(31 * 60) {
        session.on_tick(SIM_DT);
    }
    assert_eq!(session.phase(), GamePhase::GameOver);
    assert_eq!(session.final_score(), Some(15));
    assert!(
        session
            .drain_events()
            .contains(&GameEvent::GameOver { final_score: 15 })
    );

    assert_eq!(session.submit_score("Ace", &mut storage).unwrap(), Some(1));
    assert_eq!(session.leaderboard.entries[0].name, "Ace");

    // Second game: a 12-character name is replaced
    assert!(session.restart());
    session.state.round.score = 9;
    session.state.round.time_left = 0.01;
    session.on_tick(SIM_DT);
    session.submit_score("TwelveChars!", &mut storage).unwrap();
    assert_eq!(session.leaderboard.lines(), vec!["Ace: 15", "Anonymous: 9"]);
    assert_eq!(Leaderboard::load(&storage), session.leaderboard);
}

#[test]
fn test_level_up_keeps_score_and_resets_clock() {
    let mut session = quiet_session(ShapeVariant::Triangle);
    session.state.round.score = 18;
    session.on_tick(5.0);
    let pos = Vec3::ZERO;
    place(&mut session, EntityKind::Shape(ShapeVariant::Triangle), pos, 1.0, 0.5);
    click_at(&mut session, &Camera::new(1.0), pos);
    session.on_tick(SIM_DT);

    let hud = session.hud();
    assert_eq!(hud.level, 2);
    assert_eq!(hud.target_score, 45);
    assert_eq!(hud.time_left, 30);
    assert_eq!(hud.score, 29);
}

#[test]
fn test_tuning_override_from_json() {
    let tuning = Tuning::from_json(r#"{ "round_secs": 5.0, "level_start_target": 10 }"#).unwrap();
    let mut session = Session::new(1, tuning, Leaderboard::new(), Settings::default());
    session.start();
    assert_eq!(session.hud().target_score, 10);
    for _ in 0..(6 * 60) {
        session.on_tick(SIM_DT);
    }
    assert_eq!(session.phase(), GamePhase::GameOver);
}

#[test]
fn test_autoplay_full_game() {
    let dir = std::env::temp_dir().join(format!("shape-burst-it-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let mut storage = FileStorage::new(&dir);
    let mut session = Session::load(77, Tuning::default(), &storage);
    let mut bot = Autoplay::default();
    let picker = SphereIntersector::from_tuning(&session.state.tuning);
    session.start();

    // The bot clears levels faster than the clock runs out, so quit once
    // it has proven it can progress
    const QUIT_AT_LEVEL: u32 = 3;
    let mut max_level = 1;
    for _ in 0..(60 * 60 * 20) {
        if let Some(ray) = bot.next_ray(&session.state, SIM_DT) {
            session.on_pointer_action(&ray, &picker);
        }
        session.on_tick(SIM_DT);
        max_level = max_level.max(session.state.round.level);
        if session.state.round.level >= QUIT_AT_LEVEL && session.phase() == GamePhase::Running {
            assert!(session.end());
        }

        let bosses = session.state.entities.iter().filter(|e| e.kind.is_boss()).count();
        assert!(bosses <= 1);
        assert!(session.state.live_power_ups() <= 1);
        if session.phase() == GamePhase::GameOver {
            break;
        }
    }

    assert_eq!(session.phase(), GamePhase::GameOver);
    assert!(session.state.entities.is_empty());
    assert!(session.state.timers.is_empty());
    assert_eq!(session.state.round.level, max_level);
    assert!(max_level >= QUIT_AT_LEVEL);
    // Two levels cleared means at least the level-2 target was banked
    assert!(session.final_score().unwrap_or(0) >= 45);

    let rank = session.submit_score("Bot", &mut storage).unwrap();
    assert_eq!(rank, Some(1));
    let reloaded = Session::load(78, Tuning::default(), &storage);
    assert_eq!(reloaded.leaderboard.entries[0].name, "Bot");
    let _ = std::fs::remove_dir_all(&dir);
}
