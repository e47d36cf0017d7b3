use std::cell::RefCell;
use std::rc::Rc;

use flappy_bonus::autopilot;
use flappy_bonus::{GameConfig, GameLoop, GameState, InputKind, TickEvents};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// One tick per 60 Hz refresh in loop time.
const TICK_MS: f64 = 1000.0 / 60.0;

fn create_game(seed: u64) -> GameLoop<ChaCha8Rng> {
    GameLoop::with_rng(&GameConfig::default(), ChaCha8Rng::seed_from_u64(seed))
}

/// Let the bird drop until the round ends. Returns the final timestamp.
fn play_until_crash(game: &mut GameLoop<ChaCha8Rng>, mut now: f64) -> f64 {
    for _ in 0..5000 {
        if !game.tick(now) {
            break;
        }
        now += TICK_MS;
    }
    now
}

#[test]
fn test_rounds_restart_cleanly() {
    let mut game = create_game(11);
    let start_y = game.world().bird.start_y();
    let mut now = 0.0;

    for _ in 0..3 {
        assert!(game.reset());
        assert_eq!(game.score(), 0);
        assert_eq!(game.world().bird.y, start_y);
        assert_eq!(game.world().bird.velocity_y, 0.0);
        assert!(game.world().pipes.as_ref().is_some_and(|p| p.pipes().is_empty()));

        assert!(game.start(now));
        now = play_until_crash(&mut game, now);
        assert_eq!(game.state(), GameState::GameOver);
        assert!(!game.is_running());
    }
}

#[test]
fn test_input_after_crash_is_ignored() {
    let mut game = create_game(4);
    game.reset();
    game.start(0.0);
    play_until_crash(&mut game, 0.0);

    let (y, velocity_y) = (game.world().bird.y, game.world().bird.velocity_y);
    game.handle_input(InputKind::Jump);
    assert_eq!(game.world().bird.velocity_y, velocity_y);
    assert_eq!(game.update(0.1), TickEvents::default());
    assert_eq!(game.world().bird.y, y);
}

#[test]
fn test_observers_see_full_cycle() {
    let mut game = create_game(8);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    game.subscribe(move |from, to| log.borrow_mut().push((from, to)));

    game.reset();
    game.start(0.0);
    play_until_crash(&mut game, 0.0);
    game.reset();

    assert_eq!(
        *seen.borrow(),
        vec![
            (GameState::Start, GameState::Playing),
            (GameState::Playing, GameState::GameOver),
            (GameState::GameOver, GameState::Start),
        ]
    );
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.json");
    std::fs::write(&path, r#"{"pipes": {"gap": 200.0}, "anti_bonus_enabled": false}"#).unwrap();

    let config = GameConfig::load(&path).unwrap();
    assert_eq!(config.pipes.gap, 200.0);
    assert_eq!(config.bird.gravity, 0.2);

    let game = GameLoop::with_rng(&config, ChaCha8Rng::seed_from_u64(1));
    assert!(game.world().anti_bonus.is_none());
    assert!(game.world().bonus.is_some());
}

#[test]
fn test_autopilot_outlasts_free_fall() {
    let config = GameConfig::default();
    let mut game = create_game(21);
    game.reset();
    game.start(0.0);
    let mut frames = 0;
    while game.is_running() && frames < 5000 {
        frames += 1;
        game.tick(f64::from(frames) * TICK_MS);
    }

    let report = autopilot::simulate(&config, ChaCha8Rng::seed_from_u64(21), 5000);
    assert!(report.frames > frames);
}
