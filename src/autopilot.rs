//! A gap-following bot and a headless runner built on it.

use rand::Rng;
use tracing::info;

use crate::config::GameConfig;
use crate::game_loop::{GameLoop, World};
use crate::input::InputKind;
use crate::state::GameState;

/// Flaps whenever the bird sinks below a line just above the floor of the
/// next gap.
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Distance above the gap bottom at which to flap.
    pub clearance: f64,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self { clearance: 40.0 }
    }
}

impl Autopilot {
    /// The height the bird's bottom edge should stay above.
    pub fn target_line(&self, world: &World) -> f64 {
        let bird = &world.bird;
        let next_gap = world
            .pipes
            .as_ref()
            .and_then(|pipes| pipes.gaps().find(|gap| gap.x + pipes.pipe_width >= bird.x));
        match next_gap {
            Some(gap) => gap.bottom - self.clearance,
            None => world.canvas_height / 2.0,
        }
    }

    pub fn decide(&self, world: &World) -> Option<InputKind> {
        let bird = &world.bird;
        let sinking = bird.velocity_y >= 0.0;
        (sinking && bird.bounds().bottom > self.target_line(world)).then_some(InputKind::Jump)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationReport {
    pub frames: u32,
    pub score: u32,
    pub bonuses: u32,
    pub anti_bonuses: u32,
    pub game_over: bool,
}

/// Refresh interval the headless runner pretends to have.
pub const FRAME_MS: f64 = 1000.0 / 60.0;

/// Play one round with the autopilot at a steady 60 Hz until the bird
/// crashes or `max_frames` elapse.
pub fn simulate<R: Rng>(config: &GameConfig, rng: R, max_frames: u32) -> SimulationReport {
    let mut game = GameLoop::with_rng(config, rng);
    let pilot = Autopilot::default();
    let mut report = SimulationReport {
        frames: 0,
        score: 0,
        bonuses: 0,
        anti_bonuses: 0,
        game_over: false,
    };

    game.reset();
    game.start(0.0);
    let mut last_ms = 0.0;
    while report.frames < max_frames && game.is_running() {
        report.frames += 1;
        let now_ms = f64::from(report.frames) * FRAME_MS;

        if let Some(input) = pilot.decide(game.world()) {
            game.handle_input(input);
        }
        let delta_time = (now_ms - last_ms) / config.delta_normalization_ms;
        last_ms = now_ms;
        let events = game.update(delta_time);
        report.bonuses += events.bonuses_collected;
        report.anti_bonuses += events.anti_bonuses_collected;
    }

    report.score = game.score();
    report.game_over = game.state() == GameState::GameOver;
    info!(?report, "simulation finished");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_flaps_only_when_sinking_below_line() {
        let mut game = GameLoop::with_rng(&GameConfig::default(), ChaCha8Rng::seed_from_u64(1));
        game.world_mut().pipes = None;
        let pilot = Autopilot::default();

        game.world_mut().bird.y = 600.0;
        game.world_mut().bird.velocity_y = 1.0;
        assert_eq!(pilot.decide(game.world()), Some(InputKind::Jump));

        game.world_mut().bird.velocity_y = -3.0;
        assert_eq!(pilot.decide(game.world()), None);

        game.world_mut().bird.y = 100.0;
        game.world_mut().bird.velocity_y = 1.0;
        assert_eq!(pilot.decide(game.world()), None);
    }

    #[test]
    fn test_simulation_respects_frame_budget() {
        let report = simulate(&GameConfig::default(), ChaCha8Rng::seed_from_u64(42), 120);
        assert!(report.frames <= 120);
        assert!(report.game_over || report.frames == 120);
    }

    #[test]
    fn test_simulation_is_deterministic_per_seed() {
        let a = simulate(&GameConfig::default(), ChaCha8Rng::seed_from_u64(9), 600);
        let b = simulate(&GameConfig::default(), ChaCha8Rng::seed_from_u64(9), 600);
        assert_eq!(a, b);
    }
}
