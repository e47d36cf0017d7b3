//! The orchestrator: owns every entity, runs one tick per display refresh,
//! keeps score and drives the round state machine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::bird::Bird;
use crate::collision::CollisionDetector;
use crate::config::{GameConfig, PipeScoring};
use crate::hooks::Notifier;
use crate::input::InputKind;
use crate::pipes::PipeField;
use crate::scenery::{Background, Ground};
use crate::state::{GameState, StateMachine};
use crate::tokens::{TokenEffect, TokenField, TokenKind};

/// Every entity the simulation owns. Fields other than the bird, ground
/// and background are optional; a missing one is skipped each tick.
#[derive(Debug)]
pub struct World {
    pub bird: Bird,
    pub pipes: Option<PipeField>,
    pub bonus: Option<TokenField>,
    pub anti_bonus: Option<TokenField>,
    pub ground: Ground,
    pub background: Background,
    pub collision: CollisionDetector,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

impl World {
    pub fn new<R: Rng>(config: &GameConfig, rng: &mut R) -> Self {
        let (w, h) = (config.canvas_width, config.canvas_height);
        Self {
            bird: Bird::new(&config.bird, w, h),
            pipes: Some(PipeField::new(&config.pipes, w, h)),
            bonus: Some(TokenField::new(TokenKind::Bonus, &config.bonus, w, h)),
            anti_bonus: config
                .anti_bonus_enabled
                .then(|| TokenField::new(TokenKind::AntiBonus, &config.anti_bonus, w, h)),
            ground: Ground::new(&config.ground, w, h),
            background: Background::new(config.cloud_count, w, h, rng),
            collision: CollisionDetector::new(h, config.ground.height),
            canvas_width: w,
            canvas_height: h,
        }
    }

    /// Token fields in draw order (bonus first).
    pub fn token_fields(&self) -> impl Iterator<Item = &TokenField> {
        self.bonus.iter().chain(self.anti_bonus.iter())
    }
}

/// Read-only snapshot handed to the render callback.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub world: &'a World,
    pub state: GameState,
    pub score: u32,
}

/// What happened during one `update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// Points earned from pipes under the configured [`PipeScoring`].
    pub pipe_points: u32,
    pub bonuses_collected: u32,
    pub anti_bonuses_collected: u32,
    pub collided: bool,
}

impl TickEvents {
    pub fn points(&self) -> u32 {
        self.pipe_points + self.bonuses_collected
    }
}

/// Sound effects fired by the loop itself. The flap sound lives on the bird.
#[derive(Debug, Default)]
pub struct SoundHooks {
    pub on_hit: Notifier,
    pub on_score: Notifier,
}

type RenderCallback = Box<dyn FnMut(&Frame<'_>)>;

pub struct GameLoop<R = StdRng> {
    world: World,
    machine: StateMachine,
    score: u32,
    running: bool,
    last_timestamp_ms: Option<f64>,
    delta_normalization_ms: f64,
    pipe_scoring: PipeScoring,
    hooks: SoundHooks,
    on_render: Option<RenderCallback>,
    rng: R,
}

impl GameLoop<StdRng> {
    /// Seeded from `config.seed`, or from OS entropy when there is none.
    pub fn new(config: &GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> GameLoop<R> {
    pub fn with_rng(config: &GameConfig, mut rng: R) -> Self {
        Self {
            world: World::new(config, &mut rng),
            machine: StateMachine::new(),
            score: 0,
            running: false,
            last_timestamp_ms: None,
            delta_normalization_ms: config.delta_normalization_ms,
            pipe_scoring: config.pipe_scoring,
            hooks: SoundHooks::default(),
            on_render: None,
            rng,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn state(&self) -> GameState {
        self.machine.current()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// True between `start()` and `stop()`: the host should keep scheduling
    /// frames.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn hooks_mut(&mut self) -> &mut SoundHooks {
        &mut self.hooks
    }

    pub fn set_render_callback(&mut self, render: impl FnMut(&Frame<'_>) + 'static) {
        self.on_render = Some(Box::new(render));
    }

    /// Observers hear `(from, to)` for every accepted state change.
    pub fn subscribe(&mut self, observer: impl FnMut(GameState, GameState) + 'static) {
        self.machine.subscribe(observer);
    }

    /// Begin a round. `now_ms` becomes the integration baseline.
    pub fn start(&mut self, now_ms: f64) -> bool {
        if !self.machine.transition(GameState::Playing) {
            return false;
        }
        self.running = true;
        self.last_timestamp_ms = Some(now_ms);
        true
    }

    /// End the round. No further tick runs until the next `start`.
    pub fn stop(&mut self) {
        self.running = false;
        if self.machine.transition(GameState::GameOver) {
            info!(score = self.score, "round over");
        }
    }

    /// Return everything to its pre-round condition. Refused mid-round.
    pub fn reset(&mut self) -> bool {
        if self.machine.is_playing() {
            warn!("reset refused while a round is in progress");
            return false;
        }

        self.score = 0;
        let world = &mut self.world;
        world.bird.reset();
        if let Some(pipes) = world.pipes.as_mut() {
            pipes.reset();
        }
        if let Some(bonus) = world.bonus.as_mut() {
            bonus.reset();
        }
        if let Some(anti) = world.anti_bonus.as_mut() {
            anti.reset();
        }
        self.last_timestamp_ms = None;
        self.running = false;
        self.machine.transition(GameState::Start)
    }

    /// One display refresh. Returns whether another frame should be scheduled.
    pub fn tick(&mut self, timestamp_ms: f64) -> bool {
        if !self.running {
            return false;
        }

        let last = self.last_timestamp_ms.unwrap_or(timestamp_ms);
        let delta_time = ((timestamp_ms - last) / self.delta_normalization_ms).max(0.0);
        self.last_timestamp_ms = Some(timestamp_ms);

        self.update(delta_time);
        self.render();
        self.running
    }

    /// Advance every entity by `delta_time`, then resolve collisions and
    /// scoring. Does nothing outside of `Playing`.
    pub fn update(&mut self, delta_time: f64) -> TickEvents {
        let mut events = TickEvents::default();
        if !self.machine.is_playing() {
            return events;
        }

        let elapsed_ms = delta_time * self.delta_normalization_ms;
        let world = &mut self.world;
        let rng = &mut self.rng;

        world.bird.update(delta_time);
        if let Some(pipes) = world.pipes.as_mut() {
            pipes.update(delta_time, elapsed_ms, rng);
        }
        if let Some(bonus) = world.bonus.as_mut() {
            bonus.update(delta_time, elapsed_ms, world.pipes.as_ref(), rng);
        }
        if let Some(anti) = world.anti_bonus.as_mut() {
            anti.update(delta_time, elapsed_ms, world.pipes.as_ref(), rng);
        }
        world.ground.update();
        world.background.update(rng);

        if world.collision.check(&world.bird, world.pipes.as_ref()) {
            events.collided = true;
            self.hooks.on_hit.notify();
            self.stop();
        }

        let world = &mut self.world;
        if let Some(pipes) = world.pipes.as_mut() {
            let segments = pipes.check_passed(&world.bird);
            events.pipe_points = match self.pipe_scoring {
                PipeScoring::PerPipe => segments,
                PipeScoring::PerPair => segments.div_ceil(2),
            };
        }

        for field in [world.bonus.as_mut(), world.anti_bonus.as_mut()]
            .into_iter()
            .flatten()
        {
            let collected = field.check_collision(&world.bird);
            match field.kind().effect() {
                TokenEffect::Reward => events.bonuses_collected += collected,
                TokenEffect::Hazard => events.anti_bonuses_collected += collected,
            }
        }

        for _ in 0..events.points() {
            self.award_point();
        }
        if events != TickEvents::default() {
            debug!(?events, score = self.score, "tick");
        }
        events
    }

    /// Flap, but only mid-round.
    pub fn handle_input(&mut self, input: InputKind) {
        if !self.machine.is_playing() {
            return;
        }
        match input {
            InputKind::Jump => self.world.bird.jump(),
        }
    }

    /// Follow a host resize across every entity.
    pub fn update_dimensions(&mut self, canvas_width: f64, canvas_height: f64) {
        let world = &mut self.world;
        world.canvas_width = canvas_width;
        world.canvas_height = canvas_height;
        world.bird.update_dimensions(canvas_width, canvas_height);
        if let Some(pipes) = world.pipes.as_mut() {
            pipes.update_dimensions(canvas_width, canvas_height);
        }
        if let Some(bonus) = world.bonus.as_mut() {
            bonus.update_dimensions(canvas_width, canvas_height);
        }
        if let Some(anti) = world.anti_bonus.as_mut() {
            anti.update_dimensions(canvas_width, canvas_height);
        }
        world.ground.update_dimensions(canvas_width, canvas_height);
        world
            .background
            .update_dimensions(canvas_width, canvas_height, &mut self.rng);
        world.collision.update_dimensions(canvas_height);
        debug!(canvas_width, canvas_height, "resized");
    }

    /// Hand the current frame to the render callback, if any.
    pub fn render(&mut self) {
        if let Some(render) = self.on_render.as_mut() {
            render(&Frame {
                world: &self.world,
                state: self.machine.current(),
                score: self.score,
            });
        }
    }

    fn award_point(&mut self) {
        self.score += 1;
        self.hooks.on_score.notify();
    }
}
