//! Collectible tokens: gold bonuses worth a point and black hazard markers.
//!
//! Both kinds share one field implementation; they differ only in their
//! [`TokenConfig`] and in the [`TokenEffect`] the game loop applies when the
//! bird touches one.
//!
//! Placement prefers the open gap of a live pipe pair so a token is always
//! reachable. When no gap qualifies, a bounded number of random positions is
//! tried and the spawn is skipped if every one of them touches a pipe.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::bird::Bird;
use crate::config::TokenConfig;
use crate::geometry::{Bounds, time_scale};
use crate::pipes::PipeField;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Bonus,
    AntiBonus,
}

/// What touching a token does to the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenEffect {
    /// Adds one point.
    Reward,
    /// Consumed without scoring.
    Hazard,
}

impl TokenKind {
    pub fn effect(&self) -> TokenEffect {
        match self {
            Self::Bonus => TokenEffect::Reward,
            Self::AntiBonus => TokenEffect::Hazard,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bonus => "bonus",
            Self::AntiBonus => "anti-bonus",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub x: f64,
    pub y: f64,
    pub collected: bool,
}

#[derive(Debug)]
pub struct TokenField {
    kind: TokenKind,
    tokens: Vec<Token>,
    pub size: f64,
    pub speed: f64,
    spawn_interval_ms: f64,
    max_attempts: u32,
    gap_margin: f64,
    edge_margin: f64,
    since_spawn_ms: Option<f64>,
    canvas_width: f64,
    canvas_height: f64,
}

impl TokenField {
    pub fn new(
        kind: TokenKind,
        config: &TokenConfig,
        canvas_width: f64,
        canvas_height: f64,
    ) -> Self {
        Self {
            kind,
            tokens: Vec::new(),
            size: config.size,
            speed: config.speed,
            spawn_interval_ms: config.spawn_interval_ms,
            max_attempts: config.max_attempts,
            gap_margin: config.gap_margin,
            edge_margin: config.edge_margin,
            since_spawn_ms: None,
            canvas_width,
            canvas_height,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn update<R: Rng>(
        &mut self,
        delta_time: f64,
        elapsed_ms: f64,
        pipes: Option<&PipeField>,
        rng: &mut R,
    ) {
        let step = self.speed * time_scale(delta_time);
        for token in &mut self.tokens {
            token.x -= step;
        }

        let size = self.size;
        self.tokens.retain(|t| !t.collected && t.x + size > 0.0);

        let due = match self.since_spawn_ms.as_mut() {
            None => true,
            Some(since) => {
                *since += elapsed_ms;
                *since > self.spawn_interval_ms
            }
        };
        if due {
            self.spawn(pipes, rng);
            self.since_spawn_ms = Some(0.0);
        }
    }

    /// Try to place one token at the right edge. Returns its y if placed.
    pub fn spawn<R: Rng>(&mut self, pipes: Option<&PipeField>, rng: &mut R) -> Option<f64> {
        let y = match self.find_gap_position(pipes, rng) {
            Some(y) => Some(y),
            None => self.find_random_position(pipes, rng),
        };

        match y {
            Some(y) => {
                self.tokens.push(Token {
                    x: self.canvas_width,
                    y,
                    collected: false,
                });
                debug!(kind = self.kind.name(), y, "spawned token");
            }
            None => debug!(
                kind = self.kind.name(),
                attempts = self.max_attempts,
                "no free position, skipping spawn"
            ),
        }
        y
    }

    /// A jittered y inside a randomly chosen pipe gap that has room to spare.
    pub fn find_gap_position<R: Rng>(&self, pipes: Option<&PipeField>, rng: &mut R) -> Option<f64> {
        let pipes = pipes?;
        let x = self.canvas_width;

        let candidates: Vec<f64> = pipes
            .gaps()
            .filter(|gap| gap.size() > self.size + self.gap_margin)
            .map(|gap| {
                let slack = gap.size() - self.size - self.gap_margin;
                let offset = rng.gen_range(-0.5..0.5_f64) * slack;
                gap.center() - self.size / 2.0 + offset
            })
            .filter(|&y| !self.is_occupied(Some(pipes), x, y))
            .collect();

        candidates.choose(rng).copied()
    }

    /// Up to `max_attempts` random heights outside the edge bands; the first
    /// one clear of every pipe wins.
    pub fn find_random_position<R: Rng>(
        &self,
        pipes: Option<&PipeField>,
        rng: &mut R,
    ) -> Option<f64> {
        let x = self.canvas_width;
        let range = self.canvas_height - self.edge_margin * 2.0 - self.size;

        (0..self.max_attempts)
            .map(|_| {
                if range > 0.0 {
                    rng.gen_range(0.0..range) + self.edge_margin
                } else {
                    self.edge_margin
                }
            })
            .find(|&y| !self.is_occupied(pipes, x, y))
    }

    pub fn is_occupied(&self, pipes: Option<&PipeField>, x: f64, y: f64) -> bool {
        pipes.is_some_and(|p| p.overlaps(&self.token_bounds_at(x, y)))
    }

    pub fn token_bounds(&self, token: &Token) -> Bounds {
        self.token_bounds_at(token.x, token.y)
    }

    fn token_bounds_at(&self, x: f64, y: f64) -> Bounds {
        Bounds::from_rect(x, y, self.size, self.size)
    }

    /// Collect every live token the bird touches. Returns how many.
    pub fn check_collision(&mut self, bird: &Bird) -> u32 {
        let bird_bounds = bird.bounds();
        let size = self.size;
        let mut collected = 0;
        for token in self.tokens.iter_mut().filter(|t| !t.collected) {
            if Bounds::from_rect(token.x, token.y, size, size).intersects(&bird_bounds) {
                token.collected = true;
                collected += 1;
            }
        }
        collected
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Tokens still worth drawing or colliding with.
    pub fn active(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| !t.collected)
    }

    pub fn reset(&mut self) {
        self.tokens.clear();
        self.since_spawn_ms = None;
    }

    pub fn update_dimensions(&mut self, canvas_width: f64, canvas_height: f64) {
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
        let size = self.size;
        self.tokens.retain(|t| {
            t.x + size > 0.0 && t.x <= canvas_width && t.y + size <= canvas_height
        });
    }

    #[cfg(test)]
    pub(crate) fn push_token(&mut self, token: Token) {
        self.tokens.push(token);
    }
}
