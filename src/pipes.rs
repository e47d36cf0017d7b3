//! Pipe obstacles: timed pair spawning, scrolling, pruning and pass scoring.

use rand::Rng;
use tracing::debug;

use crate::bird::Bird;
use crate::config::PipeConfig;
use crate::geometry::{Bounds, time_scale};
use crate::hooks::Sprite;

/// One segment of a pair. Top segments hang from y=0; bottom ones stand
/// on the canvas floor.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub x: f64,
    pub y: f64,
    pub height: f64,
    pub is_top: bool,
    /// The bird's center has crossed this segment's right edge.
    pub passed: bool,
    /// Score was already credited for this segment.
    pub scored: bool,
}

/// The opening between a top and bottom segment spawned together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gap {
    pub x: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Gap {
    pub fn size(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> f64 {
        self.top + self.size() / 2.0
    }
}

#[derive(Debug)]
pub struct PipeField {
    pipes: Vec<Pipe>,
    pub speed: f64,
    pub pipe_width: f64,
    pub gap_size: f64,
    spawn_interval_ms: f64,
    edge_margin: f64,
    /// Time since the last spawn; `None` until the first one.
    since_spawn_ms: Option<f64>,
    canvas_width: f64,
    canvas_height: f64,
    sprite: Option<Sprite>,
}

impl PipeField {
    pub fn new(config: &PipeConfig, canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            pipes: Vec::new(),
            speed: config.speed,
            pipe_width: config.width,
            gap_size: config.gap,
            spawn_interval_ms: config.spawn_interval_ms,
            edge_margin: config.edge_margin,
            since_spawn_ms: None,
            canvas_width,
            canvas_height,
            sprite: None,
        }
    }

    /// Scroll, prune, and spawn a new pair once the interval has elapsed.
    ///
    /// `elapsed_ms` is the wall time this tick covers, taken from the same
    /// timestamps that produced `delta_time`.
    pub fn update<R: Rng>(&mut self, delta_time: f64, elapsed_ms: f64, rng: &mut R) {
        let step = self.speed * time_scale(delta_time);
        for pipe in &mut self.pipes {
            pipe.x -= step;
        }

        let width = self.pipe_width;
        self.pipes.retain(|p| p.x + width > 0.0);

        let due = match self.since_spawn_ms.as_mut() {
            None => true,
            Some(since) => {
                *since += elapsed_ms;
                *since > self.spawn_interval_ms
            }
        };
        if due {
            self.spawn_pair(rng);
            self.since_spawn_ms = Some(0.0);
        }
    }

    /// Push one top/bottom pair at the right edge with a random gap.
    pub fn spawn_pair<R: Rng>(&mut self, rng: &mut R) {
        let range = self.canvas_height - self.gap_size - self.edge_margin * 2.0;
        // Whole pixels keep `bottom.y - top.height == gap_size` exact.
        let gap_top = if range >= 1.0 {
            rng.gen_range(0.0..range).floor() + self.edge_margin
        } else {
            self.edge_margin
        };
        let gap_bottom = gap_top + self.gap_size;

        self.pipes.push(Pipe {
            x: self.canvas_width,
            y: 0.0,
            height: gap_top,
            is_top: true,
            passed: false,
            scored: false,
        });
        self.pipes.push(Pipe {
            x: self.canvas_width,
            y: gap_bottom,
            height: self.canvas_height - gap_bottom,
            is_top: false,
            passed: false,
            scored: false,
        });
        debug!(gap_top, gap_bottom, "spawned pipe pair");
    }

    /// Mark segments the bird has flown past and count newly scored ones.
    ///
    /// Both segments of a pair cross in the same tick, so one pair yields two.
    pub fn check_passed(&mut self, bird: &Bird) -> u32 {
        let bird_center = bird.center_x();
        let mut scored = 0;
        for pipe in &mut self.pipes {
            if !pipe.passed && pipe.x + self.pipe_width < bird_center {
                pipe.passed = true;
                if !pipe.scored {
                    pipe.scored = true;
                    scored += 1;
                }
            }
        }
        scored
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    pub fn pipe_bounds(&self, pipe: &Pipe) -> Bounds {
        Bounds::from_rect(pipe.x, pipe.y, self.pipe_width, pipe.height)
    }

    /// Does `bounds` touch any live segment?
    pub fn overlaps(&self, bounds: &Bounds) -> bool {
        self.pipes
            .iter()
            .any(|p| self.pipe_bounds(p).intersects(bounds))
    }

    /// Gaps of every well-formed consecutive top/bottom pair.
    pub fn gaps(&self) -> impl Iterator<Item = Gap> + '_ {
        self.pipes.chunks_exact(2).filter_map(|pair| {
            let (top, bottom) = (&pair[0], &pair[1]);
            (top.is_top && !bottom.is_top).then(|| Gap {
                x: top.x,
                top: top.height,
                bottom: bottom.y,
            })
        })
    }

    pub fn reset(&mut self) {
        self.pipes.clear();
        self.since_spawn_ms = None;
    }

    /// Adopt a new canvas size, dropping pairs that no longer fit.
    pub fn update_dimensions(&mut self, canvas_width: f64, canvas_height: f64) {
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;

        let width = self.pipe_width;
        let mut kept = Vec::with_capacity(self.pipes.len());
        for pair in self.pipes.chunks(2) {
            let fits = pair.iter().all(|p| {
                p.x + width > 0.0 && p.x <= canvas_width && p.y < canvas_height
            });
            if fits {
                kept.extend(pair.iter().cloned());
            }
        }
        for pipe in kept.iter_mut().filter(|p| !p.is_top) {
            pipe.height = canvas_height - pipe.y;
        }
        self.pipes = kept;
    }

    pub fn set_sprite(&mut self, sprite: Sprite) {
        self.sprite = Some(sprite);
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn push_pipe(&mut self, pipe: Pipe) {
        self.pipes.push(pipe);
    }

    #[cfg(test)]
    pub(crate) fn pipes_mut_for_test(&mut self) -> &mut [Pipe] {
        &mut self.pipes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BirdConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn create_test_rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(12345)
    }

    fn field() -> PipeField {
        PipeField::new(&PipeConfig::default(), 480.0, 800.0)
    }

    #[test]
    fn test_first_update_spawns_immediately() {
        let mut f = field();
        f.update(0.0, 0.0, &mut create_test_rng());
        assert_eq!(f.pipes().len(), 2);
    }

    #[test]
    fn test_spawn_produces_one_top_and_one_bottom() {
        let mut rng = create_test_rng();
        for _ in 0..200 {
            let mut f = field();
            f.spawn_pair(&mut rng);
            let pipes = f.pipes();
            assert_eq!(pipes.len(), 2);
            let (top, bottom) = (&pipes[0], &pipes[1]);
            assert!(top.is_top && !bottom.is_top);
            assert_eq!(top.x, bottom.x);
            assert_eq!(top.y, 0.0);
            assert_eq!(bottom.y - top.height, f.gap_size);
            assert!(top.height >= 50.0);
            assert!(bottom.y + 50.0 <= 800.0);
            assert_eq!(bottom.y + bottom.height, 800.0);
        }
    }

    #[test]
    fn test_spawn_waits_for_interval() {
        let mut f = field();
        let mut rng = create_test_rng();
        f.update(0.04, 16.0, &mut rng);
        assert_eq!(f.pipes().len(), 2);

        // 2500 ms exactly is not yet "more than" the interval.
        for _ in 0..156 {
            f.update(0.0, 16.0, &mut rng);
        }
        f.update(0.0, 4.0, &mut rng);
        assert_eq!(f.pipes().len(), 2);

        f.update(0.0, 1.0, &mut rng);
        assert_eq!(f.pipes().len(), 4);
    }

    #[test]
    fn test_scroll_uses_time_scale() {
        let mut f = field();
        let mut rng = create_test_rng();
        f.update(0.0, 0.0, &mut rng);
        let x0 = f.pipes()[0].x;
        f.update(1.0 / 60.0, 1000.0 / 60.0, &mut rng);
        assert!((f.pipes()[0].x - (x0 - 2.0)).abs() < 1e-9);
        // Stalled frame moves at most speed * 2.
        f.update(5.0, 2000.0, &mut rng);
        assert!((f.pipes()[0].x - (x0 - 6.0)).abs() < 1e-9);
    }

    #[test]
    fn test_offscreen_pipes_are_pruned() {
        let mut f = field();
        let mut rng = create_test_rng();
        f.spawn_pair(&mut rng);
        // 480 + 52 px to clear at 4 px per stalled tick.
        for _ in 0..140 {
            f.update(1.0, 0.0, &mut rng);
        }
        assert!(f.pipes().is_empty());
    }

    #[test]
    fn test_pass_scores_each_segment_once() {
        let mut f = field();
        let bird = Bird::new(&BirdConfig::default(), 480.0, 800.0);
        f.spawn_pair(&mut create_test_rng());
        assert_eq!(f.check_passed(&bird), 0);

        for p in &mut f.pipes {
            p.x = bird.center_x() - f.pipe_width - 1.0;
        }
        assert_eq!(f.check_passed(&bird), 2);
        assert_eq!(f.check_passed(&bird), 0);
        assert!(f.pipes().iter().all(|p| p.passed && p.scored));
    }

    #[test]
    fn test_passed_but_already_scored_does_not_rescore() {
        let mut f = field();
        let bird = Bird::new(&BirdConfig::default(), 480.0, 800.0);
        f.push_pipe(Pipe {
            x: 0.0,
            y: 0.0,
            height: 100.0,
            is_top: true,
            passed: false,
            scored: true,
        });
        assert_eq!(f.check_passed(&bird), 0);
        assert!(f.pipes()[0].passed);
    }

    #[test]
    fn test_gaps_pair_consecutive_segments() {
        let mut f = field();
        let mut rng = create_test_rng();
        f.spawn_pair(&mut rng);
        f.spawn_pair(&mut rng);
        let gaps: Vec<Gap> = f.gaps().collect();
        assert_eq!(gaps.len(), 2);
        for g in gaps {
            assert_eq!(g.size(), 320.0);
        }
    }

    #[test]
    fn test_reset_clears_and_rearms_spawn() {
        let mut f = field();
        let mut rng = create_test_rng();
        f.update(0.0, 0.0, &mut rng);
        f.reset();
        assert!(f.pipes().is_empty());
        f.update(0.0, 0.0, &mut rng);
        assert_eq!(f.pipes().len(), 2);
    }

    #[test]
    fn test_resize_prunes_out_of_bounds_pairs() {
        let mut f = field();
        let mut rng = create_test_rng();
        f.spawn_pair(&mut rng);
        for p in &mut f.pipes {
            p.x = 100.0;
        }
        f.spawn_pair(&mut rng); // at x = 480
        f.update_dimensions(300.0, 800.0);
        assert_eq!(f.pipes().len(), 2);
        assert_eq!(f.pipes()[0].x, 100.0);
    }

    #[test]
    fn test_resize_stretches_bottom_segment() {
        let mut f = field();
        let mut rng = create_test_rng();
        f.spawn_pair(&mut rng);
        f.update_dimensions(480.0, 900.0);
        let bottom = &f.pipes()[1];
        assert_eq!(bottom.y + bottom.height, 900.0);
    }
}
