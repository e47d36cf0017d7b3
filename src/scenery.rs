//! Ground strip and drifting clouds. Neither affects scoring; the ground
//! height feeds the collision detector.

use rand::Rng;

use crate::config::GroundConfig;
use crate::geometry::Bounds;

#[derive(Debug, Clone)]
pub struct Ground {
    pub height: f64,
    pub y: f64,
    /// Texture scroll, in `(-canvas_width, 0]`.
    pub offset: f64,
    scroll_speed: f64,
    canvas_width: f64,
    canvas_height: f64,
}

impl Ground {
    pub fn new(config: &GroundConfig, canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            height: config.height,
            y: canvas_height - config.height,
            offset: 0.0,
            scroll_speed: config.scroll_speed,
            canvas_width,
            canvas_height,
        }
    }

    pub fn update(&mut self) {
        self.offset -= self.scroll_speed;
        if self.offset <= -self.canvas_width {
            self.offset = 0.0;
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            left: 0.0,
            right: self.canvas_width,
            top: self.y,
            bottom: self.canvas_height,
        }
    }

    pub fn update_dimensions(&mut self, canvas_width: f64, canvas_height: f64) {
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
        self.y = canvas_height - self.height;
        if self.offset <= -canvas_width {
            self.offset = 0.0;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cloud {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub size: f64,
}

#[derive(Debug, Clone)]
pub struct Background {
    clouds: Vec<Cloud>,
    canvas_width: f64,
    canvas_height: f64,
}

impl Background {
    pub fn new<R: Rng>(count: usize, canvas_width: f64, canvas_height: f64, rng: &mut R) -> Self {
        let clouds = (0..count)
            .map(|_| Cloud {
                x: rng.gen_range(0.0..canvas_width.max(1.0)),
                y: rng.gen_range(0.0..(canvas_height * 0.6).max(1.0)),
                speed: rng.gen_range(0.5..1.0),
                size: rng.gen_range(30.0..70.0),
            })
            .collect();
        Self {
            clouds,
            canvas_width,
            canvas_height,
        }
    }

    /// Drift left; a cloud that fully leaves re-enters from the right.
    pub fn update<R: Rng>(&mut self, rng: &mut R) {
        let band = (self.canvas_height * 0.6).max(1.0);
        for cloud in &mut self.clouds {
            cloud.x -= cloud.speed;
            if cloud.x + cloud.size < 0.0 {
                cloud.x = self.canvas_width + cloud.size;
                cloud.y = rng.gen_range(0.0..band);
            }
        }
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    pub fn update_dimensions<R: Rng>(
        &mut self,
        canvas_width: f64,
        canvas_height: f64,
        rng: &mut R,
    ) {
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
        let band = (canvas_height * 0.6).max(1.0);
        for cloud in &mut self.clouds {
            if cloud.x - cloud.size > canvas_width || cloud.y > band {
                cloud.x = rng.gen_range(0.0..canvas_width.max(1.0));
                cloud.y = rng.gen_range(0.0..band);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_ground_sits_on_canvas_floor() {
        let ground = Ground::new(&GroundConfig::default(), 480.0, 800.0);
        assert_eq!(ground.y, 750.0);
        assert_eq!(ground.bounds().bottom, 800.0);
    }

    #[test]
    fn test_ground_offset_wraps() {
        let mut ground = Ground::new(&GroundConfig::default(), 10.0, 800.0);
        for _ in 0..4 {
            ground.update();
        }
        assert_eq!(ground.offset, -8.0);
        ground.update();
        assert_eq!(ground.offset, 0.0);
    }

    #[test]
    fn test_ground_follows_resize() {
        let mut ground = Ground::new(&GroundConfig::default(), 480.0, 800.0);
        ground.update_dimensions(480.0, 600.0);
        assert_eq!(ground.y, 550.0);
    }

    #[test]
    fn test_clouds_stay_in_upper_band_and_recycle() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut bg = Background::new(5, 480.0, 800.0, &mut rng);
        assert_eq!(bg.clouds().len(), 5);
        for _ in 0..2000 {
            bg.update(&mut rng);
            for c in bg.clouds() {
                assert!(c.y < 480.0);
                assert!(c.x + c.size >= -1.0);
                assert!(c.x <= 480.0 + 70.0);
            }
        }
    }
}
