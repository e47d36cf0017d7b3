//! Fatal contact checks: ground, ceiling, and pipe segments.

use crate::bird::Bird;
use crate::pipes::PipeField;

#[derive(Debug, Clone)]
pub struct CollisionDetector {
    canvas_height: f64,
    ground_height: f64,
}

impl CollisionDetector {
    pub fn new(canvas_height: f64, ground_height: f64) -> Self {
        Self {
            canvas_height,
            ground_height,
        }
    }

    pub fn ground_top(&self) -> f64 {
        self.canvas_height - self.ground_height
    }

    /// True if the bird touches the ground, the ceiling, or any pipe.
    /// Touching edges count.
    pub fn check(&self, bird: &Bird, pipes: Option<&PipeField>) -> bool {
        let bounds = bird.bounds();

        if bounds.bottom >= self.ground_top() {
            return true;
        }
        if bounds.top <= 0.0 {
            return true;
        }

        pipes.is_some_and(|field| field.overlaps(&bounds))
    }

    pub fn update_dimensions(&mut self, canvas_height: f64) {
        self.canvas_height = canvas_height;
    }
}
