//! Axis-aligned rectangles and the shared integration step.

/// Largest per-tick multiplier, so a stalled frame cannot teleport anything.
pub const MAX_TIME_SCALE: f64 = 2.0;

/// Per-tick motion multiplier: `delta_time * 60`, capped at [`MAX_TIME_SCALE`].
pub fn time_scale(delta_time: f64) -> f64 {
    (delta_time * 60.0).min(MAX_TIME_SCALE)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Bounds {
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            left: x,
            right: x + width,
            top: y,
            bottom: y + height,
        }
    }

    /// Edge-inclusive overlap: touching rectangles count as intersecting.
    /// Only a rectangle lying strictly to one side of the other misses.
    pub fn intersects(&self, other: &Bounds) -> bool {
        !(self.left > other.right
            || self.right < other.left
            || self.top > other.bottom
            || self.bottom < other.top)
    }
}
