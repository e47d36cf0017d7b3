//! The player avatar: gravity, flaps, and the screen clamp.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::config::BirdConfig;
use crate::geometry::{Bounds, time_scale};
use crate::hooks::{Notifier, Sprite};

#[derive(Debug)]
pub struct Bird {
    pub x: f64,
    pub y: f64,
    pub velocity_y: f64,
    /// Tilt in radians, from -pi/4 (climbing) to pi/2 (diving).
    pub rotation: f64,
    pub width: f64,
    pub height: f64,
    pub gravity: f64,
    pub jump_impulse: f64,
    canvas_width: f64,
    canvas_height: f64,
    x_ratio: f64,
    reset_y_ratio: f64,
    sprite: Option<Sprite>,
    on_jump_sound: Notifier,
}

impl Bird {
    pub fn new(config: &BirdConfig, canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            x: canvas_width * config.x_ratio,
            y: canvas_height * config.spawn_y_ratio,
            velocity_y: 0.0,
            rotation: 0.0,
            width: config.width,
            height: config.height,
            gravity: config.gravity,
            jump_impulse: config.jump_impulse,
            canvas_width,
            canvas_height,
            x_ratio: config.x_ratio,
            reset_y_ratio: config.reset_y_ratio,
            sprite: None,
            on_jump_sound: Notifier::none(),
        }
    }

    pub fn update(&mut self, delta_time: f64) {
        let scale = time_scale(delta_time);

        self.velocity_y += self.gravity * scale;
        self.y += self.velocity_y * scale;
        self.rotation = (self.velocity_y * 0.1).clamp(-FRAC_PI_4, FRAC_PI_2);
        self.clamp_to_screen();
    }

    /// A flap replaces the current vertical speed outright.
    pub fn jump(&mut self) {
        self.velocity_y = self.jump_impulse;
        self.on_jump_sound.notify();
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_rect(self.x, self.y, self.width, self.height)
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn start_y(&self) -> f64 {
        self.canvas_height * self.reset_y_ratio
    }

    pub fn reset(&mut self) {
        self.y = self.start_y();
        self.velocity_y = 0.0;
        self.rotation = 0.0;
    }

    /// Follow a host resize: keep the same relative column and re-clamp.
    pub fn update_dimensions(&mut self, canvas_width: f64, canvas_height: f64) {
        self.canvas_width = canvas_width;
        self.canvas_height = canvas_height;
        self.x = canvas_width * self.x_ratio;
        self.clamp_to_screen();
    }

    pub fn set_sprite(&mut self, sprite: Sprite) {
        self.sprite = Some(sprite);
    }

    pub fn sprite(&self) -> Option<&Sprite> {
        self.sprite.as_ref()
    }

    pub fn set_jump_sound(&mut self, notifier: Notifier) {
        self.on_jump_sound = notifier;
    }

    fn clamp_to_screen(&mut self) {
        let max_y = (self.canvas_height - self.height).max(0.0);
        self.y = self.y.clamp(0.0, max_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    const W: f64 = 480.0;
    const H: f64 = 800.0;

    fn bird() -> Bird {
        Bird::new(&BirdConfig::default(), W, H)
    }

    #[test]
    fn test_new_bird_position() {
        let b = bird();
        assert!((b.x - 96.0).abs() < 1e-9);
        assert!((b.y - 720.0).abs() < 1e-9);
        assert_eq!(b.velocity_y, 0.0);
    }

    #[test]
    fn test_jump_then_one_frame_at_60fps() {
        let mut b = bird();
        let before = b.y;
        b.jump();
        b.update(1.0 / 60.0);
        assert!((b.velocity_y - (-7.8)).abs() < 1e-9);
        assert!((b.y - (before - 7.8)).abs() < 1e-9);
    }

    #[test]
    fn test_jump_overrides_any_velocity() {
        for v in [-30.0, -8.0, 0.0, 3.5, 250.0] {
            let mut b = bird();
            b.velocity_y = v;
            b.jump();
            assert_eq!(b.velocity_y, -8.0);
        }
    }

    #[test]
    fn test_jump_fires_sound_hook() {
        let flaps = Rc::new(Cell::new(0));
        let f = Rc::clone(&flaps);
        let mut b = bird();
        b.set_jump_sound(Notifier::new(move || f.set(f.get() + 1)));
        b.jump();
        b.jump();
        assert_eq!(flaps.get(), 2);
    }

    #[test]
    fn test_clamp_holds_for_huge_delta() {
        for dt in [0.0, 0.001, 1.0 / 60.0, 0.5, 10.0, 1e9] {
            let mut b = bird();
            for _ in 0..50 {
                b.update(dt);
                assert!(b.y >= 0.0 && b.y <= H - b.height, "dt={dt} y={}", b.y);
            }
            b.jump();
            for _ in 0..50 {
                b.update(dt);
                assert!(b.y >= 0.0 && b.y <= H - b.height, "dt={dt} y={}", b.y);
            }
        }
    }

    #[test]
    fn test_rotation_is_bounded() {
        let mut b = bird();
        b.velocity_y = 500.0;
        b.update(1.0 / 60.0);
        assert!((b.rotation - FRAC_PI_2).abs() < 1e-12);

        b.velocity_y = -500.0;
        b.update(1.0 / 60.0);
        assert!((b.rotation + FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn test_reset_restores_start() {
        let mut b = bird();
        b.jump();
        for _ in 0..20 {
            b.update(0.05);
        }
        b.reset();
        assert_eq!(b.y, 400.0);
        assert_eq!(b.velocity_y, 0.0);
        assert_eq!(b.rotation, 0.0);
    }

    #[test]
    fn test_bounds_follow_position() {
        let mut b = bird();
        b.y = 100.0;
        let r = b.bounds();
        assert_eq!(r.top, 100.0);
        assert_eq!(r.bottom, 134.0);
        assert_eq!(r.right - r.left, 48.0);
    }

    #[test]
    fn test_shrinking_canvas_reclamps() {
        let mut b = bird();
        b.update_dimensions(240.0, 400.0);
        assert!(b.y <= 400.0 - b.height);
        assert!((b.x - 48.0).abs() < 1e-9);
    }
}
