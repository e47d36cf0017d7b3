//! Half-block terminal renderer. Every terminal cell holds two vertically
//! stacked pixels; the world is drawn in canvas units scaled to pixel rows.

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use std::io::{self, Write};

use flappy_bonus::bird::Bird;
use flappy_bonus::leaderboard::ScoreEntry;
use flappy_bonus::pipes::PipeField;
use flappy_bonus::scenery::{Background, Ground};
use flappy_bonus::tokens::{TokenField, TokenKind};
use flappy_bonus::{Frame, GameState};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    const fn dim(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }
}

const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const CLOUD: Rgb = Rgb(245, 250, 255);
const GRASS: Rgb = Rgb(84, 168, 55);
const GRASS_LIGHT: Rgb = Rgb(110, 200, 70);
const DIRT: Rgb = Rgb(210, 185, 110);
const DIRT_DARK: Rgb = Rgb(185, 160, 90);
const PANEL: Rgb = Rgb(220, 195, 120);
const GOLD: Rgb = Rgb(255, 215, 0);
const BLACK: Rgb = Rgb(10, 10, 10);
const RED: Rgb = Rgb(230, 30, 30);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);

/// Palette attached to the bird as its sprite.
#[derive(Debug, Clone, Copy)]
pub struct BirdSkin {
    pub body: Rgb,
    pub highlight: Rgb,
    pub wing: Rgb,
    pub eye: Rgb,
    pub pupil: Rgb,
    pub beak: Rgb,
    pub beak_highlight: Rgb,
}

impl Default for BirdSkin {
    fn default() -> Self {
        Self {
            body: Rgb(245, 200, 66),
            highlight: Rgb(255, 225, 100),
            wing: Rgb(215, 165, 35),
            eye: WHITE,
            pupil: Rgb(20, 20, 20),
            beak: Rgb(225, 75, 35),
            beak_highlight: Rgb(240, 110, 50),
        }
    }
}

/// Palette attached to the pipe field as its sprite.
#[derive(Debug, Clone, Copy)]
pub struct PipeSkin {
    pub left: Rgb,
    pub mid: Rgb,
    pub right: Rgb,
    pub highlight: Rgb,
    pub cap_edge: Rgb,
}

impl Default for PipeSkin {
    fn default() -> Self {
        Self {
            left: Rgb(74, 122, 26),
            mid: Rgb(100, 170, 40),
            right: Rgb(115, 191, 46),
            highlight: Rgb(145, 215, 62),
            cap_edge: Rgb(60, 100, 20),
        }
    }
}

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![SKY_TOP; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY_TOP);
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, c: Rgb) {
        let (x0, x1) = ((cx - r).floor() as i32, (cx + r).ceil() as i32);
        let (y0, y1) = ((cy - r).floor() as i32, (cy + r).ceil() as i32);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let (dx, dy) = (x as f64 + 0.5 - cx, y as f64 + 0.5 - cy);
                if dx * dx + dy * dy <= r * r {
                    self.set(x, y, c);
                }
            }
        }
    }

    fn darken(&mut self) {
        for c in &mut self.px {
            *c = c.dim();
        }
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = Rgb(0, 0, 0);
        let mut prev_bg = Rgb(0, 0, 0);
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if need_bg || prev_bg != bot {
                    queue!(out, style::SetBackgroundColor(term_color(bot)))?;
                    prev_bg = bot;
                    need_bg = false;
                }
                if top == bot {
                    queue!(out, style::Print(' '))?;
                    continue;
                }
                if need_fg || prev_fg != top {
                    queue!(out, style::SetForegroundColor(term_color(top)))?;
                    prev_fg = top;
                    need_fg = false;
                }
                queue!(out, style::Print('\u{2580}'))?; // ▀
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn term_color(c: Rgb) -> CColor {
    CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── 3x5 bitmap digits ──────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

fn draw_digit(buf: &mut PixelBuf, x: i32, y: i32, d: usize, fg: Rgb) {
    for (i, _) in DIGITS[d].iter().enumerate().filter(|(_, on)| **on == 1) {
        let (px, py) = (x + (i % 3) as i32, y + (i / 3) as i32);
        buf.set(px + 1, py + 1, SHADOW);
        buf.set(px, py, fg);
    }
}

/// Centered on `cx`, 4px per digit.
fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u32, fg: Rgb) {
    let s = n.to_string();
    let start_x = cx - (s.len() as i32 * 4 - 1) / 2;
    for (i, ch) in s.bytes().enumerate() {
        draw_digit(buf, start_x + i as i32 * 4, y, usize::from(ch - b'0'), fg);
    }
}

// ── World ───────────────────────────────────────────────────────────────────

/// Pixels per canvas unit, fitted to the buffer height.
fn scale_for(buf: &PixelBuf, frame: &Frame<'_>) -> f64 {
    buf.h as f64 / frame.world.canvas_height.max(1.0)
}

/// Draw the whole scene for one frame.
pub fn draw_frame(buf: &mut PixelBuf, frame: &Frame<'_>) {
    let s = scale_for(buf, frame);
    let world = frame.world;

    draw_sky(buf, (world.ground.y * s) as usize);
    draw_clouds(buf, &world.background, s);
    if let Some(pipes) = &world.pipes {
        draw_pipes(buf, pipes, s);
    }
    for field in world.token_fields() {
        draw_tokens(buf, field, s);
    }
    draw_ground(buf, &world.ground, s);
    draw_bird(buf, &world.bird, s);

    if frame.state == GameState::Playing {
        let cx = buf.w as i32 / 2;
        draw_number(buf, cx, 4, frame.score, WHITE);
    }
}

fn draw_sky(buf: &mut PixelBuf, sky_h: usize) {
    let sky_h = sky_h.min(buf.h);
    for y in 0..buf.h {
        let c = if y < sky_h {
            Rgb::lerp(SKY_TOP, SKY_BOT, ((y * 256) / sky_h.max(1)) as u16)
        } else {
            SKY_BOT
        };
        for x in 0..buf.w {
            buf.set(x as i32, y as i32, c);
        }
    }
}

fn draw_clouds(buf: &mut PixelBuf, background: &Background, s: f64) {
    for cloud in background.clouds() {
        let (x, y, r) = (cloud.x * s, cloud.y * s, cloud.size * s / 2.0);
        buf.fill_circle(x, y, r, CLOUD);
        buf.fill_circle(x + r, y + r * 0.3, r * 0.7, CLOUD);
        buf.fill_circle(x - r, y + r * 0.3, r * 0.6, CLOUD);
    }
}

fn draw_pipes(buf: &mut PixelBuf, pipes: &PipeField, s: f64) {
    let skin = pipes
        .sprite()
        .and_then(|sprite| sprite.downcast_ref::<PipeSkin>())
        .copied()
        .unwrap_or_default();
    let pw = (pipes.pipe_width * s).round().max(2.0) as i32;
    let cap_extra = (pw / 6).max(1);
    let cap_h = ((pipes.pipe_width * 0.4) * s).round().max(2.0) as i32;

    for pipe in pipes.pipes() {
        let px = (pipe.x * s).round() as i32;
        let top = (pipe.y * s).round() as i32;
        let bottom = ((pipe.y + pipe.height) * s).round() as i32;

        for x in 0..pw {
            let c = pipe_shade(&skin, x, pw);
            for y in top..bottom {
                buf.set(px + x, y, c);
            }
        }

        // The cap sits on the gap-facing end.
        let cap_y = if pipe.is_top { bottom - cap_h } else { top };
        for x in -cap_extra..(pw + cap_extra) {
            let c = pipe_shade(&skin, x + cap_extra, pw + cap_extra * 2);
            for y in cap_y..cap_y + cap_h {
                buf.set(px + x, y, c);
            }
            buf.set(px + x, cap_y, skin.cap_edge);
            buf.set(px + x, cap_y + cap_h - 1, skin.cap_edge);
        }
    }
}

fn pipe_shade(skin: &PipeSkin, x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return skin.mid;
    }
    let t = (x as f64 / (total_w - 1) as f64 * 256.0) as u16;
    if t < 64 {
        Rgb::lerp(skin.left, skin.mid, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(skin.mid, skin.highlight, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(skin.highlight, skin.right, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(skin.right, skin.left, ((t - 160) * 3).min(256))
    }
}

/// Bonus: gold disc with a white highlight. Anti-bonus: black disc with a
/// red X.
fn draw_tokens(buf: &mut PixelBuf, field: &TokenField, s: f64) {
    let r = (field.size * s / 2.0).max(1.5);
    for token in field.active() {
        let cx = (token.x + field.size / 2.0) * s;
        let cy = (token.y + field.size / 2.0) * s;
        match field.kind() {
            TokenKind::Bonus => {
                buf.fill_circle(cx, cy, r, GOLD);
                buf.set((cx - r / 2.0) as i32, (cy - r / 2.0) as i32, WHITE);
            }
            TokenKind::AntiBonus => {
                buf.fill_circle(cx, cy, r, BLACK);
                let arm = (r * 0.6).round().max(1.0) as i32;
                let (x, y) = (cx as i32, cy as i32);
                for d in -arm..=arm {
                    buf.set(x + d, y + d, RED);
                    buf.set(x + d, y - d, RED);
                }
            }
        }
    }
}

fn draw_ground(buf: &mut PixelBuf, ground: &Ground, s: f64) {
    let gy = (ground.y * s).round() as i32;
    let shift = (-ground.offset * s) as i32;
    for x in 0..buf.w as i32 {
        let alt = ((x + shift) / 3) % 2 == 0;
        buf.set(x, gy, if alt { GRASS } else { GRASS_LIGHT });
        buf.set(x, gy + 1, GRASS);
    }
    for y in (gy + 2)..buf.h as i32 {
        for x in 0..buf.w as i32 {
            let stripe = (x + shift + (y - gy) * 2).rem_euclid(12) < 6;
            buf.set(x, y, if stripe { DIRT } else { DIRT_DARK });
        }
    }
}

fn draw_bird(buf: &mut PixelBuf, bird: &Bird, s: f64) {
    let skin = bird
        .sprite()
        .and_then(|sprite| sprite.downcast_ref::<BirdSkin>())
        .copied()
        .unwrap_or_default();
    let x = (bird.x * s).round() as i32;
    let y = (bird.y * s).round() as i32;
    let w = (bird.width * s).round().max(4.0) as i32;
    let h = (bird.height * s).round().max(3.0) as i32;

    // Rotation shows as the beak and wing dropping when diving.
    let tilt = (bird.rotation / std::f64::consts::FRAC_PI_4).round() as i32;
    let wing_up = bird.velocity_y < 0.0;

    buf.fill_rect(x, y, w, h, skin.body);
    buf.fill_rect(x + 1, y, w - 2, 1, skin.highlight);

    let wing_y = if wing_up { y + h / 2 - 1 } else { y + h / 2 + 1 };
    buf.fill_rect(x, wing_y + tilt, (w / 2).max(1), (h / 3).max(1), skin.wing);

    let eye = (w / 5).max(1);
    let (ex, ey) = (x + w - eye - 1, y + 1);
    buf.fill_rect(ex, ey, eye, eye, skin.eye);
    buf.set(ex + eye - 1, ey + eye - 1, skin.pupil);

    let beak_w = (w / 3).max(1);
    let beak_y = y + h / 2 + tilt;
    buf.fill_rect(x + w, beak_y, beak_w, 1, skin.beak_highlight);
    buf.fill_rect(x + w, beak_y + 1, beak_w, 1, skin.beak);
}

// ── Screens ─────────────────────────────────────────────────────────────────

/// Title blocks, one token of each kind, and the stored top scores.
pub fn draw_start_screen(buf: &mut PixelBuf, best: u32, top: &[ScoreEntry]) {
    let cx = buf.w as i32 / 2;
    let cy = buf.h as i32 / 5;
    let skin = BirdSkin::default();

    let text = "FLAPPY";
    let char_w = 4;
    let char_h = 6;
    let sx = cx - text.len() as i32 * char_w / 2;
    for i in 0..text.len() as i32 {
        let bx = sx + i * char_w;
        buf.fill_rect(bx, cy, char_w - 1, char_h, skin.body);
        buf.fill_rect(bx, cy, char_w - 1, 1, skin.highlight);
    }

    let icons_y = (cy + char_h + 5) as f64;
    buf.fill_circle(cx as f64 - 5.0, icons_y, 2.0, GOLD);
    buf.set(cx - 6, icons_y as i32 - 1, WHITE);
    buf.fill_circle(cx as f64 + 5.0, icons_y, 2.0, BLACK);
    buf.set(cx + 5, icons_y as i32, RED);

    let list_y = icons_y as i32 + 6;
    draw_scores_panel(buf, cx, list_y, best, top);
}

/// Dim the finished round and show its score over the top scores.
pub fn draw_game_over(buf: &mut PixelBuf, score: u32, best: u32, top: &[ScoreEntry]) {
    buf.darken();
    let cx = buf.w as i32 / 2;
    let py = buf.h as i32 / 5;
    buf.fill_rect(cx - 10, py - 2, 21, 10, SHADOW);
    buf.fill_rect(cx - 9, py - 1, 19, 8, PANEL);
    draw_number(buf, cx, py + 1, score, WHITE);
    draw_scores_panel(buf, cx, py + 12, best, top);
}

fn draw_scores_panel(buf: &mut PixelBuf, cx: i32, y: i32, best: u32, top: &[ScoreEntry]) {
    let rows = top.len().max(1) as i32;
    let panel_h = rows * 7 + 4;
    buf.fill_rect(cx - 11, y - 1, 23, panel_h + 2, SHADOW);
    buf.fill_rect(cx - 10, y, 21, panel_h, DIRT);
    buf.fill_rect(cx - 9, y + 1, 19, panel_h - 2, PANEL);

    if top.is_empty() {
        draw_number(buf, cx, y + 2, best, GOLD);
        return;
    }
    for (i, entry) in top.iter().enumerate() {
        let fg = if i == 0 { GOLD } else { WHITE };
        draw_number(buf, cx, y + 2 + i as i32 * 7, entry.score, fg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flappy_bonus::config::TokenConfig;
    use flappy_bonus::{GameConfig, GameLoop};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pixel_count(buf: &PixelBuf, c: Rgb) -> usize {
        buf.px.iter().filter(|p| **p == c).count()
    }

    fn draw_one_token(kind: TokenKind, config: &TokenConfig) -> PixelBuf {
        let mut field = TokenField::new(kind, config, 480.0, 800.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(field.spawn(None, &mut rng).is_some());
        // Tokens spawn at the right edge, so leave room past x = 480.
        let mut buf = PixelBuf::new(130, 200);
        draw_tokens(&mut buf, &field, 0.25);
        buf
    }

    #[test]
    fn test_bonus_is_gold_with_highlight() {
        let buf = draw_one_token(TokenKind::Bonus, &TokenConfig::bonus());
        assert!(pixel_count(&buf, GOLD) > 0);
        assert_eq!(pixel_count(&buf, WHITE), 1);
        assert_eq!(pixel_count(&buf, RED), 0);
    }

    #[test]
    fn test_anti_bonus_is_black_with_red_cross() {
        let buf = draw_one_token(TokenKind::AntiBonus, &TokenConfig::anti_bonus());
        assert!(pixel_count(&buf, BLACK) > 0);
        assert!(pixel_count(&buf, RED) > 0);
        assert_eq!(pixel_count(&buf, GOLD), 0);
    }

    #[test]
    fn test_draw_frame_covers_buffer() {
        let mut game = GameLoop::with_rng(&GameConfig::default(), ChaCha8Rng::seed_from_u64(3));
        game.reset();
        game.start(0.0);
        game.tick(0.0);
        let unpainted = Rgb(1, 2, 3);
        let mut buf = PixelBuf::new(60, 100);
        buf.px.iter_mut().for_each(|p| *p = unpainted);
        let frame = Frame {
            world: game.world(),
            state: game.state(),
            score: game.score(),
        };
        draw_frame(&mut buf, &frame);
        assert_eq!(pixel_count(&buf, unpainted), 0);
    }

    #[test]
    fn test_half_block_output() {
        let mut buf = PixelBuf::new(2, 2);
        buf.set(0, 0, WHITE);
        let mut out = Vec::new();
        buf.render(&mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains('\u{2580}'));
    }
}
