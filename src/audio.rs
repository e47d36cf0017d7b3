//! Short synthesized effects for the sound hooks.
//!
//! Each effect is rendered once at startup from a `fundsp` oscillator into a
//! sample buffer, then replayed through a detached `rodio` sink.

use anyhow::Result;
use fundsp::prelude::*;
use rodio::{OutputStream, OutputStreamBuilder, Sink, buffer::SamplesBuffer};

const SAMPLE_RATE: u32 = 44_100;

pub struct Audio {
    stream: OutputStream,
    jump: Vec<f32>,
    hit: Vec<f32>,
    score: Vec<f32>,
}

impl Audio {
    /// Open the default output device and pre-render every effect.
    pub fn open() -> Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        stream.log_on_drop(false);
        Ok(Self {
            stream,
            jump: jump_samples(),
            hit: hit_samples(),
            score: score_samples(),
        })
    }

    pub fn play_jump(&self) {
        self.play(&self.jump);
    }

    pub fn play_hit(&self) {
        self.play(&self.hit);
    }

    pub fn play_score(&self) {
        self.play(&self.score);
    }

    fn play(&self, samples: &[f32]) {
        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples.to_vec()));
        sink.detach();
    }
}

/// Rising chirp.
fn jump_samples() -> Vec<f32> {
    let mut out = tone(Box::new(sine_hz::<f32>(520.0)), 0.06, 0.12);
    out.extend(tone(Box::new(sine_hz::<f32>(780.0)), 0.06, 0.12));
    out
}

/// Low buzz.
fn hit_samples() -> Vec<f32> {
    let mut out = tone(Box::new(saw_hz(220.0)), 0.15, 0.15);
    out.extend(tone(Box::new(saw_hz(90.0)), 0.35, 0.15));
    out
}

/// Two bright blips.
fn score_samples() -> Vec<f32> {
    let mut out = tone(Box::new(square_hz(988.0)), 0.05, 0.06);
    out.extend(tone(Box::new(square_hz(1319.0)), 0.12, 0.06));
    out
}

/// Render `seconds` of `unit` with a linear fade from `volume` to silence.
fn tone(mut unit: Box<dyn AudioUnit>, seconds: f32, volume: f32) -> Vec<f32> {
    unit.set_sample_rate(f64::from(SAMPLE_RATE));
    unit.reset();
    let n = (seconds * SAMPLE_RATE as f32) as usize;
    (0..n)
        .map(|i| {
            let fade = 1.0 - i as f32 / n as f32;
            unit.get_mono() as f32 * volume * fade
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effects_fade_to_silence() {
        for samples in [jump_samples(), hit_samples(), score_samples()] {
            assert!(!samples.is_empty());
            assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= 0.2));
            assert!(samples.last().is_some_and(|s| s.abs() < 0.01));
        }
    }
}
