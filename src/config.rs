//! Tuning values for every entity in the simulation.
//!
//! Defaults reproduce the classic browser build (a 480x800 canvas). A host
//! may load overrides from JSON; any field left out keeps its default.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirdConfig {
    /// Horizontal position as a fraction of canvas width.
    pub x_ratio: f64,
    /// Vertical position on construction, as a fraction of canvas height.
    pub spawn_y_ratio: f64,
    /// Vertical position after `reset()`.
    pub reset_y_ratio: f64,
    pub width: f64,
    pub height: f64,
    pub gravity: f64,
    /// Velocity assigned on a flap (negative = upward).
    pub jump_impulse: f64,
}

impl Default for BirdConfig {
    fn default() -> Self {
        Self {
            x_ratio: 0.2,
            spawn_y_ratio: 0.9,
            reset_y_ratio: 0.5,
            width: 48.0,
            height: 34.0,
            gravity: 0.2,
            jump_impulse: -8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeConfig {
    pub speed: f64,
    pub spawn_interval_ms: f64,
    pub width: f64,
    pub gap: f64,
    /// Minimum distance between the gap and the top/bottom canvas edge.
    pub edge_margin: f64,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            spawn_interval_ms: 2500.0,
            width: 52.0,
            gap: 320.0,
            edge_margin: 50.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub size: f64,
    pub speed: f64,
    pub spawn_interval_ms: f64,
    /// Random placements tried when no pipe gap qualifies.
    pub max_attempts: u32,
    /// Extra room a gap must have beyond the token size.
    pub gap_margin: f64,
    /// Band excluded at the top and bottom for random placement.
    pub edge_margin: f64,
}

impl TokenConfig {
    pub fn bonus() -> Self {
        Self {
            size: 20.0,
            speed: 2.0,
            spawn_interval_ms: 1000.0,
            max_attempts: 15,
            gap_margin: 20.0,
            edge_margin: 50.0,
        }
    }

    pub fn anti_bonus() -> Self {
        Self {
            spawn_interval_ms: 4000.0,
            max_attempts: 10,
            ..Self::bonus()
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::bonus()
    }
}

/// A partially specified [`TokenConfig`], laid over a kind's own defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TokenOverrides {
    size: Option<f64>,
    speed: Option<f64>,
    spawn_interval_ms: Option<f64>,
    max_attempts: Option<u32>,
    gap_margin: Option<f64>,
    edge_margin: Option<f64>,
}

impl TokenOverrides {
    fn apply(self, base: TokenConfig) -> TokenConfig {
        TokenConfig {
            size: self.size.unwrap_or(base.size),
            speed: self.speed.unwrap_or(base.speed),
            spawn_interval_ms: self.spawn_interval_ms.unwrap_or(base.spawn_interval_ms),
            max_attempts: self.max_attempts.unwrap_or(base.max_attempts),
            gap_margin: self.gap_margin.unwrap_or(base.gap_margin),
            edge_margin: self.edge_margin.unwrap_or(base.edge_margin),
        }
    }
}

/// Missing anti-bonus fields fall back to [`TokenConfig::anti_bonus`], not
/// to the bonus values `TokenConfig::default` carries.
fn deserialize_anti_bonus<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<TokenConfig, D::Error> {
    TokenOverrides::deserialize(deserializer).map(|o| o.apply(TokenConfig::anti_bonus()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub height: f64,
    pub scroll_speed: f64,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            height: 50.0,
            scroll_speed: 2.0,
        }
    }
}

/// How a pipe crossing the bird turns into score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipeScoring {
    /// One point per pipe segment, so a top/bottom pair is worth two.
    #[default]
    PerPipe,
    /// One point per pair, however many segments cross in the tick.
    PerPair,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub bird: BirdConfig,
    pub pipes: PipeConfig,
    pub bonus: TokenConfig,
    #[serde(deserialize_with = "deserialize_anti_bonus")]
    pub anti_bonus: TokenConfig,
    pub anti_bonus_enabled: bool,
    pub ground: GroundConfig,
    pub cloud_count: usize,
    /// Divisor turning a timestamp difference (ms) into `delta_time`.
    pub delta_normalization_ms: f64,
    pub pipe_scoring: PipeScoring,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: 480.0,
            canvas_height: 800.0,
            bird: BirdConfig::default(),
            pipes: PipeConfig::default(),
            bonus: TokenConfig::bonus(),
            anti_bonus: TokenConfig::anti_bonus(),
            anti_bonus_enabled: true,
            ground: GroundConfig::default(),
            cloud_count: 5,
            delta_normalization_ms: 400.0,
            pipe_scoring: PipeScoring::PerPipe,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NonPositive { field: &'static str, value: f64 },
    GapDoesNotFit { gap: f64, margins: f64, canvas_height: f64 },
    JumpNotUpward { impulse: f64 },
    NoAttempts { field: &'static str },
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be positive (got {value})")
            }
            Self::GapDoesNotFit {
                gap,
                margins,
                canvas_height,
            } => write!(
                f,
                "pipe gap {gap} plus margins {margins} does not fit canvas height {canvas_height}"
            ),
            Self::JumpNotUpward { impulse } => {
                write!(f, "bird.jump_impulse must be negative (got {impulse})")
            }
            Self::NoAttempts { field } => write!(f, "{field} must allow at least one attempt"),
            Self::Parse(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl GameConfig {
    /// Parse a JSON document, then validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_json(&json)
            .with_context(|| format!("loading config {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positives = [
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("bird.width", self.bird.width),
            ("bird.height", self.bird.height),
            ("pipes.width", self.pipes.width),
            ("pipes.gap", self.pipes.gap),
            ("pipes.spawn_interval_ms", self.pipes.spawn_interval_ms),
            ("bonus.size", self.bonus.size),
            ("bonus.spawn_interval_ms", self.bonus.spawn_interval_ms),
            ("anti_bonus.size", self.anti_bonus.size),
            ("anti_bonus.spawn_interval_ms", self.anti_bonus.spawn_interval_ms),
            ("delta_normalization_ms", self.delta_normalization_ms),
        ];
        for (field, value) in positives {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        let margins = self.pipes.edge_margin * 2.0;
        if self.pipes.gap + margins > self.canvas_height {
            return Err(ConfigError::GapDoesNotFit {
                gap: self.pipes.gap,
                margins,
                canvas_height: self.canvas_height,
            });
        }
        if self.bird.jump_impulse >= 0.0 {
            return Err(ConfigError::JumpNotUpward {
                impulse: self.bird.jump_impulse,
            });
        }
        if self.bonus.max_attempts == 0 {
            return Err(ConfigError::NoAttempts {
                field: "bonus.max_attempts",
            });
        }
        if self.anti_bonus.max_attempts == 0 {
            return Err(ConfigError::NoAttempts {
                field: "anti_bonus.max_attempts",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_anti_bonus_spawns_less_often() {
        let config = GameConfig::default();
        assert!(config.anti_bonus.spawn_interval_ms > config.bonus.spawn_interval_ms);
        assert_eq!(config.bonus.max_attempts, 15);
        assert_eq!(config.anti_bonus.max_attempts, 10);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            GameConfig::from_json(r#"{"pipes": {"gap": 250.0}, "pipe_scoring": "per_pair"}"#)
                .expect("valid config");
        assert_eq!(config.pipes.gap, 250.0);
        assert_eq!(config.pipes.width, 52.0);
        assert_eq!(config.pipe_scoring, PipeScoring::PerPair);
        assert_eq!(config.bird, BirdConfig::default());
    }

    #[test]
    fn test_partial_anti_bonus_keeps_its_own_defaults() {
        let config = GameConfig::from_json(r#"{"anti_bonus": {"size": 24.0}}"#)
            .expect("valid config");
        assert_eq!(config.anti_bonus.size, 24.0);
        assert_eq!(config.anti_bonus.spawn_interval_ms, 4000.0);
        assert_eq!(config.anti_bonus.max_attempts, 10);
        assert_eq!(config.bonus, TokenConfig::bonus());

        let config = GameConfig::from_json(r#"{"bonus": {"max_attempts": 3}}"#)
            .expect("valid config");
        assert_eq!(config.bonus.max_attempts, 3);
        assert_eq!(config.bonus.spawn_interval_ms, 1000.0);
        assert_eq!(config.anti_bonus, TokenConfig::anti_bonus());
    }

    #[test]
    fn test_gap_must_fit_canvas() {
        let config = GameConfig {
            canvas_height: 300.0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GapDoesNotFit { .. })
        ));
    }

    #[test]
    fn test_rejects_downward_jump() {
        let mut config = GameConfig::default();
        config.bird.jump_impulse = 3.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::JumpNotUpward { impulse: 3.0 })
        );
    }

    #[test]
    fn test_rejects_garbage_json() {
        assert!(matches!(
            GameConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
