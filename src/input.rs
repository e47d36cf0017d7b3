//! Input tokens accepted by the game loop, and the host-side debouncer.

use std::str::FromStr;

/// The only gameplay input there is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Jump,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownInput(pub String);

impl std::fmt::Display for UnknownInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown input {:?}", self.0)
    }
}

impl std::error::Error for UnknownInput {}

/// Parses the wire name of an input, for hosts that receive inputs as text.
/// The terminal host maps keys to [`InputKind`] directly.
impl FromStr for InputKind {
    type Err = UnknownInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jump" => Ok(Self::Jump),
            other => Err(UnknownInput(other.to_string())),
        }
    }
}

/// Minimum gap between deliveries, to swallow duplicate press events.
pub const DEBOUNCE_MS: f64 = 100.0;

/// Drops presses that arrive within [`DEBOUNCE_MS`] of the last accepted one.
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    last_accepted_ms: Option<f64>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, now_ms: f64) -> bool {
        match self.last_accepted_ms {
            Some(last) if now_ms - last <= DEBOUNCE_MS => false,
            _ => {
                self.last_accepted_ms = Some(now_ms);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_only_jump() {
        assert_eq!("jump".parse::<InputKind>(), Ok(InputKind::Jump));
        assert!("Jump".parse::<InputKind>().is_err());
        assert!("flap".parse::<InputKind>().is_err());
    }

    #[test]
    fn test_debounce_swallows_duplicates() {
        let mut d = Debouncer::new();
        assert!(d.accept(1000.0));
        assert!(!d.accept(1050.0));
        assert!(!d.accept(1100.0));
        assert!(d.accept(1101.0));
        assert!(!d.accept(1150.0));
    }
}
