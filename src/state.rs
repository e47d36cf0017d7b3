//! Round lifecycle: `Start -> Playing -> GameOver -> Start`.

use std::fmt;

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameState {
    #[default]
    Start,
    Playing,
    GameOver,
}

impl GameState {
    /// Whether `self -> next` is one of the allowed edges.
    pub fn can_transition_to(self, next: GameState) -> bool {
        matches!(
            (self, next),
            (Self::Start, Self::Playing)
                | (Self::Playing, Self::GameOver)
                | (Self::GameOver, Self::Start)
        )
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Playing => write!(f, "playing"),
            Self::GameOver => write!(f, "gameOver"),
        }
    }
}

type Observer = Box<dyn FnMut(GameState, GameState)>;

/// The current state plus whoever wants to hear about changes.
#[derive(Default)]
pub struct StateMachine {
    current: GameState,
    observers: Vec<Observer>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> GameState {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.current == GameState::Playing
    }

    /// Observers receive `(from, to)` after every accepted transition.
    pub fn subscribe(&mut self, observer: impl FnMut(GameState, GameState) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Move to `next` if the edge exists. Staying put is accepted silently;
    /// any other edge is refused and leaves the state unchanged.
    pub fn transition(&mut self, next: GameState) -> bool {
        let from = self.current;
        if from == next {
            return true;
        }
        if !from.can_transition_to(next) {
            warn!(%from, to = %next, "refused state transition");
            return false;
        }

        self.current = next;
        info!(%from, to = %next, "state transition");
        for observer in &mut self.observers {
            observer(from, next);
        }
        true
    }
}

impl fmt::Debug for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current)
            .field("observers", &self.observers.len())
            .finish()
    }
}
