//! Flappy Bonus: a Flappy Bird style arcade simulation with collectible
//! bonus tokens and hazard tokens placed inside pipe gaps.
//!
//! The library holds the simulation core (entities, collision, the game
//! loop and its state machine) plus host-side services that sit around it
//! (leaderboard, autopilot). Rendering, audio and input capture belong to
//! the binary.

pub mod autopilot;
pub mod bird;
pub mod collision;
pub mod config;
pub mod game_loop;
pub mod geometry;
pub mod hooks;
pub mod input;
pub mod leaderboard;
pub mod pipes;
pub mod scenery;
pub mod state;
pub mod tokens;

pub use config::GameConfig;
pub use game_loop::{Frame, GameLoop, TickEvents, World};
pub use input::InputKind;
pub use state::GameState;
