//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per frame, fixed per-tick constants
//! - Seeded RNG only, passed in by the caller
//! - Stable iteration order (obstacles in spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod input;
pub mod state;
pub mod tick;

pub use collision::{Impact, centers_collide, find_impact};
pub use difficulty::{SpawnParams, SpawnRolls, spawn_interval, spawn_params};
pub use input::{Direction, InputSource, InputState, TickInput};
pub use state::{Bounds, GamePhase, Obstacle, Particle, Player, Star, World};
pub use tick::{TickConfig, TickReport, spawn_obstacle, tick};
