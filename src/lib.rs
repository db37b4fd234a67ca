//! Star Dodge - an embeddable obstacle-dodging arcade mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (input, entities, difficulty, collisions)
//! - `renderer`: Stateless drawing onto a 2D surface
//! - `session`: Idle/Running/Over state machine and HUD projection
//! - `highscores`: High score persistence behind a storage port
//! - `platform`: Browser glue (canvas, listeners, frame loop)

pub mod error;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{SessionError, StorageError};
pub use highscores::{MemoryScoreStore, ScoreStore};
pub use session::{HudState, Session};
pub use settings::Settings;

/// Game tuning constants
pub mod consts {
    /// Player sprite size (CSS pixels)
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 44.0;
    /// Gap between the player's feet and the bottom edge
    pub const PLAYER_BOTTOM_MARGIN: f32 = 24.0;
    /// Left edge of the playable band; the right edge is `width - PLAYER_WIDTH - 1`
    pub const PLAYER_MIN_X: f32 = 10.0;
    /// Target-x change per held direction per tick
    pub const PLAYER_STEP: f32 = 14.0;
    /// Fraction of the remaining distance covered each tick
    pub const PLAYER_SMOOTHING: f32 = 0.25;

    /// Obstacle square size
    pub const OBSTACLE_SIZE: f32 = 35.0;

    /// Center distance below which the player is hit
    pub const COLLISION_RADIUS: f32 = 30.0;

    /// Score span of one level
    pub const LEVEL_SPAN: u32 = 40;
    /// Score at which obstacles turn aggressive
    pub const AGGRESSIVE_SCORE: u32 = 100;

    /// Particles per impact burst
    pub const PARTICLE_BURST: usize = 25;
    /// Life lost per tick
    pub const PARTICLE_DECAY: f32 = 0.025;

    /// Screen shake applied on impact, and its per-tick decay
    pub const SHAKE_ON_IMPACT: f32 = 20.0;
    pub const SHAKE_DECAY: f32 = 0.85;
    /// Shake below this is snapped to zero
    pub const SHAKE_EPSILON: f32 = 0.05;

    /// Default starfield size
    pub const STAR_COUNT: usize = 70;

    /// HUD projection refresh period while running
    pub const HUD_SYNC_MS: f64 = 100.0;
}

/// Level for a given score: one level per `LEVEL_SPAN` points, starting at 1
#[inline]
pub fn level_for_score(score: u32) -> u32 {
    score / consts::LEVEL_SPAN + 1
}
