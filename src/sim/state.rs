//! Entity store and core simulation types
//!
//! One [`World`] is created per session start and dropped when the session
//! returns to idle. Score and level live here and are only written by the tick.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::level_for_score;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Pre-start screen
    Idle,
    /// Active gameplay
    Running,
    /// Player was hit
    Over,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Running => "running",
            GamePhase::Over => "over",
        }
    }
}

/// Drawing surface size in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Leftmost player x
    pub fn player_min_x(&self) -> f32 {
        PLAYER_MIN_X
    }

    /// Rightmost player x (never left of the minimum on tiny surfaces)
    pub fn player_max_x(&self) -> f32 {
        (self.width - PLAYER_WIDTH - 1.0).max(PLAYER_MIN_X)
    }

    /// Player y: standing on the bottom edge
    pub fn ground_y(&self) -> f32 {
        (self.height - PLAYER_HEIGHT - PLAYER_BOTTOM_MARGIN).max(0.0)
    }

    /// Horizontal spawn range for an obstacle's left edge
    pub fn obstacle_x_range(&self) -> (f32, f32) {
        let max = (self.width - OBSTACLE_SIZE - PLAYER_MIN_X).max(PLAYER_MIN_X);
        (PLAYER_MIN_X, max)
    }
}

/// The player sprite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Where input wants the player to be
    pub target_x: f32,
    /// Fraction of the remaining distance covered each tick
    pub smoothing: f32,
}

impl Player {
    /// Centered on the ground line
    pub fn new(bounds: &Bounds) -> Self {
        let x = ((bounds.width - PLAYER_WIDTH) / 2.0)
            .clamp(bounds.player_min_x(), bounds.player_max_x());
        Self {
            pos: Vec2::new(x, bounds.ground_y()),
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            target_x: x,
            smoothing: PLAYER_SMOOTHING,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Nudge the target by one step per held direction
    pub fn steer(&mut self, left: bool, right: bool, bounds: &Bounds) {
        if left {
            self.target_x -= PLAYER_STEP;
        }
        if right {
            self.target_x += PLAYER_STEP;
        }
        self.target_x = self
            .target_x
            .clamp(bounds.player_min_x(), bounds.player_max_x());
    }

    /// Exponential approach toward the target, then clamp
    pub fn follow_target(&mut self, bounds: &Bounds) {
        self.pos.x += (self.target_x - self.pos.x) * self.smoothing;
        self.clamp_to(bounds);
    }

    /// Pull the player (and its target) back inside `bounds`
    pub fn clamp_to(&mut self, bounds: &Bounds) {
        let (min, max) = (bounds.player_min_x(), bounds.player_max_x());
        self.pos.x = self.pos.x.clamp(min, max);
        self.target_x = self.target_x.clamp(min, max);
        self.pos.y = bounds.ground_y();
    }
}

/// A falling, spinning obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Top-left corner of the unrotated square
    pub pos: Vec2,
    pub size: f32,
    /// Downward pixels per tick (> 0)
    pub speed: f32,
    /// Radians
    pub rotation: f32,
    /// Radians per tick
    pub rotation_speed: f32,
    /// Spawned at or past the aggressive score
    pub aggressive: bool,
}

impl Obstacle {
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    pub fn advance(&mut self) {
        self.pos.y += self.speed;
        self.rotation += self.rotation_speed;
    }

    /// Fully below the bottom edge
    pub fn has_exited(&self, bounds: &Bounds) -> bool {
        self.pos.y > bounds.height
    }
}

/// Impact particle colors (RGBA)
pub const PARTICLE_COLORS: [[f32; 4]; 4] = [
    [1.0, 0.42, 0.21, 1.0],
    [1.0, 0.82, 0.25, 1.0],
    [0.96, 0.26, 0.36, 1.0],
    [1.0, 1.0, 1.0, 1.0],
];

/// A cosmetic spark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 1.0 at spawn, dead at 0.0
    pub life: f32,
    pub color: [f32; 4],
    pub radius: f32,
}

impl Particle {
    /// Random direction and speed out of `origin`
    pub fn spark(origin: Vec2, rng: &mut impl Rng) -> Self {
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let speed: f32 = rng.random_range(2.0..9.0);
        Self {
            pos: origin,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            life: 1.0,
            color: PARTICLE_COLORS[rng.random_range(0..PARTICLE_COLORS.len())],
            radius: rng.random_range(2.0..5.0),
        }
    }

    /// Dead once `life` reaches zero, give or take f32 rounding
    pub fn is_alive(&self) -> bool {
        self.life > PARTICLE_DECAY * 1e-3
    }

    pub fn advance(&mut self) {
        self.pos += self.vel;
        self.life -= PARTICLE_DECAY;
    }
}

/// A background star, scrolling downward forever
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
}

impl Star {
    pub fn random(bounds: &Bounds, rng: &mut impl Rng) -> Self {
        Self {
            pos: Vec2::new(
                rng.random::<f32>() * bounds.width,
                rng.random::<f32>() * bounds.height,
            ),
            size: rng.random_range(0.5..2.0),
            speed: rng.random_range(0.3..1.5),
        }
    }

    /// Scroll at twice the star's speed, wrapping to the top
    pub fn advance(&mut self, bounds: &Bounds) {
        self.pos.y += self.speed * 2.0;
        if self.pos.y > bounds.height {
            self.pos.y = 0.0;
        }
    }
}

/// Everything one session simulates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub bounds: Bounds,
    pub player: Player,
    /// Ordered by id (spawn order)
    pub obstacles: Vec<Obstacle>,
    pub particles: Vec<Particle>,
    pub stars: Vec<Star>,
    pub score: u32,
    pub level: u32,
    /// Simulation tick counter
    pub tick_count: u64,
    /// Current screen shake magnitude
    pub shake: f32,
    /// Set on the tick the player is hit; later ticks are no-ops
    pub crashed: bool,
    next_id: u32,
}

impl World {
    /// Fresh world: player centered, no obstacles, random starfield
    pub fn new(bounds: Bounds, star_count: usize, rng: &mut impl Rng) -> Self {
        let stars = (0..star_count).map(|_| Star::random(&bounds, rng)).collect();
        Self {
            bounds,
            player: Player::new(&bounds),
            obstacles: Vec::new(),
            particles: Vec::new(),
            stars,
            score: 0,
            level: 1,
            tick_count: 0,
            shake: 0.0,
            crashed: false,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Award one point per obstacle that left the screen
    pub fn add_score(&mut self, points: u32) {
        self.score += points;
        self.level = level_for_score(self.score);
    }

    /// New surface size; positions are clamped, never rescaled
    pub fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.player.clamp_to(&bounds);
    }

    /// Emit an impact burst of `count` sparks
    pub fn burst(&mut self, origin: Vec2, count: usize, rng: &mut impl Rng) {
        self.particles
            .extend((0..count).map(|_| Particle::spark(origin, rng)));
    }

    pub fn decay_shake(&mut self) {
        self.shake *= SHAKE_DECAY;
        if self.shake < SHAKE_EPSILON {
            self.shake = 0.0;
        }
    }

    /// Move particles and drop the dead ones
    pub fn age_particles(&mut self) {
        for particle in &mut self.particles {
            particle.advance();
        }
        self.particles.retain(Particle::is_alive);
    }

    /// Cosmetic-only step (runs after a crash too)
    pub fn settle_effects(&mut self) {
        self.decay_shake();
        self.age_particles();
    }

    /// No shake and no live particles
    pub fn effects_settled(&self) -> bool {
        self.shake == 0.0 && self.particles.is_empty()
    }
}
