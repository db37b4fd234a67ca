//! Difficulty scheduling
//!
//! Pure functions of score and level. The only randomness is a
//! [`SpawnRolls`] drawn once per spawn, so callers can inject exact draws.

use rand::Rng;

use crate::consts::AGGRESSIVE_SCORE;

/// Slowest spawn cadence reachable by level alone
const MIN_INTERVAL: i64 = 8;
/// Floor once obstacles turn aggressive
const MIN_AGGRESSIVE_INTERVAL: i64 = 4;
/// Max extra speed added to each obstacle
const SPEED_JITTER: f32 = 3.0;
/// Full width of the rotation-speed range
const SPIN_RANGE: f32 = 0.1;
const AGGRESSIVE_SPIN_RANGE: f32 = 0.3;

/// Whether obstacles spawned at `score` are aggressive
#[inline]
pub fn is_aggressive(score: u32) -> bool {
    score >= AGGRESSIVE_SCORE
}

/// Ticks between spawns
pub fn spawn_interval(score: u32, level: u32) -> u64 {
    let interval = (45 - i64::from(level) * 8).max(MIN_INTERVAL);
    let interval = if is_aggressive(score) {
        (interval - 20).max(MIN_AGGRESSIVE_INTERVAL)
    } else {
        interval
    };
    interval as u64
}

/// True on ticks that should spawn an obstacle
pub fn should_spawn(tick_count: u64, score: u32, level: u32) -> bool {
    tick_count % spawn_interval(score, level) == 0
}

pub fn speed_multiplier(score: u32, level: u32) -> f32 {
    if is_aggressive(score) {
        2.2
    } else {
        1.0 + level.saturating_sub(1) as f32 * 0.22
    }
}

/// Fall speed before jitter
pub fn base_speed(score: u32, level: u32) -> f32 {
    (5.0 + level as f32 * 0.7) * speed_multiplier(score, level)
}

/// Uniform `[0, 1)` draws consumed by one spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRolls {
    /// Horizontal position within the spawn range
    pub x: f32,
    /// Extra speed, scaled to `[0, 3)`
    pub jitter: f32,
    /// Initial rotation, scaled to a full turn
    pub rotation: f32,
    /// Rotation speed, centered on zero
    pub spin: f32,
}

impl SpawnRolls {
    pub fn draw(rng: &mut impl Rng) -> Self {
        Self {
            x: rng.random(),
            jitter: rng.random(),
            rotation: rng.random(),
            spin: rng.random(),
        }
    }
}

/// Motion parameters for a new obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnParams {
    pub speed: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub aggressive: bool,
}

pub fn spawn_params(score: u32, level: u32, rolls: &SpawnRolls) -> SpawnParams {
    let aggressive = is_aggressive(score);
    let spin_range = if aggressive {
        AGGRESSIVE_SPIN_RANGE
    } else {
        SPIN_RANGE
    };
    SpawnParams {
        speed: base_speed(score, level) + rolls.jitter * SPEED_JITTER,
        rotation: rolls.rotation * std::f32::consts::TAU,
        rotation_speed: (rolls.spin - 0.5) * spin_range,
        aggressive,
    }
}
