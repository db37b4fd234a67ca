//! Player-vs-obstacle collision detection
//!
//! A loose circle test on sprite centers. The radius is deliberately larger
//! than either half-size, so near misses that visually graze still count.

use glam::Vec2;

use super::state::{Obstacle, Player};
use crate::consts::COLLISION_RADIUS;

/// A detected hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Impact {
    /// Index of the obstacle that was hit
    pub obstacle: usize,
    /// Where to spawn the particle burst
    pub point: Vec2,
}

/// True when two centers are closer than the collision radius
#[inline]
pub fn centers_collide(a: Vec2, b: Vec2) -> bool {
    a.distance(b) < COLLISION_RADIUS
}

/// First obstacle (in spawn order) touching the player, if any.
///
/// Stops at the first hit: at most one impact per tick.
pub fn find_impact(player: &Player, obstacles: &[Obstacle]) -> Option<Impact> {
    let center = player.center();
    obstacles
        .iter()
        .position(|o| centers_collide(center, o.center()))
        .map(|obstacle| Impact {
            obstacle,
            point: center,
        })
}
