//! Per-frame simulation tick
//!
//! Core game loop step: steer, move, scroll, score, spawn, collide, age
//! particles. One call per display frame.

use glam::Vec2;
use rand::Rng;

use super::collision::{Impact, find_impact};
use super::difficulty::{SpawnRolls, should_spawn, spawn_params};
use super::input::TickInput;
use super::state::{Obstacle, World};
use crate::consts::*;

/// Per-session knobs taken from settings
#[derive(Debug, Clone, Copy)]
pub struct TickConfig {
    /// Emit an impact burst on collision
    pub particles: bool,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self { particles: true }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Obstacles that left the bottom edge (one point each)
    pub exited: u32,
    /// ID of the obstacle spawned this tick
    pub spawned: Option<u32>,
    /// Set on the tick the player is hit
    pub impact: Option<Impact>,
}

impl TickReport {
    pub fn crashed(&self) -> bool {
        self.impact.is_some()
    }
}

/// Advance the world by one tick.
///
/// Does nothing once the world has crashed; use [`World::settle_effects`]
/// to let the burst play out.
pub fn tick(
    world: &mut World,
    input: &TickInput,
    rng: &mut impl Rng,
    config: &TickConfig,
) -> TickReport {
    let mut report = TickReport::default();
    if world.crashed {
        return report;
    }

    world.tick_count += 1;
    world.decay_shake();

    // Steer, then ease toward the target
    let bounds = world.bounds;
    world.player.steer(input.left, input.right, &bounds);
    world.player.follow_target(&bounds);

    // Fall and scroll
    for obstacle in &mut world.obstacles {
        obstacle.advance();
    }
    for star in &mut world.stars {
        star.advance(&bounds);
    }

    // Score obstacles that made it past the player
    let before = world.obstacles.len();
    world.obstacles.retain(|o| !o.has_exited(&bounds));
    report.exited = (before - world.obstacles.len()) as u32;
    if report.exited > 0 {
        world.add_score(report.exited);
    }

    if should_spawn(world.tick_count, world.score, world.level) {
        let rolls = SpawnRolls::draw(rng);
        report.spawned = Some(spawn_obstacle(world, &rolls));
    }

    if let Some(impact) = find_impact(&world.player, &world.obstacles) {
        if config.particles {
            world.burst(impact.point, PARTICLE_BURST, rng);
        }
        world.shake = SHAKE_ON_IMPACT;
        world.crashed = true;
        report.impact = Some(impact);
        log::debug!(
            "Hit by obstacle {} at score {}",
            world.obstacles[impact.obstacle].id,
            world.score
        );
    }

    world.age_particles();
    report
}

/// Append an obstacle just above the top edge, parameterized by difficulty
pub fn spawn_obstacle(world: &mut World, rolls: &SpawnRolls) -> u32 {
    let params = spawn_params(world.score, world.level, rolls);
    let (min_x, max_x) = world.bounds.obstacle_x_range();
    let id = world.next_entity_id();

    world.obstacles.push(Obstacle {
        id,
        pos: Vec2::new(min_x + rolls.x * (max_x - min_x), -OBSTACLE_SIZE),
        size: OBSTACLE_SIZE,
        speed: params.speed,
        rotation: params.rotation,
        rotation_speed: params.rotation_speed,
        aggressive: params.aggressive,
    });
    log::trace!(
        "Spawned obstacle {} (speed {:.2}, aggressive {})",
        id,
        params.speed,
        params.aggressive
    );
    id
}
