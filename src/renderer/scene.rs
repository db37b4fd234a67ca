//! Per-frame scene drawing
//!
//! Reads the world, never writes it. Draw order: shake offset, background,
//! stars, obstacles, particles, player.

use glam::Vec2;

use super::surface::{DrawSurface, colors};
use crate::sim::{Bounds, Obstacle, Player, World};

/// Per-frame values that are not part of the world
#[derive(Debug, Clone, Copy, Default)]
pub struct Frame {
    /// Seconds since the session started, drives idle animation
    pub time_secs: f32,
    /// Shake magnitude after settings are applied
    pub shake: f32,
}

/// Idle bob amplitude (pixels) and rate (radians/sec)
const BOUNCE_AMPLITUDE: f32 = 4.0;
const BOUNCE_RATE: f32 = 15.0;

/// Pseudo-random jitter for a shake magnitude, stable for a given time
pub fn shake_offset(shake: f32, time_secs: f32) -> Vec2 {
    if shake <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new((time_secs * 91.7).sin(), (time_secs * 73.3).cos()) * shake * 0.5
}

/// Vertical bob applied to the player sprite
pub fn player_bounce(time_secs: f32) -> f32 {
    (time_secs * BOUNCE_RATE).sin() * BOUNCE_AMPLITUDE
}

/// Clear to the background color
pub fn draw_background(surface: &mut impl DrawSurface, bounds: &Bounds, margin: f32) {
    surface.fill_rect(
        -margin,
        -margin,
        bounds.width + margin * 2.0,
        bounds.height + margin * 2.0,
        colors::BACKGROUND,
    );
}

/// Draw one complete frame of `world`
pub fn render(surface: &mut impl DrawSurface, world: &World, frame: &Frame) {
    let offset = shake_offset(frame.shake, frame.time_secs);

    surface.save();
    surface.translate(offset.x, offset.y);
    // Oversize so shake never exposes an edge
    draw_background(surface, &world.bounds, frame.shake);

    for star in &world.stars {
        surface.fill_rect(star.pos.x, star.pos.y, star.size, star.size, colors::STAR);
    }

    for obstacle in &world.obstacles {
        draw_obstacle(surface, obstacle);
    }

    for particle in &world.particles {
        surface.set_alpha(particle.life.clamp(0.0, 1.0));
        surface.fill_circle(
            particle.pos.x,
            particle.pos.y,
            particle.radius,
            particle.color,
        );
    }
    surface.set_alpha(1.0);

    draw_player(surface, &world.player, frame.time_secs);
    surface.restore();
}

fn draw_obstacle(surface: &mut impl DrawSurface, obstacle: &Obstacle) {
    let (fill, edge) = if obstacle.aggressive {
        (colors::AGGRESSIVE, colors::AGGRESSIVE_EDGE)
    } else {
        (colors::OBSTACLE, colors::OBSTACLE_EDGE)
    };
    let half = obstacle.size / 2.0;
    let center = obstacle.center();

    surface.save();
    surface.translate(center.x, center.y);
    surface.rotate(obstacle.rotation);
    surface.fill_rect(-half, -half, obstacle.size, obstacle.size, fill);
    let inset = obstacle.size - 8.0;
    surface.stroke_rect(-half + 4.0, -half + 4.0, inset, inset, edge, 2.0);
    surface.restore();
}

/// Fixed-shape figure: head, torso, two arms, two legs
fn draw_player(surface: &mut impl DrawSurface, player: &Player, time_secs: f32) {
    let x = player.pos.x;
    let y = player.pos.y + player_bounce(time_secs);
    let w = player.width;

    // Legs
    surface.fill_rect(x + w * 0.25, y + 30.0, 7.0, 14.0, colors::PLAYER_LIMB);
    surface.fill_rect(x + w * 0.75 - 7.0, y + 30.0, 7.0, 14.0, colors::PLAYER_LIMB);
    // Arms
    surface.fill_rect(x, y + 15.0, 6.0, 13.0, colors::PLAYER_LIMB);
    surface.fill_rect(x + w - 6.0, y + 15.0, 6.0, 13.0, colors::PLAYER_LIMB);
    // Torso
    surface.fill_rect(x + 6.0, y + 13.0, w - 12.0, 19.0, colors::PLAYER_BODY);
    // Head
    surface.fill_circle(x + w / 2.0, y + 7.0, 7.0, colors::PLAYER_HEAD);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::recording::{DrawCommand, RecordingSurface};
    use crate::sim::{SpawnRolls, spawn_obstacle};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn busy_world() -> World {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut world = World::new(Bounds::new(320.0, 480.0), 12, &mut rng);
        let rolls = SpawnRolls {
            x: 0.3,
            jitter: 0.5,
            rotation: 0.1,
            spin: 0.9,
        };
        spawn_obstacle(&mut world, &rolls);
        world.add_score(100);
        spawn_obstacle(&mut world, &rolls);
        world.burst(Vec2::new(100.0, 100.0), 5, &mut rng);
        world
    }

    #[test]
    fn test_draw_order() {
        let world = busy_world();
        let mut surface = RecordingSurface::new();
        render(&mut surface, &world, &Frame::default());

        let cmds = &surface.commands;
        assert_eq!(cmds[0], DrawCommand::Save);
        assert_eq!(cmds[1], DrawCommand::Translate { x: 0.0, y: 0.0 });
        assert!(matches!(
            cmds[2],
            DrawCommand::FillRect { color, .. } if color == colors::BACKGROUND
        ));
        assert_eq!(cmds.last(), Some(&DrawCommand::Restore));

        // Stars right after the background, player head last
        let stars = cmds[3..3 + world.stars.len()]
            .iter()
            .all(|c| matches!(c, DrawCommand::FillRect { color, .. } if *color == colors::STAR));
        assert!(stars);
        assert!(matches!(
            cmds[cmds.len() - 2],
            DrawCommand::FillCircle { color, .. } if color == colors::PLAYER_HEAD
        ));

        // One circle per particle plus the head
        assert_eq!(surface.circles(), world.particles.len() + 1);
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::Rotate(_))), 2);
    }

    #[test]
    fn test_aggressive_obstacles_styled_apart() {
        let world = busy_world();
        let mut surface = RecordingSurface::new();
        render(&mut surface, &world, &Frame::default());

        let fills = |color: [f32; 4]| {
            surface.count(|c| matches!(c, DrawCommand::FillRect { color: k, .. } if *k == color))
        };
        assert_eq!(fills(colors::OBSTACLE), 1);
        assert_eq!(fills(colors::AGGRESSIVE), 1);
    }

    #[test]
    fn test_render_does_not_mutate_world() {
        let world = busy_world();
        let before = serde_json::to_string(&world).unwrap();
        let mut surface = RecordingSurface::new();
        render(
            &mut surface,
            &world,
            &Frame {
                time_secs: 1.3,
                shake: 20.0,
            },
        );
        assert_eq!(serde_json::to_string(&world).unwrap(), before);
    }

    #[test]
    fn test_particle_alpha_follows_life() {
        let mut world = busy_world();
        for p in &mut world.particles {
            p.life = 0.4;
        }
        let mut surface = RecordingSurface::new();
        render(&mut surface, &world, &Frame::default());
        assert_eq!(
            surface.count(|c| *c == DrawCommand::Alpha(0.4)),
            world.particles.len()
        );
    }

    #[test]
    fn test_shake_and_bounce() {
        assert_eq!(shake_offset(0.0, 5.0), Vec2::ZERO);
        let off = shake_offset(20.0, 0.37);
        assert!(off.x.abs() <= 10.0 && off.y.abs() <= 10.0);
        assert!(off != Vec2::ZERO);

        for i in 0..100 {
            assert!(player_bounce(i as f32 * 0.01).abs() <= BOUNCE_AMPLITUDE);
        }
    }
}
