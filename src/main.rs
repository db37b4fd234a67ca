//! Star Dodge entry point
//!
//! The game itself is mounted from JavaScript through the library's
//! `StarDodge` export. Natively this runs a headless session with a simple
//! autopilot and prints the final HUD.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use star_dodge::renderer::RecordingSurface;
    use star_dodge::sim::{Bounds, GamePhase, TickInput, World};
    use star_dodge::{MemoryScoreStore, Session, Settings};

    /// Step away from the closest obstacle bearing down on the player
    fn autopilot(world: &World) -> TickInput {
        let me = world.player.center();
        let threat = world
            .obstacles
            .iter()
            .filter(|o| o.center().y < me.y && me.y - o.center().y < 220.0)
            .min_by(|a, b| {
                (a.center().x - me.x)
                    .abs()
                    .partial_cmp(&(b.center().x - me.x).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        match threat {
            Some(o) if (o.center().x - me.x).abs() < 60.0 => {
                let go_left = (o.center().x >= me.x && me.x > 80.0)
                    || me.x > world.bounds.width - 80.0;
                TickInput {
                    left: go_left,
                    right: !go_left,
                }
            }
            _ => TickInput::default(),
        }
    }

    env_logger::init();
    log::info!("Star Dodge (native) starting headless run...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(7);
    let mut session = Session::new(
        MemoryScoreStore::new(),
        Bounds::new(480.0, 720.0),
        seed,
        Settings::default(),
    );
    if let Err(e) = session.start(0.0) {
        log::error!("Could not start: {}", e);
        return;
    }

    let mut surface = RecordingSurface::new();
    let mut now = 0.0;
    for _ in 0..60 * 120 {
        let input = session.world().map(autopilot).unwrap_or_default();
        session.frame(now, &input);
        surface.clear();
        session.draw(&mut surface, now);
        now += 1000.0 / 60.0;
        if session.phase() == GamePhase::Over && !session.needs_frames() {
            break;
        }
    }

    log::info!(
        "Finished after {:.1}s, last frame issued {} draw calls",
        now / 1000.0,
        surface.commands.len()
    );
    match serde_json::to_string_pretty(session.hud()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to encode HUD: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the StarDodge constructor, this is just to satisfy the compiler
}
