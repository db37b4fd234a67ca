//! Session controller
//!
//! Owns the Idle → Running → Over state machine, the per-session world and
//! the RNG. The world's score and level are authoritative; the host only
//! ever sees [`HudState`], a copy refreshed every `HUD_SYNC_MS` while running
//! and immediately on every phase change.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::consts::HUD_SYNC_MS;
use crate::error::SessionError;
use crate::highscores::{HighScore, ScoreStore};
use crate::renderer::{DrawSurface, Frame, draw_background, render};
use crate::settings::Settings;
use crate::sim::{Bounds, GamePhase, TickInput, TickReport, World, tick};

/// Read-only projection for the host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HudState {
    pub score: u32,
    pub level: u32,
    pub phase: GamePhase,
    pub high_score: u32,
    /// This session beat the high score it started with
    pub new_record: bool,
}

/// Fixed-period gate for HUD refreshes
#[derive(Debug, Clone, Copy)]
struct HudSync {
    interval_ms: f64,
    last_ms: Option<f64>,
}

impl HudSync {
    fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// True at most once per interval; the first call is always due
    fn due(&mut self, now_ms: f64) -> bool {
        match self.last_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }

    fn restart(&mut self, now_ms: f64) {
        self.last_ms = Some(now_ms);
    }
}

pub struct Session<S: ScoreStore> {
    phase: GamePhase,
    world: Option<World>,
    hud: HudState,
    hud_sync: HudSync,
    high: HighScore,
    /// High score when the current run began
    best_at_start: u32,
    store: S,
    rng: Pcg32,
    settings: Settings,
    bounds: Bounds,
    surface_ready: bool,
    started_at_ms: f64,
}

impl<S: ScoreStore> Session<S> {
    /// Idle session; reads the persisted high score
    pub fn new(store: S, bounds: Bounds, seed: u64, settings: Settings) -> Self {
        let high = HighScore::load(&store);
        Self {
            phase: GamePhase::Idle,
            world: None,
            hud: HudState {
                score: 0,
                level: 1,
                phase: GamePhase::Idle,
                high_score: high.best(),
                new_record: false,
            },
            hud_sync: HudSync::new(HUD_SYNC_MS),
            high,
            best_at_start: high.best(),
            store,
            rng: Pcg32::seed_from_u64(seed),
            settings,
            bounds,
            surface_ready: true,
            started_at_ms: 0.0,
        }
    }

    /// Record whether a drawing surface was acquired. Without one the
    /// session stays idle.
    pub fn set_surface_ready(&mut self, ready: bool) {
        self.surface_ready = ready;
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn hud(&self) -> &HudState {
        &self.hud
    }

    pub fn high_score(&self) -> u32 {
        self.high.best()
    }

    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Takes effect for rendering immediately, for the starfield next run
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Idle → Running
    pub fn start(&mut self, now_ms: f64) -> Result<(), SessionError> {
        if !self.surface_ready {
            log::warn!("Start refused: no drawing surface");
            return Err(SessionError::SurfaceUnavailable);
        }
        if self.phase != GamePhase::Idle {
            return Err(SessionError::InvalidTransition {
                from: self.phase,
                action: "start",
            });
        }
        self.begin_run(now_ms);
        Ok(())
    }

    /// Over (or Running) → Running with a fresh world
    pub fn reset(&mut self, now_ms: f64) -> Result<(), SessionError> {
        if self.phase == GamePhase::Idle {
            return Err(SessionError::InvalidTransition {
                from: self.phase,
                action: "reset",
            });
        }
        self.begin_run(now_ms);
        Ok(())
    }

    /// Any phase → Idle; the world is dropped
    pub fn dismiss(&mut self) {
        if self.phase != GamePhase::Idle {
            log::info!("Session dismissed from {:?}", self.phase);
        }
        self.world = None;
        self.phase = GamePhase::Idle;
        self.sync_hud();
    }

    fn begin_run(&mut self, now_ms: f64) {
        self.world = Some(World::new(
            self.bounds,
            self.settings.star_count,
            &mut self.rng,
        ));
        self.phase = GamePhase::Running;
        self.best_at_start = self.high.best();
        self.started_at_ms = now_ms;
        self.hud_sync.restart(now_ms);
        self.sync_hud();
        log::info!("Run started (high score {})", self.high.best());
    }

    /// Surface size changed; entities are clamped, never reset
    pub fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        if let Some(world) = self.world.as_mut() {
            world.resize(bounds);
        }
    }

    /// One display frame. Returns the tick report while running.
    pub fn frame(&mut self, now_ms: f64, input: &TickInput) -> Option<TickReport> {
        let world = self.world.as_mut()?;
        match self.phase {
            GamePhase::Running => {
                let config = self.settings.tick_config();
                let report = tick(world, input, &mut self.rng, &config);
                let score = world.score;
                self.high.observe(score, &mut self.store);

                if report.crashed() {
                    self.phase = GamePhase::Over;
                    self.sync_hud();
                    log::info!("Game over: score {}, level {}", self.hud.score, self.hud.level);
                } else if self.hud_sync.due(now_ms) {
                    self.sync_hud();
                }
                Some(report)
            }
            GamePhase::Over => {
                world.settle_effects();
                None
            }
            GamePhase::Idle => None,
        }
    }

    /// Whether the host should keep scheduling frames
    pub fn needs_frames(&self) -> bool {
        match (self.phase, &self.world) {
            (GamePhase::Running, _) => true,
            (GamePhase::Over, Some(world)) => !world.effects_settled(),
            _ => false,
        }
    }

    /// Whether movement keys belong to the game rather than the host page
    pub fn captures_keys(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Draw the current world (or a blank field when idle)
    pub fn draw(&self, surface: &mut impl DrawSurface, now_ms: f64) {
        match &self.world {
            Some(world) => {
                let frame = Frame {
                    time_secs: ((now_ms - self.started_at_ms) / 1000.0) as f32,
                    shake: self.settings.shake_for_render(world.shake),
                };
                render(surface, world, &frame);
            }
            None => draw_background(surface, &self.bounds, 0.0),
        }
    }

    /// Copy the authoritative counters into the HUD projection
    fn sync_hud(&mut self) {
        let (score, level) = self
            .world
            .as_ref()
            .map_or((0, 1), |w| (w.score, w.level));
        self.hud = HudState {
            score,
            level,
            phase: self.phase,
            high_score: self.high.best(),
            new_record: score > self.best_at_start,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::error::StorageError;
    use crate::highscores::MemoryScoreStore;
    use crate::renderer::RecordingSurface;
    use crate::sim::Obstacle;
    use glam::Vec2;

    const IDLE: TickInput = TickInput {
        left: false,
        right: false,
    };

    fn session_with(store: MemoryScoreStore) -> Session<MemoryScoreStore> {
        Session::new(store, Bounds::new(400.0, 600.0), 42, Settings::default())
    }

    fn running() -> Session<MemoryScoreStore> {
        let mut s = session_with(MemoryScoreStore::new());
        s.start(0.0).unwrap();
        s
    }

    fn push_exiting(session: &mut Session<impl ScoreStore>) {
        let world = session.world.as_mut().unwrap();
        let id = world.next_entity_id();
        world.obstacles.push(Obstacle {
            id,
            pos: Vec2::new(PLAYER_MIN_X, world.bounds.height - 1.0),
            size: OBSTACLE_SIZE,
            speed: 5.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            aggressive: false,
        });
    }

    fn push_on_player(session: &mut Session<impl ScoreStore>) {
        let world = session.world.as_mut().unwrap();
        let id = world.next_entity_id();
        let c = world.player.center();
        world.obstacles.push(Obstacle {
            id,
            pos: c - Vec2::splat(OBSTACLE_SIZE / 2.0),
            size: OBSTACLE_SIZE,
            speed: 0.1,
            rotation: 0.0,
            rotation_speed: 0.0,
            aggressive: false,
        });
    }

    /// Feed `n` exits, one per frame, 16ms apart starting at `t`
    fn feed_exits(session: &mut Session<impl ScoreStore>, n: u32, t: &mut f64) {
        for _ in 0..n {
            push_exiting(session);
            session.frame(*t, &IDLE);
            *t += 16.0;
        }
    }

    #[test]
    fn test_new_session_is_idle_with_stored_high_score() {
        let s = session_with(MemoryScoreStore::with_raw("77"));
        assert_eq!(s.phase(), GamePhase::Idle);
        assert!(s.world().is_none());
        assert_eq!(s.hud().high_score, 77);
        assert_eq!(s.hud().phase, GamePhase::Idle);
        assert!(!s.needs_frames());
    }

    #[test]
    fn test_start_requires_surface() {
        let mut s = session_with(MemoryScoreStore::new());
        s.set_surface_ready(false);
        assert_eq!(s.start(0.0), Err(SessionError::SurfaceUnavailable));
        assert_eq!(s.phase(), GamePhase::Idle);
        assert!(s.frame(16.0, &IDLE).is_none());
    }

    #[test]
    fn test_invalid_transitions_are_refused() {
        let mut s = session_with(MemoryScoreStore::new());
        assert!(matches!(
            s.reset(0.0),
            Err(SessionError::InvalidTransition { from: GamePhase::Idle, .. })
        ));
        s.start(0.0).unwrap();
        assert!(matches!(
            s.start(1.0),
            Err(SessionError::InvalidTransition { from: GamePhase::Running, .. })
        ));
        assert_eq!(s.phase(), GamePhase::Running);
    }

    #[test]
    fn test_hud_is_throttled() {
        let mut s = running();
        let mut t = 10.0;
        feed_exits(&mut s, 3, &mut t);
        // Last sync happened at start (t = 0)
        assert_eq!(s.world().unwrap().score, 3);
        assert_eq!(s.hud().score, 0);

        s.frame(100.0, &IDLE);
        assert_eq!(s.hud().score, 3);

        push_exiting(&mut s);
        s.frame(150.0, &IDLE);
        assert_eq!(s.hud().score, 3, "next sync not due until 200ms");
        s.frame(200.0, &IDLE);
        assert_eq!(s.hud().score, 4);
    }

    #[test]
    fn test_end_to_end_scoring_and_game_over() {
        let mut s = running();
        let mut t = 0.0;
        feed_exits(&mut s, 40, &mut t);
        t += HUD_SYNC_MS;
        s.frame(t, &IDLE);
        assert_eq!((s.hud().score, s.hud().level), (40, 2));

        feed_exits(&mut s, 1, &mut t);
        t += HUD_SYNC_MS;
        s.frame(t, &IDLE);
        assert_eq!((s.hud().score, s.hud().level), (41, 2));

        push_on_player(&mut s);
        let report = s.frame(t + 1.0, &IDLE).unwrap();
        assert!(report.crashed());
        assert_eq!(s.phase(), GamePhase::Over);
        assert_eq!(s.hud().phase, GamePhase::Over);
        assert_eq!(s.hud().score, 41);

        for i in 0..50 {
            push_exiting(&mut s);
            assert!(s.frame(t + 1000.0 + i as f64 * 200.0, &IDLE).is_none());
        }
        assert_eq!(s.world().unwrap().score, 41);
        assert_eq!((s.hud().score, s.hud().level), (41, 2));
    }

    #[test]
    fn test_effects_settle_after_game_over() {
        let mut s = running();
        push_on_player(&mut s);
        s.frame(16.0, &IDLE);
        assert_eq!(s.phase(), GamePhase::Over);
        assert!(s.needs_frames());

        let mut t = 32.0;
        while s.needs_frames() {
            s.frame(t, &IDLE);
            t += 16.0;
            assert!(t < 10_000.0, "effects never settled");
        }
        assert!(s.world().unwrap().particles.is_empty());
    }

    #[test]
    fn test_reset_from_over() {
        let mut s = running();
        let mut t = 0.0;
        feed_exits(&mut s, 5, &mut t);
        push_on_player(&mut s);
        s.frame(t, &IDLE);
        assert_eq!(s.phase(), GamePhase::Over);

        s.reset(t + 500.0).unwrap();
        let world = s.world().unwrap();
        assert_eq!(s.phase(), GamePhase::Running);
        assert_eq!((world.score, world.level), (0, 1));
        assert!(world.obstacles.is_empty());
        assert!(world.particles.is_empty());
        assert_eq!((s.hud().score, s.hud().level), (0, 1));
        assert_eq!(s.hud().phase, GamePhase::Running);
    }

    #[test]
    fn test_high_score_is_monotonic_across_runs() {
        let mut s = session_with(MemoryScoreStore::with_raw("3"));
        s.start(0.0).unwrap();
        let mut t = 0.0;

        feed_exits(&mut s, 5, &mut t);
        assert_eq!(s.store().raw(), Some("5"));
        assert_eq!(s.high_score(), 5);

        push_on_player(&mut s);
        s.frame(t, &IDLE);
        assert!(s.hud().new_record);

        s.reset(t).unwrap();
        assert!(!s.hud().new_record);
        feed_exits(&mut s, 2, &mut t);
        assert_eq!(s.store().raw(), Some("5"), "lower score never overwrites");

        feed_exits(&mut s, 5, &mut t);
        assert_eq!(s.store().raw(), Some("7"));
        assert_eq!(s.high_score(), 7);
    }

    #[test]
    fn test_dismiss_returns_to_idle() {
        let mut s = running();
        s.dismiss();
        assert_eq!(s.phase(), GamePhase::Idle);
        assert!(s.world().is_none());
        assert_eq!(s.hud().phase, GamePhase::Idle);
        assert!(s.frame(100.0, &IDLE).is_none());
        s.start(200.0).unwrap();
        assert_eq!(s.phase(), GamePhase::Running);
    }

    #[test]
    fn test_keys_captured_only_while_running() {
        let mut s = session_with(MemoryScoreStore::new());
        assert!(!s.captures_keys());
        s.start(0.0).unwrap();
        assert!(s.captures_keys());

        push_on_player(&mut s);
        s.frame(16.0, &IDLE);
        assert_eq!(s.phase(), GamePhase::Over);
        assert!(!s.captures_keys());

        s.dismiss();
        assert!(!s.captures_keys());
    }

    #[test]
    fn test_dismiss_from_over_publishes_idle_hud() {
        let mut s = running();
        push_on_player(&mut s);
        s.frame(16.0, &IDLE);
        let before = *s.hud();
        assert_eq!(before.phase, GamePhase::Over);

        s.dismiss();
        assert_ne!(*s.hud(), before);
        assert_eq!(s.hud().phase, GamePhase::Idle);
        assert_eq!((s.hud().score, s.hud().level), (0, 1));
    }

    #[test]
    fn test_resize_keeps_game_state() {
        let mut s = running();
        let mut t = 0.0;
        feed_exits(&mut s, 3, &mut t);
        s.resize(Bounds::new(200.0, 500.0));

        let world = s.world().unwrap();
        assert_eq!(world.score, 3);
        assert_eq!(world.bounds, Bounds::new(200.0, 500.0));
        assert!(world.player.pos.x <= 200.0 - PLAYER_WIDTH - 1.0);
    }

    #[test]
    fn test_storage_failure_never_breaks_play() {
        struct FullStore;
        impl ScoreStore for FullStore {
            fn get(&self) -> Result<u32, StorageError> {
                Err(StorageError::Read("denied".to_string()))
            }
            fn set(&mut self, _score: u32) -> Result<(), StorageError> {
                Err(StorageError::Write("quota".to_string()))
            }
        }

        let mut s = Session::new(FullStore, Bounds::new(400.0, 600.0), 1, Settings::default());
        assert_eq!(s.high_score(), 0);
        s.start(0.0).unwrap();
        let mut t = 0.0;
        feed_exits(&mut s, 4, &mut t);
        assert_eq!(s.high_score(), 4);
        assert_eq!(s.phase(), GamePhase::Running);
    }

    #[test]
    fn test_draw_idle_and_running() {
        let mut s = session_with(MemoryScoreStore::new());
        let mut surface = RecordingSurface::new();
        s.draw(&mut surface, 0.0);
        assert_eq!(surface.commands.len(), 1);

        s.start(0.0).unwrap();
        surface.clear();
        s.draw(&mut surface, 16.0);
        assert!(surface.commands.len() > STAR_COUNT);
    }
}
