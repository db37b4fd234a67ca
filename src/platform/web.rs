//! Browser host glue
//!
//! Mounts the game on a canvas: acquires the 2D context, wires keyboard and
//! pointer-zone listeners into [`InputState`], and drives the session from
//! `requestAnimationFrame`. Everything here runs on the page's single event
//! loop, so the shared state is a plain `Rc<RefCell<_>>`.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent,
};

use crate::error::MountError;
use crate::highscores::LocalStorageScores;
use crate::renderer::{Color, DrawSurface, css_color};
use crate::session::{HudState, Session};
use crate::settings::Settings;
use crate::sim::input::{key_direction, pointer_zone};
use crate::sim::{Bounds, GamePhase, InputSource, InputState};

/// Canvas 2D context behind the renderer's surface port
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn acquire(canvas: &HtmlCanvasElement) -> Result<Self, MountError> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .ok_or(MountError::NoContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| MountError::NoContext)?;
        Ok(Self { ctx })
    }

    /// Reset to CSS-pixel coordinates for this device pixel ratio
    fn begin_frame(&self, dpr: f64) {
        let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
        self.ctx.set_global_alpha(1.0);
    }
}

impl DrawSurface for CanvasSurface {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f32, y: f32) {
        let _ = self.ctx.translate(x as f64, y as f64);
    }

    fn rotate(&mut self, radians: f32) {
        let _ = self.ctx.rotate(radians as f64);
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, line_width: f32) {
        self.ctx.set_stroke_style_str(&css_color(color));
        self.ctx.set_line_width(line_width as f64);
        self.ctx.stroke_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&css_color(color));
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(x as f64, y as f64, radius as f64, 0.0, std::f64::consts::TAU);
        self.ctx.fill();
    }
}

/// An event listener that detaches itself when dropped
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(target: &EventTarget, kind: &'static str, f: impl FnMut(Event) + 'static) -> Self {
        let callback = Closure::<dyn FnMut(Event)>::new(f);
        if let Err(e) =
            target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())
        {
            log::warn!("Failed to attach {} listener: {:?}", kind, e);
        }
        Self {
            target: target.clone(),
            kind,
            callback,
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// Everything the frame callback and listeners share
struct Runtime {
    session: Session<LocalStorageScores>,
    input: InputState,
    surface: Option<CanvasSurface>,
    dpr: f64,
    /// Pending animation frame
    raf_id: Option<i32>,
    last_hud: HudState,
    on_hud: Option<js_sys::Function>,
}

impl Runtime {
    /// Tick and draw; returns whether another frame is needed
    fn step(&mut self, now_ms: f64) -> bool {
        let input = self.input.snapshot();
        self.session.frame(now_ms, &input);
        self.draw(now_ms);
        self.session.needs_frames()
    }

    fn draw(&mut self, now_ms: f64) {
        if let Some(surface) = self.surface.as_mut() {
            surface.begin_frame(self.dpr);
            self.session.draw(surface, now_ms);
        }
    }

    /// The HUD projection and its listener, if it changed since last asked
    fn take_hud_change(&mut self) -> Option<(js_sys::Function, HudState)> {
        let hud = *self.session.hud();
        if hud == self.last_hud {
            return None;
        }
        self.last_hud = hud;
        self.on_hud.clone().map(|f| (f, hud))
    }
}

/// Tell the host about HUD changes. Called with no borrow held, so the
/// listener may read the getters.
fn flush_hud(rt: &Rc<RefCell<Runtime>>) {
    let change = rt.borrow_mut().take_hud_change();
    let Some((f, hud)) = change else {
        return;
    };
    match serde_json::to_string(&hud) {
        Ok(json) => {
            if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                log::warn!("HUD listener threw: {:?}", e);
            }
        }
        Err(e) => log::warn!("Failed to encode HUD: {}", e),
    }
}

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or(0.0, |p| p.now())
}

/// Request the next frame unless one is already pending
fn schedule(rt: &Rc<RefCell<Runtime>>, slot: &FrameSlot) {
    if rt.borrow().raf_id.is_some() {
        return;
    }
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Some(callback) = slot.borrow().as_ref() {
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(id) => rt.borrow_mut().raf_id = Some(id),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
    }
}

/// Route console logging and panics to the browser console
fn init_console() {
    console_error_panic_hook::set_once();
    // Only fails when a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
}

/// The mini-game as mounted by the host page
#[wasm_bindgen]
pub struct StarDodge {
    rt: Rc<RefCell<Runtime>>,
    frame: FrameSlot,
    listeners: Vec<Listener>,
    canvas: HtmlCanvasElement,
    on_close: Option<js_sys::Function>,
    closed: bool,
}

#[wasm_bindgen]
impl StarDodge {
    /// Mount on `canvas`. A canvas without a 2D context still mounts, but
    /// stays idle and refuses to start.
    #[wasm_bindgen(constructor)]
    pub fn mount(canvas: HtmlCanvasElement, on_close: Option<js_sys::Function>) -> StarDodge {
        init_console();

        let window = web_sys::window();
        let dpr = window.as_ref().map_or(1.0, |w| w.device_pixel_ratio());
        let css_w = canvas.client_width() as f64;
        let css_h = canvas.client_height() as f64;
        canvas.set_width((css_w * dpr) as u32);
        canvas.set_height((css_h * dpr) as u32);

        let surface = match CanvasSurface::acquire(&canvas) {
            Ok(surface) => Some(surface),
            Err(e) => {
                log::error!("Star Dodge disabled: {}", e);
                None
            }
        };

        let seed = js_sys::Date::now() as u64;
        let mut session = Session::new(
            LocalStorageScores,
            Bounds::new(css_w as f32, css_h as f32),
            seed,
            Settings::load(),
        );
        session.set_surface_ready(surface.is_some());

        let rt = Rc::new(RefCell::new(Runtime {
            last_hud: *session.hud(),
            session,
            input: InputState::new(),
            surface,
            dpr,
            raf_id: None,
            on_hud: None,
        }));
        let frame: FrameSlot = Rc::new(RefCell::new(None));

        {
            let weak_rt = Rc::downgrade(&rt);
            let weak_slot = Rc::downgrade(&frame);
            *frame.borrow_mut() = Some(Closure::new(move |now: f64| {
                let (Some(rt), Some(slot)) = (weak_rt.upgrade(), weak_slot.upgrade()) else {
                    return;
                };
                let more = {
                    let mut r = rt.borrow_mut();
                    r.raf_id = None;
                    r.step(now)
                };
                flush_hud(&rt);
                if more {
                    schedule(&rt, &slot);
                }
            }));
        }

        let listeners = match window {
            Some(window) => attach_listeners(&rt, &window, &canvas),
            None => {
                log::error!("Input disabled: {}", MountError::NoWindow);
                Vec::new()
            }
        };

        rt.borrow_mut().draw(now_ms());
        log::info!("Star Dodge mounted ({}x{} @ {}x)", css_w, css_h, dpr);

        StarDodge {
            rt,
            frame,
            listeners,
            canvas,
            on_close,
            closed: false,
        }
    }

    /// Idle → Running
    pub fn start(&self) -> Result<(), JsValue> {
        self.rt
            .borrow_mut()
            .session
            .start(now_ms())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        flush_hud(&self.rt);
        schedule(&self.rt, &self.frame);
        Ok(())
    }

    /// Over → Running with a fresh world
    pub fn reset(&self) -> Result<(), JsValue> {
        {
            let mut r = self.rt.borrow_mut();
            r.session
                .reset(now_ms())
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            r.input.clear();
        }
        flush_hud(&self.rt);
        schedule(&self.rt, &self.frame);
        Ok(())
    }

    /// Tear down and tell the host; the handle is inert afterwards
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.teardown();
        if let Some(f) = &self.on_close {
            if let Err(e) = f.call0(&JsValue::NULL) {
                log::warn!("on_close threw: {:?}", e);
            }
        }
    }

    /// Host-reported surface size in CSS pixels
    pub fn resize(&self, css_width: f64, css_height: f64, dpr: f64) {
        self.canvas.set_width((css_width * dpr) as u32);
        self.canvas.set_height((css_height * dpr) as u32);

        let mut r = self.rt.borrow_mut();
        r.dpr = dpr;
        r.session
            .resize(Bounds::new(css_width as f32, css_height as f32));
        // Resizing clears the canvas; repaint when no frame is coming
        if r.raf_id.is_none() {
            r.draw(now_ms());
        }
    }

    /// Replace settings from JSON and persist them
    pub fn apply_settings(&self, json: &str) {
        let settings = Settings::from_json(json);
        settings.save();
        self.rt.borrow_mut().session.set_settings(settings);
    }

    /// Called with the HUD projection (JSON) whenever it changes
    pub fn set_hud_listener(&self, f: Option<js_sys::Function>) {
        self.rt.borrow_mut().on_hud = f;
    }

    #[wasm_bindgen(getter)]
    pub fn score(&self) -> u32 {
        self.rt.borrow().session.hud().score
    }

    #[wasm_bindgen(getter)]
    pub fn level(&self) -> u32 {
        self.rt.borrow().session.hud().level
    }

    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        self.rt.borrow().session.hud().phase.as_str().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn high_score(&self) -> u32 {
        self.rt.borrow().session.hud().high_score
    }
}

impl StarDodge {
    fn teardown(&mut self) {
        self.closed = true;
        self.listeners.clear();
        {
            let mut r = self.rt.borrow_mut();
            if let (Some(id), Some(window)) = (r.raf_id.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(id);
            }
            r.session.dismiss();
            r.session.set_surface_ready(false);
            r.input.clear();
        }
        flush_hud(&self.rt);
        self.frame.borrow_mut().take();
        log::info!("Star Dodge closed");
    }
}

impl Drop for StarDodge {
    fn drop(&mut self) {
        if !self.closed {
            self.teardown();
        }
    }
}

fn attach_listeners(
    rt: &Rc<RefCell<Runtime>>,
    window: &web_sys::Window,
    canvas: &HtmlCanvasElement,
) -> Vec<Listener> {
    let mut listeners = Vec::new();

    // Arrow keys
    for (kind, held) in [("keydown", true), ("keyup", false)] {
        let rt = rt.clone();
        listeners.push(Listener::attach(window, kind, move |event: Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if let Some(dir) = key_direction(&event.key()) {
                let mut r = rt.borrow_mut();
                // Arrows scroll the host page unless a run is live
                if r.session.captures_keys() {
                    event.prevent_default();
                }
                if held {
                    r.input.press(InputSource::Keyboard, dir);
                } else {
                    r.input.release(InputSource::Keyboard, dir);
                }
            }
        }));
    }

    // Left/right half-surface pointer zones
    {
        let rt = rt.clone();
        let canvas_clone = canvas.clone();
        listeners.push(Listener::attach(canvas, "pointerdown", move |event: Event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            event.prevent_default();
            let zone = pointer_zone(
                event.offset_x() as f32,
                canvas_clone.client_width() as f32,
            );
            let mut r = rt.borrow_mut();
            r.input.release_all(InputSource::Pointer);
            r.input.press(InputSource::Pointer, zone);
        }));
    }
    for kind in ["pointerup", "pointercancel", "pointerleave"] {
        let rt = rt.clone();
        listeners.push(Listener::attach(canvas, kind, move |_event: Event| {
            rt.borrow_mut().input.release_all(InputSource::Pointer);
        }));
    }

    // Losing focus drops held keys that will never see a keyup
    {
        let rt = rt.clone();
        listeners.push(Listener::attach(window, "blur", move |_event: Event| {
            let mut r = rt.borrow_mut();
            if r.session.phase() == GamePhase::Running {
                r.input.clear();
            }
        }));
    }

    listeners
}
