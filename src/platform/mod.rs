//! Platform abstraction layer
//!
//! Browser-only glue: canvas surface, device listeners, frame loop and the
//! `wasm_bindgen` mount API. Native builds run the core headless.

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{CanvasSurface, StarDodge};
