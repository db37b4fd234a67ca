//! 2D canvas rendering module
//!
//! Stateless: every frame is drawn from the world alone onto a
//! [`DrawSurface`].

pub mod recording;
pub mod scene;
pub mod surface;

pub use recording::{DrawCommand, RecordingSurface};
pub use scene::{Frame, draw_background, render};
pub use surface::{Color, DrawSurface, colors, css_color};
