//! The 2D drawing surface the renderer targets
//!
//! A small subset of a canvas 2D context. Coordinates are CSS pixels; the
//! backend owns any device-pixel-ratio scaling.

/// RGBA, each channel in `[0, 1]`
pub type Color = [f32; 4];

pub trait DrawSurface {
    /// Push the current transform and alpha
    fn save(&mut self);
    /// Pop back to the last `save`
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, radians: f32);
    /// Global alpha for subsequent fills
    fn set_alpha(&mut self, alpha: f32);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);
    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, line_width: f32);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Color);
}

/// CSS `rgba()` string for a color
pub fn css_color(color: Color) -> String {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {})",
        channel(color[0]),
        channel(color[1]),
        channel(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}

/// Colors for game elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.07, 1.0];
    pub const STAR: [f32; 4] = [0.85, 0.88, 1.0, 0.8];
    pub const OBSTACLE: [f32; 4] = [0.55, 0.36, 0.96, 1.0];
    pub const OBSTACLE_EDGE: [f32; 4] = [0.78, 0.67, 1.0, 1.0];
    pub const AGGRESSIVE: [f32; 4] = [0.94, 0.2, 0.27, 1.0];
    pub const AGGRESSIVE_EDGE: [f32; 4] = [1.0, 0.62, 0.3, 1.0];
    pub const PLAYER_BODY: [f32; 4] = [0.16, 0.83, 0.75, 1.0];
    pub const PLAYER_HEAD: [f32; 4] = [0.98, 0.86, 0.72, 1.0];
    pub const PLAYER_LIMB: [f32; 4] = [0.1, 0.6, 0.55, 1.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color() {
        assert_eq!(css_color([1.0, 0.0, 0.5, 1.0]), "rgba(255, 0, 128, 1)");
        assert_eq!(css_color([2.0, -1.0, 0.0, 0.5]), "rgba(255, 0, 0, 0.5)");
    }
}
