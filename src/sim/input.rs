//! Movement intent shared between device listeners and the tick
//!
//! Listeners write, the tick only reads a [`TickInput`] snapshot. Each device
//! keeps its own pair of flags so releasing a key never cancels a held pointer.

/// Where a movement intent came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Keyboard,
    Pointer,
}

/// Horizontal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct HeldFlags {
    left: bool,
    right: bool,
}

impl HeldFlags {
    fn set(&mut self, dir: Direction, held: bool) {
        match dir {
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }
}

/// Current movement intent from every device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    keyboard: HeldFlags,
    pointer: HeldFlags,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    fn flags_mut(&mut self, source: InputSource) -> &mut HeldFlags {
        match source {
            InputSource::Keyboard => &mut self.keyboard,
            InputSource::Pointer => &mut self.pointer,
        }
    }

    /// Key-down or pointer-zone press
    pub fn press(&mut self, source: InputSource, dir: Direction) {
        self.flags_mut(source).set(dir, true);
    }

    /// Key-up for a single direction
    pub fn release(&mut self, source: InputSource, dir: Direction) {
        self.flags_mut(source).set(dir, false);
    }

    /// Pointer release/cancel: a pointer only ever holds one zone
    pub fn release_all(&mut self, source: InputSource) {
        *self.flags_mut(source) = HeldFlags::default();
    }

    /// Drop every held flag (session reset, focus loss)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn moving_left(&self) -> bool {
        self.keyboard.left || self.pointer.left
    }

    pub fn moving_right(&self) -> bool {
        self.keyboard.right || self.pointer.right
    }

    /// Read-only view handed to the tick
    pub fn snapshot(&self) -> TickInput {
        TickInput {
            left: self.moving_left(),
            right: self.moving_right(),
        }
    }
}

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
}

/// Map a keyboard `key` value to a direction
pub fn key_direction(key: &str) -> Option<Direction> {
    match key {
        "ArrowLeft" => Some(Direction::Left),
        "ArrowRight" => Some(Direction::Right),
        _ => None,
    }
}

/// Map a press at `x` on a surface of `width` to its half-surface zone
pub fn pointer_zone(x: f32, width: f32) -> Direction {
    if x < width / 2.0 {
        Direction::Left
    } else {
        Direction::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_are_or_combined() {
        let mut input = InputState::new();
        input.press(InputSource::Keyboard, Direction::Left);
        input.press(InputSource::Pointer, Direction::Left);
        input.release(InputSource::Keyboard, Direction::Left);
        assert!(input.moving_left(), "pointer still holds left");

        input.release_all(InputSource::Pointer);
        assert!(!input.moving_left());
        assert_eq!(input.snapshot(), TickInput::default());
    }

    #[test]
    fn test_both_directions_can_be_held() {
        let mut input = InputState::new();
        input.press(InputSource::Keyboard, Direction::Left);
        input.press(InputSource::Pointer, Direction::Right);
        let snap = input.snapshot();
        assert!(snap.left && snap.right);

        input.clear();
        assert_eq!(input.snapshot(), TickInput::default());
    }

    #[test]
    fn test_key_and_zone_mapping() {
        assert_eq!(key_direction("ArrowLeft"), Some(Direction::Left));
        assert_eq!(key_direction("ArrowRight"), Some(Direction::Right));
        assert_eq!(key_direction("a"), None);

        assert_eq!(pointer_zone(10.0, 400.0), Direction::Left);
        assert_eq!(pointer_zone(199.9, 400.0), Direction::Left);
        assert_eq!(pointer_zone(200.0, 400.0), Direction::Right);
    }
}
