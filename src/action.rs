//! Normalized input actions
//!
//! Keyboards, TV remotes and D-pads are all reduced to this set before they
//! reach a test-run; the core never sees raw key events.

use crate::optotype::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Back,
    None,
}

impl Action {
    /// Arrow actions as optotype directions
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Action::Up => Some(Direction::Up),
            Action::Down => Some(Direction::Down),
            Action::Left => Some(Direction::Left),
            Action::Right => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn is_navigation(&self) -> bool {
        self.direction().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_mapping() {
        assert_eq!(Action::Up.direction(), Some(Direction::Up));
        assert_eq!(Action::Right.direction(), Some(Direction::Right));
        assert_eq!(Action::Confirm.direction(), None);
        assert!(!Action::Back.is_navigation());
        assert!(Action::Left.is_navigation());
    }
}
