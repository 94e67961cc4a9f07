//! Viewport rectangles and the deltas between them.

use serde::{Deserialize, Serialize};

/// A measured rectangle in viewport pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Translation that carries this rect's top-left corner onto `to`'s.
    #[must_use]
    pub fn delta_to(&self, to: &Rect) -> Delta {
        Delta {
            dx: to.left - self.left,
            dy: to.top - self.top,
        }
    }

    /// Whether the point lies inside this rect.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.left + self.width && y >= self.top && y < self.top + self.height
    }
}

/// A screen-space translation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub dx: f64,
    pub dy: f64,
}

impl Delta {
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta() {
        let from = Rect::new(100.0, 400.0, 70.0, 100.0);
        let to = Rect::new(40.0, 50.0, 70.0, 100.0);
        assert_eq!(from.delta_to(&to), Delta { dx: -60.0, dy: -350.0 });
        assert!(from.delta_to(&from).is_zero());
    }

    #[test]
    fn test_contains() {
        let rect = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert!(rect.contains(10.0, 14.9));
        assert!(!rect.contains(15.0, 12.0));
    }
}
