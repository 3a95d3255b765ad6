use serde::{Deserialize, Serialize};

/// Represents an integer bounding box in global pixel space.
///
/// `min` is the lower-left corner and `max` the upper-right one; because pixel
/// `y` grows northward, `max_y` is the top edge of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBounds {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl PixelBounds {
    /// Creates bounds from individual coordinates
    pub fn new(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Gets the width of the bounds
    pub fn width(&self) -> i64 {
        self.max_x - self.min_x
    }

    /// Gets the height of the bounds
    pub fn height(&self) -> i64 {
        self.max_y - self.min_y
    }

    /// Checks if the bounds contain a pixel
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Returns a new bounds expanded by the given amount on every side
    pub fn expanded(&self, amount: i64) -> PixelBounds {
        Self::new(
            self.min_x - amount,
            self.min_y - amount,
            self.max_x + amount,
            self.max_y + amount,
        )
    }

    /// Checks if the bounds are valid (min <= max)
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_creation() {
        let bounds = PixelBounds::new(10, 20, 30, 60);
        assert_eq!(bounds.width(), 20);
        assert_eq!(bounds.height(), 40);
        assert!(bounds.is_valid());
    }

    #[test]
    fn test_bounds_expanded() {
        let bounds = PixelBounds::new(10, 20, 30, 60).expanded(5);
        assert_eq!(bounds, PixelBounds::new(5, 15, 35, 65));
        assert!(bounds.contains(5, 65));
        assert!(!bounds.contains(4, 30));
    }
}
