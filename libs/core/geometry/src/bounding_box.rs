use serde::{Deserialize, Serialize};

/// An integer rectangle in full-image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn translated(&self, dx: i64, dy: i64) -> Self {
        Self { x: self.x + dx, y: self.y + dy, ..*self }
    }

    pub fn touches_edge(&self, image_width: u32, image_height: u32) -> bool {
        self.x <= 0
            || self.y <= 0
            || self.x + i64::from(self.width) >= i64::from(image_width)
            || self.y + i64::from(self.height) >= i64::from(image_height)
    }

    /// Union of two bounding boxes, the smallest rectangle containing both.
    pub fn union(&self, other: &Self) -> Self {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = (self.x + i64::from(self.width)).max(other.x + i64::from(other.width));
        let y1 = (self.y + i64::from(self.height)).max(other.y + i64::from(other.height));
        Self { x: x0, y: y0, width: (x1 - x0) as u32, height: (y1 - y0) as u32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_is_width_times_height() {
        let bbox = BoundingBox::new(100, 100, 101, 101);
        assert_eq!(bbox.area(), 101 * 101);
    }

    #[test]
    fn touches_edge_detects_left_and_top() {
        let image_bounds = (512, 512);
        assert!(BoundingBox::new(0, 10, 5, 5).touches_edge(image_bounds.0, image_bounds.1));
        assert!(BoundingBox::new(10, 0, 5, 5).touches_edge(image_bounds.0, image_bounds.1));
        assert!(!BoundingBox::new(10, 10, 5, 5).touches_edge(image_bounds.0, image_bounds.1));
    }

    #[test]
    fn touches_edge_detects_right_and_bottom() {
        assert!(BoundingBox::new(500, 10, 12, 5).touches_edge(512, 512));
        assert!(BoundingBox::new(10, 500, 5, 12).touches_edge(512, 512));
    }
}
