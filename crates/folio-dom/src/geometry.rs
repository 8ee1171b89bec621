//! Geometry
//!
//! Document-space rectangles for layout boxes and viewport tests.

/// Rectangle in document coordinates (CSS pixels)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DOMRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DOMRect {
    /// Create with dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Same rect shifted by a scroll offset (document → client coordinates)
    pub fn translated(&self, dx: f64, dy: f64) -> DOMRect {
        DOMRect::from_xywh(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grow on every side by `margin`
    pub fn expanded(&self, margin: f64) -> DOMRect {
        DOMRect::from_xywh(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }

    /// Intersection area, if the rects overlap with positive area
    pub fn intersection(&self, other: &DOMRect) -> Option<DOMRect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right > x && bottom > y {
            Some(DOMRect::from_xywh(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Overlap test that also accepts zero-area boxes touching the other rect
    pub fn touches(&self, other: &DOMRect) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }
}

/// Scroll behavior requested by `scroll_to`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScrollBehavior {
    #[default]
    Auto,
    Smooth,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let rect = DOMRect::from_xywh(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
        assert_eq!(rect.left(), 10.0);
    }

    #[test]
    fn test_intersection() {
        let a = DOMRect::from_xywh(0.0, 0.0, 100.0, 100.0);
        let b = DOMRect::from_xywh(50.0, 50.0, 100.0, 100.0);
        let c = DOMRect::from_xywh(200.0, 200.0, 50.0, 50.0);

        assert_eq!(a.intersection(&b), Some(DOMRect::from_xywh(50.0, 50.0, 50.0, 50.0)));
        assert!(a.intersection(&c).is_none());
    }

    #[test]
    fn test_touches_zero_area() {
        let viewport = DOMRect::from_xywh(0.0, 0.0, 800.0, 600.0);
        let unsized_img = DOMRect::from_xywh(10.0, 600.0, 0.0, 0.0);
        assert!(unsized_img.touches(&viewport));
        assert!(unsized_img.intersection(&viewport).is_none());
    }
}
