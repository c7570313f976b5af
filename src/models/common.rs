use serde::{Deserialize, Serialize};

/// A position in page-local pixel units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// A width and height in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }

    /// Zero-size sentinel used for elements the measurer did not report.
    pub fn zero() -> Self {
        Size::default()
    }

    pub fn is_zero(&self) -> bool {
        self.width <= 0.0 && self.height <= 0.0
    }

    /// Width divided by height, `None` for degenerate sizes.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.width > 0.0 && self.height > 0.0 {
            Some(self.width / self.height)
        } else {
            None
        }
    }

    /// Scales both dimensions by the same factor.
    pub fn scaled(&self, factor: f64) -> Size {
        Size {
            width: self.width * factor,
            height: self.height * factor,
        }
    }
}

/// A rendered element box as reported by the browser, in viewport pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        BoundingBox {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        BoundingBox {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_covers_both_boxes() {
        let a = BoundingBox::new(40.0, 100.0, 200.0, 30.0);
        let b = BoundingBox::new(60.0, 130.0, 300.0, 30.0);
        let u = a.union(&b);
        assert_eq!(u, BoundingBox::new(40.0, 100.0, 320.0, 60.0));
    }

    #[test]
    fn aspect_ratio_of_degenerate_size_is_none() {
        assert_eq!(Size::new(0.0, 10.0).aspect_ratio(), None);
        assert_eq!(Size::new(200.0, 100.0).aspect_ratio(), Some(2.0));
    }
}
