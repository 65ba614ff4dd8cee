//! CSS Box Model types.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)

use serde::Serialize;

/// Tolerance for comparing layout coordinates.
pub const EPSILON: f32 = 0.01;

/// [§ 3. The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
///
/// "Each box has a content area and optional surrounding padding, border,
/// and margin areas."
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BoxDimensions {
    /// Content area, in strip coordinates.
    pub content: Rect,
    /// Used padding widths.
    pub padding: EdgeSizes,
    /// Used border widths.
    pub border: EdgeSizes,
    /// Used margins, after collapsing where it applies.
    pub margin: EdgeSizes,
}

/// A rectangle positioned in 2D space.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Build a rect from its corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Smallest rect containing both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// This rect grown outwards by `edges` on each side.
    #[must_use]
    pub fn outset(&self, edges: &EdgeSizes) -> Self {
        Self {
            x: self.x - edges.left,
            y: self.y - edges.top,
            width: self.width + edges.horizontal(),
            height: self.height + edges.vertical(),
        }
    }

    /// The same rect moved by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Edge sizes for padding, border, or margin.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl EdgeSizes {
    /// Left plus right.
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// Top plus bottom.
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

impl BoxDimensions {
    /// [§ 3.1 Margins](https://www.w3.org/TR/css-box-3/#margins)
    ///
    /// "The margin box is the outermost box, and contains all four areas."
    #[must_use]
    pub fn margin_box(&self) -> Rect {
        self.border_box().outset(&self.margin)
    }

    /// [§ 3.2 Padding](https://www.w3.org/TR/css-box-3/#paddings)
    #[must_use]
    pub fn padding_box(&self) -> Rect {
        self.content.outset(&self.padding)
    }

    /// [§ 3.3 Borders](https://www.w3.org/TR/css-box-3/#borders)
    ///
    /// The box fragmentation measures and clips: breaks fall at its edges.
    #[must_use]
    pub fn border_box(&self) -> Rect {
        self.padding_box().outset(&self.border)
    }

    /// Horizontal padding plus border.
    #[must_use]
    pub fn horizontal_chrome(&self) -> f32 {
        self.padding.horizontal() + self.border.horizontal()
    }

    /// Vertical padding plus border.
    #[must_use]
    pub fn vertical_chrome(&self) -> f32 {
        self.padding.vertical() + self.border.vertical()
    }

    /// Move every area by `(dx, dy)`.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.content.x += dx;
        self.content.y += dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_areas_nest() {
        let dims = BoxDimensions {
            content: Rect::new(20.0, 30.0, 100.0, 50.0),
            padding: EdgeSizes {
                top: 5.0,
                right: 5.0,
                bottom: 5.0,
                left: 5.0,
            },
            border: EdgeSizes {
                top: 1.0,
                right: 1.0,
                bottom: 1.0,
                left: 1.0,
            },
            margin: EdgeSizes {
                top: 10.0,
                right: 0.0,
                bottom: 10.0,
                left: 0.0,
            },
        };
        assert_eq!(dims.padding_box(), Rect::new(15.0, 25.0, 110.0, 60.0));
        assert_eq!(dims.border_box(), Rect::new(14.0, 24.0, 112.0, 62.0));
        assert_eq!(dims.margin_box(), Rect::new(14.0, 14.0, 112.0, 82.0));
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 20.0, 10.0, 5.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 15.0, 25.0));
    }
}
