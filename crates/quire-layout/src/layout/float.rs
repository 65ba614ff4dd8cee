//! CSS Float Layout.
//!
//! [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "A float is a box that is shifted to the left or right on the current line.
//! The most interesting characteristic of a float is that content may flow along
//! its side (or be prohibited from doing so by the 'clear' property)."
//!
//! One [`FloatContext`] exists per block formatting context. All coordinates
//! are absolute, so nested block containers that share their parent's BFC can
//! query it with their own content edges as the lane.

use serde::Serialize;

use super::box_model::Rect;
use crate::style::{ClearSide, FloatSide};

/// A single float that has been placed in the flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedFloat {
    /// Which side this float is on.
    pub side: FloatSide,
    /// The margin box of the float (absolute coordinates).
    pub margin_box: Rect,
}

/// Horizontal extent a box may occupy: its containing block's content edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lane {
    /// Left content edge.
    pub left: f32,
    /// Right content edge.
    pub right: f32,
}

impl Lane {
    /// The lane spanning `rect` horizontally.
    #[must_use]
    pub fn of(rect: Rect) -> Self {
        Self {
            left: rect.x,
            right: rect.right(),
        }
    }

    /// Width of the lane.
    #[must_use]
    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }
}

/// Tracks placed floats within a block formatting context.
///
/// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
///
/// "Since a float is not in the flow, non-positioned block boxes created
/// before and after the float box flow vertically as if the float did not
/// exist. However, the current and subsequent line boxes created next to
/// the float are shortened as necessary to make room for the margin box
/// of the float."
#[derive(Debug, Clone, Default)]
pub struct FloatContext {
    floats: Vec<PlacedFloat>,
}

impl FloatContext {
    /// An empty context for a new block formatting context.
    #[must_use]
    pub const fn new() -> Self {
        Self { floats: Vec::new() }
    }

    /// Returns true if there are no placed floats in this context.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.floats.is_empty()
    }

    /// All floats placed so far, in placement order.
    #[must_use]
    pub fn floats(&self) -> &[PlacedFloat] {
        &self.floats
    }

    /// [§ 10.6.7](https://www.w3.org/TR/CSS2/visudet.html#root-height)
    ///
    /// "If the element has any floating descendants whose bottom margin edge
    /// is below the element's bottom content edge, then the height is
    /// increased to include those edges."
    #[must_use]
    pub fn max_float_bottom(&self) -> Option<f32> {
        self.floats
            .iter()
            .map(|f| f.margin_box.bottom())
            .reduce(f32::max)
    }

    /// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Place a float's margin box of `width` x `height` at or below `y`.
    ///
    /// "A floated box is shifted to the left or right until its outer edge
    /// touches the containing block edge or the outer edge of another float."
    pub fn place_float(
        &mut self,
        side: FloatSide,
        width: f32,
        height: f32,
        y: f32,
        lane: Lane,
    ) -> Rect {
        // STEP 1: Start at the highest allowed position.
        // [§ 9.5.1 Rule 8] "A floating box must be placed as high as possible."
        //
        // [§ 9.5.1 Rule 5] "The outer top of a floating box may not be higher
        // than the outer top of any block or floated box generated by an
        // element earlier in the source document."
        let mut y = self
            .floats
            .iter()
            .map(|f| f.margin_box.y)
            .fold(y, f32::max);

        // STEP 2: Scan downward past float bottoms until the float fits.
        // [§ 9.5.1 Rules 2, 3, 7]
        let (left, avail) = loop {
            let (left, avail) = self.available_range(y, height.max(0.01), lane);
            if avail + 0.01 >= width || avail >= lane.width() {
                break (left, avail);
            }
            let next_y = self.next_float_bottom_after(y);
            if next_y <= y {
                // Nothing below; overflow the containing block.
                break (left, avail);
            }
            y = next_y;
        };

        // STEP 3: Push to the side.
        // [§ 9.5.1 Rule 9] "A left-floating box must be put as far to the left
        // as possible, a right-floating box as far to the right as possible."
        let x = match side {
            FloatSide::Right => (left + avail - width).max(lane.left),
            FloatSide::Left | FloatSide::None => left,
        };
        let rect = Rect::new(x, y, width, height);
        self.floats.push(PlacedFloat {
            side,
            margin_box: rect,
        });
        rect
    }

    /// [§ 9.5.2 'clear'](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    ///
    /// "This property indicates which sides of an element's box(es) may not
    /// be adjacent to an earlier floating box."
    ///
    /// Returns the lowest float bottom on the cleared side(s), or `y` if none
    /// is below it.
    #[must_use]
    pub fn clear(&self, clear: ClearSide, y: f32) -> f32 {
        self.floats
            .iter()
            .filter(|f| match clear {
                ClearSide::None => false,
                ClearSide::Left => f.side == FloatSide::Left,
                ClearSide::Right => f.side == FloatSide::Right,
                ClearSide::Both => true,
            })
            .map(|f| f.margin_box.bottom())
            .fold(y, f32::max)
    }

    /// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
    ///
    /// "The current and subsequent line boxes created next to the float are
    /// shortened as necessary to make room for the margin box of the float."
    ///
    /// Returns `(left, available_width)` inside `lane` for the band
    /// `[y, y + height)`.
    #[must_use]
    pub fn available_range(&self, y: f32, height: f32, lane: Lane) -> (f32, f32) {
        let band_bottom = y + height;
        let mut left = lane.left;
        let mut right = lane.right;
        for f in &self.floats {
            let r = f.margin_box;
            if r.y >= band_bottom || r.bottom() <= y || r.width <= 0.0 {
                continue;
            }
            match f.side {
                FloatSide::Right => right = right.min(r.x),
                FloatSide::Left | FloatSide::None => left = left.max(r.right()),
            }
        }
        (left, (right - left).max(0.0))
    }

    /// Whether any float intrudes on `lane` in the band `[y, y + height)`.
    #[must_use]
    pub fn intrudes(&self, y: f32, height: f32, lane: Lane) -> bool {
        let (left, avail) = self.available_range(y, height, lane);
        left > lane.left + 0.01 || avail + 0.01 < lane.width()
    }

    /// The smallest float bottom edge strictly below `y`, or `y` if none.
    #[must_use]
    pub fn next_float_bottom_after(&self, y: f32) -> f32 {
        self.floats
            .iter()
            .map(|f| f.margin_box.bottom())
            .filter(|b| *b > y)
            .reduce(f32::min)
            .unwrap_or(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LANE: Lane = Lane {
        left: 0.0,
        right: 100.0,
    };

    #[test]
    fn test_left_and_right_floats_share_a_band() {
        let mut ctx = FloatContext::new();
        let a = ctx.place_float(FloatSide::Left, 30.0, 20.0, 0.0, LANE);
        let b = ctx.place_float(FloatSide::Right, 30.0, 20.0, 0.0, LANE);
        assert_eq!(a, Rect::new(0.0, 0.0, 30.0, 20.0));
        assert_eq!(b, Rect::new(70.0, 0.0, 30.0, 20.0));
        assert_eq!(ctx.available_range(5.0, 10.0, LANE), (30.0, 40.0));
        assert_eq!(ctx.available_range(25.0, 10.0, LANE), (0.0, 100.0));
    }

    #[test]
    fn test_float_moves_down_when_it_does_not_fit() {
        let mut ctx = FloatContext::new();
        let _ = ctx.place_float(FloatSide::Left, 80.0, 20.0, 0.0, LANE);
        let placed = ctx.place_float(FloatSide::Left, 40.0, 10.0, 0.0, LANE);
        assert_eq!(placed.y, 20.0);
        assert_eq!(placed.x, 0.0);
    }

    #[test]
    fn test_clear_sides() {
        let mut ctx = FloatContext::new();
        let _ = ctx.place_float(FloatSide::Left, 10.0, 50.0, 0.0, LANE);
        let _ = ctx.place_float(FloatSide::Right, 10.0, 80.0, 0.0, LANE);
        assert_eq!(ctx.clear(ClearSide::Left, 10.0), 50.0);
        assert_eq!(ctx.clear(ClearSide::Both, 10.0), 80.0);
        assert_eq!(ctx.clear(ClearSide::None, 10.0), 10.0);
        assert_eq!(ctx.max_float_bottom(), Some(80.0));
    }

    #[test]
    fn test_nested_lane_is_intersected() {
        let mut ctx = FloatContext::new();
        let _ = ctx.place_float(FloatSide::Left, 30.0, 20.0, 0.0, LANE);
        let inner = Lane {
            left: 10.0,
            right: 90.0,
        };
        assert_eq!(ctx.available_range(0.0, 5.0, inner), (30.0, 60.0));
        assert!(ctx.intrudes(0.0, 5.0, inner));
    }
}
