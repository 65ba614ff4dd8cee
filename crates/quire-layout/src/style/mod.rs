//! Typed computed styles for layout.
//!
//! The resolved property maps handed over by the style resolver are still
//! text. This module validates that text and turns it into the typed values
//! the formatting contexts read.

pub mod computed;
pub mod display;
pub mod list_style;
pub mod validator;
pub mod values;

pub use computed::{
    AlignItems, AutoEdges, BoxSizing, BreakBetween, BreakInside, ClearSide, ComputedStyle,
    FlexDirection, FlexWrap, FloatSide, JustifyContent, LengthEdges, LineHeight, Overflow,
    PositionType, TextAlign, WhiteSpace,
};
pub use display::{
    DisplayValue, InnerDisplayType, OuterDisplayType, UnsupportedDisplay,
    default_display_for_element, parse_display,
};
pub use list_style::{ListStylePosition, ListStyleType, parse_list_style_type};
pub use validator::{CssValidator, DeviceCmykValidator, PropertyValidator};
pub use values::{AutoLength, DEFAULT_FONT_SIZE_PX, LengthValue};
