//! Computed style of a box.
//!
//! [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//! "The computed value is the result of resolving the specified value..."
//!
//! The external resolver has already cascaded and inherited every property,
//! so this module only turns property text into typed values. Invalid text
//! has been filtered by a [`super::PropertyValidator`] before this runs;
//! anything still unparseable falls back to the initial value.

use quire_dom::PropertyMap;
use serde::Serialize;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

use super::display::DisplayValue;
use super::list_style::ListStylePosition;
use super::values::{
    AutoLength, DEFAULT_FONT_SIZE_PX, LengthValue, expand_box_shorthand, split_components,
};

/// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum PositionType {
    /// "The box is a normal box, laid out according to the normal flow."
    #[default]
    Static,
    /// "The box's position is calculated according to the normal flow...
    /// Then the box is offset relative to its normal position."
    Relative,
    /// "The box's position (and possibly size) is specified with the 'top',
    /// 'right', 'bottom', and 'left' properties."
    Absolute,
    /// "Fixed positioning is a subcategory of absolute positioning... the
    /// containing block is established by the viewport", here the page area.
    Fixed,
}

impl PositionType {
    /// Absolute and fixed boxes are taken out of flow.
    #[must_use]
    pub const fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }

    /// Whether the box establishes a containing block for absolute descendants.
    #[must_use]
    pub const fn is_positioned(self) -> bool {
        !matches!(self, Self::Static)
    }
}

/// [§ 9.5.1 'float'](https://www.w3.org/TR/CSS2/visuren.html#float-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FloatSide {
    /// "The box is not floated."
    #[default]
    None,
    /// "The element generates a block box that is floated to the left."
    Left,
    /// "Similar to 'left', except the box is floated to the right."
    Right,
}

/// [§ 9.5.2 'clear'](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ClearSide {
    /// "No constraint on the box's position with respect to floats."
    #[default]
    None,
    /// "...below the bottom outer edge of any left-floating boxes"
    Left,
    /// "...below the bottom outer edge of any right-floating boxes"
    Right,
    /// "...below the bottom outer edge of any right-floating and
    /// left-floating boxes"
    Both,
}

/// [§ 4 'box-sizing'](https://www.w3.org/TR/css-sizing-3/#box-sizing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BoxSizing {
    /// "width and height... are measured inside the padding"
    #[default]
    ContentBox,
    /// "...padding and border are laid out and drawn inside the specified width
    /// and height"
    BorderBox,
}

/// [§ 3 'overflow'](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Overflow {
    /// "There is no special handling of overflow"
    #[default]
    Visible,
    /// Clipped, establishes a BFC.
    Hidden,
    /// Clipped, does not establish a scroll container.
    Clip,
    /// Scroll container.
    Scroll,
    /// Scroll container if needed.
    Auto,
}

impl Overflow {
    /// `overflow: visible`
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }
}

/// [§ 16.2 'text-align'](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TextAlign {
    /// `left`, and `start` in left-to-right text.
    #[default]
    #[strum(to_string = "left", serialize = "start")]
    Left,
    /// `right`, and `end` in left-to-right text.
    #[strum(to_string = "right", serialize = "end")]
    Right,
    /// "Inline contents are centered within the line box."
    Center,
    /// "Text is justified according to the method specified by the
    /// text-justify property"
    Justify,
}

/// [§ 3 'white-space'](https://www.w3.org/TR/css-text-3/#white-space-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum WhiteSpace {
    /// Collapse white space, wrap lines.
    #[default]
    Normal,
    /// Preserve white space and newlines, no wrapping.
    Pre,
    /// Collapse white space, no wrapping.
    Nowrap,
    /// Preserve white space and newlines, wrap lines.
    PreWrap,
    /// Collapse spaces but keep newlines, wrap lines.
    PreLine,
}

impl WhiteSpace {
    /// Whether runs of spaces collapse.
    #[must_use]
    pub const fn collapses_spaces(self) -> bool {
        matches!(self, Self::Normal | Self::Nowrap | Self::PreLine)
    }

    /// Whether newlines in the source force line breaks.
    #[must_use]
    pub const fn preserves_newlines(self) -> bool {
        matches!(self, Self::Pre | Self::PreWrap | Self::PreLine)
    }

    /// Whether lines may wrap at soft wrap opportunities.
    #[must_use]
    pub const fn wraps(self) -> bool {
        matches!(self, Self::Normal | Self::PreWrap | Self::PreLine)
    }
}

/// [§ 10.8.1 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#propdef-line-height)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum LineHeight {
    /// "Tells user agents to set the used value to a 'reasonable' value based
    /// on the font of the element."
    #[default]
    Normal,
    /// "The used value of the property is this number multiplied by the
    /// element's font size."
    Number(f32),
    /// An absolute line height in pixels.
    Px(f32),
}

impl LineHeight {
    /// Used line height for a font size and the face's normal ratio.
    #[must_use]
    pub fn resolve(self, font_size: f32, normal_ratio: f32) -> f32 {
        match self {
            Self::Normal => font_size * normal_ratio,
            Self::Number(n) => font_size * n,
            Self::Px(px) => px,
        }
    }
}

/// [§ 5.1 'flex-direction'](https://www.w3.org/TR/css-flexbox-1/#flex-direction-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FlexDirection {
    /// "The flex container's main axis has the same orientation as the inline axis"
    #[default]
    Row,
    /// "Same as row, except the main-start and main-end directions are swapped."
    RowReverse,
    /// "The flex container's main axis has the same orientation as the block axis"
    Column,
    /// "Same as column, except the main-start and main-end directions are swapped."
    ColumnReverse,
}

impl FlexDirection {
    /// Whether the main axis is horizontal.
    #[must_use]
    pub const fn is_row(self) -> bool {
        matches!(self, Self::Row | Self::RowReverse)
    }

    /// Whether main-start and main-end are swapped.
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }
}

/// [§ 5.2 'flex-wrap'](https://www.w3.org/TR/css-flexbox-1/#flex-wrap-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum FlexWrap {
    /// "The flex container is single-line."
    #[default]
    Nowrap,
    /// "The flex container is multi-line."
    Wrap,
    /// "Same as wrap" with cross-start and cross-end swapped.
    WrapReverse,
}

/// [§ 8.2 'justify-content'](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum JustifyContent {
    /// "Flex items are packed toward the start of the line."
    #[default]
    #[strum(to_string = "flex-start", serialize = "start", serialize = "normal", serialize = "left")]
    FlexStart,
    /// "Flex items are packed toward the end of the line."
    #[strum(to_string = "flex-end", serialize = "end", serialize = "right")]
    FlexEnd,
    /// "Flex items are packed toward the center of the line."
    Center,
    /// "Flex items are evenly distributed in the line."
    SpaceBetween,
    /// "...with half-size spaces on either end."
    SpaceAround,
    /// Equal spaces between and around every item.
    SpaceEvenly,
}

/// [§ 8.3 'align-items'](https://www.w3.org/TR/css-flexbox-1/#align-items-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum AlignItems {
    /// "If the cross size property of the flex item computes to auto... the
    /// used outer cross size is the used cross size of its flex line"
    #[default]
    #[strum(to_string = "stretch", serialize = "normal")]
    Stretch,
    /// "The cross-start margin edge of the flex item is placed flush with the
    /// cross-start edge of the line."
    #[strum(to_string = "flex-start", serialize = "start", serialize = "self-start")]
    FlexStart,
    /// "...flush with the cross-end edge of the line."
    #[strum(to_string = "flex-end", serialize = "end", serialize = "self-end")]
    FlexEnd,
    /// "The flex item's margin box is centered in the cross axis within the line."
    Center,
    /// Treated as `flex-start`.
    Baseline,
}

/// [§ 3.1 break-before / break-after](https://www.w3.org/TR/css-break-3/#break-between)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BreakBetween {
    /// "Neither force nor forbid a break before/after the principal box."
    #[default]
    #[strum(to_string = "auto", serialize = "column", serialize = "avoid-column")]
    Auto,
    /// "Avoid a break before/after the principal box."
    #[strum(to_string = "avoid", serialize = "avoid-page")]
    Avoid,
    /// "Always force a page break before/after the principal box."
    Page,
    /// The legacy `page-break-*: always`.
    Always,
    /// "Force one or two page breaks ... so that the next page is formatted
    /// as a left page."
    #[strum(to_string = "left", serialize = "verso")]
    Left,
    /// "...so that the next page is formatted as a right page."
    #[strum(to_string = "right", serialize = "recto")]
    Right,
}

impl BreakBetween {
    /// Whether this value forces a page break.
    #[must_use]
    pub const fn is_forced(self) -> bool {
        matches!(self, Self::Page | Self::Always | Self::Left | Self::Right)
    }
}

/// [§ 3.2 break-inside](https://www.w3.org/TR/css-break-3/#break-within)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum BreakInside {
    /// "Impose no additional breaking constraints within the box."
    #[default]
    #[strum(to_string = "auto", serialize = "avoid-column")]
    Auto,
    /// "Avoid breaks within the box."
    #[strum(to_string = "avoid", serialize = "avoid-page")]
    Avoid,
}

/// Edge values that may be `auto`, as used by margins and insets.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AutoEdges {
    /// Top edge.
    pub top: AutoLength,
    /// Right edge.
    pub right: AutoLength,
    /// Bottom edge.
    pub bottom: AutoLength,
    /// Left edge.
    pub left: AutoLength,
}

/// Edge values that are always lengths, as used by padding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LengthEdges {
    /// Top edge.
    pub top: LengthValue,
    /// Right edge.
    pub right: LengthValue,
    /// Bottom edge.
    pub bottom: LengthValue,
    /// Left edge.
    pub left: LengthValue,
}

impl Default for LengthEdges {
    fn default() -> Self {
        Self {
            top: LengthValue::ZERO,
            right: LengthValue::ZERO,
            bottom: LengthValue::ZERO,
            left: LengthValue::ZERO,
        }
    }
}

/// One entry of a `counter-reset`, `counter-set` or `counter-increment` list.
pub type CounterChange = (String, i32);

/// Computed styles for a box.
///
/// [§ 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedStyle {
    /// [§ 2 'display'](https://www.w3.org/TR/css-display-3/#the-display-properties)
    ///
    /// Set by the box tree builder, which owns blockification and defaults.
    pub display: DisplayValue,
    /// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
    pub position: PositionType,
    /// [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
    /// 'top', 'right', 'bottom', 'left'
    pub inset: AutoEdges,
    /// [§ 9.5.1 'float'](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    pub float: FloatSide,
    /// [§ 9.5.2 'clear'](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    pub clear: ClearSide,

    /// [§ 10.2 'width'](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
    pub width: AutoLength,
    /// [§ 10.5 'height'](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    pub height: AutoLength,
    /// [§ 10.4 'min-width'](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    pub min_width: LengthValue,
    /// 'max-width', `None` for `none`.
    pub max_width: Option<LengthValue>,
    /// [§ 10.7 'min-height'](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
    pub min_height: LengthValue,
    /// 'max-height', `None` for `none`.
    pub max_height: Option<LengthValue>,
    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    pub margin: AutoEdges,
    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    pub padding: LengthEdges,
    /// [§ 8.5.1 Border width](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
    ///
    /// Already zeroed for sides whose border style is `none` or `hidden`.
    pub border_width: [f32; 4],
    /// [§ 4 'box-sizing'](https://www.w3.org/TR/css-sizing-3/#box-sizing)
    pub box_sizing: BoxSizing,
    /// [§ 3 'overflow'](https://www.w3.org/TR/css-overflow-3/#overflow-properties)
    pub overflow: Overflow,
    /// [§ 5.1 'aspect-ratio'](https://www.w3.org/TR/css-sizing-4/#aspect-ratio)
    /// as width / height.
    pub aspect_ratio: Option<f32>,

    /// [§ 3.5 'font-size'](https://www.w3.org/TR/css-fonts-4/#font-size-prop) in px.
    pub font_size: f32,
    /// [§ 3.1 'font-family'](https://www.w3.org/TR/css-fonts-4/#font-family-prop)
    /// in priority order, unquoted.
    pub font_family: Vec<String>,
    /// [§ 3.2 'font-weight'](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
    pub font_weight: u16,
    /// [§ 3.4 'font-style'](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
    /// is `italic` or `oblique`.
    pub italic: bool,
    /// [§ 10.8.1 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#propdef-line-height)
    pub line_height: LineHeight,
    /// [§ 16.2 'text-align'](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    pub text_align: TextAlign,
    /// [§ 16.1 'text-indent'](https://www.w3.org/TR/CSS2/text.html#indentation-prop)
    pub text_indent: LengthValue,
    /// [§ 3 'white-space'](https://www.w3.org/TR/css-text-3/#white-space-property)
    pub white_space: WhiteSpace,
    /// [§ 3.1 'color'](https://www.w3.org/TR/css-color-4/#the-color-property),
    /// passed through to the output unchanged.
    pub color: String,

    /// [§ 3.3 'orphans'](https://www.w3.org/TR/css-break-3/#widows-orphans)
    /// "the minimum number of lines in a block container that must be left
    /// at the bottom of a fragment before a fragmentation break"
    pub orphans: u32,
    /// "the minimum number of lines in a block container that must be left
    /// at the top of a fragment after a fragmentation break"
    pub widows: u32,
    /// [§ 3.1 'break-before'](https://www.w3.org/TR/css-break-3/#break-between)
    pub break_before: BreakBetween,
    /// 'break-after'
    pub break_after: BreakBetween,
    /// [§ 3.2 'break-inside'](https://www.w3.org/TR/css-break-3/#break-within)
    pub break_inside: BreakInside,

    /// [§ 3.1 'list-style-type'](https://www.w3.org/TR/css-lists-3/#text-markers)
    /// as written; the builder validates it when generating a marker.
    pub list_style_type: String,
    /// [§ 3.2 'list-style-position'](https://www.w3.org/TR/css-lists-3/#list-style-position-property)
    pub list_style_position: ListStylePosition,
    /// [§ 4.2 'counter-reset'](https://www.w3.org/TR/css-lists-3/#counter-reset)
    pub counter_reset: Vec<CounterChange>,
    /// [§ 4.3 'counter-set'](https://www.w3.org/TR/css-lists-3/#increment-set)
    pub counter_set: Vec<CounterChange>,
    /// 'counter-increment'
    pub counter_increment: Vec<CounterChange>,
    /// [§ 1 'content'](https://www.w3.org/TR/css-content-3/#content-property)
    /// as written; parsed by [`crate::content`].
    pub content: Option<String>,

    /// [§ 5.1 'flex-direction'](https://www.w3.org/TR/css-flexbox-1/#flex-direction-property)
    pub flex_direction: FlexDirection,
    /// [§ 5.2 'flex-wrap'](https://www.w3.org/TR/css-flexbox-1/#flex-wrap-property)
    pub flex_wrap: FlexWrap,
    /// [§ 7.3.1 'flex-grow'](https://www.w3.org/TR/css-flexbox-1/#flex-grow-property)
    pub flex_grow: f32,
    /// [§ 7.3.2 'flex-shrink'](https://www.w3.org/TR/css-flexbox-1/#flex-shrink-property)
    pub flex_shrink: f32,
    /// [§ 7.3.3 'flex-basis'](https://www.w3.org/TR/css-flexbox-1/#flex-basis-property)
    /// `auto` and `content` both map to [`AutoLength::Auto`].
    pub flex_basis: AutoLength,
    /// [§ 8.2 'justify-content'](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
    pub justify_content: JustifyContent,
    /// [§ 8.3 'align-items'](https://www.w3.org/TR/css-flexbox-1/#align-items-property)
    pub align_items: AlignItems,
    /// 'align-self', `None` for `auto`.
    pub align_self: Option<AlignItems>,
    /// [§ 8.1 'row-gap'](https://www.w3.org/TR/css-align-3/#column-row-gap)
    pub row_gap: LengthValue,
    /// 'column-gap'
    pub column_gap: LengthValue,
    /// [§ 17.6.1 'border-spacing'](https://www.w3.org/TR/CSS2/tables.html#separated-borders)
    /// horizontal and vertical spacing in px.
    pub border_spacing: (f32, f32),
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: DisplayValue::inline(),
            position: PositionType::Static,
            inset: AutoEdges::default(),
            float: FloatSide::None,
            clear: ClearSide::None,
            width: AutoLength::Auto,
            height: AutoLength::Auto,
            min_width: LengthValue::ZERO,
            max_width: None,
            min_height: LengthValue::ZERO,
            max_height: None,
            margin: AutoEdges {
                top: AutoLength::Length(LengthValue::ZERO),
                right: AutoLength::Length(LengthValue::ZERO),
                bottom: AutoLength::Length(LengthValue::ZERO),
                left: AutoLength::Length(LengthValue::ZERO),
            },
            padding: LengthEdges::default(),
            border_width: [0.0; 4],
            box_sizing: BoxSizing::ContentBox,
            overflow: Overflow::Visible,
            aspect_ratio: None,
            font_size: DEFAULT_FONT_SIZE_PX,
            font_family: vec!["serif".to_string()],
            font_weight: 400,
            italic: false,
            line_height: LineHeight::Normal,
            text_align: TextAlign::Left,
            text_indent: LengthValue::ZERO,
            white_space: WhiteSpace::Normal,
            color: "black".to_string(),
            orphans: 2,
            widows: 2,
            break_before: BreakBetween::Auto,
            break_after: BreakBetween::Auto,
            break_inside: BreakInside::Auto,
            list_style_type: "disc".to_string(),
            list_style_position: ListStylePosition::Outside,
            counter_reset: Vec::new(),
            counter_set: Vec::new(),
            counter_increment: Vec::new(),
            content: None,
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::Nowrap,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: AutoLength::Auto,
            justify_content: JustifyContent::FlexStart,
            align_items: AlignItems::Stretch,
            align_self: None,
            row_gap: LengthValue::ZERO,
            column_gap: LengthValue::ZERO,
            border_spacing: (0.0, 0.0),
        }
    }
}

fn keyword<T: FromStr>(map: &PropertyMap, name: &str) -> Option<T> {
    map.value(name).and_then(|v| T::from_str(v.trim()).ok())
}

/// [§ 8.5.1 'border-width'](https://www.w3.org/TR/CSS2/box.html#border-width-properties)
/// "thin <= medium <= thick"
fn border_width_px(text: &str, font_size: f32) -> Option<f32> {
    match text.trim().to_ascii_lowercase().as_str() {
        "thin" => Some(1.0),
        "medium" => Some(3.0),
        "thick" => Some(5.0),
        other => match LengthValue::parse(other, font_size)? {
            LengthValue::Px(px) if px >= 0.0 => Some(px),
            _ => None,
        },
    }
}

const BORDER_STYLES: [&str; 10] = [
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

/// The width part of a `border` / `border-<side>` shorthand. `Some(0.0)` when
/// the style component is `none` or `hidden`; `medium` when a style is given
/// without a width.
fn border_shorthand_width(text: &str, font_size: f32) -> Option<f32> {
    let parts = split_components(text);
    let mut width = None;
    let mut has_style = false;
    for part in &parts {
        let lower = part.to_ascii_lowercase();
        if lower == "none" || lower == "hidden" {
            return Some(0.0);
        }
        if BORDER_STYLES.contains(&lower.as_str()) {
            has_style = true;
        } else if let Some(w) = border_width_px(part, font_size) {
            width = Some(w);
        }
    }
    width.or(has_style.then_some(3.0))
}

/// Parse a `counter-reset` style list: `name [integer]?` pairs, or `none`.
#[must_use]
pub fn parse_counter_list(text: &str, default: i32) -> Vec<CounterChange> {
    let mut out: Vec<CounterChange> = Vec::new();
    if text.trim().eq_ignore_ascii_case("none") {
        return out;
    }
    for token in text.split_whitespace() {
        if let Ok(n) = token.parse::<i32>() {
            if let Some(last) = out.last_mut() {
                last.1 = n;
            }
        } else {
            out.push((token.to_string(), default));
        }
    }
    out
}

/// Parse a `font-family` list into unquoted family names.
#[must_use]
pub fn parse_font_family(text: &str) -> Vec<String> {
    text.split(',')
        .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\'').trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Parse a `font-weight` value to its numeric weight.
#[must_use]
pub fn parse_font_weight(text: &str) -> Option<u16> {
    match text.trim().to_ascii_lowercase().as_str() {
        "normal" => Some(400),
        "bold" | "bolder" => Some(700),
        "lighter" => Some(300),
        other => other.parse::<u16>().ok().filter(|w| (1..=1000).contains(w)),
    }
}

/// Parse `line-height`. Lengths have been absolutized to px upstream.
#[must_use]
pub fn parse_line_height(text: &str, font_size: f32) -> Option<LineHeight> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("normal") {
        return Some(LineHeight::Normal);
    }
    if let Ok(n) = text.parse::<f32>() {
        return (n >= 0.0).then_some(LineHeight::Number(n));
    }
    match LengthValue::parse(text, font_size)? {
        LengthValue::Px(px) => Some(LineHeight::Px(px)),
        LengthValue::Percent(pct) => Some(LineHeight::Px(font_size * pct / 100.0)),
    }
}

/// Parse `aspect-ratio`: `auto`, `<number>`, or `<number> / <number>`,
/// optionally combined with `auto`.
#[must_use]
pub fn parse_aspect_ratio(text: &str) -> Option<Option<f32>> {
    let ratio_text: String = text
        .split_whitespace()
        .filter(|t| !t.eq_ignore_ascii_case("auto"))
        .collect();
    if ratio_text.is_empty() {
        return text.trim().eq_ignore_ascii_case("auto").then_some(None);
    }
    let ratio = match ratio_text.split_once('/') {
        Some((w, h)) => {
            let w: f32 = w.parse().ok()?;
            let h: f32 = h.parse().ok()?;
            (h > 0.0).then(|| w / h)?
        }
        None => ratio_text.parse().ok()?,
    };
    (ratio.is_finite() && ratio > 0.0).then_some(Some(ratio))
}

/// [§ 7.1.1 'flex' shorthand](https://www.w3.org/TR/css-flexbox-1/#flex-common)
///
/// Returns `(grow, shrink, basis)`.
#[must_use]
pub fn parse_flex_shorthand(text: &str, font_size: f32) -> Option<(f32, f32, AutoLength)> {
    match text.trim().to_ascii_lowercase().as_str() {
        // "flex: initial - Equivalent to flex: 0 1 auto."
        "initial" => return Some((0.0, 1.0, AutoLength::Auto)),
        // "flex: auto - Equivalent to flex: 1 1 auto."
        "auto" => return Some((1.0, 1.0, AutoLength::Auto)),
        // "flex: none - Equivalent to flex: 0 0 auto."
        "none" => return Some((0.0, 0.0, AutoLength::Auto)),
        _ => {}
    }
    let mut numbers = Vec::new();
    // "When omitted from the flex shorthand, its specified value is 0."
    let mut basis = AutoLength::Length(LengthValue::ZERO);
    for part in text.split_whitespace() {
        if let Ok(n) = part.parse::<f32>() {
            numbers.push(n);
        } else if part.eq_ignore_ascii_case("content") {
            basis = AutoLength::Auto;
        } else {
            basis = AutoLength::parse(part, font_size)?;
        }
    }
    match numbers.as_slice() {
        [] => Some((1.0, 1.0, basis)),
        [g] => Some((*g, 1.0, basis)),
        [g, s] => Some((*g, *s, basis)),
        _ => None,
    }
}

impl ComputedStyle {
    /// Compute the style of a box from its resolved property map.
    ///
    /// `display` is left at its default; the box tree builder owns it.
    #[must_use]
    pub fn compute(map: &PropertyMap) -> Self {
        let mut style = Self::default();
        let fs = map
            .value("font-size")
            .and_then(|v| LengthValue::parse(v, DEFAULT_FONT_SIZE_PX))
            .map_or(DEFAULT_FONT_SIZE_PX, |l| l.resolve(DEFAULT_FONT_SIZE_PX));
        style.font_size = fs;
        let length = |name: &str| map.value(name).and_then(|v| LengthValue::parse(v, fs));
        let auto_length = |name: &str| map.value(name).and_then(|v| AutoLength::parse(v, fs));

        // Positioning
        if let Some(v) = keyword(map, "position") {
            style.position = v;
        }
        for (slot, name) in [
            (&mut style.inset.top, "top"),
            (&mut style.inset.right, "right"),
            (&mut style.inset.bottom, "bottom"),
            (&mut style.inset.left, "left"),
        ] {
            if let Some(v) = auto_length(name) {
                *slot = v;
            }
        }
        if let Some(v) = keyword(map, "float") {
            style.float = v;
        }
        if let Some(v) = keyword(map, "clear") {
            style.clear = v;
        }

        // Sizing
        if let Some(v) = auto_length("width") {
            style.width = v;
        }
        if let Some(v) = auto_length("height") {
            style.height = v;
        }
        if let Some(v) = length("min-width") {
            style.min_width = v;
        }
        if let Some(v) = length("min-height") {
            style.min_height = v;
        }
        style.max_width = length("max-width");
        style.max_height = length("max-height");
        if let Some(v) = keyword(map, "box-sizing") {
            style.box_sizing = v;
        }
        if let Some(v) = keyword(map, "overflow") {
            style.overflow = v;
        }
        if let Some(ratio) = map.value("aspect-ratio").and_then(parse_aspect_ratio) {
            style.aspect_ratio = ratio;
        }

        // Box edges: shorthands first, longhands override.
        if let Some([t, r, b, l]) = map.value("margin").and_then(expand_box_shorthand) {
            let parse = |v: &str| AutoLength::parse(v, fs);
            if let (Some(t), Some(r), Some(b), Some(l)) = (parse(t), parse(r), parse(b), parse(l)) {
                style.margin = AutoEdges {
                    top: t,
                    right: r,
                    bottom: b,
                    left: l,
                };
            }
        }
        for (slot, name) in [
            (&mut style.margin.top, "margin-top"),
            (&mut style.margin.right, "margin-right"),
            (&mut style.margin.bottom, "margin-bottom"),
            (&mut style.margin.left, "margin-left"),
        ] {
            if let Some(v) = auto_length(name) {
                *slot = v;
            }
        }
        if let Some([t, r, b, l]) = map.value("padding").and_then(expand_box_shorthand) {
            let parse = |v: &str| LengthValue::parse(v, fs);
            if let (Some(t), Some(r), Some(b), Some(l)) = (parse(t), parse(r), parse(b), parse(l)) {
                style.padding = LengthEdges {
                    top: t,
                    right: r,
                    bottom: b,
                    left: l,
                };
            }
        }
        for (slot, name) in [
            (&mut style.padding.top, "padding-top"),
            (&mut style.padding.right, "padding-right"),
            (&mut style.padding.bottom, "padding-bottom"),
            (&mut style.padding.left, "padding-left"),
        ] {
            if let Some(v) = length(name) {
                *slot = v;
            }
        }
        style.border_width = Self::compute_border_widths(map, fs);

        // Text
        if let Some(families) = map.value("font-family").map(parse_font_family)
            && !families.is_empty()
        {
            style.font_family = families;
        }
        if let Some(w) = map.value("font-weight").and_then(parse_font_weight) {
            style.font_weight = w;
        }
        style.italic = map
            .value("font-style")
            .is_some_and(|v| matches!(v.trim(), "italic" | "oblique"));
        if let Some(lh) = map.value("line-height").and_then(|v| parse_line_height(v, fs)) {
            style.line_height = lh;
        }
        if let Some(v) = keyword(map, "text-align") {
            style.text_align = v;
        }
        if let Some(v) = length("text-indent") {
            style.text_indent = v;
        }
        if let Some(v) = keyword(map, "white-space") {
            style.white_space = v;
        }
        if let Some(v) = map.value("color") {
            style.color = v.trim().to_string();
        }

        // Fragmentation
        let count = |name: &str| {
            map.value(name)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|n| *n >= 1)
        };
        if let Some(n) = count("orphans") {
            style.orphans = n;
        }
        if let Some(n) = count("widows") {
            style.widows = n;
        }
        // [§ 3.4 Page Break Aliases](https://www.w3.org/TR/css-break-3/#page-break-properties)
        // "the page-break-before, page-break-after and page-break-inside
        // properties... must be treated as legacy shorthands"
        style.break_before = keyword(map, "break-before")
            .or_else(|| keyword(map, "page-break-before"))
            .unwrap_or_default();
        style.break_after = keyword(map, "break-after")
            .or_else(|| keyword(map, "page-break-after"))
            .unwrap_or_default();
        style.break_inside = keyword(map, "break-inside")
            .or_else(|| keyword(map, "page-break-inside"))
            .unwrap_or_default();

        // Lists, counters, generated content
        if let Some(v) = map.value("list-style-type") {
            style.list_style_type = v.trim().to_string();
        }
        if let Some(v) = keyword(map, "list-style-position") {
            style.list_style_position = v;
        }
        if let Some(v) = map.value("counter-reset") {
            style.counter_reset = parse_counter_list(v, 0);
        }
        if let Some(v) = map.value("counter-set") {
            style.counter_set = parse_counter_list(v, 0);
        }
        if let Some(v) = map.value("counter-increment") {
            style.counter_increment = parse_counter_list(v, 1);
        }
        style.content = map.value("content").map(|v| v.trim().to_string());

        // Flex
        if let Some(v) = keyword(map, "flex-direction") {
            style.flex_direction = v;
        }
        if let Some(v) = keyword(map, "flex-wrap") {
            style.flex_wrap = v;
        }
        if let Some((g, s, b)) = map.value("flex").and_then(|v| parse_flex_shorthand(v, fs)) {
            style.flex_grow = g;
            style.flex_shrink = s;
            style.flex_basis = b;
        }
        let number = |name: &str| {
            map.value(name)
                .and_then(|v| v.trim().parse::<f32>().ok())
                .filter(|n| *n >= 0.0)
        };
        if let Some(g) = number("flex-grow") {
            style.flex_grow = g;
        }
        if let Some(s) = number("flex-shrink") {
            style.flex_shrink = s;
        }
        if let Some(b) = map.value("flex-basis") {
            style.flex_basis = if b.trim().eq_ignore_ascii_case("content") {
                AutoLength::Auto
            } else {
                AutoLength::parse(b, fs).unwrap_or_default()
            };
        }
        if let Some(v) = keyword(map, "justify-content") {
            style.justify_content = v;
        }
        if let Some(v) = keyword(map, "align-items") {
            style.align_items = v;
        }
        style.align_self = map
            .value("align-self")
            .filter(|v| !v.trim().eq_ignore_ascii_case("auto"))
            .and_then(|v| AlignItems::from_str(v.trim()).ok());
        let gap = |v: &str| {
            if v.trim().eq_ignore_ascii_case("normal") {
                Some(LengthValue::ZERO)
            } else {
                LengthValue::parse(v, fs)
            }
        };
        if let Some(v) = map.value("gap") {
            let parts = split_components(v);
            if let Some(row) = parts.first().and_then(|p| gap(p)) {
                style.row_gap = row;
                style.column_gap = parts.get(1).and_then(|p| gap(p)).unwrap_or(row);
            }
        }
        if let Some(v) = map.value("row-gap").and_then(gap) {
            style.row_gap = v;
        }
        if let Some(v) = map.value("column-gap").and_then(gap) {
            style.column_gap = v;
        }

        // Tables
        if let Some(v) = map.value("border-spacing") {
            let parts: Vec<f32> = split_components(v)
                .iter()
                .filter_map(|p| LengthValue::parse(p, fs).map(|l| l.resolve(0.0)))
                .collect();
            style.border_spacing = match parts.as_slice() {
                [both] => (*both, *both),
                [h, v, ..] => (*h, *v),
                [] => (0.0, 0.0),
            };
        }

        style
    }

    fn compute_border_widths(map: &PropertyMap, fs: f32) -> [f32; 4] {
        let mut widths = [0.0; 4];
        if let Some(w) = map.value("border").and_then(|v| border_shorthand_width(v, fs)) {
            widths = [w; 4];
        }
        if let Some(sides) = map.value("border-width").and_then(expand_box_shorthand) {
            for (slot, side) in widths.iter_mut().zip(sides) {
                if let Some(w) = border_width_px(side, fs) {
                    *slot = w;
                }
            }
        }
        for (i, side) in ["top", "right", "bottom", "left"].iter().enumerate() {
            if let Some(w) = map
                .value(&format!("border-{side}"))
                .and_then(|v| border_shorthand_width(v, fs))
            {
                widths[i] = w;
            }
            if let Some(w) = map
                .value(&format!("border-{side}-width"))
                .and_then(|v| border_width_px(v, fs))
            {
                widths[i] = w;
            }
        }
        // [§ 8.5.3 Border style](https://www.w3.org/TR/CSS2/box.html#border-style-properties)
        // "none: No border... the computed border width is zero"
        let styles = map.value("border-style").and_then(expand_box_shorthand);
        for (i, side) in ["top", "right", "bottom", "left"].iter().enumerate() {
            let style = map
                .value(&format!("border-{side}-style"))
                .or_else(|| styles.map(|s| s[i]));
            if style.is_some_and(|s| matches!(s.trim(), "none" | "hidden")) {
                widths[i] = 0.0;
            }
        }
        widths
    }

    /// Style of an anonymous box: inherited properties come from `parent`,
    /// everything else takes its initial value.
    ///
    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    /// "The properties of anonymous boxes are inherited from the enclosing
    /// non-anonymous box."
    #[must_use]
    pub fn anonymous_from(parent: &Self) -> Self {
        Self {
            display: DisplayValue::block(),
            font_size: parent.font_size,
            font_family: parent.font_family.clone(),
            font_weight: parent.font_weight,
            italic: parent.italic,
            line_height: parent.line_height,
            text_align: parent.text_align,
            text_indent: parent.text_indent,
            white_space: parent.white_space,
            color: parent.color.clone(),
            orphans: parent.orphans,
            widows: parent.widows,
            list_style_type: parent.list_style_type.clone(),
            list_style_position: parent.list_style_position,
            border_spacing: parent.border_spacing,
            ..Self::default()
        }
    }

    /// Whether the box is floated.
    #[must_use]
    pub fn is_floated(&self) -> bool {
        self.float != FloatSide::None
    }

    /// Whether the box is absolutely or fixed positioned.
    #[must_use]
    pub const fn is_absolutely_positioned(&self) -> bool {
        self.position.is_out_of_flow()
    }

    /// Used `break-inside: avoid`.
    #[must_use]
    pub fn avoids_break_inside(&self) -> bool {
        self.break_inside == BreakInside::Avoid
    }

    /// The `border_width` array as `(top, right, bottom, left)`.
    #[must_use]
    pub const fn border(&self) -> (f32, f32, f32, f32) {
        let [t, r, b, l] = self.border_width;
        (t, r, b, l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compute(decls: &[(&str, &str)]) -> ComputedStyle {
        ComputedStyle::compute(&PropertyMap::from_declarations(decls.iter().copied()))
    }

    #[test]
    fn test_margin_shorthand_then_longhand() {
        let style = compute(&[("margin", "10px auto"), ("margin-top", "20px")]);
        assert_eq!(style.margin.top, AutoLength::Length(LengthValue::Px(20.0)));
        assert_eq!(style.margin.left, AutoLength::Auto);
        assert_eq!(style.margin.bottom, AutoLength::Length(LengthValue::Px(10.0)));
    }

    #[test]
    fn test_border_shorthand_and_style_none() {
        let style = compute(&[("border", "2px solid red"), ("border-left-style", "none")]);
        assert_eq!(style.border_width, [2.0, 2.0, 2.0, 0.0]);
        let medium = compute(&[("border-top", "solid")]);
        assert_eq!(medium.border_width[0], 3.0);
    }

    #[test]
    fn test_page_break_aliases() {
        let style = compute(&[("page-break-before", "always"), ("page-break-inside", "avoid")]);
        assert_eq!(style.break_before, BreakBetween::Always);
        assert!(style.break_before.is_forced());
        assert_eq!(style.break_inside, BreakInside::Avoid);
        let modern = compute(&[("break-after", "recto")]);
        assert_eq!(modern.break_after, BreakBetween::Right);
    }

    #[test]
    fn test_flex_shorthand() {
        assert_eq!(
            parse_flex_shorthand("1", 16.0),
            Some((1.0, 1.0, AutoLength::Length(LengthValue::ZERO)))
        );
        assert_eq!(parse_flex_shorthand("none", 16.0), Some((0.0, 0.0, AutoLength::Auto)));
        assert_eq!(
            parse_flex_shorthand("2 0 50%", 16.0),
            Some((2.0, 0.0, AutoLength::Length(LengthValue::Percent(50.0))))
        );
    }

    #[test]
    fn test_counter_lists() {
        assert_eq!(
            parse_counter_list("chapter section 3", 0),
            vec![("chapter".to_string(), 0), ("section".to_string(), 3)]
        );
        assert_eq!(parse_counter_list("item", 1), vec![("item".to_string(), 1)]);
        assert!(parse_counter_list("none", 1).is_empty());
    }

    #[test]
    fn test_aspect_ratio_forms() {
        assert_eq!(parse_aspect_ratio("16 / 9"), Some(Some(16.0 / 9.0)));
        assert_eq!(parse_aspect_ratio("2"), Some(Some(2.0)));
        assert_eq!(parse_aspect_ratio("auto"), Some(None));
        assert_eq!(parse_aspect_ratio("auto 1/2"), Some(Some(0.5)));
        assert_eq!(parse_aspect_ratio("1/0"), None);
    }

    #[test]
    fn test_anonymous_style_inherits_text_only() {
        let parent = compute(&[("margin", "10px"), ("orphans", "4"), ("font-size", "20px")]);
        let anon = ComputedStyle::anonymous_from(&parent);
        assert_eq!(anon.orphans, 4);
        assert_eq!(anon.font_size, 20.0);
        assert_eq!(anon.margin, ComputedStyle::default().margin);
    }
}
