//! CSS length values and parsing.
//!
//! [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)

use serde::Serialize;

/// User agent default font size, also the `rem` basis.
/// [§ 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
/// "Lengths refer to distance measurements and are denoted by `<length>` in the
/// property definitions."
///
/// Font-relative and absolute units are converted to pixels while computing
/// the style. Percentages stay symbolic until the containing block is known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LengthValue {
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    /// "1px = 1/96th of 1in"
    Px(f32),
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    Percent(f32),
}

impl LengthValue {
    /// `0px`.
    pub const ZERO: Self = Self::Px(0.0);

    /// Parse a `<length-percentage>` token.
    ///
    /// `font_size` is the element's computed font size, used for `em`, `ex`
    /// and `ch`. Returns `None` for anything that is not a length, including
    /// `calc()` expressions.
    #[must_use]
    pub fn parse(text: &str, font_size: f32) -> Option<Self> {
        let text = text.trim();
        if let Some(pct) = text.strip_suffix('%') {
            return pct.trim().parse::<f32>().ok().filter(|v| v.is_finite()).map(Self::Percent);
        }
        let split = text
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(text.len());
        let (number, unit) = text.split_at(split);
        let value: f32 = number.trim().parse().ok().filter(|v: &f32| v.is_finite())?;
        // [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
        let px = match unit.to_ascii_lowercase().as_str() {
            // "a unitless zero is allowed for lengths"
            "" if value == 0.0 => 0.0,
            "px" => value,
            "pt" => value * 96.0 / 72.0,
            "pc" => value * 16.0,
            "in" => value * 96.0,
            "cm" => value * 96.0 / 2.54,
            "mm" => value * 96.0 / 25.4,
            "q" => value * 96.0 / 101.6,
            // [§ 5.1.1 Font-relative lengths](https://www.w3.org/TR/css-values-4/#font-relative-lengths)
            "em" => value * font_size,
            "rem" => value * DEFAULT_FONT_SIZE_PX,
            "ex" | "ch" => value * font_size * 0.5,
            _ => return None,
        };
        Some(Self::Px(px))
    }

    /// Resolve against a percentage basis.
    #[must_use]
    pub fn resolve(self, basis: f32) -> f32 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => basis * pct / 100.0,
        }
    }

    /// Resolve against a basis that may be indefinite.
    ///
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    /// Percentages of an indefinite size behave as `auto`, signalled by `None`.
    #[must_use]
    pub fn resolve_definite(self, basis: Option<f32>) -> Option<f32> {
        match self {
            Self::Px(px) => Some(px),
            Self::Percent(pct) => basis.filter(|b| b.is_finite()).map(|b| b * pct / 100.0),
        }
    }

    /// Whether this is a percentage.
    #[must_use]
    pub const fn is_percent(self) -> bool {
        matches!(self, Self::Percent(_))
    }
}

/// [§ 4.4 Automatic values](https://www.w3.org/TR/css-values-4/#auto)
///
/// A length that may also be `auto`, as used by `width`, `height`, margins
/// and the inset properties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub enum AutoLength {
    /// `auto`
    #[default]
    Auto,
    /// An explicit length or percentage.
    Length(LengthValue),
}

impl AutoLength {
    /// Parse `auto` or a `<length-percentage>`.
    #[must_use]
    pub fn parse(text: &str, font_size: f32) -> Option<Self> {
        if text.trim().eq_ignore_ascii_case("auto") {
            Some(Self::Auto)
        } else {
            LengthValue::parse(text, font_size).map(Self::Length)
        }
    }

    /// Whether the value is `auto`.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Resolve to pixels, `None` for `auto` or for a percentage of an
    /// indefinite basis.
    #[must_use]
    pub fn resolve_definite(self, basis: Option<f32>) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Length(len) => len.resolve_definite(basis),
        }
    }
}

/// Split a shorthand value into its whitespace-separated components,
/// keeping parenthesised groups together.
#[must_use]
pub fn split_components(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        match c {
            '(' => {
                depth += 1;
                start.get_or_insert(i);
            }
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    out.push(&text[s..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(s) = start {
        out.push(&text[s..]);
    }
    out
}

/// [§ 4.2 Margin shorthand](https://www.w3.org/TR/CSS2/box.html#propdef-margin)
///
/// Expand a 1-4 value box shorthand into `[top, right, bottom, left]`.
#[must_use]
pub fn expand_box_shorthand(text: &str) -> Option<[&str; 4]> {
    let parts = split_components(text);
    match parts.as_slice() {
        [a] => Some([a, a, a, a]),
        [v, h] => Some([v, h, v, h]),
        [t, h, b] => Some([t, h, b, h]),
        [t, r, b, l] => Some([t, r, b, l]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_units_convert_to_px() {
        assert_eq!(LengthValue::parse("1in", 16.0), Some(LengthValue::Px(96.0)));
        assert_eq!(LengthValue::parse("12pt", 16.0), Some(LengthValue::Px(16.0)));
        assert_eq!(LengthValue::parse("0", 16.0), Some(LengthValue::Px(0.0)));
        assert_eq!(LengthValue::parse("5", 16.0), None);
    }

    #[test]
    fn test_font_relative_units_use_element_font_size() {
        assert_eq!(LengthValue::parse("2em", 10.0), Some(LengthValue::Px(20.0)));
        assert_eq!(LengthValue::parse("1rem", 10.0), Some(LengthValue::Px(16.0)));
    }

    #[test]
    fn test_percent_stays_symbolic() {
        let pct = LengthValue::parse("50%", 16.0).unwrap();
        assert_eq!(pct, LengthValue::Percent(50.0));
        assert_eq!(pct.resolve(300.0), 150.0);
        assert_eq!(pct.resolve_definite(None), None);
    }

    #[test]
    fn test_box_shorthand_expansion() {
        assert_eq!(expand_box_shorthand("1px 2px"), Some(["1px", "2px", "1px", "2px"]));
        assert_eq!(expand_box_shorthand("1px 2px 3px"), Some(["1px", "2px", "3px", "2px"]));
        assert_eq!(expand_box_shorthand(""), None);
    }

    #[test]
    fn test_split_components_keeps_functions_whole() {
        assert_eq!(
            split_components("rgb(1, 2, 3) solid  2px"),
            ["rgb(1, 2, 3)", "solid", "2px"]
        );
    }
}
