//! Property value validation.
//!
//! [§ 2.2 Error handling](https://www.w3.org/TR/css-syntax-3/#error-handling)
//! "When errors occur in CSS, the parser attempts to recover gracefully,
//! throwing away only the minimum amount of content before returning to
//! parsing as normal."
//!
//! The box tree builder runs every specified declaration through a
//! [`PropertyValidator`]; rejected values are reported as
//! `invalid-property-value` and ignored, as if never declared.

use std::fmt::Debug;
use std::str::FromStr;

use super::computed::{
    AlignItems, BoxSizing, BreakBetween, BreakInside, ClearSide, FlexDirection, FlexWrap,
    FloatSide, JustifyContent, Overflow, PositionType, TextAlign, WhiteSpace, parse_aspect_ratio,
    parse_flex_shorthand, parse_font_weight, parse_line_height,
};
use super::list_style::ListStylePosition;
use crate::content::parse_content;
use super::values::{AutoLength, LengthValue, expand_box_shorthand, split_components};

/// Decides whether a declared value is valid for a property.
///
/// Implementations must accept every value they do not know how to check;
/// unknown properties are ignored by layout anyway.
pub trait PropertyValidator: Debug + Send + Sync {
    /// Whether `value` is a valid value of `property`.
    fn validate(&self, property: &str, value: &str) -> bool;
}

/// Grammar checks for the properties layout consumes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssValidator;

/// [`CssValidator`] extended with the `device-cmyk()` colour function of
/// [CSS Color 5 § 14](https://www.w3.org/TR/css-color-5/#device-cmyk).
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceCmykValidator;

/// [§ 6.1 Named colors](https://www.w3.org/TR/css-color-4/#named-colors)
/// The basic keywords; extended names pass the identifier check below.
const BASIC_COLORS: [&str; 18] = [
    "black", "silver", "gray", "white", "maroon", "red", "purple", "fuchsia", "green", "lime",
    "olive", "yellow", "navy", "blue", "teal", "aqua", "transparent", "currentcolor",
];

const COLOR_FUNCTIONS: [&str; 8] = [
    "rgb(", "rgba(", "hsl(", "hsla(", "hwb(", "lab(", "lch(", "color(",
];

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '-' || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_balanced_function(text: &str, prefixes: &[&str]) -> bool {
    let lower = text.to_ascii_lowercase();
    prefixes.iter().any(|p| lower.starts_with(p)) && lower.ends_with(')')
}

/// [§ 4 Representing Colors](https://www.w3.org/TR/css-color-4/#color-type)
fn is_color(text: &str) -> bool {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    let lower = text.to_ascii_lowercase();
    BASIC_COLORS.contains(&lower.as_str())
        || is_balanced_function(text, &COLOR_FUNCTIONS)
        || (is_identifier(text) && !lower.starts_with("device-"))
}

fn is_length(text: &str) -> bool {
    LengthValue::parse(text, 16.0).is_some()
}

fn is_non_negative_length(text: &str) -> bool {
    LengthValue::parse(text, 16.0).is_some_and(|l| match l {
        LengthValue::Px(v) | LengthValue::Percent(v) => v >= 0.0,
    })
}

fn is_auto_length(text: &str) -> bool {
    AutoLength::parse(text, 16.0).is_some()
}

fn is_keyword<T: FromStr>(text: &str) -> bool {
    T::from_str(text.trim()).is_ok()
}

fn is_integer_at_least(text: &str, min: i64) -> bool {
    text.trim().parse::<i64>().is_ok_and(|n| n >= min)
}

fn is_border_width(text: &str) -> bool {
    matches!(text.trim(), "thin" | "medium" | "thick") || is_non_negative_length(text)
}

fn is_counter_list(text: &str) -> bool {
    let text = text.trim();
    if text.eq_ignore_ascii_case("none") {
        return true;
    }
    let mut seen_name = false;
    for token in text.split_whitespace() {
        if token.parse::<i32>().is_ok() {
            if !seen_name {
                return false;
            }
        } else if is_identifier(token) {
            seen_name = true;
        } else {
            return false;
        }
    }
    seen_name
}

impl CssValidator {
    /// Shared grammar check; `color` decides colour validity so that the
    /// CMYK validator can widen it.
    fn check(property: &str, value: &str, color: fn(&str) -> bool) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }
        // [§ 7.3 Explicit Defaulting](https://www.w3.org/TR/css-cascade-4/#defaulting-keywords)
        if matches!(
            value.to_ascii_lowercase().as_str(),
            "inherit" | "initial" | "unset" | "revert"
        ) {
            return true;
        }
        match property {
            "width" | "height" | "top" | "right" | "bottom" | "left" | "margin-top"
            | "margin-right" | "margin-bottom" | "margin-left" => is_auto_length(value),
            "margin" => expand_box_shorthand(value)
                .is_some_and(|sides| sides.iter().all(|s| is_auto_length(s))),
            "padding-top" | "padding-right" | "padding-bottom" | "padding-left" | "min-width"
            | "min-height" => is_non_negative_length(value),
            "padding" => expand_box_shorthand(value)
                .is_some_and(|sides| sides.iter().all(|s| is_non_negative_length(s))),
            "max-width" | "max-height" => value == "none" || is_non_negative_length(value),
            "text-indent" => is_length(value),
            "font-size" => {
                is_non_negative_length(value)
                    || matches!(
                        value,
                        "xx-small" | "x-small" | "small" | "medium" | "large" | "x-large"
                            | "xx-large" | "smaller" | "larger"
                    )
            }
            "line-height" => parse_line_height(value, 16.0).is_some(),
            "font-weight" => parse_font_weight(value).is_some(),
            "font-style" => matches!(value, "normal" | "italic" | "oblique"),
            "border-top-width" | "border-right-width" | "border-bottom-width"
            | "border-left-width" => is_border_width(value),
            "border-width" => expand_box_shorthand(value)
                .is_some_and(|sides| sides.iter().all(|s| is_border_width(s))),
            "border-spacing" => {
                let parts = split_components(value);
                (1..=2).contains(&parts.len()) && parts.iter().all(|p| is_non_negative_length(p))
            }
            "orphans" | "widows" => is_integer_at_least(value, 1),
            "z-index" => value == "auto" || is_integer_at_least(value, i64::from(i32::MIN)),
            "flex-grow" | "flex-shrink" => value.parse::<f32>().is_ok_and(|n| n >= 0.0),
            "flex-basis" => value == "content" || is_auto_length(value),
            "flex" => parse_flex_shorthand(value, 16.0).is_some(),
            "row-gap" | "column-gap" => value == "normal" || is_non_negative_length(value),
            "gap" => {
                let parts = split_components(value);
                (1..=2).contains(&parts.len())
                    && parts
                        .iter()
                        .all(|p| *p == "normal" || is_non_negative_length(p))
            }
            "aspect-ratio" => parse_aspect_ratio(value).is_some(),
            "counter-reset" | "counter-set" | "counter-increment" => is_counter_list(value),
            "color" | "background-color" | "border-color" | "border-top-color"
            | "border-right-color" | "border-bottom-color" | "border-left-color" => color(value),
            "position" => is_keyword::<PositionType>(value),
            "float" => is_keyword::<FloatSide>(value),
            "clear" => is_keyword::<ClearSide>(value),
            "box-sizing" => is_keyword::<BoxSizing>(value),
            "overflow" => is_keyword::<Overflow>(value),
            "text-align" => is_keyword::<TextAlign>(value),
            "white-space" => is_keyword::<WhiteSpace>(value),
            "flex-direction" => is_keyword::<FlexDirection>(value),
            "flex-wrap" => is_keyword::<FlexWrap>(value),
            "justify-content" => is_keyword::<JustifyContent>(value),
            "align-items" => is_keyword::<AlignItems>(value),
            "align-self" => value == "auto" || is_keyword::<AlignItems>(value),
            "break-before" | "break-after" | "page-break-before" | "page-break-after" => {
                is_keyword::<BreakBetween>(value)
            }
            "break-inside" | "page-break-inside" => is_keyword::<BreakInside>(value),
            "list-style-position" => is_keyword::<ListStylePosition>(value),
            "content" => parse_content(value).is_ok(),
            // Any identifier is syntactically a display or counter style
            // name; unsupported ones get their own diagnostics.
            "display" => is_identifier(value),
            "list-style-type" => {
                is_identifier(value) || (value.starts_with(['"', '\'']) && value.len() >= 2)
            }
            _ => true,
        }
    }
}

impl PropertyValidator for CssValidator {
    fn validate(&self, property: &str, value: &str) -> bool {
        Self::check(property, value, is_color)
    }
}

/// [CSS Color 5 § 14 device-cmyk()](https://www.w3.org/TR/css-color-5/#device-cmyk)
fn is_color_or_cmyk(text: &str) -> bool {
    is_color(text) || is_balanced_function(text.trim(), &["device-cmyk("])
}

impl PropertyValidator for DeviceCmykValidator {
    fn validate(&self, property: &str, value: &str) -> bool {
        CssValidator::check(property, value, is_color_or_cmyk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lengths_and_keywords() {
        let v = CssValidator;
        assert!(v.validate("width", "50%"));
        assert!(v.validate("margin", "0 auto"));
        assert!(!v.validate("padding-top", "-3px"));
        assert!(!v.validate("width", "wide"));
        assert!(v.validate("float", "left"));
        assert!(!v.validate("float", "center"));
        assert!(v.validate("width", "inherit"));
    }

    #[test]
    fn test_orphans_must_be_positive_integers() {
        let v = CssValidator;
        assert!(v.validate("orphans", "3"));
        assert!(!v.validate("orphans", "0"));
        assert!(!v.validate("widows", "two"));
    }

    #[test]
    fn test_device_cmyk_needs_the_cmyk_validator() {
        let cmyk = "device-cmyk(0 0.5 1 0)";
        assert!(!CssValidator.validate("color", cmyk));
        assert!(DeviceCmykValidator.validate("color", cmyk));
        assert!(DeviceCmykValidator.validate("color", "#ff0000"));
        assert!(!DeviceCmykValidator.validate("color", "#ff00z"));
    }

    #[test]
    fn test_display_accepts_any_identifier() {
        assert!(CssValidator.validate("display", "grid"));
        assert!(!CssValidator.validate("display", "12"));
    }

    #[test]
    fn test_content_values() {
        assert!(CssValidator.validate("content", "'See page ' target-counter(url(#a), page)"));
        assert!(!CssValidator.validate("content", "counter(a, b, c)"));
    }

    #[test]
    fn test_counter_lists() {
        assert!(CssValidator.validate("counter-reset", "chapter 2 section"));
        assert!(!CssValidator.validate("counter-reset", "3 chapter"));
    }
}
