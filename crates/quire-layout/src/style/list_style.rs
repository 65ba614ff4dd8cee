//! List marker styles.
//!
//! [CSS Lists and Counters Module Level 3](https://www.w3.org/TR/css-lists-3/)
//! and the predefined counter styles of
//! [CSS Counter Styles Level 3 § 6](https://www.w3.org/TR/css-counter-styles-3/#predefined-counters).

use serde::Serialize;
use std::str::FromStr;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// [§ 3.1 list-style-type](https://www.w3.org/TR/css-lists-3/#text-markers)
///
/// The counter styles the engine can render.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum ListStyleType {
    /// A filled circle bullet.
    #[default]
    Disc,
    /// A hollow circle bullet.
    Circle,
    /// A filled square bullet.
    Square,
    /// Decimal numbers, beginning with 1.
    Decimal,
    /// Decimal numbers padded to two digits: 01, 02, ... 99, 100.
    DecimalLeadingZero,
    /// Lowercase roman numerals.
    LowerRoman,
    /// Uppercase roman numerals.
    UpperRoman,
    /// Lowercase ASCII letters: a, b, ... z, aa, ab.
    #[strum(to_string = "lower-alpha", serialize = "lower-latin")]
    LowerAlpha,
    /// Uppercase ASCII letters.
    #[strum(to_string = "upper-alpha", serialize = "upper-latin")]
    UpperAlpha,
    /// Lowercase classical Greek letters.
    LowerGreek,
    /// No marker.
    None,
}

/// [§ 3.2 list-style-position](https://www.w3.org/TR/css-lists-3/#list-style-position-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ListStylePosition {
    /// "The ::marker pseudo-element is an inline element placed immediately
    /// before the ::before pseudo-element in the list item's principal box"
    Inside,
    /// Like `inside`, but the marker hangs outside the line start and takes
    /// no inline space.
    #[default]
    Outside,
}

/// Parse a `list-style-type` value.
///
/// Returns `None` for counter styles outside the supported set, which the
/// box tree builder reports and renders as `decimal`.
#[must_use]
pub fn parse_list_style_type(text: &str) -> Option<ListStyleType> {
    ListStyleType::from_str(text.trim()).ok()
}

impl ListStyleType {
    /// [§ 6.1 Numeric counter styles](https://www.w3.org/TR/css-counter-styles-3/#simple-numeric)
    ///
    /// Representation of `value` in this style, without prefix or suffix.
    /// Values outside a style's range use `decimal`, as its fallback is.
    #[must_use]
    pub fn format(self, value: i32) -> String {
        match self {
            Self::Disc => "•".to_string(),
            Self::Circle => "◦".to_string(),
            Self::Square => "▪".to_string(),
            Self::None => String::new(),
            Self::Decimal => value.to_string(),
            Self::DecimalLeadingZero => {
                if (0..10).contains(&value) {
                    format!("0{value}")
                } else if (-9..0).contains(&value) {
                    format!("-0{}", -value)
                } else {
                    value.to_string()
                }
            }
            // "range: 1 to 3999"
            Self::LowerRoman => to_roman(value).map_or_else(|| value.to_string(), |r| r.to_lowercase()),
            Self::UpperRoman => to_roman(value).unwrap_or_else(|| value.to_string()),
            // [§ 6.2 Alphabetic](https://www.w3.org/TR/css-counter-styles-3/#alphabetic-system)
            // "range: 1 to infinity"
            Self::LowerAlpha => alphabetic(value, &LATIN_LOWER),
            Self::UpperAlpha => alphabetic(value, &LATIN_UPPER),
            Self::LowerGreek => alphabetic(value, &GREEK_LOWER),
        }
    }

    /// Marker string for a list item: `"3. "` for ordinal styles, the bullet
    /// and a space for symbolic ones, empty for `none`.
    #[must_use]
    pub fn marker_text(self, value: i32) -> String {
        match self {
            Self::None => String::new(),
            Self::Disc | Self::Circle | Self::Square => format!("{} ", self.format(value)),
            _ => format!("{}. ", self.format(value)),
        }
    }

    /// Whether the style's representation depends on the counter value.
    #[must_use]
    pub const fn is_ordinal(self) -> bool {
        !matches!(self, Self::Disc | Self::Circle | Self::Square | Self::None)
    }
}

const LATIN_LOWER: [char; 26] = [
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];
const LATIN_UPPER: [char; 26] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];
const GREEK_LOWER: [char; 24] = [
    'α', 'β', 'γ', 'δ', 'ε', 'ζ', 'η', 'θ', 'ι', 'κ', 'λ', 'μ', 'ν', 'ξ', 'ο', 'π', 'ρ', 'σ', 'τ',
    'υ', 'φ', 'χ', 'ψ', 'ω',
];

fn alphabetic(value: i32, symbols: &[char]) -> String {
    if value < 1 {
        return value.to_string();
    }
    let base = symbols.len();
    let mut n = value as usize;
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(symbols[n % base]);
        n /= base;
    }
    out.iter().rev().collect()
}

fn to_roman(value: i32) -> Option<String> {
    const TABLE: [(i32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if !(1..=3999).contains(&value) {
        return None;
    }
    let mut n = value;
    let mut out = String::new();
    for (weight, digits) in TABLE {
        while n >= weight {
            out.push_str(digits);
            n -= weight;
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roman_and_alpha() {
        assert_eq!(ListStyleType::UpperRoman.format(1994), "MCMXCIV");
        assert_eq!(ListStyleType::LowerRoman.format(4), "iv");
        assert_eq!(ListStyleType::LowerAlpha.format(27), "aa");
        assert_eq!(ListStyleType::UpperAlpha.format(26), "Z");
        assert_eq!(ListStyleType::LowerGreek.format(2), "β");
    }

    #[test]
    fn test_out_of_range_values_fall_back_to_decimal() {
        assert_eq!(ListStyleType::UpperRoman.format(0), "0");
        assert_eq!(ListStyleType::UpperRoman.format(4000), "4000");
        assert_eq!(ListStyleType::LowerAlpha.format(-3), "-3");
    }

    #[test]
    fn test_marker_text() {
        assert_eq!(ListStyleType::Decimal.marker_text(3), "3. ");
        assert_eq!(ListStyleType::DecimalLeadingZero.marker_text(7), "07. ");
        assert_eq!(ListStyleType::Disc.marker_text(3), "• ");
        assert_eq!(ListStyleType::None.marker_text(3), "");
    }

    #[test]
    fn test_parse_aliases_and_unknowns() {
        assert_eq!(parse_list_style_type("lower-latin"), Some(ListStyleType::LowerAlpha));
        assert_eq!(parse_list_style_type("hebrew"), None);
    }
}
