//! Font faces, font matching and per-character fallback.
//!
//! [CSS Fonts Module Level 4 § 5 Font Matching](https://www.w3.org/TR/css-fonts-4/#font-matching-algorithm)
//!
//! Glyph outlines are the backend's business. Layout only needs to know which
//! face renders each character and how wide and tall that face sets it, so a
//! [`FontFace`] is a set of scaled metrics plus the Unicode ranges it covers.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// How a character that the element's first font cannot render is matched.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackStrategy {
    /// Walk the element's `font-family` list, then every provider face, and
    /// take the first face covering the character. Faces that declare no
    /// coverage are assumed to cover everything.
    #[default]
    BestMatch,
    /// Only faces whose declared coverage contains the character qualify.
    RangeRestricted,
}

/// One font face known to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFace {
    /// Unique face name, reported in `fonts_used`.
    pub name: String,
    /// Family name matched against `font-family`.
    pub family: String,
    /// [§ 2.2 font-weight](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
    #[serde(default = "FontFace::default_weight")]
    pub weight: u16,
    /// Italic or oblique face.
    #[serde(default)]
    pub italic: bool,
    /// Inclusive Unicode code point ranges the face has glyphs for.
    #[serde(default)]
    pub coverage: Vec<(u32, u32)>,
    /// Advance width of a narrow glyph, as a fraction of the font size.
    #[serde(default = "FontFace::default_advance")]
    pub advance_ratio: f32,
    /// `line-height: normal`, as a fraction of the font size.
    #[serde(default = "FontFace::default_line_height")]
    pub line_height_ratio: f32,
    /// Ascent as a fraction of the font size; descent is the remainder.
    #[serde(default = "FontFace::default_ascent")]
    pub ascent_ratio: f32,
}

impl FontFace {
    const fn default_weight() -> u16 {
        400
    }

    const fn default_advance() -> f32 {
        0.5
    }

    const fn default_line_height() -> f32 {
        1.2
    }

    const fn default_ascent() -> f32 {
        0.8
    }

    /// A face with default metrics and undeclared coverage.
    #[must_use]
    pub fn new(name: &str, family: &str) -> Self {
        Self {
            name: name.to_string(),
            family: family.to_string(),
            weight: Self::default_weight(),
            italic: false,
            coverage: Vec::new(),
            advance_ratio: Self::default_advance(),
            line_height_ratio: Self::default_line_height(),
            ascent_ratio: Self::default_ascent(),
        }
    }

    /// Declare the covered ranges, builder style.
    #[must_use]
    pub fn with_coverage(mut self, ranges: &[(u32, u32)]) -> Self {
        self.coverage = ranges.to_vec();
        self
    }

    /// Set weight and italic, builder style.
    #[must_use]
    pub const fn with_style(mut self, weight: u16, italic: bool) -> Self {
        self.weight = weight;
        self.italic = italic;
        self
    }

    /// Set the narrow advance ratio, builder style.
    #[must_use]
    pub const fn with_advance(mut self, ratio: f32) -> Self {
        self.advance_ratio = ratio;
        self
    }

    /// Whether the face's declared coverage contains `ch`.
    #[must_use]
    pub fn declares(&self, ch: char) -> bool {
        let cp = u32::from(ch);
        self.coverage.iter().any(|&(lo, hi)| lo <= cp && cp <= hi)
    }

    /// Whether the face covers `ch` under `strategy`.
    #[must_use]
    pub fn covers(&self, ch: char, strategy: FallbackStrategy) -> bool {
        match strategy {
            FallbackStrategy::BestMatch => self.coverage.is_empty() || self.declares(ch),
            FallbackStrategy::RangeRestricted => self.declares(ch),
        }
    }

    /// Advance width of `ch` at `size`.
    ///
    /// East Asian wide characters take a full em; format and zero-width
    /// characters take nothing.
    #[must_use]
    pub fn advance(&self, ch: char, size: f32) -> f32 {
        match u32::from(ch) {
            0x00AD | 0x200B..=0x200D | 0x2060 | 0xFEFF => 0.0,
            0x1100..=0x115F
            | 0x2E80..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x1F300..=0x1FAFF
            | 0x20000..=0x3FFFD => size,
            _ => size * self.advance_ratio,
        }
    }

    /// Ascent at `size`.
    #[must_use]
    pub fn ascent(&self, size: f32) -> f32 {
        size * self.ascent_ratio
    }

    /// Descent at `size`.
    #[must_use]
    pub fn descent(&self, size: f32) -> f32 {
        size * (1.0 - self.ascent_ratio)
    }
}

/// Latin, Greek, punctuation and the geometric shapes used by list markers.
const DEFAULT_COVERAGE: [(u32, u32); 6] = [
    (0x0009, 0x000D),
    (0x0020, 0x024F),
    (0x0370, 0x03FF),
    (0x2000, 0x206F),
    (0x20A0, 0x20CF),
    (0x2190, 0x25FF),
];

/// The set of faces available to layout, in provider order.
#[derive(Debug, Clone, PartialEq)]
pub struct FontProvider {
    faces: Vec<FontFace>,
}

impl Default for FontProvider {
    /// Serif, sans-serif and monospace faces covering Latin and Greek text.
    fn default() -> Self {
        Self::new(vec![
            FontFace::new("Quire Serif", "serif").with_coverage(&DEFAULT_COVERAGE),
            FontFace::new("Quire Sans", "sans-serif").with_coverage(&DEFAULT_COVERAGE),
            FontFace::new("Quire Mono", "monospace")
                .with_coverage(&DEFAULT_COVERAGE)
                .with_advance(0.6),
        ])
    }
}

impl FontProvider {
    /// A provider over `faces`.
    #[must_use]
    pub const fn new(faces: Vec<FontFace>) -> Self {
        Self { faces }
    }

    /// All faces in provider order.
    #[must_use]
    pub fn faces(&self) -> &[FontFace] {
        &self.faces
    }

    /// Face by index.
    #[must_use]
    pub fn face(&self, index: usize) -> Option<&FontFace> {
        self.faces.get(index)
    }

    /// Whether the provider has no faces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// [§ 5.2 Matching font styles](https://www.w3.org/TR/css-fonts-4/#font-style-matching)
    ///
    /// Faces of `family`, best style match first: matching italic before
    /// weight distance.
    fn family_faces(&self, family: &str, weight: u16, italic: bool) -> Vec<usize> {
        let mut matches: Vec<usize> = (0..self.faces.len())
            .filter(|&i| self.faces[i].family.eq_ignore_ascii_case(family))
            .collect();
        matches.sort_by_key(|&i| {
            let face = &self.faces[i];
            (face.italic != italic, face.weight.abs_diff(weight), i)
        });
        matches
    }

    /// Candidate faces in matching order: the `font-family` list, then every
    /// face in provider order.
    #[must_use]
    pub fn candidates(&self, families: &[String], weight: u16, italic: bool) -> Vec<usize> {
        let mut out: Vec<usize> = Vec::new();
        for family in families {
            for i in self.family_faces(family, weight, italic) {
                if !out.contains(&i) {
                    out.push(i);
                }
            }
        }
        for i in 0..self.faces.len() {
            if !out.contains(&i) {
                out.push(i);
            }
        }
        out
    }

    /// The face used for metrics when no character decides: the first
    /// candidate.
    #[must_use]
    pub fn primary(&self, families: &[String], weight: u16, italic: bool) -> usize {
        self.candidates(families, weight, italic)
            .first()
            .copied()
            .unwrap_or(0)
    }

    /// [§ 5.1 Cluster matching](https://www.w3.org/TR/css-fonts-4/#cluster-matching)
    ///
    /// The first candidate covering `ch`, or `None` if no face does.
    #[must_use]
    pub fn select(
        &self,
        candidates: &[usize],
        ch: char,
        strategy: FallbackStrategy,
    ) -> Option<usize> {
        candidates
            .iter()
            .copied()
            .find(|&i| self.faces.get(i).is_some_and(|f| f.covers(ch, strategy)))
    }
}

/// A run of text set in one face.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    /// The text of the run.
    pub text: String,
    /// Index of the face in the provider.
    pub face: usize,
    /// Total advance width.
    pub width: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> FontProvider {
        FontProvider::new(vec![
            FontFace::new("Body", "Body").with_coverage(&[(0x20, 0x7E)]),
            FontFace::new("Body Bold", "Body")
                .with_coverage(&[(0x20, 0x7E)])
                .with_style(700, false),
            FontFace::new("Han", "Han").with_coverage(&[(0x4E00, 0x9FFF)]),
            FontFace::new("Anything", "Anything"),
        ])
    }

    #[test]
    fn test_family_list_orders_candidates_by_style() {
        let p = provider();
        let bold = p.candidates(&["Body".to_string()], 700, false);
        assert_eq!(bold[..2], [1, 0]);
        assert_eq!(p.primary(&["Body".to_string()], 400, false), 0);
    }

    #[test]
    fn test_best_match_treats_undeclared_coverage_as_full() {
        let p = provider();
        let cands = p.candidates(&["Body".to_string()], 400, false);
        assert_eq!(p.select(&cands, 'a', FallbackStrategy::BestMatch), Some(0));
        assert_eq!(p.select(&cands, '中', FallbackStrategy::BestMatch), Some(2));
        assert_eq!(p.select(&cands, 'Ж', FallbackStrategy::BestMatch), Some(3));
    }

    #[test]
    fn test_range_restricted_needs_declared_coverage() {
        let p = provider();
        let cands = p.candidates(&["Body".to_string()], 400, false);
        assert_eq!(p.select(&cands, 'Ж', FallbackStrategy::RangeRestricted), None);
        assert_eq!(
            p.select(&cands, '中', FallbackStrategy::RangeRestricted),
            Some(2)
        );
    }

    #[test]
    fn test_wide_characters_take_a_full_em() {
        let face = FontFace::new("X", "X");
        assert_eq!(face.advance('a', 10.0), 5.0);
        assert_eq!(face.advance('中', 10.0), 10.0);
        assert_eq!(face.advance('\u{200B}', 10.0), 0.0);
    }
}
