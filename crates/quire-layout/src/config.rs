//! Conversion settings.
//!
//! [`ConversionConfig`] is built in code with `with_*` methods; the CLI reads
//! the same settings from a JSON [`ConfigFile`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::QuireError;
use crate::fonts::{FallbackStrategy, FontFace, FontProvider};
use crate::layout::Rect;
use crate::style::{CssValidator, DeviceCmykValidator, PropertyValidator};

/// CSS px per inch.
const PX_PER_IN: f32 = 96.0;

/// CSS px per millimetre.
const PX_PER_MM: f32 = PX_PER_IN / 25.4;

/// [Media Queries 4 § 2.3 Media Types](https://www.w3.org/TR/mediaqueries-4/#media-types)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Paged material.
    #[default]
    Print,
    /// Computer screens.
    Screen,
}

impl MediaType {
    /// Whether a media query list such as `screen, print` applies.
    ///
    /// Only media types are understood; a query with features matches when
    /// its type does.
    #[must_use]
    pub fn matches(self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }
        query.split(',').any(|q| {
            let mut words = q.split_whitespace().peekable();
            let negated = words.peek().is_some_and(|w| w.eq_ignore_ascii_case("not"));
            if negated {
                let _ = words.next();
            }
            if words.peek().is_some_and(|w| w.eq_ignore_ascii_case("only")) {
                let _ = words.next();
            }
            let hit = match words.next() {
                None => true,
                Some(t) if t.starts_with('(') => true,
                Some(t) => t.eq_ignore_ascii_case("all") || t.eq_ignore_ascii_case(&self.to_string()),
            };
            hit != negated
        })
    }
}

/// [CSS Paged Media 3 § 5.2 Page size](https://www.w3.org/TR/css-page-3/#page-size-prop)
///
/// Page box size in CSS px.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    /// Page width.
    pub width: f32,
    /// Page height.
    pub height: f32,
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

impl PageSize {
    /// ISO A4, 210mm x 297mm.
    pub const A4: Self = Self {
        width: 210.0 * PX_PER_MM,
        height: 297.0 * PX_PER_MM,
    };

    /// US letter, 8.5in x 11in.
    pub const LETTER: Self = Self {
        width: 8.5 * PX_PER_IN,
        height: 11.0 * PX_PER_IN,
    };

    /// A named size (`a4`, `letter`, `a5`, `legal`), or `WIDTHxHEIGHT` in px.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "a4" => Some(Self::A4),
            "a5" => Some(Self {
                width: 148.0 * PX_PER_MM,
                height: 210.0 * PX_PER_MM,
            }),
            "letter" => Some(Self::LETTER),
            "legal" => Some(Self {
                width: 8.5 * PX_PER_IN,
                height: 14.0 * PX_PER_IN,
            }),
            other => {
                let (w, h) = other.split_once('x')?;
                let width = w.trim().trim_end_matches("px").parse::<f32>().ok()?;
                let height = h.trim().trim_end_matches("px").parse::<f32>().ok()?;
                (width > 0.0 && height > 0.0).then_some(Self { width, height })
            }
        }
    }
}

/// Page margins in px, `[top, right, bottom, left]`.
pub type PageMargins = [f32; 4];

/// Everything a conversion can be told.
#[derive(Clone)]
pub struct ConversionConfig {
    /// Base URI for relative resources; overrides the document's own.
    pub base_url: Option<String>,
    /// Page box size.
    pub page: PageSize,
    /// Page margins.
    pub margins: PageMargins,
    /// Media type for `@import` and `@media` filtering.
    pub media: MediaType,
    /// Faces available to text layout.
    pub fonts: FontProvider,
    /// Character fallback strategy.
    pub fallback: FallbackStrategy,
    /// Keep `div`, `p`, `ul`, `ol`, `li`, `section` and `article` boxes on
    /// one page whenever they fit on one.
    pub continuous_container: bool,
    /// Resolve `target-counter()`; when off it renders nothing.
    pub target_counters: bool,
    /// Upper bound on layout passes for `target-counter()` resolution.
    pub max_relayouts: usize,
    /// Split blocks even when orphans/widows cannot be honoured.
    pub allow_widow_orphan_violation: bool,
    /// Declared-value validator.
    pub validator: Arc<dyn PropertyValidator>,
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("base_url", &self.base_url)
            .field("page", &self.page)
            .field("margins", &self.margins)
            .field("media", &self.media)
            .field("fonts", &self.fonts.faces().len())
            .field("fallback", &self.fallback)
            .field("continuous_container", &self.continuous_container)
            .field("target_counters", &self.target_counters)
            .field("max_relayouts", &self.max_relayouts)
            .field(
                "allow_widow_orphan_violation",
                &self.allow_widow_orphan_violation,
            )
            .field("validator", &self.validator)
            .finish()
    }
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            page: PageSize::A4,
            // 0.75in
            margins: [72.0; 4],
            media: MediaType::Print,
            fonts: FontProvider::default(),
            fallback: FallbackStrategy::BestMatch,
            continuous_container: false,
            target_counters: true,
            max_relayouts: 4,
            allow_widow_orphan_violation: false,
            validator: Arc::new(CssValidator),
        }
    }
}

impl ConversionConfig {
    /// Set the base URI.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the page size.
    #[must_use]
    pub const fn with_page(mut self, page: PageSize) -> Self {
        self.page = page;
        self
    }

    /// Set all four page margins.
    #[must_use]
    pub const fn with_margins(mut self, margins: PageMargins) -> Self {
        self.margins = margins;
        self
    }

    /// Set the media type.
    #[must_use]
    pub const fn with_media(mut self, media: MediaType) -> Self {
        self.media = media;
        self
    }

    /// Replace the font provider.
    #[must_use]
    pub fn with_fonts(mut self, fonts: FontProvider) -> Self {
        self.fonts = fonts;
        self
    }

    /// Set the fallback strategy.
    #[must_use]
    pub const fn with_fallback(mut self, fallback: FallbackStrategy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Enable keep-together for the container elements.
    #[must_use]
    pub const fn with_continuous_container(mut self, on: bool) -> Self {
        self.continuous_container = on;
        self
    }

    /// Enable or disable `target-counter()`.
    #[must_use]
    pub const fn with_target_counters(mut self, on: bool) -> Self {
        self.target_counters = on;
        self
    }

    /// Set the layout pass limit.
    #[must_use]
    pub const fn with_max_relayouts(mut self, passes: usize) -> Self {
        self.max_relayouts = passes;
        self
    }

    /// Allow orphans/widows violations instead of pushing lines.
    #[must_use]
    pub const fn with_widow_orphan_violation(mut self, allow: bool) -> Self {
        self.allow_widow_orphan_violation = allow;
        self
    }

    /// Swap the declared-value validator.
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn PropertyValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// The page content area, at the origin.
    #[must_use]
    pub fn page_area(&self) -> Rect {
        let [top, right, bottom, left] = self.margins;
        Rect::new(
            0.0,
            0.0,
            (self.page.width - left - right).max(0.0),
            (self.page.height - top - bottom).max(0.0),
        )
    }

    /// Check the settings that would make layout meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`QuireError::NoFonts`] for an empty provider and
    /// [`QuireError::InvalidConfig`] when margins leave no content area or
    /// the pass limit is zero.
    pub fn validate(&self) -> Result<(), QuireError> {
        if self.fonts.is_empty() {
            return Err(QuireError::NoFonts);
        }
        let area = self.page_area();
        if area.width <= 0.0 || area.height <= 0.0 {
            return Err(QuireError::InvalidConfig(format!(
                "margins {:?} leave no content area on a {}x{} page",
                self.margins, self.page.width, self.page.height
            )));
        }
        if self.max_relayouts == 0 {
            return Err(QuireError::InvalidConfig(
                "max_relayouts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which validator a [`ConfigFile`] selects.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum ValidatorKind {
    /// [`CssValidator`]
    #[default]
    Css,
    /// [`DeviceCmykValidator`]
    DeviceCmyk,
}

/// The serialized form of [`ConversionConfig`].
///
/// ```json
/// { "page": "letter", "margins": [48, 48, 48, 48],
///   "continuous_container": true, "validator": "device-cmyk" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Base URI.
    pub base_url: Option<String>,
    /// Page size name or `WIDTHxHEIGHT`.
    pub page: Option<String>,
    /// `[top, right, bottom, left]` margins in px.
    pub margins: Option<PageMargins>,
    /// Media type.
    pub media: Option<MediaType>,
    /// Font faces in provider order; the built-in faces when empty.
    pub fonts: Vec<FontFace>,
    /// Fallback strategy.
    pub fallback: Option<FallbackStrategy>,
    /// Keep-together for container elements.
    pub continuous_container: Option<bool>,
    /// `target-counter()` resolution.
    pub target_counters: Option<bool>,
    /// Layout pass limit.
    pub max_relayouts: Option<usize>,
    /// Orphans/widows violation policy.
    pub allow_widow_orphan_violation: Option<bool>,
    /// Validator choice.
    pub validator: Option<ValidatorKind>,
}

impl ConfigFile {
    /// Parse the JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`QuireError::ConfigJson`] for malformed JSON or unknown keys.
    pub fn from_json(text: &str) -> Result<Self, QuireError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply the file on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`QuireError::InvalidConfig`] for an unknown page size.
    pub fn into_config(self) -> Result<ConversionConfig, QuireError> {
        let mut config = ConversionConfig {
            base_url: self.base_url,
            ..ConversionConfig::default()
        };
        if let Some(name) = self.page {
            config.page = PageSize::parse(&name)
                .ok_or_else(|| QuireError::InvalidConfig(format!("unknown page size '{name}'")))?;
        }
        if let Some(margins) = self.margins {
            config.margins = margins;
        }
        if let Some(media) = self.media {
            config.media = media;
        }
        if !self.fonts.is_empty() {
            config.fonts = FontProvider::new(self.fonts);
        }
        if let Some(fallback) = self.fallback {
            config.fallback = fallback;
        }
        if let Some(on) = self.continuous_container {
            config.continuous_container = on;
        }
        if let Some(on) = self.target_counters {
            config.target_counters = on;
        }
        if let Some(n) = self.max_relayouts {
            config.max_relayouts = n;
        }
        if let Some(allow) = self.allow_widow_orphan_violation {
            config.allow_widow_orphan_violation = allow;
        }
        config.validator = match self.validator.unwrap_or_default() {
            ValidatorKind::Css => Arc::new(CssValidator),
            ValidatorKind::DeviceCmyk => Arc::new(DeviceCmykValidator),
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_sizes() {
        assert_eq!(PageSize::parse("Letter"), Some(PageSize::LETTER));
        assert_eq!(
            PageSize::parse("600x800"),
            Some(PageSize {
                width: 600.0,
                height: 800.0
            })
        );
        assert_eq!(PageSize::parse("0x800"), None);
        assert_eq!(PageSize::parse("tabloid"), None);
    }

    #[test]
    fn test_media_queries() {
        assert!(MediaType::Print.matches("print"));
        assert!(MediaType::Print.matches("screen, print"));
        assert!(MediaType::Print.matches(""));
        assert!(MediaType::Print.matches("all and (min-width: 10px)"));
        assert!(!MediaType::Print.matches("screen"));
        assert!(MediaType::Print.matches("not screen"));
        assert!(MediaType::Screen.matches("only screen"));
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let file = ConfigFile::from_json(
            r#"{ "page": "letter", "margins": [10, 20, 10, 20],
                 "continuous_container": true, "validator": "device-cmyk",
                 "max_relayouts": 2 }"#,
        )
        .expect("valid config");
        let config = file.into_config().expect("known page size");
        assert_eq!(config.page, PageSize::LETTER);
        assert!(config.continuous_container);
        assert_eq!(config.max_relayouts, 2);
        assert!(config.target_counters);
        assert_eq!(config.page_area().width, 8.5 * 96.0 - 40.0);
        assert!(config.validator.validate("color", "device-cmyk(0 0 0 1)"));
    }

    #[test]
    fn test_config_file_rejects_unknown_keys() {
        assert!(ConfigFile::from_json(r#"{ "pages": "a4" }"#).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(ConversionConfig::default().validate().is_ok());
        let no_area = ConversionConfig::default().with_margins([600.0; 4]);
        assert!(matches!(no_area.validate(), Err(QuireError::InvalidConfig(_))));
        let no_fonts = ConversionConfig::default().with_fonts(FontProvider::new(Vec::new()));
        assert!(matches!(no_fonts.validate(), Err(QuireError::NoFonts)));
    }
}
