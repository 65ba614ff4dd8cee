//! Layout diagnostics with stable identifiers.
//!
//! Every recoverable problem the pipeline runs into (an unsupported keyword,
//! content that does not fit, a target counter that never stabilized) is
//! reported here instead of aborting the conversion. Identifiers are stable
//! kebab-case strings so downstream tooling can count and filter them.
//!
//! Unlike a process-wide warning set, a [`Diagnostics`] sink belongs to one
//! conversion pass. Nothing is deduplicated: two offending elements produce
//! two entries, which keeps counts meaningful.

use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// How bad a diagnostic is.
///
/// Neither severity stops the conversion. `Error` marks lost input (a
/// resource that could not be fetched), `Warn` marks degraded output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Output was produced but deviates from what the author asked for.
    Warn,
    /// Some input could not be used at all.
    Error,
}

/// Stable identifier of a diagnostic kind.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticId {
    /// A `display` keyword the engine does not implement; treated as `block`.
    UnsupportedDisplay,
    /// A `list-style-type` the engine does not implement; treated as `decimal`.
    UnsupportedListStyleType,
    /// The configured validator rejected a property value.
    InvalidPropertyValue,
    /// Content overflows a fixed-size box.
    ContentOverflow,
    /// A keep-together box is taller than a whole page.
    ElementDoesNotFit,
    /// A paragraph was split in a way that violates `orphans` or `widows`.
    WidowOrphanViolation,
    /// `break-inside: avoid` on a box that can only be fragmented by rows.
    KeepTogetherUnsupported,
    /// Target counters did not stabilize within the relayout budget.
    RelayoutBudgetExceeded,
    /// `target-counter()` names an element that does not exist.
    UnresolvedTargetCounter,
    /// `target-counter()` was used while target counters are switched off.
    TargetCounterDisabled,
    /// No configured font face covers a character.
    MissingGlyph,
    /// A stylesheet or other resource could not be loaded.
    ResourceFetchFailed,
    /// An `@import` chain loops back onto a sheet that is still loading.
    ImportCycle,
}

impl DiagnosticId {
    /// The pipeline component that reports this diagnostic.
    #[must_use]
    pub const fn component(self) -> &'static str {
        match self {
            Self::UnsupportedDisplay | Self::UnsupportedListStyleType => "Box",
            Self::InvalidPropertyValue => "Style",
            Self::ContentOverflow => "Layout",
            Self::ElementDoesNotFit | Self::WidowOrphanViolation | Self::KeepTogetherUnsupported => {
                "Fragment"
            }
            Self::RelayoutBudgetExceeded
            | Self::UnresolvedTargetCounter
            | Self::TargetCounterDisabled => "Counter",
            Self::MissingGlyph => "Font",
            Self::ResourceFetchFailed | Self::ImportCycle => "Fetch",
        }
    }

    /// The stable kebab-case string form, e.g. `"content-overflow"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A single reported problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity of the problem.
    pub severity: Severity,
    /// Stable identifier.
    pub id: DiagnosticId,
    /// Human readable detail, naming the offending element or value.
    pub message: String,
}

impl Diagnostic {
    /// Render the diagnostic as one colored terminal line:
    /// `[Quire <component>] ⚠ [<id>] <message>`.
    #[must_use]
    pub fn to_terminal_line(&self) -> String {
        let prefix = format!("[Quire {}]", self.id.component());
        let body = format!("⚠ [{}] {}", self.id, self.message);
        match self.severity {
            Severity::Warn => format!("{} {}", prefix.yellow(), body.yellow()),
            Severity::Error => format!("{} {}", prefix.red().bold(), body.red()),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.id, self.message)
    }
}

/// Ordered collection of diagnostics for one conversion pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a warning.
    pub fn warn(&mut self, id: DiagnosticId, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Warn,
            id,
            message: message.into(),
        });
    }

    /// Record an error.
    pub fn error(&mut self, id: DiagnosticId, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Error,
            id,
            message: message.into(),
        });
    }

    /// Record an already built diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        #[cfg(feature = "trace")]
        eprintln!("{}", diagnostic.to_terminal_line());
        self.entries.push(diagnostic);
    }

    /// Move every entry of `other` into this sink, keeping order.
    pub fn extend(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// Iterate over entries in reporting order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    /// Number of entries with the given id.
    #[must_use]
    pub fn count(&self, id: DiagnosticId) -> usize {
        self.entries.iter().filter(|d| d.id == id).count()
    }

    /// Number of entries with the given severity.
    #[must_use]
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Whether any entry has the given id.
    #[must_use]
    pub fn contains(&self, id: DiagnosticId) -> bool {
        self.entries.iter().any(|d| d.id == id)
    }

    /// Whether any `Error` entry was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.count_severity(Severity::Error) > 0
    }

    /// Total number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was reported.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the sink, returning its entries.
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn ids_are_kebab_case_and_round_trip() {
        assert_eq!(DiagnosticId::ContentOverflow.as_str(), "content-overflow");
        assert_eq!(
            DiagnosticId::from_str("widow-orphan-violation").ok(),
            Some(DiagnosticId::WidowOrphanViolation)
        );
        for id in DiagnosticId::iter() {
            assert!(!id.as_str().contains('_'), "{id} is not kebab-case");
            assert!(!id.component().is_empty());
        }
    }

    #[test]
    fn counts_are_not_deduplicated() {
        let mut sink = Diagnostics::new();
        sink.warn(DiagnosticId::UnsupportedDisplay, "grid on <div>");
        sink.warn(DiagnosticId::UnsupportedDisplay, "grid on <div>");
        sink.error(DiagnosticId::ResourceFetchFailed, "missing.css");

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.count(DiagnosticId::UnsupportedDisplay), 2);
        assert_eq!(sink.count_severity(Severity::Warn), 2);
        assert!(sink.has_errors());
    }

    #[test]
    fn display_form() {
        let d = Diagnostic {
            severity: Severity::Warn,
            id: DiagnosticId::MissingGlyph,
            message: "U+4E2D".to_string(),
        };
        assert_eq!(d.to_string(), "WARN [missing-glyph] U+4E2D");
        assert!(d.to_terminal_line().contains("[Quire Font]"));
    }
}
