//! `target-counter()` cross references.
//!
//! [CSS GCPM 3 § 3.3 Cross-references](https://www.w3.org/TR/css-gcpm-3/#cross-references)
//!
//! "The target-counter() function retrieves the value of the innermost
//! counter with a given name at the target end of a link."
//!
//! The page number of a target is only known after fragmentation, so
//! requests are recorded while boxes are built, resolved against the paged
//! result, and fed back into the next pass as guesses.

use std::collections::{BTreeMap, HashMap};

use quire_common::{DiagnosticId, Diagnostics};
use serde::Serialize;

use crate::style::ListStyleType;

/// Name of the counter that reads the target's page number.
pub const PAGE_COUNTER: &str = "page";

/// A `target-counter()` met while building boxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetCounterRequest {
    /// Request number within the pass, in document order.
    pub id: usize,
    /// Fragment identifier of the target element, without `#`.
    pub target: String,
    /// Counter name, or [`PAGE_COUNTER`].
    pub counter: String,
    /// Style the value is rendered in.
    pub style: ListStyleType,
}

impl TargetCounterRequest {
    /// Whether the request reads the target's page number.
    #[must_use]
    pub fn is_page(&self) -> bool {
        self.counter == PAGE_COUNTER
    }
}

/// Resolved values keyed by `(target, counter)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetValues {
    values: BTreeMap<(String, String), i32>,
}

impl TargetValues {
    /// No values: the first pass renders every reference as `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value.
    pub fn insert(&mut self, target: &str, counter: &str, value: i32) {
        let _ = self
            .values
            .insert((target.to_string(), counter.to_string()), value);
    }

    /// The value for `target`'s `counter`, if resolved.
    #[must_use]
    pub fn get(&self, target: &str, counter: &str) -> Option<i32> {
        self.values
            .get(&(target.to_string(), counter.to_string()))
            .copied()
    }

    /// Number of resolved references.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Counter values of every element with an `id`, captured while building.
pub type CounterSnapshots = HashMap<String, BTreeMap<String, i32>>;

/// Resolve the requests of one pass.
///
/// `page_of` maps an element id to the 1-based number of the page its first
/// fragment lies on. Targets with no element are reported as
/// `unresolved-target-counter` and resolve to `0`; a counter that is not in
/// scope at an existing target also reads `0`.
pub fn resolve_requests(
    requests: &[TargetCounterRequest],
    snapshots: &CounterSnapshots,
    page_of: impl Fn(&str) -> Option<usize>,
    diagnostics: &mut Diagnostics,
) -> TargetValues {
    let mut values = TargetValues::new();
    for request in requests {
        if values.get(&request.target, &request.counter).is_some() {
            continue;
        }
        let value = if request.is_page() {
            page_of(&request.target).map(|n| i32::try_from(n).unwrap_or(i32::MAX))
        } else {
            snapshots
                .get(&request.target)
                .map(|counters| counters.get(&request.counter).copied().unwrap_or(0))
        };
        let value = value.unwrap_or_else(|| {
            diagnostics.warn(
                DiagnosticId::UnresolvedTargetCounter,
                format!(
                    "target-counter(#{}, {}) has no target element",
                    request.target, request.counter
                ),
            );
            0
        });
        values.insert(&request.target, &request.counter, value);
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: usize, target: &str, counter: &str) -> TargetCounterRequest {
        TargetCounterRequest {
            id,
            target: target.to_string(),
            counter: counter.to_string(),
            style: ListStyleType::Decimal,
        }
    }

    #[test]
    fn test_pages_and_counters_resolve() {
        let mut snapshots = CounterSnapshots::new();
        let _ = snapshots.insert(
            "fig".to_string(),
            BTreeMap::from([("figure".to_string(), 3)]),
        );
        let mut diagnostics = Diagnostics::new();
        let values = resolve_requests(
            &[request(0, "fig", "page"), request(1, "fig", "figure")],
            &snapshots,
            |id| (id == "fig").then_some(2),
            &mut diagnostics,
        );
        assert_eq!(values.get("fig", "page"), Some(2));
        assert_eq!(values.get("fig", "figure"), Some(3));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_target_warns_once_per_reference() {
        let mut diagnostics = Diagnostics::new();
        let values = resolve_requests(
            &[request(0, "nowhere", "page"), request(1, "nowhere", "page")],
            &CounterSnapshots::new(),
            |_| None,
            &mut diagnostics,
        );
        assert_eq!(values.get("nowhere", "page"), Some(0));
        assert_eq!(diagnostics.count(DiagnosticId::UnresolvedTargetCounter), 1);
    }
}
