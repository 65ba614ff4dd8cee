//! CSS counters.
//!
//! [§ 4 Automatic Numbering With Counters](https://www.w3.org/TR/css-lists-3/#auto-numbering)
//!
//! "Counters have a name and a creator, which identify the counter, and an
//! integer value." The store is threaded through the box tree builder in
//! document order; it is never shared between passes.

use std::collections::BTreeMap;

use crate::style::ComputedStyle;

/// A counter instance: name and value.
type Counter = (String, i32);

/// Scoped counter state for one traversal.
///
/// [§ 4.4.1 Creating and Inheriting Counters](https://www.w3.org/TR/css-lists-3/#creating-counters)
///
/// Each frame holds the counters created by the children of one element.
/// "The scope of a counter therefore starts at the first element in the
/// document that has a 'counter-reset' for that counter and includes the
/// element's descendants and its following siblings with their
/// descendants."
#[derive(Debug, Clone)]
pub struct CounterStore {
    frames: Vec<Vec<Counter>>,
}

impl Default for CounterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterStore {
    /// An empty store with the document-level frame.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames: vec![Vec::new()],
        }
    }

    /// "Instantiate a counter": a new instance in the current frame, hiding
    /// any outer counter of the same name.
    ///
    /// A second reset of the same name by a later sibling replaces the
    /// sibling's instance rather than nesting.
    pub fn reset(&mut self, name: &str, value: i32) {
        let frame = self.current_frame();
        if let Some(existing) = frame.iter_mut().find(|(n, _)| n == name) {
            existing.1 = value;
        } else {
            frame.push((name.to_string(), value));
        }
    }

    /// `counter-set`: set the innermost instance, instantiating one first
    /// if the name is not in scope.
    pub fn set(&mut self, name: &str, value: i32) {
        match self.innermost_mut(name) {
            Some(counter) => *counter = value,
            None => self.reset(name, value),
        }
    }

    /// `counter-increment`: add `by` (possibly negative) to the innermost
    /// instance, instantiating one at zero first if the name is not in scope.
    pub fn increment(&mut self, name: &str, by: i32) {
        match self.innermost_mut(name) {
            Some(counter) => *counter = counter.saturating_add(by),
            None => self.reset(name, by),
        }
    }

    /// Apply an element's `counter-reset`, `counter-set` and
    /// `counter-increment`, in that order.
    ///
    /// [§ 4.5 Counters in elements that do not generate boxes](https://www.w3.org/TR/css-lists-3/#counters-without-boxes)
    /// Callers skip this for `display: none` elements.
    pub fn apply(&mut self, style: &ComputedStyle) {
        for (name, value) in &style.counter_reset {
            self.reset(name, *value);
        }
        for (name, value) in &style.counter_set {
            self.set(name, *value);
        }
        for (name, by) in &style.counter_increment {
            self.increment(name, *by);
        }
    }

    /// Open a frame for the children of the current element.
    pub fn enter_children(&mut self) {
        self.frames.push(Vec::new());
    }

    /// Close the frame of the current element's children, destroying the
    /// counters they created.
    pub fn leave_children(&mut self) {
        if self.frames.len() > 1 {
            let _ = self.frames.pop();
        }
    }

    /// [§ 4.6 `counter()`](https://www.w3.org/TR/css-lists-3/#counter-functions)
    ///
    /// Value of the innermost counter named `name`, or `None` if none is in
    /// scope ("the counter() function ... generates ... as if the counter
    /// had been instantiated with a value of 0").
    #[must_use]
    pub fn value(&self, name: &str) -> Option<i32> {
        self.frames
            .iter()
            .rev()
            .flat_map(|f| f.iter().rev())
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// `counters()`: values of every counter named `name` in scope, outermost
    /// first.
    #[must_use]
    pub fn values(&self, name: &str) -> Vec<i32> {
        self.frames
            .iter()
            .flat_map(|f| f.iter())
            .filter(|(n, _)| n == name)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Innermost value of every counter in scope, for target lookups.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, i32> {
        let mut out = BTreeMap::new();
        for (name, value) in self.frames.iter().flat_map(|f| f.iter()) {
            let _ = out.insert(name.clone(), *value);
        }
        out
    }

    /// Nesting depth, the document-level frame being 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn current_frame(&mut self) -> &mut Vec<Counter> {
        if self.frames.is_empty() {
            self.frames.push(Vec::new());
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn innermost_mut(&mut self, name: &str) -> Option<&mut i32> {
        self.frames
            .iter_mut()
            .rev()
            .flat_map(|f| f.iter_mut().rev())
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_scopes_hide_and_restore() {
        let mut store = CounterStore::new();
        store.reset("item", 0);
        store.increment("item", 1);
        store.enter_children();
        store.reset("item", 0);
        store.increment("item", 1);
        store.increment("item", 1);
        assert_eq!(store.value("item"), Some(2));
        assert_eq!(store.values("item"), [1, 2]);
        store.leave_children();
        assert_eq!(store.value("item"), Some(1));
    }

    #[test]
    fn test_increment_without_reset_instantiates() {
        let mut store = CounterStore::new();
        store.increment("chapter", -3);
        assert_eq!(store.value("chapter"), Some(-3));
        store.set("section", 7);
        assert_eq!(store.value("section"), Some(7));
        assert_eq!(store.value("missing"), None);
    }

    #[test]
    fn test_sibling_reset_replaces_instead_of_nesting() {
        let mut store = CounterStore::new();
        store.enter_children();
        store.reset("c", 5);
        store.reset("c", 1);
        assert_eq!(store.values("c"), [1]);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.get("c"), Some(&1));
        assert_eq!(store.depth(), 2);
    }
}
