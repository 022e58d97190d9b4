//! Per-kind element spans with offset hit-testing.

use indexmap::IndexMap;

use active_text_core::{Element, ElementKind, ElementSpan};

/// Spans recognized by one scan, grouped by kind.
///
/// Kinds keep their insertion order, spans keep match order. Lookups walk
/// kinds in order and return the first span containing the offset, so when
/// spans of different kinds overlap the earlier kind wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementIndex {
    spans: IndexMap<ElementKind, Vec<ElementSpan>>,
}

impl ElementIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the spans of a kind.
    ///
    /// Inserting a kind twice replaces its spans but keeps its position.
    pub fn insert(&mut self, kind: ElementKind, spans: Vec<ElementSpan>) {
        self.spans.insert(kind, spans);
    }

    /// Spans of a kind, empty if the kind was not scanned.
    pub fn spans(&self, kind: &ElementKind) -> &[ElementSpan] {
        self.spans.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the kind was scanned.
    pub fn contains_kind(&self, kind: &ElementKind) -> bool {
        self.spans.contains_key(kind)
    }

    /// Scanned kinds in insertion order.
    pub fn kinds(&self) -> impl Iterator<Item = &ElementKind> {
        self.spans.keys()
    }

    /// Every span, kind by kind.
    pub fn iter(&self) -> impl Iterator<Item = &ElementSpan> {
        self.spans.values().flatten()
    }

    /// Total number of spans.
    pub fn len(&self) -> usize {
        self.spans.values().map(Vec::len).sum()
    }

    /// Whether no span was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all kinds and spans.
    pub fn clear(&mut self) {
        self.spans.clear();
    }

    /// First span whose range contains `offset`, end inclusive.
    pub fn span_at(&self, offset: usize) -> Option<&ElementSpan> {
        self.iter().find(|span| span.range.contains_inclusive(offset))
    }

    /// Element at a character offset.
    ///
    /// An offset equal to `location + length` still hits the span.
    pub fn lookup(&self, offset: usize) -> Option<&Element> {
        self.span_at(offset).map(|span| &span.element)
    }
}

impl<'a> IntoIterator for &'a ElementIndex {
    type Item = &'a ElementSpan;
    type IntoIter = std::iter::Flatten<indexmap::map::Values<'a, ElementKind, Vec<ElementSpan>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.values().flatten()
    }
}
