//! Caller-supplied accept/reject predicates.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use active_text_core::{ElementKind, Error, Result};

/// Boxed error returned by a failing filter.
pub type FilterError = Box<dyn std::error::Error + Send + Sync>;

/// Accept/reject predicate applied to the cleaned text of a candidate.
///
/// Any `Fn(&str) -> bool` is a filter. Wrap a fallible closure in
/// [`FallibleFilter`] to propagate its errors out of the scan.
pub trait ElementFilter: Send + Sync {
    /// Whether the candidate text should become an element.
    fn accept(&self, text: &str) -> std::result::Result<bool, FilterError>;
}

impl<F> ElementFilter for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn accept(&self, text: &str) -> std::result::Result<bool, FilterError> {
        Ok(self(text))
    }
}

/// Filter backed by a closure that can fail.
pub struct FallibleFilter<F>(pub F);

impl<F, E> ElementFilter for FallibleFilter<F>
where
    F: Fn(&str) -> std::result::Result<bool, E> + Send + Sync,
    E: Into<FilterError>,
{
    fn accept(&self, text: &str) -> std::result::Result<bool, FilterError> {
        (self.0)(text).map_err(Into::into)
    }
}

/// Per-kind filters.
///
/// URLs have no filter hook. A kind without a filter accepts everything.
#[derive(Clone, Default)]
pub struct FilterSet {
    filters: HashMap<ElementKind, Arc<dyn ElementFilter>>,
}

impl FilterSet {
    /// Create an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a filter for a kind, replacing any previous one.
    pub fn set(&mut self, kind: ElementKind, filter: Arc<dyn ElementFilter>) -> Result<()> {
        if !kind.is_filterable() {
            return Err(Error::Config(format!("{kind} elements cannot be filtered")));
        }
        self.filters.insert(kind, filter);
        Ok(())
    }

    /// Builder form of [`FilterSet::set`].
    pub fn with(mut self, kind: ElementKind, filter: impl ElementFilter + 'static) -> Result<Self> {
        self.set(kind, Arc::new(filter))?;
        Ok(self)
    }

    /// Remove the filter for a kind.
    pub fn remove(&mut self, kind: &ElementKind) -> bool {
        self.filters.remove(kind).is_some()
    }

    /// Filter installed for a kind.
    pub fn get(&self, kind: &ElementKind) -> Option<&dyn ElementFilter> {
        self.filters.get(kind).map(|f| f.as_ref())
    }

    /// Run the filter for `kind` on `text`; no filter means accept.
    pub fn accepts(&self, kind: &ElementKind, text: &str) -> Result<bool> {
        match self.get(kind) {
            Some(filter) => filter.accept(text).map_err(|e| Error::Filter {
                kind: kind.to_string(),
                message: e.to_string(),
            }),
            None => Ok(true),
        }
    }

    /// Whether no filters are installed.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Debug for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSet")
            .field("kinds", &self.filters.keys().collect::<Vec<_>>())
            .finish()
    }
}
