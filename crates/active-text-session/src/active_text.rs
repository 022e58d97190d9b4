//! Host-facing controller tying scanning, selection and dispatch together.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use active_text_core::{
    ActiveTextConfig, Element, ElementKind, ElementSpan, Error, Result, TextRange,
};
use active_text_scanner::text::utf16_len;
use active_text_scanner::{
    ElementExtractor, ElementFilter, ElementIndex, FilterSet, ScanIssue, ScanOutput,
};

use crate::dispatch::{ActiveTextDelegate, DispatchTarget, TapHandlers};
use crate::selection::{SelectionEvent, SelectionTracker, TouchOutcome, TouchPhase};

/// A stretch of text with uniform styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRun {
    /// Range in the displayed text
    pub range: TextRange,
    /// Element kind, `None` for plain text
    pub kind: Option<ElementKind>,
    /// Whether the element is selected
    pub selected: bool,
}

/// Active text owned by a host view.
///
/// Every configuration change rescans the full source text, except inside
/// [`ActiveText::customize`] where a single rescan runs at the end. The
/// source is kept as given; truncations only exist in the displayed text.
pub struct ActiveText {
    source: String,
    config: ActiveTextConfig,
    filters: FilterSet,
    extractor: ElementExtractor,
    output: ScanOutput,
    selection: SelectionTracker,
    handlers: TapHandlers,
    batch_depth: usize,
}

impl ActiveText {
    /// Create with the default configuration.
    pub fn new() -> Self {
        let config = ActiveTextConfig::default();
        Self {
            source: String::new(),
            selection: SelectionTracker::from_settings(&config.interaction),
            config,
            filters: FilterSet::new(),
            extractor: ElementExtractor::new(),
            output: ScanOutput::default(),
            handlers: TapHandlers::new(),
            batch_depth: 0,
        }
    }

    /// Create with a validated configuration.
    pub fn with_config(config: ActiveTextConfig) -> Result<Self> {
        config.validate()?;
        let mut active = Self::new();
        active.selection = SelectionTracker::from_settings(&config.interaction);
        active.config = config;
        Ok(active)
    }

    /// Replace the extractor, e.g. to use a private pattern cache.
    pub fn with_extractor(mut self, extractor: ElementExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Displayed text, with URL truncations applied.
    pub fn text(&self) -> &str {
        &self.output.text
    }

    /// Text as last given to [`set_text`](Self::set_text).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Current configuration.
    pub fn config(&self) -> &ActiveTextConfig {
        &self.config
    }

    /// Recognized elements.
    pub fn index(&self) -> &ElementIndex {
        &self.output.index
    }

    /// Problems reported by the last scan.
    pub fn issues(&self) -> &[ScanIssue] {
        &self.output.issues
    }

    /// Selection state.
    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    /// Tap handlers.
    pub fn handlers_mut(&mut self) -> &mut TapHandlers {
        &mut self.handlers
    }

    /// Replace the source text and rescan.
    pub fn set_text(&mut self, text: impl Into<String>) -> Result<()> {
        self.source = text.into();
        self.rescan()
    }

    /// Rescan the source text and clear any selection.
    ///
    /// Deferred while a [`customize`](Self::customize) batch is open. If
    /// the scan fails the element index is emptied.
    pub fn rescan(&mut self) -> Result<()> {
        if self.batch_depth > 0 {
            return Ok(());
        }

        self.selection.reset();

        match self
            .extractor
            .scan(&self.source, &self.config.scan, &self.filters)
        {
            Ok(output) => {
                for issue in &output.issues {
                    warn!("Scan issue: {}", issue);
                }
                debug!(
                    "Rescanned text: {} elements, {} code units",
                    output.index.len(),
                    utf16_len(&output.text)
                );
                self.output = output;
                Ok(())
            }
            Err(e) => {
                self.output = ScanOutput::unscanned(self.source.clone());
                Err(e)
            }
        }
    }

    /// Styling runs covering the whole text, from the current index.
    ///
    /// No scan happens. Where spans overlap, the element found first by
    /// lookup wins.
    pub fn reconfigure_display(&self) -> Vec<DisplayRun> {
        let length = utf16_len(self.text());
        let selected = self.selection.selected().map(|span| span.range);

        let mut spans: Vec<&ElementSpan> = self.output.index.iter().collect();
        spans.sort_by_key(|span| span.range.location);

        let mut runs = Vec::new();
        let mut at = 0;
        for span in spans {
            let range = span.range;
            if range.location < at || range.end() > length || range.is_empty() {
                continue;
            }
            if range.location > at {
                runs.push(DisplayRun {
                    range: TextRange::new(at, range.location - at),
                    kind: None,
                    selected: false,
                });
            }
            runs.push(DisplayRun {
                range,
                kind: Some(span.kind.clone()),
                selected: selected == Some(range),
            });
            at = range.end();
        }

        if at < length {
            runs.push(DisplayRun {
                range: TextRange::new(at, length - at),
                kind: None,
                selected: false,
            });
        }

        runs
    }

    /// Apply several configuration changes with a single rescan.
    pub fn customize<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.batch_depth += 1;
        let result = f(self);
        self.batch_depth -= 1;
        result?;
        self.rescan()
    }

    /// Accept only mentions passing `predicate`.
    pub fn filter_mention(
        &mut self,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Result<()> {
        self.set_filter(ElementKind::Mention, Arc::new(predicate))
    }

    /// Accept only hashtags passing `predicate`.
    pub fn filter_hashtag(
        &mut self,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Result<()> {
        self.set_filter(ElementKind::Hashtag, Arc::new(predicate))
    }

    /// Install a filter for any filterable kind.
    pub fn set_filter(&mut self, kind: ElementKind, filter: Arc<dyn ElementFilter>) -> Result<()> {
        self.filters.set(kind, filter)?;
        self.rescan()
    }

    /// Choose the kinds to recognize.
    pub fn set_enabled_kinds(&mut self, kinds: Vec<ElementKind>) -> Result<()> {
        self.config.scan.enabled_kinds = kinds;
        self.rescan()
    }

    /// Set or clear the URL truncation length.
    pub fn set_url_max_length(&mut self, max_length: Option<usize>) -> Result<()> {
        if max_length == Some(0) {
            return Err(Error::Config("URL max length must be > 0".to_string()));
        }
        self.config.scan.url_max_length = max_length;
        self.rescan()
    }

    /// Register the pattern of a custom kind. The kind still has to be
    /// enabled to be scanned.
    pub fn register_custom_pattern(
        &mut self,
        tag: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Result<()> {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return Err(Error::Config(
                "custom pattern tag cannot be empty".to_string(),
            ));
        }
        self.config.scan.set_custom_pattern(tag, pattern);
        self.rescan()
    }

    /// Handle mention taps.
    pub fn handle_mention_tap(&mut self, handler: impl Fn(&str) + Send + Sync + 'static) {
        self.handlers.on_mention(handler);
    }

    /// Handle hashtag taps.
    pub fn handle_hashtag_tap(&mut self, handler: impl Fn(&str) + Send + Sync + 'static) {
        self.handlers.on_hashtag(handler);
    }

    /// Handle URL taps.
    pub fn handle_url_tap(&mut self, handler: impl Fn(&Url) + Send + Sync + 'static) {
        self.handlers.on_url(handler);
    }

    /// Handle email taps.
    pub fn handle_email_tap(&mut self, handler: impl Fn(&str) + Send + Sync + 'static) {
        self.handlers.on_email(handler);
    }

    /// Handle taps on a custom kind.
    pub fn handle_custom_tap(
        &mut self,
        tag: impl Into<String>,
        handler: impl Fn(&str) + Send + Sync + 'static,
    ) {
        self.handlers.on_custom(tag, handler);
    }

    /// Remove the tap handler of a kind.
    pub fn remove_handle(&mut self, kind: &ElementKind) -> bool {
        self.handlers.remove_handler(kind)
    }

    /// Set the fallback delegate.
    pub fn set_delegate(&mut self, delegate: Option<Arc<dyn ActiveTextDelegate>>) {
        self.handlers.set_delegate(delegate);
    }

    /// Feed a touch at an already computed character offset.
    ///
    /// A completed tap is dispatched before this returns.
    pub fn handle_touch(
        &mut self,
        phase: TouchPhase,
        offset: Option<usize>,
        now: Instant,
    ) -> TouchOutcome {
        let hit = offset.and_then(|offset| self.output.index.span_at(offset));
        let outcome = self.selection.handle(phase, hit, now);

        if let Some(span) = outcome.tapped() {
            let target = self.handlers.dispatch(&span.element);
            if target == DispatchTarget::Dropped {
                info!("Tap on {} had no handler", span.kind);
            }
        }

        outcome
    }

    /// Expire tap feedback. Returns the deselection, if any.
    pub fn tick(&mut self, now: Instant) -> Option<SelectionEvent> {
        self.selection.expire(now)
    }

    /// Element at a character offset.
    pub fn element_at(&self, offset: usize) -> Option<&Element> {
        self.output.index.lookup(offset)
    }
}

impl Default for ActiveText {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActiveText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveText")
            .field("source", &self.source)
            .field("text", &self.output.text)
            .field("config", &self.config)
            .field("elements", &self.output.index.len())
            .field("selection", self.selection.state())
            .field("handlers", &self.handlers)
            .finish()
    }
}
