//! Touch-driven selection state machine.
//!
//! A touch that lands on an element selects it (pending). Releasing over
//! the same element commits the selection and reports a tap; the committed
//! highlight stays for a short feedback delay and is then cleared by
//! [`SelectionTracker::expire`].

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use active_text_core::{ElementSpan, InteractionSettings};

/// Phase of a touch, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    /// Finger down
    Began,
    /// Finger moved
    Moved,
    /// Finger lifted
    Ended,
    /// Touch cancelled by the system
    Cancelled,
    /// Finger down, not moving
    Stationary,
}

/// Selection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    /// Nothing selected
    None,
    /// Element under an active touch
    Pending(ElementSpan),
    /// Tapped element kept highlighted until the feedback delay elapses
    Committed {
        /// The tapped span
        span: ElementSpan,
        /// When the tap was committed
        since: Instant,
    },
}

/// Change reported by a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "span", rename_all = "snake_case")]
pub enum SelectionEvent {
    /// Span became selected
    Selected(ElementSpan),
    /// Span lost its selection
    Deselected(ElementSpan),
    /// Span was tapped
    Tapped(ElementSpan),
}

/// Result of feeding a touch to the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TouchOutcome {
    /// Events in the order they happened
    pub events: Vec<SelectionEvent>,
    /// Whether the touch was handled by an element and should not be
    /// forwarded to the host's default handling
    pub consumed: bool,
}

impl TouchOutcome {
    /// The tapped span, if the touch completed a tap.
    pub fn tapped(&self) -> Option<&ElementSpan> {
        self.events.iter().find_map(|event| match event {
            SelectionEvent::Tapped(span) => Some(span),
            _ => None,
        })
    }
}

/// Tracks which element is selected across touch phases.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    state: SelectionState,
    feedback_delay: Duration,
}

impl SelectionTracker {
    /// Create a tracker with the given feedback delay.
    pub fn new(feedback_delay: Duration) -> Self {
        Self {
            state: SelectionState::None,
            feedback_delay,
        }
    }

    /// Create a tracker from interaction settings.
    pub fn from_settings(settings: &InteractionSettings) -> Self {
        Self::new(settings.feedback_delay())
    }

    /// Current state.
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Selected span, pending or committed.
    pub fn selected(&self) -> Option<&ElementSpan> {
        match &self.state {
            SelectionState::None => None,
            SelectionState::Pending(span) => Some(span),
            SelectionState::Committed { span, .. } => Some(span),
        }
    }

    /// Feedback delay applied after a tap.
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    /// Change the feedback delay; an already committed tap uses the new value.
    pub fn set_feedback_delay(&mut self, delay: Duration) {
        self.feedback_delay = delay;
    }

    /// Feed a touch.
    ///
    /// `hit` is the span under the touch, or `None` if the touch is not over
    /// an element or its position is unknown.
    pub fn handle(
        &mut self,
        phase: TouchPhase,
        hit: Option<&ElementSpan>,
        now: Instant,
    ) -> TouchOutcome {
        let mut outcome = TouchOutcome::default();

        match phase {
            TouchPhase::Began | TouchPhase::Moved => {
                if matches!(self.state, SelectionState::Committed { .. }) {
                    self.clear(&mut outcome.events);
                }

                match hit {
                    Some(hit) => {
                        let unchanged = matches!(
                            &self.state,
                            SelectionState::Pending(current) if current.range == hit.range
                        );
                        if !unchanged {
                            self.clear(&mut outcome.events);
                            self.state = SelectionState::Pending(hit.clone());
                            outcome.events.push(SelectionEvent::Selected(hit.clone()));
                        }
                        outcome.consumed = true;
                    }
                    None => self.clear(&mut outcome.events),
                }
            }
            TouchPhase::Ended => {
                let pending = match std::mem::replace(&mut self.state, SelectionState::None) {
                    SelectionState::Pending(span) => span,
                    other => {
                        self.state = other;
                        return outcome;
                    }
                };

                if hit.is_some_and(|hit| hit.range == pending.range) {
                    debug!(
                        "Tap committed on {} at {}+{}",
                        pending.kind, pending.range.location, pending.range.length
                    );
                    outcome.events.push(SelectionEvent::Tapped(pending.clone()));
                    self.state = SelectionState::Committed {
                        span: pending,
                        since: now,
                    };
                    outcome.consumed = true;
                } else {
                    outcome.events.push(SelectionEvent::Deselected(pending));
                }
            }
            TouchPhase::Cancelled => {
                outcome.consumed = matches!(self.state, SelectionState::Pending(_));
                self.clear(&mut outcome.events);
            }
            TouchPhase::Stationary => {
                outcome.consumed = matches!(self.state, SelectionState::Pending(_));
            }
        }

        outcome
    }

    /// Clear a committed selection whose feedback delay has elapsed.
    pub fn expire(&mut self, now: Instant) -> Option<SelectionEvent> {
        match &self.state {
            SelectionState::Committed { since, .. }
                if now.saturating_duration_since(*since) >= self.feedback_delay => {}
            _ => return None,
        }

        let mut events = Vec::with_capacity(1);
        self.clear(&mut events);
        events.pop()
    }

    /// Drop any selection immediately.
    pub fn reset(&mut self) -> Option<SelectionEvent> {
        let mut events = Vec::with_capacity(1);
        self.clear(&mut events);
        events.pop()
    }

    fn clear(&mut self, events: &mut Vec<SelectionEvent>) {
        match std::mem::replace(&mut self.state, SelectionState::None) {
            SelectionState::None => {}
            SelectionState::Pending(span) | SelectionState::Committed { span, .. } => {
                events.push(SelectionEvent::Deselected(span));
            }
        }
    }
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::from_settings(&InteractionSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use active_text_core::{Element, ElementKind, TextRange};

    fn span(location: usize, length: usize, text: &str) -> ElementSpan {
        ElementSpan::new(
            TextRange::new(location, length),
            Element::create(&ElementKind::Mention, text),
            ElementKind::Mention,
        )
    }

    fn tracker() -> SelectionTracker {
        SelectionTracker::new(Duration::from_millis(250))
    }

    #[test]
    fn test_tap_commits_and_reports_once() {
        let mut tracker = tracker();
        let ann = span(0, 4, "ann");
        let now = Instant::now();

        let down = tracker.handle(TouchPhase::Began, Some(&ann), now);
        assert_eq!(down.events, vec![SelectionEvent::Selected(ann.clone())]);
        assert!(down.consumed);

        let up = tracker.handle(TouchPhase::Ended, Some(&ann), now);
        assert_eq!(up.events, vec![SelectionEvent::Tapped(ann.clone())]);
        assert_eq!(up.tapped(), Some(&ann));
        assert!(matches!(tracker.state(), SelectionState::Committed { .. }));

        let again = tracker.handle(TouchPhase::Ended, Some(&ann), now);
        assert!(again.events.is_empty());
        assert!(!again.consumed);
    }

    #[test]
    fn test_touch_outside_elements() {
        let mut tracker = tracker();
        let outcome = tracker.handle(TouchPhase::Began, None, Instant::now());
        assert!(outcome.events.is_empty());
        assert!(!outcome.consumed);
        assert_eq!(tracker.state(), &SelectionState::None);
    }

    #[test]
    fn test_move_to_other_span() {
        let mut tracker = tracker();
        let ann = span(0, 4, "ann");
        let bob = span(9, 4, "bob");
        let now = Instant::now();

        tracker.handle(TouchPhase::Began, Some(&ann), now);
        let moved = tracker.handle(TouchPhase::Moved, Some(&bob), now);
        assert_eq!(
            moved.events,
            vec![
                SelectionEvent::Deselected(ann),
                SelectionEvent::Selected(bob.clone())
            ]
        );
        assert_eq!(tracker.selected(), Some(&bob));
    }

    #[test]
    fn test_move_within_span_is_silent() {
        let mut tracker = tracker();
        let ann = span(0, 4, "ann");
        let now = Instant::now();

        tracker.handle(TouchPhase::Began, Some(&ann), now);
        let moved = tracker.handle(TouchPhase::Moved, Some(&ann), now);
        assert!(moved.events.is_empty());
        assert!(moved.consumed);
    }

    #[test]
    fn test_move_off_elements_deselects() {
        let mut tracker = tracker();
        let ann = span(0, 4, "ann");
        let now = Instant::now();

        tracker.handle(TouchPhase::Began, Some(&ann), now);
        let moved = tracker.handle(TouchPhase::Moved, None, now);
        assert_eq!(moved.events, vec![SelectionEvent::Deselected(ann)]);
        assert_eq!(tracker.state(), &SelectionState::None);
    }

    #[test]
    fn test_release_elsewhere_no_tap() {
        let mut tracker = tracker();
        let ann = span(0, 4, "ann");
        let bob = span(9, 4, "bob");
        let now = Instant::now();

        tracker.handle(TouchPhase::Began, Some(&ann), now);
        let up = tracker.handle(TouchPhase::Ended, Some(&bob), now);
        assert_eq!(up.events, vec![SelectionEvent::Deselected(ann)]);
        assert!(up.tapped().is_none());
        assert!(!up.consumed);

        tracker.handle(TouchPhase::Began, Some(&bob), now);
        let up = tracker.handle(TouchPhase::Ended, None, now);
        assert!(up.tapped().is_none());
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut tracker = tracker();
        let ann = span(0, 4, "ann");
        let now = Instant::now();

        tracker.handle(TouchPhase::Began, Some(&ann), now);
        let cancelled = tracker.handle(TouchPhase::Cancelled, Some(&ann), now);
        assert_eq!(cancelled.events, vec![SelectionEvent::Deselected(ann)]);
        assert!(cancelled.consumed);
        assert_eq!(tracker.state(), &SelectionState::None);
    }

    #[test]
    fn test_stationary_keeps_state() {
        let mut tracker = tracker();
        let ann = span(0, 4, "ann");
        let now = Instant::now();

        tracker.handle(TouchPhase::Began, Some(&ann), now);
        let still = tracker.handle(TouchPhase::Stationary, None, now);
        assert!(still.events.is_empty());
        assert_eq!(tracker.selected(), Some(&ann));
    }

    #[test]
    fn test_feedback_expires_after_delay() {
        let mut tracker = tracker();
        let ann = span(0, 4, "ann");
        let now = Instant::now();

        tracker.handle(TouchPhase::Began, Some(&ann), now);
        tracker.handle(TouchPhase::Ended, Some(&ann), now);

        assert!(tracker.expire(now + Duration::from_millis(100)).is_none());
        assert_eq!(
            tracker.expire(now + Duration::from_millis(250)),
            Some(SelectionEvent::Deselected(ann))
        );
        assert_eq!(tracker.state(), &SelectionState::None);
    }

    #[test]
    fn test_new_touch_clears_committed() {
        let mut tracker = tracker();
        let ann = span(0, 4, "ann");
        let bob = span(9, 4, "bob");
        let now = Instant::now();

        tracker.handle(TouchPhase::Began, Some(&ann), now);
        tracker.handle(TouchPhase::Ended, Some(&ann), now);

        let down = tracker.handle(TouchPhase::Began, Some(&bob), now);
        assert_eq!(
            down.events,
            vec![
                SelectionEvent::Deselected(ann),
                SelectionEvent::Selected(bob)
            ]
        );
    }

    #[test]
    fn test_expire_ignores_pending() {
        let mut tracker = tracker();
        let ann = span(0, 4, "ann");
        let now = Instant::now();

        tracker.handle(TouchPhase::Began, Some(&ann), now);
        assert!(tracker.expire(now + Duration::from_secs(5)).is_none());
        assert_eq!(tracker.reset(), Some(SelectionEvent::Deselected(ann)));
    }

    #[test]
    fn test_event_serialization() {
        let event = SelectionEvent::Tapped(span(0, 4, "ann"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "tapped");
        assert_eq!(json["span"]["element"]["text"], "ann");
    }
}
