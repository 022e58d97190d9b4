//! # active-text-session
//!
//! Interactive layer for active text.
//!
//! This crate provides:
//! - The [`ActiveText`] controller owned by a host view
//! - Touch selection with delayed tap feedback
//! - Tap dispatch to per-kind handlers or a delegate
//! - Display runs for styling the scanned text
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on active-text-core
//! and active-text-scanner. Geometry-to-offset translation and rendering
//! stay with the host: touches arrive as character offsets and styling
//! leaves as [`DisplayRun`]s.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod active_text;
pub mod dispatch;
pub mod selection;

// Re-export commonly used types
pub use active_text::{ActiveText, DisplayRun};
pub use dispatch::{ActiveTextDelegate, DispatchTarget, TapHandlers, TextHandler, UrlHandler};
pub use selection::{SelectionEvent, SelectionState, SelectionTracker, TouchOutcome, TouchPhase};
