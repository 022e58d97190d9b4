//! # active-text-core
//!
//! Core types for active text.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other active-text crates. It provides:
//!
//! - Text ranges in UTF-16 code units
//! - Element kinds, elements and spans
//! - Configuration types
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - the scanner and session crates
//! depend on this one, but this crate has no dependencies on them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod element;
pub mod error;
pub mod range;

// Re-export commonly used types
pub use config::{ActiveTextConfig, CustomPatternConfig, InteractionSettings, ScanSettings};
pub use element::{Element, ElementKind, ElementSpan};
pub use error::{Error, Result};
pub use range::TextRange;
