//! # active-text-scanner
//!
//! Scanning engine for active text.
//!
//! This crate provides:
//! - Fixed recognition patterns and a shared compiled-pattern cache
//! - Per-kind extraction strategies, URL truncation included
//! - Caller-supplied filters
//! - An index of recognized elements with offset hit-testing
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on active-text-core
//! and knows nothing about touches or selection.
//!
//! ## Example
//!
//! ```
//! use active_text_core::{ElementKind, ScanSettings};
//! use active_text_scanner::{ElementExtractor, FilterSet};
//!
//! let output = ElementExtractor::new()
//!     .scan("ping @ann about #rust", &ScanSettings::default(), &FilterSet::new())
//!     .unwrap();
//!
//! assert_eq!(output.index.spans(&ElementKind::Mention)[0].element.text(), "ann");
//! assert_eq!(output.lookup(16).map(|e| e.text()), Some("rust"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod extractor;
pub mod filter;
pub mod index;
pub mod pattern;
pub mod text;

// Re-export commonly used types
pub use extractor::{ElementExtractor, ScanIssue, ScanOutput, UrlExtraction, URL_ELLIPSIS};
pub use filter::{ElementFilter, FallibleFilter, FilterError, FilterSet};
pub use index::ElementIndex;
pub use pattern::{PatternCache, PatternMatch, PatternMatcher};
