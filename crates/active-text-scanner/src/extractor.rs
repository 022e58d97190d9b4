//! Element extraction.
//!
//! Runs the per-kind strategies over a text and assembles the results into
//! an [`ElementIndex`]. URLs are extracted first because truncation
//! rewrites the text; every other kind then scans the rewritten buffer so
//! all ranges address the same final text.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use active_text_core::{Element, ElementKind, ElementSpan, Error, Result, ScanSettings, TextRange};

use crate::filter::FilterSet;
use crate::index::ElementIndex;
use crate::pattern::{builtin_pattern, PatternMatcher, URL_PATTERN};
use crate::text::{byte_range, find_from, replace_range, substring, utf16_len, utf16_offset};

/// Marker appended to a truncated URL.
pub const URL_ELLIPSIS: &str = "...";

/// Scheme prefixed to URLs written without one.
const DEFAULT_URL_SCHEME: &str = "https://";

/// Non-fatal problem encountered during a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanIssue {
    /// A kind's pattern failed to compile; the kind produced no spans.
    PatternCompile {
        /// Kind whose pattern failed
        kind: ElementKind,
        /// Pattern source
        pattern: String,
        /// Compiler message
        message: String,
    },

    /// A custom kind was enabled without a registered pattern.
    MissingCustomPattern {
        /// Tag of the custom kind
        tag: String,
    },

    /// A URL could not be located in the rewritten buffer; it was kept
    /// untruncated at its shifted position.
    UrlNotRelocated {
        /// The URL word
        word: String,
        /// Best-effort range
        range: TextRange,
    },
}

impl fmt::Display for ScanIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanIssue::PatternCompile {
                kind,
                pattern,
                message,
            } => write!(f, "pattern for {kind} failed to compile ('{pattern}'): {message}"),
            ScanIssue::MissingCustomPattern { tag } => {
                write!(f, "no pattern registered for custom:{tag}")
            }
            ScanIssue::UrlNotRelocated { word, range } => write!(
                f,
                "URL '{}' not found near {}+{}",
                word, range.location, range.length
            ),
        }
    }
}

/// Result of a full scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutput {
    /// Final text, with URL truncations applied
    pub text: String,
    /// Recognized elements; every range addresses `text`
    pub index: ElementIndex,
    /// Non-fatal problems
    pub issues: Vec<ScanIssue>,
}

impl ScanOutput {
    /// Output for text that contains no elements.
    pub fn unscanned(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Element at a character offset.
    pub fn lookup(&self, offset: usize) -> Option<&Element> {
        self.index.lookup(offset)
    }

    /// Text addressed by a range of the output text.
    pub fn text_of(&self, range: TextRange) -> Result<&str> {
        substring(&self.text, range).ok_or_else(|| Error::InvalidRange {
            location: range.location,
            length: range.length,
            text_length: utf16_len(&self.text),
        })
    }

    fn degrade(&mut self, kind: ElementKind, pattern: String, message: String) {
        warn!("Pattern for {} failed to compile: {}", kind, message);
        self.index.insert(kind.clone(), Vec::new());
        self.issues.push(ScanIssue::PatternCompile {
            kind,
            pattern,
            message,
        });
    }
}

/// Result of URL extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlExtraction {
    /// URL spans in match order, ranges in `text`
    pub spans: Vec<ElementSpan>,
    /// Text after truncation
    pub text: String,
    /// URLs that could not be relocated
    pub issues: Vec<ScanIssue>,
}

/// Extracts elements from text.
#[derive(Debug, Clone, Default)]
pub struct ElementExtractor {
    matcher: PatternMatcher,
}

impl ElementExtractor {
    /// Create an extractor using the process-wide pattern cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor around a specific matcher.
    pub fn with_matcher(matcher: PatternMatcher) -> Self {
        Self { matcher }
    }

    /// The matcher used for all kinds.
    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    /// Scan `text` for every enabled kind.
    ///
    /// URLs run first and may rewrite the text; the other kinds follow in
    /// configured order on the rewritten text and drop any span inside a
    /// URL. A kind whose pattern does not
    /// compile, or a custom kind without a pattern, yields no spans and a
    /// [`ScanIssue`]. A failing filter fails the whole scan.
    pub fn scan(
        &self,
        text: &str,
        settings: &ScanSettings,
        filters: &FilterSet,
    ) -> Result<ScanOutput> {
        let mut output = ScanOutput::unscanned(text);
        if text.is_empty() {
            return Ok(output);
        }

        if settings.is_enabled(&ElementKind::Url) {
            let range = TextRange::full(utf16_len(text));
            match self.extract_url_elements(text, range, settings.url_max_length) {
                Ok(extraction) => {
                    output.text = extraction.text;
                    output.issues.extend(extraction.issues);
                    output.index.insert(ElementKind::Url, extraction.spans);
                }
                Err(Error::PatternCompile { pattern, message }) => {
                    output.degrade(ElementKind::Url, pattern, message);
                }
                Err(e) => return Err(e),
            }
        }

        let range = TextRange::full(utf16_len(&output.text));
        let url_ranges: Vec<TextRange> = output
            .index
            .spans(&ElementKind::Url)
            .iter()
            .map(|span| span.range)
            .collect();
        let mut seen = HashSet::new();

        for kind in &settings.enabled_kinds {
            if *kind == ElementKind::Url || !seen.insert(kind) {
                continue;
            }

            let pattern = match kind {
                ElementKind::Custom(tag) => settings.custom_pattern(tag),
                other => builtin_pattern(other),
            };
            let Some(pattern) = pattern else {
                warn!("Custom kind {} enabled without a pattern", kind);
                output.issues.push(ScanIssue::MissingCustomPattern {
                    tag: kind.custom_tag().unwrap_or_default().to_string(),
                });
                output.index.insert(kind.clone(), Vec::new());
                continue;
            };

            match self.extract_elements(kind, pattern, &output.text, range, filters) {
                Ok(mut spans) => {
                    spans.retain(|span| !url_ranges.iter().any(|url| url.intersects(&span.range)));
                    output.index.insert(kind.clone(), spans);
                }
                Err(Error::PatternCompile { pattern, message }) => {
                    output.degrade(kind.clone(), pattern, message);
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            "Scanned {} code units: {} elements across {} kinds, {} issues",
            range.length,
            output.index.len(),
            output.index.kinds().count(),
            output.issues.len()
        );

        Ok(output)
    }

    /// Extract URLs, truncating those longer than `max_length`.
    ///
    /// Matches are found once on the input. Each is then located in the
    /// working buffer at its original position shifted by the length change
    /// of earlier rewrites, so a repeated URL is always rewritten at its own
    /// occurrence.
    ///
    /// With a limit set, a run of exactly `max_length` URL characters that
    /// starts at a URL boundary and ends in [`URL_ELLIPSIS`] is taken as an
    /// earlier truncation and kept as-is, whether or not it still matches
    /// the URL pattern. Re-scanning output text therefore leaves it
    /// unchanged.
    pub fn extract_url_elements(
        &self,
        text: &str,
        range: TextRange,
        max_length: Option<usize>,
    ) -> Result<UrlExtraction> {
        let matches = self.matcher.find_matches(URL_PATTERN, text, range)?;
        let min_length = ElementKind::Url.min_length();

        let mut candidates = match max_length {
            Some(max) => truncation_marks(text, range, max),
            None => Vec::new(),
        };
        for candidate in &matches {
            if candidate.range.length <= min_length {
                continue;
            }
            let word = candidate.text.trim();
            if word.is_empty() {
                continue;
            }
            let leading = candidate.text.len() - candidate.text.trim_start().len();
            candidates.push(UrlCandidate {
                range: TextRange::new(
                    candidate.range.location + utf16_len(&candidate.text[..leading]),
                    utf16_len(word),
                ),
                word,
                marked: false,
            });
        }
        // Marks win ties so a URL matching inside one is skipped.
        candidates.sort_by_key(|c| (c.range.location, !c.marked));

        let mut buffer = text.to_string();
        let mut spans = Vec::with_capacity(candidates.len());
        let mut issues = Vec::new();
        let mut delta: isize = 0;
        let mut covered_to = 0;

        for candidate in candidates {
            if candidate.range.location < covered_to {
                continue;
            }
            covered_to = candidate.range.end();

            let word = candidate.word;
            let expected = candidate.range.shifted(delta);

            if candidate.marked {
                let bare = word.strip_suffix(URL_ELLIPSIS).unwrap_or(word);
                spans.push(url_span(expected, bare, word.to_string()));
                continue;
            }

            let located = if substring(&buffer, expected) == Some(word) {
                Some(expected)
            } else {
                find_from(&buffer, word, expected.location)
            };

            let Some(found) = located else {
                warn!("URL '{}' not found in rewritten text", word);
                issues.push(ScanIssue::UrlNotRelocated {
                    word: word.to_string(),
                    range: expected,
                });
                spans.push(url_span(expected, word, word.to_string()));
                continue;
            };

            let span = match max_length {
                Some(max) if word.chars().count() > max => {
                    let shown: String =
                        word.chars().take(max).chain(URL_ELLIPSIS.chars()).collect();
                    if replace_range(&mut buffer, found, &shown) {
                        let length = utf16_len(&shown);
                        delta += length as isize - found.length as isize;
                        debug!("Truncated URL '{}' to '{}'", word, shown);
                        url_span(TextRange::new(found.location, length), word, shown)
                    } else {
                        url_span(found, word, word.to_string())
                    }
                }
                _ => url_span(found, word, word.to_string()),
            };
            spans.push(span);
        }

        Ok(UrlExtraction {
            spans,
            text: buffer,
            issues,
        })
    }

    /// Extract elements of a non-URL kind with `pattern`.
    ///
    /// Mentions and hashtags have their leading boundary character and
    /// marker stripped from the element text; the span still covers the
    /// raw match. Emails and custom kinds keep the trimmed match. Raw
    /// matches at or below the kind's minimum length are discarded before
    /// filtering.
    pub fn extract_elements(
        &self,
        kind: &ElementKind,
        pattern: &str,
        text: &str,
        range: TextRange,
        filters: &FilterSet,
    ) -> Result<Vec<ElementSpan>> {
        if *kind == ElementKind::Url {
            return Err(Error::Other(
                "URLs are extracted with extract_url_elements".to_string(),
            ));
        }

        let matches = self.matcher.find_matches(pattern, text, range)?;
        let min_length = kind.min_length();
        let mut spans = Vec::new();

        for candidate in matches {
            if candidate.range.length <= min_length {
                continue;
            }

            let cleaned = match kind {
                ElementKind::Mention | ElementKind::Hashtag => strip_boundary(&candidate.text),
                _ => candidate.text.trim(),
            };
            if cleaned.is_empty() || !filters.accepts(kind, cleaned)? {
                continue;
            }

            spans.push(ElementSpan::new(
                candidate.range,
                Element::create(kind, cleaned),
                kind.clone(),
            ));
        }

        Ok(spans)
    }
}

fn url_span(range: TextRange, word: &str, display: String) -> ElementSpan {
    let original = if word.contains("://") {
        word.to_string()
    } else {
        format!("{DEFAULT_URL_SCHEME}{word}")
    };
    ElementSpan::new(range, Element::Url { original, display }, ElementKind::Url)
}

/// Drop the boundary character, then a `@`/`#` marker.
fn strip_boundary(raw: &str) -> &str {
    let mut chars = raw.chars();
    chars.next();
    let rest = chars.as_str();
    rest.strip_prefix(|c: char| c == '@' || c == '#').unwrap_or(rest)
}

/// A URL occurrence in the input, before any rewrite.
struct UrlCandidate<'a> {
    range: TextRange,
    word: &'a str,
    /// An earlier truncation, ellipsis included
    marked: bool,
}

/// Earlier truncations in `range`: exactly `max` URL characters plus the
/// ellipsis, preceded by a URL boundary and followed by a URL terminator.
fn truncation_marks(text: &str, range: TextRange, max: usize) -> Vec<UrlCandidate<'_>> {
    let mut marks = Vec::new();
    if max == 0 {
        return marks;
    }

    let bytes = byte_range(text, range);
    let scope = &text[bytes.clone()];
    let mut previous = text[..bytes.start].chars().next_back();
    let mut unit = utf16_offset(text, bytes.start);
    let mut skip_to = 0;

    for (at, ch) in scope.char_indices() {
        let location = unit;
        unit += ch.len_utf16();
        let boundary = previous.map_or(true, is_url_boundary);
        previous = Some(ch);
        if at < skip_to || !boundary {
            continue;
        }

        if let Some(length) = marked_length(&scope[at..], max) {
            let word = &scope[at..at + length];
            marks.push(UrlCandidate {
                range: TextRange::new(location, utf16_len(word)),
                word,
                marked: true,
            });
            skip_to = at + length;
        }
    }

    marks
}

/// Byte length of a truncated display at the start of `rest`.
fn marked_length(rest: &str, max: usize) -> Option<usize> {
    let mut chars = rest.char_indices();
    for position in 0..max {
        let (_, ch) = chars.next()?;
        let allowed = if position == 0 {
            is_url_start(ch)
        } else {
            is_url_char(ch)
        };
        if !allowed {
            return None;
        }
    }

    let cut = chars.next().map_or(rest.len(), |(at, _)| at);
    let tail = rest[cut..].strip_prefix(URL_ELLIPSIS)?;
    tail.chars()
        .next()
        .map_or(true, is_url_terminator)
        .then_some(cut + URL_ELLIPSIS.len())
}

fn is_url_boundary(ch: char) -> bool {
    ch.is_whitespace() || ".:;?-(".contains(ch)
}

fn is_url_terminator(ch: char) -> bool {
    ch.is_whitespace() || ".,:;?-)".contains(ch)
}

fn is_url_start(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-'
}

fn is_url_char(ch: char) -> bool {
    is_url_start(ch) || "./?&%=+:".contains(ch)
}
