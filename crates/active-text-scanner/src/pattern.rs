//! Recognition patterns and the compiled-pattern cache.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use active_text_core::{ElementKind, Error, Result, TextRange};

use crate::text::{byte_range, utf16_offset, Utf16Cursor};

/// `#` preceded by start, whitespace or end, followed by word code points.
pub const HASHTAG_PATTERN: &str = r"(?:^|\s|$)#[\p{L}0-9_]*";

/// `@` preceded by start, whitespace, end or a dot, followed by optionally
/// dot-separated word segments.
pub const MENTION_PATTERN: &str = r"(?:^|\s|$|[.])@[\p{L}0-9_]+(?:\.[\p{L}0-9_]+)*";

/// Local part, `@`, domain with a 2-64 letter TLD.
pub const EMAIL_PATTERN: &str = r"[A-Z0-9a-z._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,64}";

/// Scheme, `www.` or bare domain with a TLD and optional path.
///
/// Both boundary groups are excluded from the reported match.
pub const URL_PATTERN: &str = concat!(
    r"(?P<lookbehind>^|[\s.:;?\-\(])",
    r"(?:(?:https?://|www\.|[a-zA-Z][a-zA-Z0-9+.-]*://)?[\w-]+\.[a-zA-Z]{2,}(?:[\w./?&%=+-]*[\w/])?",
    r"|[a-zA-Z][a-zA-Z0-9+.-]*://[\w./?&%=+-]*)",
    r"(?P<lookahead>$|[\s.,:;?\-\)])",
);

/// Name of the group whose text is excluded from the start of a match.
pub const LOOKBEHIND_GROUP: &str = "lookbehind";

/// Name of the group whose text is excluded from the end of a match; the
/// next search resumes where it starts.
pub const LOOKAHEAD_GROUP: &str = "lookahead";

/// Built-in pattern of a kind; custom kinds have none.
pub fn builtin_pattern(kind: &ElementKind) -> Option<&'static str> {
    match kind {
        ElementKind::Mention => Some(MENTION_PATTERN),
        ElementKind::Hashtag => Some(HASHTAG_PATTERN),
        ElementKind::Url => Some(URL_PATTERN),
        ElementKind::Email => Some(EMAIL_PATTERN),
        ElementKind::Custom(_) => None,
    }
}

lazy_static! {
    static ref GLOBAL_CACHE: Arc<PatternCache> = Arc::new(PatternCache::new());
}

/// A single pattern match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Match range in UTF-16 code units
    pub range: TextRange,
    /// Matched text
    pub text: String,
}

/// Cache of compiled patterns keyed by pattern source.
///
/// Entries are never evicted. Compilation failures are not cached.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: RwLock<HashMap<String, Arc<Regex>>>,
}

impl PatternCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            compiled: RwLock::new(HashMap::new()),
        }
    }

    /// Process-wide cache.
    pub fn global() -> Arc<PatternCache> {
        Arc::clone(&GLOBAL_CACHE)
    }

    /// Get the compiled form of a pattern, compiling and inserting it on
    /// first use. Patterns are case-insensitive.
    pub fn get_or_compile(&self, pattern: &str) -> Result<Arc<Regex>> {
        {
            let compiled = self.compiled.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(regex) = compiled.get(pattern) {
                return Ok(Arc::clone(regex));
            }
        }

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::PatternCompile {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;

        debug!("Compiled pattern: {}", pattern);

        let mut compiled = self.compiled.write().unwrap_or_else(PoisonError::into_inner);
        let regex = compiled
            .entry(pattern.to_string())
            .or_insert_with(|| Arc::new(regex));
        Ok(Arc::clone(regex))
    }

    /// Whether a pattern has been compiled.
    pub fn contains(&self, pattern: &str) -> bool {
        self.compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(pattern)
    }

    /// Number of cached patterns.
    pub fn len(&self) -> usize {
        self.compiled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached pattern.
    pub fn clear(&self) {
        self.compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Finds non-overlapping pattern matches in text.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    cache: Arc<PatternCache>,
}

impl PatternMatcher {
    /// Create a matcher backed by the process-wide cache.
    pub fn new() -> Self {
        Self::with_cache(PatternCache::global())
    }

    /// Create a matcher backed by a specific cache.
    pub fn with_cache(cache: Arc<PatternCache>) -> Self {
        Self { cache }
    }

    /// The cache this matcher compiles into.
    pub fn cache(&self) -> &Arc<PatternCache> {
        &self.cache
    }

    /// Find all matches of `pattern` inside `range` of `text`, left to right.
    ///
    /// The range bounds act as the anchoring bounds: `^` and `$` match at
    /// its edges. A range past the end of the text is clamped.
    pub fn find_matches(
        &self,
        pattern: &str,
        text: &str,
        range: TextRange,
    ) -> Result<Vec<PatternMatch>> {
        let regex = self.cache.get_or_compile(pattern)?;
        let window = byte_range(text, range);
        let haystack = &text[window.clone()];

        let mut matches = Vec::new();
        let mut cursor = Utf16Cursor::at(0, 0);
        let base = utf16_offset(text, window.start);
        let mut at = 0;

        while at <= haystack.len() {
            let Some(caps) = regex.captures_at(haystack, at) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };

            let start = caps
                .name(LOOKBEHIND_GROUP)
                .map_or(whole.start(), |m| m.end());
            let end = caps
                .name(LOOKAHEAD_GROUP)
                .map_or(whole.end(), |m| m.start())
                .max(start);

            let location = cursor.advance(haystack, start);
            let end_unit = cursor.advance(haystack, end);
            matches.push(PatternMatch {
                range: TextRange::new(base + location, end_unit - location),
                text: haystack[start..end].to_string(),
            });

            at = if end > whole.start() {
                end
            } else {
                match haystack[whole.start()..].chars().next() {
                    Some(ch) => whole.start() + ch.len_utf8(),
                    None => break,
                }
            };
        }

        Ok(matches)
    }
}

impl Default for PatternMatcher {
    fn default() -> Self {
        Self::new()
    }
}
