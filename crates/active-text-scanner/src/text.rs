//! UTF-16 index helpers.
//!
//! Ranges are reported in UTF-16 code units while Rust strings are indexed
//! by byte. These helpers convert between the two and never panic on
//! offsets that fall inside a surrogate pair or past the end of the text;
//! such offsets snap down to the previous character boundary.

use active_text_core::TextRange;

/// Length of a string in UTF-16 code units.
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// UTF-16 offset of a byte offset.
///
/// `byte` must lie on a character boundary; otherwise it is snapped down.
pub fn utf16_offset(s: &str, byte: usize) -> usize {
    let mut byte = byte.min(s.len());
    while !s.is_char_boundary(byte) {
        byte -= 1;
    }
    utf16_len(&s[..byte])
}

/// Byte offset of a UTF-16 offset, snapping down to a character boundary.
pub fn byte_offset(s: &str, unit: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in s.char_indices() {
        let next = units + ch.len_utf16();
        if next > unit {
            return byte;
        }
        units = next;
    }
    s.len()
}

/// Byte range of a UTF-16 range, clamped to the text.
pub fn byte_range(s: &str, range: TextRange) -> std::ops::Range<usize> {
    let start = byte_offset(s, range.location);
    let end = byte_offset(s, range.end()).max(start);
    start..end
}

/// Substring addressed by an exact UTF-16 range.
///
/// Returns `None` if the range runs past the end of the text or splits a
/// surrogate pair.
pub fn substring(s: &str, range: TextRange) -> Option<&str> {
    let bytes = byte_range(s, range);
    let slice = &s[bytes.clone()];
    if utf16_offset(s, bytes.start) != range.location || utf16_len(slice) != range.length {
        return None;
    }
    Some(slice)
}

/// First occurrence of `needle` starting at or after UTF-16 offset `from`.
pub fn find_from(s: &str, needle: &str, from: usize) -> Option<TextRange> {
    if needle.is_empty() {
        return None;
    }
    let start = byte_offset(s, from);
    let found = s[start..].find(needle)? + start;
    Some(TextRange::new(utf16_offset(s, found), utf16_len(needle)))
}

/// Replace the text covered by an exact UTF-16 range.
///
/// Returns `false` (and leaves the text untouched) if the range is not
/// addressable.
pub fn replace_range(s: &mut String, range: TextRange, with: &str) -> bool {
    if substring(s, range).is_none() {
        return false;
    }
    let bytes = byte_range(s, range);
    s.replace_range(bytes, with);
    true
}

/// Incremental byte → UTF-16 converter for monotonically increasing offsets.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Utf16Cursor {
    byte: usize,
    unit: usize,
}

impl Utf16Cursor {
    /// Cursor positioned at a known pair of offsets.
    pub(crate) fn at(byte: usize, unit: usize) -> Self {
        Self { byte, unit }
    }

    /// Advance to `byte` and return its UTF-16 offset.
    pub(crate) fn advance(&mut self, s: &str, byte: usize) -> usize {
        if byte < self.byte {
            self.byte = byte;
            self.unit = utf16_len(&s[..byte]);
        } else {
            self.unit += utf16_len(&s[self.byte..byte]);
            self.byte = byte;
        }
        self.unit
    }
}
