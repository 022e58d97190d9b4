//! Text ranges measured in UTF-16 code units.

use serde::{Deserialize, Serialize};

/// Range of text, in UTF-16 code units.
///
/// Offsets are UTF-16 based because that is the index space host text
/// systems (glyph indices, attributed strings) report touches in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextRange {
    /// Starting offset (0-based)
    pub location: usize,
    /// Length in code units
    pub length: usize,
}

impl TextRange {
    /// Create a new range.
    pub fn new(location: usize, length: usize) -> Self {
        Self { location, length }
    }

    /// Empty range at offset 0.
    pub fn empty() -> Self {
        Self {
            location: 0,
            length: 0,
        }
    }

    /// Range starting at 0 and covering `length` code units.
    pub fn full(length: usize) -> Self {
        Self {
            location: 0,
            length,
        }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.location + self.length
    }

    /// Whether the range covers no code units.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Hit-test containment with an inclusive upper bound.
    ///
    /// `location <= offset <= location + length`. The offset one past the
    /// last code unit still hits; callers rely on this for taps landing on
    /// the trailing edge of an element.
    pub fn contains_inclusive(&self, offset: usize) -> bool {
        offset >= self.location && offset <= self.end()
    }

    /// Half-open containment (`location <= offset < end`).
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.location && offset < self.end()
    }

    /// Check if this range shares at least one code unit with another.
    pub fn intersects(&self, other: &TextRange) -> bool {
        self.location < other.end() && other.location < self.end()
    }

    /// Shift the range by a signed delta, saturating at 0.
    pub fn shifted(&self, delta: isize) -> Self {
        let location = if delta.is_negative() {
            self.location.saturating_sub(delta.unsigned_abs())
        } else {
            self.location + delta as usize
        };
        Self {
            location,
            length: self.length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_creation() {
        let range = TextRange::new(5, 10);
        assert_eq!(range.location, 5);
        assert_eq!(range.length, 10);
        assert_eq!(range.end(), 15);
    }

    #[test]
    fn test_range_full_and_empty() {
        assert!(TextRange::empty().is_empty());
        assert_eq!(TextRange::full(12), TextRange::new(0, 12));
    }

    #[test]
    fn test_contains_inclusive_upper_bound() {
        let range = TextRange::new(4, 6);

        assert!(range.contains_inclusive(4)); // first unit
        assert!(range.contains_inclusive(7)); // inside
        assert!(range.contains_inclusive(10)); // one past the end still hits

        assert!(!range.contains_inclusive(3));
        assert!(!range.contains_inclusive(11));
    }

    #[test]
    fn test_contains_half_open() {
        let range = TextRange::new(4, 6);
        assert!(range.contains(9));
        assert!(!range.contains(10));
    }

    #[test]
    fn test_range_intersects() {
        let a = TextRange::new(0, 5);
        let b = TextRange::new(4, 3); // overlaps by one unit
        let c = TextRange::new(5, 3); // touches only

        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(!c.intersects(&a));
    }

    #[test]
    fn test_range_shifted() {
        let range = TextRange::new(10, 4);
        assert_eq!(range.shifted(3), TextRange::new(13, 4));
        assert_eq!(range.shifted(-4), TextRange::new(6, 4));
        assert_eq!(range.shifted(-20), TextRange::new(0, 4));
    }
}
