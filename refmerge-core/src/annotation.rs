//! Text occurrences of a referent.

use serde::{Deserialize, Serialize};

/// How two character ranges relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextsCompareType {
    /// Ends before the other one starts.
    Early,
    /// Starts after the other one ends.
    Later,
    /// Same range.
    Equivalent,
    /// Covers the other range.
    Contains,
    /// Lies inside the other range.
    In,
    /// Partial overlap.
    Intersect,
}

/// One mention of a referent in the source text: `[begin_char, end_char)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextAnnotation {
    /// Start character offset (inclusive)
    pub begin_char: usize,
    /// End character offset (exclusive)
    pub end_char: usize,
    /// Set on the first occurrence a referent receives.
    #[serde(default)]
    pub essential: bool,
}

impl TextAnnotation {
    /// Create an annotation. Offsets are swapped if given in reverse.
    #[must_use]
    pub fn new(begin_char: usize, end_char: usize) -> Self {
        let (begin_char, end_char) = if begin_char <= end_char {
            (begin_char, end_char)
        } else {
            (end_char, begin_char)
        };
        Self {
            begin_char,
            end_char,
            essential: false,
        }
    }

    /// Length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end_char - self.begin_char
    }

    /// True for a zero-width annotation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.begin_char == self.end_char
    }

    /// Compare this annotation with a raw range.
    ///
    /// Equal ranges are `Equivalent` even when zero-width.
    #[must_use]
    pub fn compare(&self, begin_char: usize, end_char: usize) -> TextsCompareType {
        if self.begin_char == begin_char && self.end_char == end_char {
            TextsCompareType::Equivalent
        } else if self.end_char <= begin_char {
            TextsCompareType::Early
        } else if self.begin_char >= end_char {
            TextsCompareType::Later
        } else if self.begin_char <= begin_char && self.end_char >= end_char {
            TextsCompareType::Contains
        } else if self.begin_char >= begin_char && self.end_char <= end_char {
            TextsCompareType::In
        } else {
            TextsCompareType::Intersect
        }
    }

    /// Compare this annotation with another one.
    #[must_use]
    pub fn compare_with(&self, other: &TextAnnotation) -> TextsCompareType {
        self.compare(other.begin_char, other.end_char)
    }

    /// Widen this annotation so it also covers `other`.
    pub fn merge(&mut self, other: &TextAnnotation) {
        self.begin_char = self.begin_char.min(other.begin_char);
        self.end_char = self.end_char.max(other.end_char);
    }
}

impl std::fmt::Display for TextAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}..{})", self.begin_char, self.end_char)
    }
}
