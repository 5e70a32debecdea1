//! Grammatical number and gender flags.
//!
//! Both are bit sets: an ambiguous word form ("sheep") carries several bits at
//! once, and agreement checks are plain intersections.

use bitflags::bitflags;

bitflags! {
    /// Grammatical gender.
    ///
    /// ```
    /// use refmerge_core::MorphGender;
    ///
    /// let ambiguous = MorphGender::MASCULINE | MorphGender::FEMININE;
    /// assert!(ambiguous.agrees_with(MorphGender::FEMININE));
    /// assert!(!ambiguous.agrees_with(MorphGender::NEUTER));
    /// assert!(MorphGender::UNDEFINED.agrees_with(MorphGender::NEUTER));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MorphGender: u8 {
        /// Unknown or not applicable.
        const UNDEFINED = 0;
        /// Masculine.
        const MASCULINE = 1;
        /// Feminine.
        const FEMININE = 1 << 1;
        /// Neuter.
        const NEUTER = 1 << 2;
    }
}

bitflags! {
    /// Grammatical number.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MorphNumber: u8 {
        /// Unknown or not applicable.
        const UNDEFINED = 0;
        /// Singular.
        const SINGULAR = 1;
        /// Plural.
        const PLURAL = 1 << 1;
    }
}

impl MorphGender {
    /// An undefined side agrees with anything; otherwise the sets must intersect.
    #[must_use]
    pub fn agrees_with(self, other: MorphGender) -> bool {
        self.is_empty() || other.is_empty() || self.intersects(other)
    }
}

impl MorphNumber {
    /// An undefined side agrees with anything; otherwise the sets must intersect.
    #[must_use]
    pub fn agrees_with(self, other: MorphNumber) -> bool {
        self.is_empty() || other.is_empty() || self.intersects(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_agreement() {
        assert!(MorphNumber::SINGULAR.agrees_with(MorphNumber::SINGULAR));
        assert!(!MorphNumber::SINGULAR.agrees_with(MorphNumber::PLURAL));
        assert!(MorphNumber::UNDEFINED.agrees_with(MorphNumber::PLURAL));
        assert!((MorphNumber::SINGULAR | MorphNumber::PLURAL).agrees_with(MorphNumber::PLURAL));
    }

    #[test]
    fn test_default_is_undefined() {
        assert_eq!(MorphGender::default(), MorphGender::UNDEFINED);
        assert!(MorphNumber::default().is_empty());
    }
}
