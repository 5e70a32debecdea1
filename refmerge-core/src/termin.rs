//! Term variants ("termins"): normalized spellings an entity is known under.
//!
//! A termin stores its words upper-cased with apostrophes removed, which is
//! the form the ontology index is keyed on. Termins are built once and never
//! edited after they are handed to an ontology item; a changed spelling means
//! a new termin and a re-index.

use crate::{MorphGender, MorphNumber, SurfaceForm};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Returned by [`Termin::canonic_text`] when there is nothing to show.
pub const UNKNOWN_TEXT: &str = "?";

/// One normalized textual variant of an entity name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Termin {
    terms: Vec<String>,
    acronym: Option<String>,
    canonic_text: Option<String>,
    ignore_terms_order: bool,
    internal: bool,
    tag: Option<String>,
    #[serde(skip)]
    gender: MorphGender,
}

impl Termin {
    /// Build a termin observed in text.
    ///
    /// ```
    /// use refmerge_core::Termin;
    ///
    /// let t = Termin::new("  O'Hare  International ");
    /// assert_eq!(t.terms(), ["OHARE", "INTERNATIONAL"]);
    /// assert_eq!(t.canonic_text(), "OHARE INTERNATIONAL");
    /// ```
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            terms: normalize_words(source),
            acronym: None,
            canonic_text: None,
            ignore_terms_order: false,
            internal: false,
            tag: None,
            gender: MorphGender::UNDEFINED,
        }
    }

    /// Build a termin the engine synthesized itself (never shown as a canonical name).
    #[must_use]
    pub fn internal(source: &str) -> Self {
        Self {
            internal: true,
            ..Self::new(source)
        }
    }

    /// Build a termin from an upstream span's normalized surface form.
    #[must_use]
    pub fn from_surface(form: &dyn SurfaceForm, number: MorphNumber, gender: MorphGender) -> Self {
        Self::new(&form.normalized_text(number, gender, false)).with_gender(gender)
    }

    /// Attach a tag (e.g. the attribute the variant was derived from).
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Attach an acronym, normalized like the words.
    #[must_use]
    pub fn with_acronym(mut self, acronym: &str) -> Self {
        let acronym: String = acronym
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_uppercase)
            .collect();
        self.acronym = (!acronym.is_empty()).then_some(acronym);
        self
    }

    /// Set the gender hint.
    #[must_use]
    pub fn with_gender(mut self, gender: MorphGender) -> Self {
        self.gender = gender;
        self
    }

    /// Match words regardless of their order ("Ivanov Ivan" == "Ivan Ivanov").
    #[must_use]
    pub fn ignoring_order(mut self) -> Self {
        self.ignore_terms_order = true;
        self
    }

    /// Override the canonical text.
    #[must_use]
    pub fn with_canonic_text(mut self, text: impl Into<String>) -> Self {
        self.canonic_text = Some(text.into());
        self
    }

    /// Normalized words.
    #[must_use]
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Normalized acronym, if any.
    #[must_use]
    pub fn acronym(&self) -> Option<&str> {
        self.acronym.as_deref()
    }

    /// Tag, if any.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// True if the engine synthesized this variant.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// Gender hint.
    #[must_use]
    pub fn gender(&self) -> MorphGender {
        self.gender
    }

    /// True if word order is ignored when comparing.
    #[must_use]
    pub fn ignores_terms_order(&self) -> bool {
        self.ignore_terms_order
    }

    /// True if the termin has neither words nor an acronym.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.acronym.is_none()
    }

    /// Display form: the override, else the joined words, else the acronym, else `"?"`.
    #[must_use]
    pub fn canonic_text(&self) -> Cow<'_, str> {
        if let Some(text) = &self.canonic_text {
            return Cow::Borrowed(text);
        }
        match self.terms.len() {
            0 => Cow::Borrowed(self.acronym.as_deref().unwrap_or(UNKNOWN_TEXT)),
            1 => Cow::Borrowed(&self.terms[0]),
            _ => Cow::Owned(self.terms.join(" ")),
        }
    }

    /// Keys this termin is indexed under.
    ///
    /// The first word (every word when order is ignored) plus the acronym.
    #[must_use]
    pub fn hash_variants(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        let words = if self.ignore_terms_order {
            &self.terms[..]
        } else {
            &self.terms[..self.terms.len().min(1)]
        };
        for word in words {
            if !keys.contains(&word.as_str()) {
                keys.push(word);
            }
        }
        if let Some(acronym) = self.acronym.as_deref() {
            if !keys.contains(&acronym) {
                keys.push(acronym);
            }
        }
        keys
    }

    /// True if both termins denote the same spelling.
    ///
    /// Acronyms match each other; otherwise the word sequences must be equal
    /// (as multisets when either side ignores order).
    #[must_use]
    pub fn is_equal(&self, other: &Termin) -> bool {
        if let (Some(a), Some(b)) = (&self.acronym, &other.acronym) {
            if a == b {
                return true;
            }
        }
        if self.terms.is_empty() || self.terms.len() != other.terms.len() {
            return false;
        }
        if self.ignore_terms_order || other.ignore_terms_order {
            let mut a: Vec<&String> = self.terms.iter().collect();
            let mut b: Vec<&String> = other.terms.iter().collect();
            a.sort();
            b.sort();
            return a == b;
        }
        self.terms == other.terms
    }
}

impl std::fmt::Display for Termin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.terms.join(" "))?;
        if let Some(acronym) = &self.acronym {
            if !self.terms.is_empty() {
                f.write_str(", ")?;
            }
            f.write_str(acronym)?;
        }
        Ok(())
    }
}

/// Upper-case, drop apostrophes, split on whitespace, trim edge punctuation.
fn normalize_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| *c != '\'' && *c != '\u{2019}')
                .flat_map(char::to_uppercase)
                .collect::<String>()
        })
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-')
                .trim_matches('-')
                .to_string()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        let t = Termin::new("Saint-Petersburg, Russia.");
        assert_eq!(t.terms(), ["SAINT-PETERSBURG", "RUSSIA"]);
        assert!(Termin::new(" ,. ").is_empty());
    }

    #[test]
    fn test_canonic_text_fallbacks() {
        assert_eq!(Termin::new("").canonic_text(), UNKNOWN_TEXT);
        assert_eq!(Termin::new("").with_acronym("u.s.").canonic_text(), "US");
        assert_eq!(
            Termin::new("united states").with_canonic_text("USA").canonic_text(),
            "USA"
        );
    }

    #[test]
    fn test_hash_variants_respect_order_flag() {
        let ordered = Termin::new("Ivan Ivanov");
        assert_eq!(ordered.hash_variants(), vec!["IVAN"]);
        let unordered = Termin::new("Ivan Ivanov").ignoring_order();
        assert_eq!(unordered.hash_variants(), vec!["IVAN", "IVANOV"]);
        let acr = Termin::new("World Health Organization").with_acronym("WHO");
        assert_eq!(acr.hash_variants(), vec!["WORLD", "WHO"]);
    }

    #[test]
    fn test_is_equal() {
        assert!(Termin::new("New York").is_equal(&Termin::new("NEW  YORK")));
        assert!(!Termin::new("New York").is_equal(&Termin::new("York New")));
        assert!(Termin::new("Ivanov Ivan")
            .ignoring_order()
            .is_equal(&Termin::new("Ivan Ivanov")));
        assert!(Termin::new("")
            .with_acronym("WHO")
            .is_equal(&Termin::new("World Health Organization").with_acronym("WHO")));
        assert!(!Termin::new("").is_equal(&Termin::new("")));
    }

    #[test]
    fn test_internal_flag() {
        assert!(Termin::internal("MSK").is_internal());
        assert!(!Termin::new("MSK").is_internal());
    }
}
