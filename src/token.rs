//! Upstream spans as the registry sees them.
//!
//! Recognizers upstream of the registry (noun phrases, prepositional groups,
//! conjunctions, verb groups, brackets, table cells) all hand over the same
//! thing: a span that can say how its text reads in a requested grammatical
//! number and gender. [`MetaToken`] is that closed set of span shapes, and
//! [`SurfaceForm`] is the one thing the registry asks of them.
//!
//! Morphology itself is not computed here. A [`WordToken`] carries the
//! inflected forms an analyzer already produced; normalization only picks
//! among them.

use refmerge_core::{MorphGender, MorphNumber, ReferentId, SurfaceForm};

/// One inflected form of a word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordForm {
    /// Form text
    pub text: String,
    /// Numbers this form expresses
    pub number: MorphNumber,
    /// Genders this form expresses
    pub gender: MorphGender,
}

/// A single word with its analyzer output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WordToken {
    /// Text as written in the document
    pub source: String,
    /// Dictionary form
    pub lemma: Option<String>,
    /// Inflected forms, most likely first
    pub forms: Vec<WordForm>,
}

impl WordToken {
    /// A word with no analyzer output.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Builder: set the lemma.
    #[must_use]
    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    /// Builder: add an inflected form.
    #[must_use]
    pub fn with_form(
        mut self,
        text: impl Into<String>,
        number: MorphNumber,
        gender: MorphGender,
    ) -> Self {
        self.forms.push(WordForm {
            text: text.into(),
            number,
            gender,
        });
        self
    }

    /// Form agreeing with `number` and `gender`, else the lemma, else the source.
    #[must_use]
    pub fn pick(&self, number: MorphNumber, gender: MorphGender) -> &str {
        self.forms
            .iter()
            .find(|f| f.number.agrees_with(number) && f.gender.agrees_with(gender))
            .map(|f| f.text.as_str())
            .or(self.lemma.as_deref())
            .unwrap_or(&self.source)
    }
}

impl SurfaceForm for WordToken {
    fn normalized_text(&self, number: MorphNumber, gender: MorphGender, keep_case: bool) -> String {
        apply_case(self.pick(number, gender), &self.source, keep_case)
    }
}

/// A recognized span, by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaToken {
    /// A single word.
    Text(WordToken),
    /// Adjectives agreeing with a head noun.
    NounPhrase {
        /// Modifiers, in text order
        adjectives: Vec<WordToken>,
        /// Head noun
        noun: WordToken,
    },
    /// Preposition followed by its object.
    Preposition {
        /// The preposition (not inflected)
        preposition: WordToken,
        /// Object of the preposition
        inner: Box<MetaToken>,
    },
    /// Coordinated spans.
    Conjunction {
        /// Conjoined spans
        parts: Vec<MetaToken>,
        /// The conjunction word
        conjunction: WordToken,
    },
    /// Verb group: auxiliaries then the main verb.
    Verb(Vec<WordToken>),
    /// Span inside brackets or quotes.
    Bracket {
        /// Opening character
        open: char,
        /// Enclosed span
        inner: Box<MetaToken>,
        /// Closing character
        close: char,
    },
    /// Content of one table cell.
    TableCell {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
        /// Cell content
        tokens: Vec<MetaToken>,
    },
    /// A span already resolved to a referent.
    Referent {
        /// The referent
        referent: ReferentId,
        /// Text of the span
        text: String,
    },
}

impl MetaToken {
    /// A single-word token.
    #[must_use]
    pub fn word(source: impl Into<String>) -> Self {
        MetaToken::Text(WordToken::new(source))
    }

    /// Referent carried by this token, if it is a resolved span.
    #[must_use]
    pub fn referent(&self) -> Option<ReferentId> {
        match self {
            MetaToken::Referent { referent, .. } => Some(*referent),
            _ => None,
        }
    }
}

impl SurfaceForm for MetaToken {
    fn normalized_text(&self, number: MorphNumber, gender: MorphGender, keep_case: bool) -> String {
        match self {
            MetaToken::Text(word) => word.normalized_text(number, gender, keep_case),
            MetaToken::NounPhrase { adjectives, noun } => {
                let mut words: Vec<String> = adjectives
                    .iter()
                    .map(|a| a.normalized_text(number, gender, keep_case))
                    .collect();
                words.push(noun.normalized_text(number, gender, keep_case));
                words.join(" ")
            }
            MetaToken::Preposition { preposition, inner } => format!(
                "{} {}",
                apply_case(&preposition.source, &preposition.source, keep_case),
                inner.normalized_text(number, gender, keep_case)
            ),
            MetaToken::Conjunction { parts, conjunction } => {
                let separator = format!(
                    " {} ",
                    apply_case(&conjunction.source, &conjunction.source, keep_case)
                );
                parts
                    .iter()
                    .map(|p| p.normalized_text(number, gender, keep_case))
                    .collect::<Vec<_>>()
                    .join(&separator)
            }
            MetaToken::Verb(words) => {
                let last = words.len().saturating_sub(1);
                words
                    .iter()
                    .enumerate()
                    .map(|(i, w)| {
                        let text = if i == last {
                            w.lemma.as_deref().unwrap_or(&w.source)
                        } else {
                            &w.source
                        };
                        apply_case(text, &w.source, keep_case)
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            }
            MetaToken::Bracket { open, inner, close } => format!(
                "{}{}{}",
                open,
                inner.normalized_text(number, gender, keep_case),
                close
            ),
            MetaToken::TableCell { tokens, .. } => tokens
                .iter()
                .map(|t| t.normalized_text(number, gender, keep_case))
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            MetaToken::Referent { text, .. } => apply_case(text, text, keep_case),
        }
    }
}

/// Upper-case `text`, or with `keep_case` copy the casing pattern of `source`.
fn apply_case(text: &str, source: &str, keep_case: bool) -> String {
    if !keep_case {
        return text.to_uppercase();
    }
    let letters: Vec<char> = source.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return text.to_string();
    }
    if letters.iter().all(|c| c.is_lowercase()) {
        text.to_lowercase()
    } else if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
        text.to_uppercase()
    } else if letters[0].is_uppercase() {
        let mut chars = text.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    } else {
        text.to_string()
    }
}
