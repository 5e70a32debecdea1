//! Writing-system detection.
//!
//! Canonical names are picked among term variants that start with a letter of
//! the document's primary script, so the script has to be known before any
//! ontology item is asked for its display text.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Writing systems that can be a document's primary script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    /// Latin alphabet
    #[default]
    Latin,
    /// Cyrillic alphabet
    Cyrillic,
    /// Greek alphabet
    Greek,
    /// Arabic script
    Arabic,
    /// Hebrew script
    Hebrew,
    /// Han ideographs, kana and hangul
    Cjk,
}

impl Script {
    /// Every script, in detection priority order.
    pub const ALL: [Script; 6] = [
        Script::Latin,
        Script::Cyrillic,
        Script::Greek,
        Script::Arabic,
        Script::Hebrew,
        Script::Cjk,
    ];

    /// Script of a single letter; `None` for non-letters and unsupported scripts.
    #[must_use]
    pub fn of(c: char) -> Option<Script> {
        if !c.is_alphabetic() {
            return None;
        }
        match c {
            'a'..='z' | 'A'..='Z' | '\u{00c0}'..='\u{024f}' | '\u{1e00}'..='\u{1eff}' => {
                Some(Script::Latin)
            }
            '\u{0400}'..='\u{052f}' => Some(Script::Cyrillic),
            '\u{0370}'..='\u{03ff}' | '\u{1f00}'..='\u{1fff}' => Some(Script::Greek),
            '\u{0600}'..='\u{06ff}' | '\u{0750}'..='\u{077f}' => Some(Script::Arabic),
            '\u{0590}'..='\u{05ff}' => Some(Script::Hebrew),
            '\u{3040}'..='\u{30ff}' | '\u{4e00}'..='\u{9fff}' | '\u{ac00}'..='\u{d7af}' => {
                Some(Script::Cjk)
            }
            _ => None,
        }
    }

    /// True if `c` is a letter of this script.
    #[must_use]
    pub fn contains(self, c: char) -> bool {
        Script::of(c) == Some(self)
    }

    /// True if the first character of `text` is a letter of this script.
    #[must_use]
    pub fn starts(self, text: &str) -> bool {
        text.chars().next().is_some_and(|c| self.contains(c))
    }

    /// Lowercase name, as used in config files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Script::Latin => "latin",
            Script::Cyrillic => "cyrillic",
            Script::Greek => "greek",
            Script::Arabic => "arabic",
            Script::Hebrew => "hebrew",
            Script::Cjk => "cjk",
        }
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Script {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Script::ALL
            .into_iter()
            .find(|script| script.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::parse(format!("unknown script '{}'", s)))
    }
}

/// Most frequent script among the letters of `text`.
///
/// Ties go to the script listed first in [`Script::ALL`]; text without any
/// supported letter is treated as Latin.
///
/// ```
/// use refmerge_core::{detect_script, Script};
///
/// assert_eq!(detect_script("Moscow is big"), Script::Latin);
/// assert_eq!(detect_script("улица Ленина, 5"), Script::Cyrillic);
/// assert_eq!(detect_script("12 + 3"), Script::Latin);
/// ```
#[must_use]
pub fn detect_script(text: &str) -> Script {
    let mut counts = [0usize; Script::ALL.len()];
    for c in text.chars() {
        if let Some(script) = Script::of(c) {
            if let Some(i) = Script::ALL.iter().position(|s| *s == script) {
                counts[i] += 1;
            }
        }
    }

    let mut best = 0;
    for (i, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = i;
        }
    }
    Script::ALL[best]
}
