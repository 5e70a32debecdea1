//! The analysis kit: one document's text, referents and span attachments.
//!
//! The kit is the document-wide mention index. Every span a recognizer tied
//! to a referent is recorded here, so that when two referents turn out to be
//! one entity a single [`MentionIndex::replace_referent`] call moves all of
//! those spans (and every slot pointing at the old referent) to the survivor.

use std::collections::HashSet;

use refmerge_core::{
    detect_script, DocumentContext, MentionIndex, ReferentArena, ReferentId, Script,
    TextAnnotation, TextsCompareType,
};
use serde::{Deserialize, Serialize};

/// A span of the document tied to a referent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attachment {
    /// Character span
    pub span: TextAnnotation,
    /// Referent mentioned by the span
    pub referent: ReferentId,
}

/// Per-document state shared by the registry and the recognizers.
#[derive(Debug, Clone, Default)]
pub struct AnalysisKit {
    text: String,
    script: Script,
    arena: ReferentArena,
    attachments: Vec<Attachment>,
}

impl AnalysisKit {
    /// Create a kit for `text`; the primary script is detected from it.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let script = detect_script(&text);
        Self {
            text,
            script,
            ..Self::default()
        }
    }

    /// Builder: pin the primary script.
    #[must_use]
    pub fn with_script(mut self, script: Script) -> Self {
        self.script = script;
        self
    }

    /// Document text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text covered by `[begin_char, end_char)`, in characters.
    #[must_use]
    pub fn slice(&self, begin_char: usize, end_char: usize) -> String {
        self.text
            .chars()
            .skip(begin_char)
            .take(end_char.saturating_sub(begin_char))
            .collect()
    }

    /// The referent arena.
    #[must_use]
    pub fn arena(&self) -> &ReferentArena {
        &self.arena
    }

    /// The referent arena, mutably.
    pub fn arena_mut(&mut self) -> &mut ReferentArena {
        &mut self.arena
    }

    // -------------------------------------------------------------------------
    // Attachments
    // -------------------------------------------------------------------------

    /// Tie a span to a referent. Attaching the same pair twice is a no-op.
    pub fn attach(&mut self, span: TextAnnotation, referent: ReferentId) {
        let attachment = Attachment { span, referent };
        if !self.attachments.contains(&attachment) {
            self.attachments.push(attachment);
        }
    }

    /// All attachments, in attach order.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Spans tied to a referent.
    #[must_use]
    pub fn spans_of(&self, referent: ReferentId) -> Vec<TextAnnotation> {
        self.attachments
            .iter()
            .filter(|a| a.referent == referent)
            .map(|a| a.span)
            .collect()
    }

    /// Referent tied to exactly `[begin_char, end_char)`.
    #[must_use]
    pub fn referent_of(&self, begin_char: usize, end_char: usize) -> Option<ReferentId> {
        self.attachments
            .iter()
            .find(|a| a.span.compare(begin_char, end_char) == TextsCompareType::Equivalent)
            .map(|a| a.referent)
    }

    /// Drop every attachment of a referent. Returns how many were dropped.
    pub fn detach_all(&mut self, referent: ReferentId) -> usize {
        let before = self.attachments.len();
        self.attachments.retain(|a| a.referent != referent);
        before - self.attachments.len()
    }
}

impl MentionIndex for AnalysisKit {
    fn replace_referent(&mut self, old: ReferentId, new: ReferentId) {
        if old == new {
            return;
        }
        let mut moved = 0usize;
        for attachment in &mut self.attachments {
            if attachment.referent == old {
                attachment.referent = new;
                moved += 1;
            }
        }
        if moved > 0 {
            let mut seen: HashSet<Attachment> = HashSet::with_capacity(self.attachments.len());
            self.attachments.retain(|a| seen.insert(*a));
        }
        let slots = self.arena.replace_slot_references(old, new);
        if moved > 0 || slots > 0 {
            log::trace!(
                "repointed {} -> {}: {} spans, {} referents",
                old,
                new,
                moved,
                slots
            );
        }
    }
}

impl DocumentContext for AnalysisKit {
    fn referents(&self) -> &ReferentArena {
        &self.arena
    }

    fn referents_mut(&mut self) -> &mut ReferentArena {
        &mut self.arena
    }

    fn script(&self) -> Script {
        self.script
    }
}
