//! Seams between the merge engine and the rest of the pipeline.
//!
//! The engine never tokenizes, never validates and never owns the document.
//! It reaches those collaborators through the traits below:
//!
//! - [`MentionIndex`]: every span attachment of the document; repointable.
//! - [`DocumentContext`]: the mention index plus the arena and the script.
//! - [`BaseRegistry`]: final acceptance authority for new identities.
//! - [`SurfaceForm`]: normalized text of an upstream span.

use crate::{MorphGender, MorphNumber, ReferentArena, ReferentId, Script};

/// Document-wide map from referents to the spans that mention them.
pub trait MentionIndex {
    /// Make everything that referenced `old` reference `new` instead.
    ///
    /// A no-op when nothing references `old`.
    fn replace_referent(&mut self, old: ReferentId, new: ReferentId);
}

/// Everything the engine needs from the document being analyzed.
pub trait DocumentContext: MentionIndex {
    /// The document's referents.
    fn referents(&self) -> &ReferentArena;

    /// The document's referents, mutably.
    fn referents_mut(&mut self) -> &mut ReferentArena;

    /// Primary script of the document text.
    fn script(&self) -> Script;
}

/// Validates and stores referents that represent new identities.
pub trait BaseRegistry {
    /// Accept `referent` and return the canonical object to use for it.
    ///
    /// The result may be a different, already stored referent. `None` means
    /// the referent was rejected.
    fn register_referent(
        &mut self,
        ctx: &mut dyn DocumentContext,
        referent: ReferentId,
    ) -> Option<ReferentId>;

    /// Forget a referent. Unknown referents are ignored.
    fn remove_referent(&mut self, ctx: &mut dyn DocumentContext, referent: ReferentId);

    /// True if `referent` is stored.
    fn contains(&self, referent: ReferentId) -> bool;
}

/// A span that can render itself as normalized text.
pub trait SurfaceForm {
    /// Text of the span in the requested number and gender.
    ///
    /// Upper-cased unless `keep_case` asks for the source casing.
    fn normalized_text(&self, number: MorphNumber, gender: MorphGender, keep_case: bool) -> String;
}
