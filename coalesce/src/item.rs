//! Ontology items: one entity identity and every spelling it is known under.

use once_cell::unsync::OnceCell;
use refmerge_core::termin::UNKNOWN_TEXT;
use refmerge_core::{ReferentId, Script, Termin};
use serde::{Deserialize, Serialize};

/// Creation-ordered identifier of an item inside one [`crate::OntologyCollection`].
///
/// Ids are handed out monotonically and survive re-indexing, so comparing two
/// ids tells which item was created first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// Raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item{}", self.0)
    }
}

/// The identity record of one entity.
#[derive(Debug, Clone)]
pub struct OntologyItem {
    id: ItemId,
    referent: ReferentId,
    termins: Vec<Termin>,
    script: Script,
    ignore_tagged: bool,
    canonic_text: OnceCell<String>,
}

impl OntologyItem {
    pub(crate) fn new(
        id: ItemId,
        referent: ReferentId,
        termins: Vec<Termin>,
        script: Script,
        ignore_tagged: bool,
    ) -> Self {
        Self {
            id,
            referent,
            termins,
            script,
            ignore_tagged,
            canonic_text: OnceCell::new(),
        }
    }

    /// Item id.
    #[must_use]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Referent currently owning this identity.
    #[must_use]
    pub fn referent(&self) -> ReferentId {
        self.referent
    }

    /// Term variants, in insertion order.
    #[must_use]
    pub fn termins(&self) -> &[Termin] {
        &self.termins
    }

    /// Primary script used for canonical text.
    #[must_use]
    pub fn script(&self) -> Script {
        self.script
    }

    /// Display name of the entity, computed on first use.
    ///
    /// The shortest observed variant starting with a letter of the primary
    /// script; ties keep the earlier variant. `"?"` when nothing qualifies.
    pub fn canonic_text(&self) -> &str {
        self.canonic_text
            .get_or_init(|| shortest_canonical_text(&self.termins, self.script, self.ignore_tagged))
    }

    /// Forget the cached canonical text.
    pub fn reset_canonic_text(&mut self) {
        self.canonic_text = OnceCell::new();
    }

    /// Force the canonical text.
    pub fn set_canonic_text(&mut self, text: impl Into<String>) {
        self.canonic_text = OnceCell::with_value(text.into());
    }

    /// Recompute the canonical text now, optionally skipping tagged variants.
    pub fn set_shortest_canonical_text(&mut self, ignore_tagged: bool) -> &str {
        self.ignore_tagged = ignore_tagged;
        self.reset_canonic_text();
        self.canonic_text()
    }

    pub(crate) fn replace_termins(&mut self, termins: Vec<Termin>) {
        self.termins = termins;
        self.reset_canonic_text();
    }

    pub(crate) fn set_script(&mut self, script: Script) {
        if self.script != script {
            self.script = script;
            self.reset_canonic_text();
        }
    }
}

fn shortest_canonical_text(termins: &[Termin], script: Script, ignore_tagged: bool) -> String {
    let mut best: Option<(usize, String)> = None;
    for termin in termins {
        if termin.is_internal() || (ignore_tagged && termin.tag().is_some()) {
            continue;
        }
        let text = termin.canonic_text();
        if !script.starts(&text) {
            continue;
        }
        let len = text.chars().count();
        if best.as_ref().map_or(true, |(best_len, _)| len < *best_len) {
            best = Some((len, text.into_owned()));
        }
    }
    best.map_or_else(|| UNKNOWN_TEXT.to_string(), |(_, text)| text)
}
