//! The ontology index: term-variant keys to the items that claim them.
//!
//! # Layout
//!
//! ```text
//! index: "MOSCOW" -> [(item0, 0), (item3, 1)]
//!        "MSK"    -> [(item0, 1)]
//! items: item0 -> OntologyItem { referent: #4, termins: [MOSCOW, MSK] }
//!        item3 -> OntologyItem { referent: #9, termins: [MOSCOW CITY, MOSCOW] }
//! by_referent: #4 -> item0, #9 -> item3
//! ```
//!
//! An index entry is `(item, position of the termin inside the item)`. A key
//! only nominates an item; the termin at that position must still be
//! [`Termin::is_equal`] to the query termin for the item to count as a hit.
//!
//! # Invariants
//!
//! - Every stored item has at least one index entry.
//! - Every index entry names a stored item and a termin that produces its key.
//! - `by_referent` and the items agree in both directions.
//!
//! [`OntologyCollection::validate`] checks all three.

use crate::item::{ItemId, OntologyItem};
use refmerge_core::{EqualsMode, ReferentArena, ReferentId, Script, Termin};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A broken index invariant, as reported by [`OntologyCollection::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexIssue {
    /// A stored item has no index entry.
    ItemNotIndexed(ItemId),
    /// An index entry names an item that is not stored.
    DanglingEntry {
        /// Index key
        key: String,
        /// Missing item
        item: ItemId,
    },
    /// An index entry names a termin that does not produce its key.
    EntryMismatch {
        /// Index key
        key: String,
        /// Item named by the entry
        item: ItemId,
        /// Termin position named by the entry
        position: usize,
    },
    /// `by_referent` disagrees with the item's referent.
    ReferentMapMismatch {
        /// Referent
        referent: ReferentId,
        /// Item
        item: ItemId,
    },
}

impl std::fmt::Display for IndexIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexIssue::ItemNotIndexed(item) => write!(f, "{} has no index entry", item),
            IndexIssue::DanglingEntry { key, item } => {
                write!(f, "key '{}' names missing {}", key, item)
            }
            IndexIssue::EntryMismatch {
                key,
                item,
                position,
            } => write!(
                f,
                "key '{}' names termin {} of {} which does not produce it",
                key, position, item
            ),
            IndexIssue::ReferentMapMismatch { referent, item } => {
                write!(f, "referent {} and {} disagree", referent, item)
            }
        }
    }
}

/// Index from normalized term variants to ontology items.
#[derive(Debug, Clone, Default)]
pub struct OntologyCollection {
    items: BTreeMap<ItemId, OntologyItem>,
    by_referent: HashMap<ReferentId, ItemId>,
    index: HashMap<String, Vec<(ItemId, usize)>>,
    next_id: u64,
    script: Script,
    ignore_tagged: bool,
}

impl OntologyCollection {
    /// Create an empty collection for a document in `script`.
    #[must_use]
    pub fn new(script: Script) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    /// Builder: skip tagged variants when computing canonical text.
    #[must_use]
    pub fn with_canonical_ignores_tagged(mut self, ignore_tagged: bool) -> Self {
        self.ignore_tagged = ignore_tagged;
        self
    }

    /// Primary script.
    #[must_use]
    pub fn script(&self) -> Script {
        self.script
    }

    /// Change the primary script; cached canonical texts are dropped.
    pub fn set_script(&mut self, script: Script) {
        self.script = script;
        for item in self.items.values_mut() {
            item.set_script(script);
        }
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Find the items that could denote the same entity as `referent`.
    ///
    /// `termins` are the query variants; when `None` they are derived from the
    /// referent. Returns `None` when no variant key is indexed at all.
    /// Otherwise returns the items holding an equal variant whose referent is
    /// compatible with the query, earliest-created first. With
    /// `must_be_single`, hits that are not pairwise compatible yield an empty
    /// list.
    #[must_use]
    pub fn try_attach_by_referent(
        &self,
        referents: &ReferentArena,
        referent: ReferentId,
        termins: Option<&[Termin]>,
        must_be_single: bool,
    ) -> Option<Vec<ItemId>> {
        let Some(query) = referents.get(referent) else {
            log::warn!("lookup of retired referent {}", referent);
            return None;
        };
        let derived;
        let termins = match termins {
            Some(termins) => termins,
            None => {
                derived = query.create_termins();
                &derived[..]
            }
        };

        let mut considered = false;
        let mut hits: BTreeSet<ItemId> = BTreeSet::new();
        for termin in termins {
            for key in termin.hash_variants() {
                let Some(entries) = self.index.get(key) else {
                    continue;
                };
                considered = true;
                for &(item_id, position) in entries {
                    let equal = self
                        .items
                        .get(&item_id)
                        .and_then(|item| item.termins().get(position))
                        .is_some_and(|t| t.is_equal(termin));
                    if equal {
                        hits.insert(item_id);
                    }
                }
            }
        }
        if !considered {
            return None;
        }

        let mut matched: Vec<(ItemId, ReferentId)> = Vec::new();
        for item_id in hits {
            let Some(item) = self.items.get(&item_id) else {
                continue;
            };
            let Some(other) = referents.get(item.referent()) else {
                log::warn!("{} owned by retired referent {}", item_id, item.referent());
                continue;
            };
            if item.referent() == referent || query.can_be_equals(other, EqualsMode::Compatible) {
                matched.push((item_id, item.referent()));
            }
        }

        if must_be_single && matched.len() > 1 {
            for (i, (_, a)) in matched.iter().enumerate() {
                for (_, b) in &matched[i + 1..] {
                    let compatible = match (referents.get(*a), referents.get(*b)) {
                        (Some(x), Some(y)) => x.can_be_equals(y, EqualsMode::Compatible),
                        _ => false,
                    };
                    if !compatible {
                        log::debug!(
                            "ambiguous lookup for {}: {} and {} conflict",
                            referent,
                            a,
                            b
                        );
                        return Some(Vec::new());
                    }
                }
            }
        }
        Some(matched.into_iter().map(|(id, _)| id).collect())
    }

    /// Items holding a variant equal to `text`, earliest first.
    #[must_use]
    pub fn find_items_by_string(&self, text: &str) -> Vec<ItemId> {
        let query = Termin::new(text);
        let mut hits: BTreeSet<ItemId> = BTreeSet::new();
        for key in query.hash_variants() {
            for &(item_id, position) in self.index.get(key).into_iter().flatten() {
                let equal = self
                    .items
                    .get(&item_id)
                    .and_then(|item| item.termins().get(position))
                    .is_some_and(|t| t.is_equal(&query));
                if equal {
                    hits.insert(item_id);
                }
            }
        }
        hits.into_iter().collect()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Create or refresh the item of `referent`.
    ///
    /// An existing item keeps its id; if the derived variants changed it is
    /// unindexed, updated and reindexed. A referent without any variant gets
    /// no item. Calling this twice in a row changes nothing.
    pub fn add_referent(&mut self, referents: &ReferentArena, referent: ReferentId) -> Option<ItemId> {
        let Some(r) = referents.get(referent) else {
            log::warn!("cannot index retired referent {}", referent);
            return None;
        };
        let termins = r.create_termins();

        if let Some(&item_id) = self.by_referent.get(&referent) {
            let unchanged = self
                .items
                .get(&item_id)
                .is_some_and(|item| item.termins() == &termins[..]);
            if unchanged {
                return Some(item_id);
            }
            if termins.is_empty() {
                self.remove_item(item_id);
                return None;
            }
            if let Some(item) = self.items.get_mut(&item_id) {
                unindex_item(&mut self.index, item);
                item.replace_termins(termins);
                index_item(&mut self.index, item);
                log::trace!("reindexed {} ({} variants)", item_id, item.termins().len());
            }
            return Some(item_id);
        }

        if termins.is_empty() {
            log::debug!("{} has no name variants; not indexed", referent);
            return None;
        }
        let item_id = ItemId::new(self.next_id);
        self.next_id += 1;
        let item = OntologyItem::new(item_id, referent, termins, self.script, self.ignore_tagged);
        index_item(&mut self.index, &item);
        log::trace!("indexed {} as {}", referent, item_id);
        self.items.insert(item_id, item);
        self.by_referent.insert(referent, item_id);
        Some(item_id)
    }

    /// Remove the item of `referent`. Returns false if there was none.
    pub fn remove(&mut self, referent: ReferentId) -> bool {
        match self.by_referent.get(&referent) {
            Some(&item_id) => self.remove_item(item_id),
            None => false,
        }
    }

    /// Remove an item and all its index entries. Returns false if it was not stored.
    pub fn remove_item(&mut self, item_id: ItemId) -> bool {
        let Some(item) = self.items.remove(&item_id) else {
            return false;
        };
        unindex_item(&mut self.index, &item);
        if self.by_referent.get(&item.referent()) == Some(&item_id) {
            self.by_referent.remove(&item.referent());
        }
        log::trace!("removed {}", item_id);
        true
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Item by id.
    #[must_use]
    pub fn get(&self, item_id: ItemId) -> Option<&OntologyItem> {
        self.items.get(&item_id)
    }

    /// Item of a referent.
    #[must_use]
    pub fn item_for(&self, referent: ReferentId) -> Option<&OntologyItem> {
        self.by_referent
            .get(&referent)
            .and_then(|id| self.items.get(id))
    }

    /// Mutable item of a referent.
    pub fn item_for_mut(&mut self, referent: ReferentId) -> Option<&mut OntologyItem> {
        match self.by_referent.get(&referent) {
            Some(id) => self.items.get_mut(id),
            None => None,
        }
    }

    /// Canonical text of a referent's item.
    #[must_use]
    pub fn canonic_text_of(&self, referent: ReferentId) -> Option<&str> {
        self.item_for(referent).map(OntologyItem::canonic_text)
    }

    /// Items in creation order.
    pub fn items(&self) -> impl Iterator<Item = &OntologyItem> {
        self.items.values()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if no item is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check every index invariant.
    #[must_use]
    pub fn validate(&self) -> Vec<IndexIssue> {
        let mut issues = Vec::new();
        let mut indexed: BTreeSet<ItemId> = BTreeSet::new();

        for (key, entries) in &self.index {
            for &(item_id, position) in entries {
                match self.items.get(&item_id) {
                    None => issues.push(IndexIssue::DanglingEntry {
                        key: key.clone(),
                        item: item_id,
                    }),
                    Some(item) => {
                        let produces = item
                            .termins()
                            .get(position)
                            .is_some_and(|t| t.hash_variants().contains(&key.as_str()));
                        if produces {
                            indexed.insert(item_id);
                        } else {
                            issues.push(IndexIssue::EntryMismatch {
                                key: key.clone(),
                                item: item_id,
                                position,
                            });
                        }
                    }
                }
            }
        }

        for (item_id, item) in &self.items {
            if !indexed.contains(item_id) {
                issues.push(IndexIssue::ItemNotIndexed(*item_id));
            }
            if self.by_referent.get(&item.referent()) != Some(item_id) {
                issues.push(IndexIssue::ReferentMapMismatch {
                    referent: item.referent(),
                    item: *item_id,
                });
            }
        }
        for (referent, item_id) in &self.by_referent {
            if self.items.get(item_id).map(OntologyItem::referent) != Some(*referent) {
                issues.push(IndexIssue::ReferentMapMismatch {
                    referent: *referent,
                    item: *item_id,
                });
            }
        }
        issues
    }

    /// True if [`validate`](Self::validate) finds nothing.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.validate().is_empty()
    }
}

fn index_item(index: &mut HashMap<String, Vec<(ItemId, usize)>>, item: &OntologyItem) {
    for (position, termin) in item.termins().iter().enumerate() {
        for key in termin.hash_variants() {
            let entries = index.entry(key.to_string()).or_default();
            if !entries.contains(&(item.id(), position)) {
                entries.push((item.id(), position));
            }
        }
    }
}

fn unindex_item(index: &mut HashMap<String, Vec<(ItemId, usize)>>, item: &OntologyItem) {
    for termin in item.termins() {
        for key in termin.hash_variants() {
            if let Some(entries) = index.get_mut(key) {
                entries.retain(|(id, _)| *id != item.id());
                if entries.is_empty() {
                    index.remove(key);
                }
            }
        }
    }
}
