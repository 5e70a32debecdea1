//! Per-document ownership of referents.
//!
//! Every referent of one document lives in a [`ReferentArena`]; everything else
//! (slot values, span attachments, ontology items) holds [`ReferentId`]s. A
//! retired referent leaves a hole, so handles are never reused within a
//! document and a stale handle simply stops resolving.

use crate::{Error, Referent, ReferentId, Result};

/// Owner of all referents of one document.
#[derive(Debug, Clone, Default)]
pub struct ReferentArena {
    slots: Vec<Option<Referent>>,
    live: usize,
}

impl ReferentArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a referent and hand out its handle.
    pub fn alloc(&mut self, referent: Referent) -> ReferentId {
        let id = ReferentId::new(self.slots.len() as u32);
        self.slots.push(Some(referent));
        self.live += 1;
        id
    }

    /// Look up a live referent.
    #[must_use]
    pub fn get(&self, id: ReferentId) -> Option<&Referent> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Look up a live referent for mutation.
    pub fn get_mut(&mut self, id: ReferentId) -> Option<&mut Referent> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Like [`get`](Self::get), but a dead handle is an error.
    pub fn try_get(&self, id: ReferentId) -> Result<&Referent> {
        self.get(id).ok_or(Error::UnknownReferent(id))
    }

    /// Retire a referent. Returns it if it was live.
    pub fn remove(&mut self, id: ReferentId) -> Option<Referent> {
        let taken = self.slots.get_mut(id.index()).and_then(Option::take);
        if taken.is_some() {
            self.live -= 1;
        }
        taken
    }

    /// True if the handle still resolves.
    #[must_use]
    pub fn contains(&self, id: ReferentId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live referents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// True if no referent is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live referents in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (ReferentId, &Referent)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().map(|r| (ReferentId::new(i as u32), r)))
    }

    /// Live referents with a slot value pointing at `target`, in id order.
    #[must_use]
    pub fn referrers_of(&self, target: ReferentId) -> Vec<ReferentId> {
        self.iter()
            .filter(|(_, r)| {
                r.slots()
                    .iter()
                    .any(|s| s.value.as_referent() == Some(target))
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Repoint every slot value referencing `old` to `new`.
    ///
    /// Returns the number of referents that changed.
    pub fn replace_slot_references(&mut self, old: ReferentId, new: ReferentId) -> usize {
        self.slots
            .iter_mut()
            .flatten()
            .map(|r| r.replace_slot_referent(old, new))
            .filter(|changed| *changed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{attrs, ReferentKind, SlotValue};

    #[test]
    fn test_alloc_and_remove() {
        let mut arena = ReferentArena::new();
        let a = arena.alloc(Referent::new(ReferentKind::Geo));
        let b = arena.alloc(Referent::new(ReferentKind::Street));
        assert_eq!(arena.len(), 2);
        assert_ne!(a, b);

        assert!(arena.remove(a).is_some());
        assert!(arena.remove(a).is_none());
        assert!(!arena.contains(a));
        assert!(arena.try_get(a).is_err());
        assert_eq!(arena.len(), 1);

        // Handles are not reused
        let c = arena.alloc(Referent::new(ReferentKind::Geo));
        assert_ne!(a, c);
        let ids: Vec<ReferentId> = arena.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![b, c]);
    }

    #[test]
    fn test_replace_slot_references() {
        let mut arena = ReferentArena::new();
        let old = arena.alloc(Referent::new(ReferentKind::Geo).with_slot(attrs::NAME, "Msk"));
        let new = arena.alloc(Referent::new(ReferentKind::Geo).with_slot(attrs::NAME, "Moscow"));
        let street = arena.alloc(
            Referent::new(ReferentKind::Street)
                .with_slot(attrs::NAME, "Arbat")
                .with_slot(attrs::GEO, old),
        );
        assert_eq!(arena.referrers_of(old), vec![street]);
        assert!(arena.referrers_of(street).is_empty());
        assert_eq!(arena.replace_slot_references(old, new), 1);
        assert!(arena.referrers_of(old).is_empty());
        assert_eq!(arena.referrers_of(new), vec![street]);
        assert_eq!(
            arena.get(street).and_then(|r| r.slot_value(attrs::GEO)),
            Some(&SlotValue::Referent(new))
        );
    }
}
