//! Referent registration: deduplicate, merge, repoint.
//!
//! # Algorithm
//!
//! ```text
//! candidate ──► ontology lookup ──► drop generalizations ──┬─► none left ──► base registry ──► index
//!                                                          │
//!                                                          └─► survivors: merge candidate into the
//!                                                              first, fold the rest, repoint spans,
//!                                                              resolve cross-references, reindex
//! ```
//!
//! Folding a referent repoints the slots of every referent that mentioned
//! it. Those referents may now duplicate each other (two streets that named
//! two spellings of one city), so they are looked up again, and so on until
//! a pass merges nothing. Every call runs to completion before returning, so
//! no caller ever sees a half-merged identity.

use std::collections::{BTreeMap, VecDeque};

use crate::collection::OntologyCollection;
use crate::config::RegistryConfig;
use refmerge_core::{BaseRegistry, DocumentContext, ReferentId, Script};

/// Repoint bookkeeping for one registration call.
#[derive(Debug, Default)]
struct Cascade {
    recheck: VecDeque<ReferentId>,
    redirects: BTreeMap<ReferentId, ReferentId>,
}

impl Cascade {
    fn queue(&mut self, referent: ReferentId) {
        if !self.recheck.contains(&referent) {
            self.recheck.push_back(referent);
        }
    }

    /// The referent that finally absorbed `referent`.
    fn resolve(&self, mut referent: ReferentId) -> ReferentId {
        for _ in 0..=self.redirects.len() {
            match self.redirects.get(&referent) {
                Some(&next) => referent = next,
                None => break,
            }
        }
        referent
    }
}

/// Merges newly found referents into the document's known identities.
#[derive(Debug, Clone)]
pub struct ReferentRegistry<B> {
    ontology: OntologyCollection,
    base: B,
    config: RegistryConfig,
}

impl<B: BaseRegistry> ReferentRegistry<B> {
    /// Create a registry with default settings.
    #[must_use]
    pub fn new(base: B) -> Self {
        Self::with_config(base, RegistryConfig::default())
    }

    /// Create a registry with explicit settings.
    #[must_use]
    pub fn with_config(base: B, config: RegistryConfig) -> Self {
        let ontology = OntologyCollection::new(config.script.unwrap_or_default())
            .with_canonical_ignores_tagged(config.canonical_ignores_tagged);
        Self {
            ontology,
            base,
            config,
        }
    }

    /// Settings.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The ontology index.
    #[must_use]
    pub fn ontology(&self) -> &OntologyCollection {
        &self.ontology
    }

    /// The base registry.
    #[must_use]
    pub fn base(&self) -> &B {
        &self.base
    }

    /// The base registry, mutably.
    pub fn base_mut(&mut self) -> &mut B {
        &mut self.base
    }

    /// Canonical text of a registered referent.
    #[must_use]
    pub fn canonic_text(&self, referent: ReferentId) -> Option<&str> {
        self.ontology.canonic_text_of(referent)
    }

    /// Register a candidate and return the canonical referent to use for it.
    ///
    /// `None` means the base registry rejected a new identity; nothing is
    /// indexed then. When the candidate merges into an existing identity it
    /// is retired from the arena and every reference to it is repointed.
    /// Registered referents whose slots were repointed along the way are
    /// merged too if they turned into duplicates.
    pub fn register_referent(
        &mut self,
        ctx: &mut dyn DocumentContext,
        candidate: ReferentId,
    ) -> Option<ReferentId> {
        let mut cascade = Cascade::default();
        let canonical = self.register_once(ctx, candidate, &mut cascade)?;
        while let Some(next) = cascade.recheck.pop_front() {
            if !ctx.referents().contains(next) || self.ontology.item_for(next).is_none() {
                continue;
            }
            log::debug!("rechecking {} after repoint", next);
            self.register_once(ctx, next, &mut cascade);
        }
        Some(cascade.resolve(canonical))
    }

    fn register_once(
        &mut self,
        ctx: &mut dyn DocumentContext,
        candidate: ReferentId,
        cascade: &mut Cascade,
    ) -> Option<ReferentId> {
        let Some(query) = ctx.referents().get(candidate) else {
            log::warn!("register of retired referent {}", candidate);
            return None;
        };
        let script = self.config.script.unwrap_or_else(|| ctx.script());
        if self.ontology.script() != script {
            self.ontology.set_script(script);
        }

        let hits = self
            .ontology
            .try_attach_by_referent(ctx.referents(), candidate, None, self.config.must_be_single)
            .unwrap_or_default();
        let survivors: Vec<ReferentId> = hits
            .iter()
            .filter_map(|id| self.ontology.get(*id))
            .map(|item| item.referent())
            .filter(|r| {
                ctx.referents().get(*r).is_some_and(|other| {
                    !query.can_be_general_for(other) && !other.can_be_general_for(query)
                })
            })
            .collect();

        let Some((&first, extras)) = survivors.split_first() else {
            return self.register_new(ctx, candidate, cascade);
        };
        let mut survivor = first;

        if survivor != candidate {
            self.absorb(ctx, survivor, candidate, self.config.overwrite_on_merge, cascade);
            self.retire(ctx, candidate);
            log::debug!("merged {} into {}", candidate, survivor);
        }

        for &extra in extras {
            if extra == candidate || extra == survivor {
                continue;
            }
            self.absorb(ctx, survivor, extra, false, cascade);
            self.retire(ctx, extra);
            log::debug!("folded {} into {}", extra, survivor);
        }

        let has_ext = ctx
            .referents()
            .get(survivor)
            .is_some_and(|r| !r.ext_referents().is_empty());
        if has_ext {
            let canonical = match self.base.register_referent(ctx, survivor) {
                Some(canonical) => canonical,
                None => {
                    log::warn!("base registry rejected merged {}; keeping it", survivor);
                    survivor
                }
            };
            if canonical != survivor {
                repoint(ctx, survivor, canonical, cascade);
                self.retire(ctx, survivor);
                log::debug!("{} resolved to {}", survivor, canonical);
                survivor = canonical;
            }
        }

        self.ontology.add_referent(ctx.referents(), survivor);
        Some(survivor)
    }

    /// Forget a referent: ontology first, then the base registry.
    pub fn remove_referent(&mut self, ctx: &mut dyn DocumentContext, referent: ReferentId) {
        self.ontology.remove(referent);
        self.base.remove_referent(ctx, referent);
    }

    /// Pin the primary script, overriding detection.
    pub fn set_script(&mut self, script: Script) {
        self.config.script = Some(script);
        self.ontology.set_script(script);
    }

    fn register_new(
        &mut self,
        ctx: &mut dyn DocumentContext,
        candidate: ReferentId,
        cascade: &mut Cascade,
    ) -> Option<ReferentId> {
        let Some(accepted) = self.base.register_referent(ctx, candidate) else {
            log::debug!("base registry rejected {}", candidate);
            return None;
        };
        if accepted != candidate {
            repoint(ctx, candidate, accepted, cascade);
            self.retire(ctx, candidate);
            log::debug!("{} deduplicated to {}", candidate, accepted);
        }
        self.ontology.add_referent(ctx.referents(), accepted);
        Some(accepted)
    }

    /// Merge `from` into `into` and repoint everything that referenced `from`.
    fn absorb(
        &mut self,
        ctx: &mut dyn DocumentContext,
        into: ReferentId,
        from: ReferentId,
        overwrite: bool,
        cascade: &mut Cascade,
    ) {
        let arena = ctx.referents_mut();
        let Some(source) = arena.get(from).cloned() else {
            log::warn!("cannot merge retired referent {}", from);
            return;
        };
        if let Some(target) = arena.get_mut(into) {
            target.merge_slots(&source, overwrite);
            target.merge_occurrences(&source);
        }
        repoint(ctx, from, into, cascade);
    }

    /// Drop a merged-away referent from the index, the base registry and the arena.
    fn retire(&mut self, ctx: &mut dyn DocumentContext, referent: ReferentId) {
        self.ontology.remove(referent);
        if self.base.contains(referent) {
            self.base.remove_referent(ctx, referent);
        }
        ctx.referents_mut().remove(referent);
    }
}

/// Repoint `from` to `into` and queue every referent whose slots changed.
fn repoint(ctx: &mut dyn DocumentContext, from: ReferentId, into: ReferentId, cascade: &mut Cascade) {
    for referrer in ctx.referents().referrers_of(from) {
        if referrer != from {
            cascade.queue(referrer);
        }
    }
    ctx.replace_referent(from, into);
    cascade.redirects.insert(from, into);
}
