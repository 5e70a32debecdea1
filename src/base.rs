//! The base entity registry: final acceptance of new identities.
//!
//! [`EntityRegistry`] is the [`BaseRegistry`] a [`crate::DocumentSession`]
//! uses by default. It validates referents, registers their nested
//! cross-references first, and catches the duplicates that slipped past the
//! ontology lookup by scanning the most recently stored referents.

use std::collections::BTreeMap;

use refmerge_core::{
    attrs, BaseRegistry, DocumentContext, EqualsMode, Referent, ReferentId, ReferentKind,
};

use crate::config::Config;
use crate::Result;

/// How many of the most recently stored referents a new one is compared with.
pub const DEDUP_WINDOW: usize = 1000;

/// Why a referent was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// The referent has no slots at all.
    NoSlots,
    /// None of the kind's name attributes has a value.
    MissingName {
        /// Kind of the rejected referent
        kind: ReferentKind,
    },
    /// A configured required attribute is missing.
    MissingRequired {
        /// Kind of the rejected referent
        kind: ReferentKind,
        /// Missing attribute
        attr: String,
    },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::NoSlots => f.write_str("no slots"),
            ValidationIssue::MissingName { kind } => {
                write!(f, "{} without {}", kind, kind.name_attributes().join("/"))
            }
            ValidationIssue::MissingRequired { kind, attr } => {
                write!(f, "{} without required {}", kind, attr)
            }
        }
    }
}

/// Validating store of accepted referents.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    stored: Vec<ReferentId>,
    required: BTreeMap<ReferentKind, Vec<String>>,
    window: usize,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self {
            stored: Vec::new(),
            required: BTreeMap::new(),
            window: DEDUP_WINDOW,
        }
    }
}

impl EntityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the required attributes of `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(config
            .required_by_kind()?
            .into_iter()
            .fold(Self::new(), |registry, (kind, names)| {
                registry.with_required(kind, names)
            }))
    }

    /// Builder: require `names` on every referent of `kind`.
    ///
    /// Names are matched as upper-case attribute names.
    #[must_use]
    pub fn with_required<I, S>(mut self, kind: ReferentKind, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let required = self.required.entry(kind).or_default();
        for name in names {
            let name = attrs::normalize(name.as_ref());
            if !required.contains(&name) {
                required.push(name);
            }
        }
        self
    }

    /// Builder: compare new referents with this many recent ones.
    #[must_use]
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Everything wrong with `referent`; empty when it would be accepted.
    #[must_use]
    pub fn validate(&self, referent: &Referent) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if referent.slots().is_empty() {
            issues.push(ValidationIssue::NoSlots);
            return issues;
        }
        let kind = referent.kind();
        if kind != ReferentKind::Generic && referent.name_values().is_empty() {
            issues.push(ValidationIssue::MissingName { kind });
        }
        for attr in self.required.get(&kind).into_iter().flatten() {
            if !referent.has_attr(attr) {
                issues.push(ValidationIssue::MissingRequired {
                    kind,
                    attr: attr.clone(),
                });
            }
        }
        issues
    }

    /// True if `referent` would pass validation.
    #[must_use]
    pub fn is_valid(&self, referent: &Referent) -> bool {
        self.validate(referent).is_empty()
    }

    /// Stored referents, oldest first.
    #[must_use]
    pub fn referents(&self) -> &[ReferentId] {
        &self.stored
    }

    /// Number of stored referents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stored.len()
    }

    /// True if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stored.is_empty()
    }

    /// Register nested referents first and repoint the owner's slots at
    /// whatever they resolved to.
    fn register_ext_referents(&mut self, ctx: &mut dyn DocumentContext, owner: ReferentId) {
        let pending = match ctx.referents_mut().get_mut(owner) {
            Some(r) => r.take_ext_referents(),
            None => return,
        };
        for ext in pending {
            if ext == owner {
                continue;
            }
            match self.register_referent(ctx, ext) {
                Some(canonical) if canonical != ext => {
                    ctx.replace_referent(ext, canonical);
                    ctx.referents_mut().remove(ext);
                }
                Some(_) => {}
                None => log::debug!("nested {} of {} rejected", ext, owner),
            }
        }
    }

    /// A recent stored referent denoting the same entity, if exactly one
    /// fits (or several fit and one has identical slots).
    fn find_duplicate(&self, ctx: &dyn DocumentContext, referent: ReferentId) -> Option<ReferentId> {
        let arena = ctx.referents();
        let candidate = arena.get(referent)?;
        let start = self.stored.len().saturating_sub(self.window);
        let matches: Vec<ReferentId> = self.stored[start..]
            .iter()
            .copied()
            .filter(|id| *id != referent)
            .filter(|id| {
                arena.get(*id).is_some_and(|other| {
                    candidate.can_be_equals(other, EqualsMode::SharedName)
                        && !candidate.can_be_general_for(other)
                        && !other.can_be_general_for(candidate)
                })
            })
            .collect();
        match matches.as_slice() {
            [] => None,
            [single] => Some(*single),
            several => several.iter().copied().find(|id| {
                arena
                    .get(*id)
                    .is_some_and(|other| same_slots(candidate, other))
            }),
        }
    }
}

impl BaseRegistry for EntityRegistry {
    fn register_referent(
        &mut self,
        ctx: &mut dyn DocumentContext,
        referent: ReferentId,
    ) -> Option<ReferentId> {
        if self.stored.contains(&referent) {
            self.register_ext_referents(ctx, referent);
            return Some(referent);
        }
        let issues = match ctx.referents().get(referent) {
            Some(r) => self.validate(r),
            None => {
                log::warn!("base registration of retired referent {}", referent);
                return None;
            }
        };
        if !issues.is_empty() {
            let reasons: Vec<String> = issues.iter().map(ToString::to_string).collect();
            log::debug!("rejected {}: {}", referent, reasons.join(", "));
            return None;
        }

        self.register_ext_referents(ctx, referent);

        if let Some(existing) = self.find_duplicate(ctx, referent) {
            let arena = ctx.referents_mut();
            if let Some(source) = arena.get(referent).cloned() {
                if let Some(target) = arena.get_mut(existing) {
                    target.merge_slots(&source, false);
                    target.merge_occurrences(&source);
                }
            }
            log::debug!("{} duplicates stored {}", referent, existing);
            return Some(existing);
        }

        self.stored.push(referent);
        Some(referent)
    }

    fn remove_referent(&mut self, _ctx: &mut dyn DocumentContext, referent: ReferentId) {
        self.stored.retain(|r| *r != referent);
    }

    fn contains(&self, referent: ReferentId) -> bool {
        self.stored.contains(&referent)
    }
}

fn same_slots(a: &Referent, b: &Referent) -> bool {
    a.slots().len() == b.slots().len()
        && a
            .slots()
            .iter()
            .all(|s| b.find_slot(&s.name, Some(&s.value)).is_some())
}
