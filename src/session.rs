//! One document's registration session.
//!
//! A [`DocumentSession`] owns everything one document needs: the
//! [`AnalysisKit`] (text, arena, span attachments) and the
//! [`ReferentRegistry`] with its base registry. Nothing is shared between
//! sessions, so documents can be processed on separate threads.
//!
//! # Example
//!
//! ```
//! use refmerge::{DocumentSession, Referent, ReferentKind, attrs};
//!
//! let text = "Moscow (MSK) is large. MSK traffic is heavy.";
//! let mut session = DocumentSession::new(text);
//!
//! let first = Referent::new(ReferentKind::Geo)
//!     .with_slot(attrs::NAME, "Moscow")
//!     .with_slot(attrs::NAME, "MSK");
//! let a = session.register_at(first, 0, 6).unwrap();
//!
//! let second = Referent::new(ReferentKind::Geo).with_slot(attrs::NAME, "MSK");
//! let b = session.register_at(second, 23, 26).unwrap();
//!
//! assert_eq!(a, b);
//! assert_eq!(session.canonic_text(a), Some("MSK"));
//! assert_eq!(session.entities().len(), 1);
//! ```

use refmerge_coalesce::{ReferentRegistry, RegistryConfig};
use refmerge_core::termin::UNKNOWN_TEXT;
use refmerge_core::{
    BaseRegistry, MorphGender, MorphNumber, Referent, ReferentId, ReferentKind, Slot,
    SurfaceForm, TextAnnotation,
};
use serde::Serialize;

use crate::base::EntityRegistry;
use crate::config::Config;
use crate::kit::AnalysisKit;
use crate::token::MetaToken;
use crate::Result;

/// A canonical entity as reported at the end of a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySummary {
    /// Referent handle
    pub id: ReferentId,
    /// Kind
    pub kind: ReferentKind,
    /// Canonical display text
    pub canonical: String,
    /// Attribute values
    pub slots: Vec<Slot>,
    /// Text occurrences
    pub occurrences: Vec<TextAnnotation>,
    /// Document text of each occurrence
    pub mentions: Vec<String>,
    /// Number of spans attached to the entity
    pub attachments: usize,
}

/// Registration state of one document.
#[derive(Debug, Clone)]
pub struct DocumentSession<B = EntityRegistry> {
    kit: AnalysisKit,
    registry: ReferentRegistry<B>,
}

impl DocumentSession<EntityRegistry> {
    /// Start a session over `text` with default settings.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_registry(
            AnalysisKit::new(text),
            ReferentRegistry::new(EntityRegistry::new()),
        )
    }

    /// Start a session over `text` with a loaded configuration.
    pub fn from_config(text: impl Into<String>, config: &Config) -> Result<Self> {
        let base = EntityRegistry::from_config(config)?;
        let mut kit = AnalysisKit::new(text);
        if let Some(script) = config.registry.script {
            kit = kit.with_script(script);
        }
        Ok(Self::with_registry(
            kit,
            ReferentRegistry::with_config(base, config.registry.clone()),
        ))
    }
}

impl<B: BaseRegistry> DocumentSession<B> {
    /// Start a session from explicit parts.
    #[must_use]
    pub fn with_registry(kit: AnalysisKit, registry: ReferentRegistry<B>) -> Self {
        Self { kit, registry }
    }

    /// Start a session over `text` with a custom base registry.
    #[must_use]
    pub fn with_base(text: impl Into<String>, base: B, config: RegistryConfig) -> Self {
        Self::with_registry(AnalysisKit::new(text), ReferentRegistry::with_config(base, config))
    }

    /// The analysis kit.
    #[must_use]
    pub fn kit(&self) -> &AnalysisKit {
        &self.kit
    }

    /// The registry.
    #[must_use]
    pub fn registry(&self) -> &ReferentRegistry<B> {
        &self.registry
    }

    /// Hand a referent to the session's arena without registering it.
    pub fn alloc(&mut self, referent: Referent) -> ReferentId {
        self.kit.arena_mut().alloc(referent)
    }

    /// A live referent.
    #[must_use]
    pub fn referent(&self, id: ReferentId) -> Option<&Referent> {
        self.kit.arena().get(id)
    }

    /// Mutable access to a live referent (e.g. to add nested references).
    pub fn referent_mut(&mut self, id: ReferentId) -> Option<&mut Referent> {
        self.kit.arena_mut().get_mut(id)
    }

    /// Register an allocated referent; see [`ReferentRegistry::register_referent`].
    pub fn register(&mut self, id: ReferentId) -> Option<ReferentId> {
        self.registry.register_referent(&mut self.kit, id)
    }

    /// Register a referent found at `[begin_char, end_char)` and tie the span
    /// to the canonical result. A rejected referent attaches nothing.
    pub fn register_at(
        &mut self,
        mut referent: Referent,
        begin_char: usize,
        end_char: usize,
    ) -> Option<ReferentId> {
        let span = TextAnnotation::new(begin_char, end_char);
        referent.add_occurrence(span);
        let id = self.alloc(referent);
        let canonical = self.register(id)?;
        self.kit.attach(span, canonical);
        Some(canonical)
    }

    /// Build a one-slot referent from a recognized span and register it.
    ///
    /// The slot value is the span's singular surface form in source casing.
    pub fn register_span(
        &mut self,
        kind: ReferentKind,
        attr: &str,
        token: &MetaToken,
        begin_char: usize,
        end_char: usize,
    ) -> Option<ReferentId> {
        let value = token.normalized_text(MorphNumber::SINGULAR, MorphGender::UNDEFINED, true);
        if value.trim().is_empty() {
            log::debug!("empty surface form at [{}..{})", begin_char, end_char);
            return None;
        }
        let referent = Referent::new(kind).with_slot(attr, value);
        self.register_at(referent, begin_char, end_char)
    }

    /// Forget a referent and its spans.
    pub fn remove_referent(&mut self, id: ReferentId) {
        self.registry.remove_referent(&mut self.kit, id);
        self.kit.detach_all(id);
    }

    /// Canonical text of a registered referent.
    #[must_use]
    pub fn canonic_text(&self, id: ReferentId) -> Option<&str> {
        self.registry.canonic_text(id)
    }

    /// Every accepted entity, in creation order.
    #[must_use]
    pub fn entities(&self) -> Vec<EntitySummary> {
        self.kit
            .arena()
            .iter()
            .filter(|(id, _)| self.registry.base().contains(*id))
            .map(|(id, referent)| EntitySummary {
                id,
                kind: referent.kind(),
                canonical: self.canonic_text(id).unwrap_or(UNKNOWN_TEXT).to_string(),
                slots: referent.slots().to_vec(),
                occurrences: referent.occurrence().to_vec(),
                mentions: referent
                    .occurrence()
                    .iter()
                    .map(|o| self.kit.slice(o.begin_char, o.end_char))
                    .collect(),
                attachments: self.kit.spans_of(id).len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::WordToken;
    use refmerge_core::attrs;

    #[test]
    fn test_register_at_attaches_canonical() {
        let mut session = DocumentSession::new("Moscow. Moscow.");
        let geo = || Referent::new(ReferentKind::Geo).with_slot(attrs::NAME, "Moscow");
        let a = session.register_at(geo(), 0, 6).unwrap();
        let b = session.register_at(geo(), 8, 14).unwrap();
        assert_eq!(a, b);
        assert_eq!(session.kit().spans_of(a).len(), 2);
        let entities = session.entities();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].mentions, vec!["Moscow", "Moscow"]);
        assert_eq!(entities[0].attachments, 2);
    }

    #[test]
    fn test_rejected_attaches_nothing() {
        let mut session = DocumentSession::new("city");
        let r = Referent::new(ReferentKind::Geo).with_slot(attrs::TYPE, "city");
        assert_eq!(session.register_at(r, 0, 4), None);
        assert!(session.kit().attachments().is_empty());
        assert!(session.entities().is_empty());
    }

    #[test]
    fn test_register_span_uses_surface_form() {
        let mut session = DocumentSession::new("the Red Square");
        let token = MetaToken::NounPhrase {
            adjectives: vec![WordToken::new("Red")],
            noun: WordToken::new("Square"),
        };
        let id = session
            .register_span(ReferentKind::Geo, attrs::NAME, &token, 4, 14)
            .unwrap();
        assert_eq!(
            session.referent(id).and_then(|r| r.string_value(attrs::NAME)).as_deref(),
            Some("Red Square")
        );
        assert_eq!(session.canonic_text(id), Some("RED SQUARE"));
        assert_eq!(session.entities()[0].mentions, vec!["Red Square"]);
    }

    #[test]
    fn test_remove_referent() {
        let mut session = DocumentSession::new("Moscow");
        let id = session
            .register_at(Referent::new(ReferentKind::Geo).with_slot(attrs::NAME, "Moscow"), 0, 6)
            .unwrap();
        session.remove_referent(id);
        assert!(session.entities().is_empty());
        assert!(session.kit().attachments().is_empty());
        assert!(session.registry().ontology().is_empty());
    }

    #[test]
    fn test_from_config_pins_script() {
        let config = Config::from_toml_str("[registry]\nscript = \"cyrillic\"").unwrap();
        let mut session = DocumentSession::from_config("Moscow", &config).unwrap();
        let id = session
            .register_at(
                Referent::new(ReferentKind::Geo)
                    .with_slot(attrs::NAME, "Moscow")
                    .with_slot(attrs::NAME, "Москва"),
                0,
                6,
            )
            .unwrap();
        assert_eq!(session.canonic_text(id), Some("МОСКВА"));
    }
}
