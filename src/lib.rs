//! # refmerge
//!
//! Referent deduplication and ontology merging for entity extraction.
//!
//! As grammar rules find candidate entities ("referents") in a document,
//! refmerge decides whether each one is an entity already seen. Matching
//! records are merged into a single canonical referent, every earlier span
//! and slot that pointed at a merged-away record is repointed, and each
//! entity gets a canonical display name.
//!
//! ## Crates
//!
//! | Crate | Contents |
//! |-------|----------|
//! | `refmerge-core` | `Referent`, slots, occurrences, `ReferentArena`, `Termin`, collaborator traits |
//! | `refmerge-coalesce` | `OntologyCollection`, `ReferentRegistry`, `RegistryConfig` |
//! | `refmerge` (this crate) | `AnalysisKit`, `EntityRegistry`, `MetaToken`, `DocumentSession`, `Config` |
//!
//! ## Quick Start
//!
//! ```rust
//! use refmerge::{attrs, DocumentSession, Referent, ReferentKind};
//!
//! let mut session = DocumentSession::new("Ivan Petrov met I. Petrov.");
//! let full = Referent::new(ReferentKind::Person)
//!     .with_slot(attrs::LASTNAME, "Petrov")
//!     .with_slot(attrs::FIRSTNAME, "Ivan");
//! let short = Referent::new(ReferentKind::Person)
//!     .with_slot(attrs::LASTNAME, "Petrov")
//!     .with_slot(attrs::FIRSTNAME, "I.");
//!
//! let a = session.register_at(full, 0, 11).unwrap();
//! let b = session.register_at(short, 16, 25).unwrap();
//! assert_eq!(a, b);
//! ```
//!
//! ## Design
//!
//! - **Arena ownership**: referents live in one `ReferentArena` per document;
//!   everything else holds `ReferentId` handles.
//! - **Closed kinds**: `ReferentKind` declares which attributes are names,
//!   which are single-valued and which narrow a description.
//! - **Single-threaded per document**: a `DocumentSession` owns all state;
//!   separate documents share nothing.

#![warn(missing_docs)]

pub mod base;
pub mod config;
mod error;
pub mod kit;
pub mod session;
pub mod token;

pub use base::{EntityRegistry, ValidationIssue};
pub use config::Config;
pub use error::{Error, Result};
pub use kit::{AnalysisKit, Attachment};
pub use session::{DocumentSession, EntitySummary};
pub use token::{MetaToken, WordForm, WordToken};

pub use refmerge_coalesce::{
    IndexIssue, ItemId, OntologyCollection, OntologyItem, ReferentRegistry, RegistryConfig,
};
pub use refmerge_core::{
    attrs, detect_script, BaseRegistry, DocumentContext, EqualsMode, MentionIndex, MorphGender,
    MorphNumber, Referent, ReferentArena, ReferentId, ReferentKind, Script, Slot, SlotValue,
    SurfaceForm, Termin, TextAnnotation,
};
