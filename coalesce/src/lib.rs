//! # refmerge-coalesce
//!
//! Within-document referent deduplication and ontology merging.
//!
//! As recognizers find candidate entities across a document, the
//! [`ReferentRegistry`] decides whether each candidate is an entity already
//! seen. Matches are merged into a single surviving referent, every earlier
//! reference to the merged-away records is repointed, and the
//! [`OntologyCollection`] keeps one item per identity, indexed by its
//! normalized spellings.
//!
//! # Example
//!
//! ```
//! use refmerge_coalesce::OntologyCollection;
//! use refmerge_core::{attrs, Referent, ReferentArena, ReferentKind, Script};
//!
//! let mut arena = ReferentArena::new();
//! let moscow = arena.alloc(
//!     Referent::new(ReferentKind::Geo)
//!         .with_slot(attrs::NAME, "Moscow")
//!         .with_slot(attrs::NAME, "MSK"),
//! );
//! let mut ontology = OntologyCollection::new(Script::Latin);
//! ontology.add_referent(&arena, moscow);
//!
//! let mention = arena.alloc(Referent::new(ReferentKind::Geo).with_slot(attrs::NAME, "msk"));
//! let hits = ontology.try_attach_by_referent(&arena, mention, None, true);
//! assert_eq!(hits.map(|h| h.len()), Some(1));
//! assert_eq!(ontology.canonic_text_of(moscow), Some("MSK"));
//! ```

#![warn(missing_docs)]

pub mod collection;
pub mod config;
pub mod item;
pub mod registry;

pub use collection::{IndexIssue, OntologyCollection};
pub use config::RegistryConfig;
pub use item::{ItemId, OntologyItem};
pub use registry::ReferentRegistry;
