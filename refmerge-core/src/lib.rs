//! # refmerge-core
//!
//! Core types for the refmerge workspace: shared data structures used across all crates.
//!
//! This crate provides:
//! - **Referents**: `Referent`, `ReferentKind`, `Slot`, `SlotValue`, `TextAnnotation`
//! - **Ownership**: `ReferentArena` and the `ReferentId` handle every other crate passes around
//! - **Term variants**: `Termin`, the normalized spellings an entity is indexed under
//! - **Collaborator seams**: `BaseRegistry`, `MentionIndex`, `DocumentContext`, `SurfaceForm`
//!
//! All other crates in the workspace depend on `refmerge-core` so that a referent
//! built by a recognizer can be handed to the registry without conversion.

#![warn(missing_docs)]

pub mod annotation;
pub mod arena;
pub mod context;
pub mod error;
pub mod morph;
pub mod referent;
pub mod script;
pub mod termin;

// Re-exports for convenience
pub use annotation::{TextAnnotation, TextsCompareType};
pub use arena::ReferentArena;
pub use context::{BaseRegistry, DocumentContext, MentionIndex, SurfaceForm};
pub use error::{Error, Result};
pub use morph::{MorphGender, MorphNumber};
pub use referent::{attrs, EqualsMode, Referent, ReferentId, ReferentKind, Slot, SlotValue};
pub use script::{detect_script, Script};
pub use termin::Termin;
