//! Selective field projection for catalog responses.
//!
//! Given a client-supplied set of requested/excluded dotted field paths and a
//! named response profile, this crate decides which fields of an entity are
//! included, computes only those fields (every field is behind a lazy thunk),
//! and assembles an insertion-ordered response document. A variant entity
//! shape (e.g. a product variation) is derived from the base projection by a
//! static subtraction spec rather than a second set of per-field conditionals.
//!
//! The crate is pure: no I/O, no async, no hidden state. Data access lives in
//! the thunks supplied by the caller.

mod decision;
mod error;
mod path;
mod profile;
mod project;
mod schema;
mod selection;
mod variant;

pub use decision::FieldDecision;
pub use error::{BoxError, ProfileFileError, ProjectError};
pub use path::{parse_path_list, FieldPath, ParsedPaths};
pub use profile::{ProfileDefaults, ResponseProfile};
pub use project::{project, FieldComputers, FieldThunk, ProjectedEntity};
pub use schema::{EntitySchema, FieldDef, FieldKind};
pub use selection::{FieldSelection, MetaSelection};
pub use variant::{specialize, VariantFieldSpec};
