//! Document schema descriptions
//!
//! Schemas describe the shape of stored documents: field names, declared
//! types and the rule annotations attached to each field. They can be built
//! in code, provided by a [`Document`] impl, or loaded from JSON.

mod errors;
mod loader;
mod naming;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use loader::SchemaLoader;
pub use types::{Document, FieldDef, SchemaType, StructDef, SKIP_FIELD};
