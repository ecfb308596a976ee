//! Runtime values for patch payloads
//!
//! Payloads are converted into [`Value`] before validation so the structural
//! matcher works on one closed set of kinds.

mod errors;
mod object_id;
mod ser;
mod types;

pub use errors::{ValueError, ValueResult};
pub use object_id::ObjectId;
pub use ser::{to_value, ValueSerializer};
pub use types::{Kind, Map, Record, Value};
