//! Operation compiler
//!
//! Compiles patch operations into MongoDB aggregation-pipeline update stages
//! (`$set`/`$unset` with `$concatArrays`, `$slice`, `$add` and `$size`
//! expressions). Policies run before compilation; [`SmartParser`] adds schema
//! validation in front.

mod compile;
mod errors;
mod fragment;
mod policy;
mod smart;

pub use compile::Compiler;
pub use errors::{CompileError, CompileResult};
pub use fragment::{Expr, Fragment};
pub use policy::{DisallowPathPolicy, Policy};
pub use smart::SmartParser;
