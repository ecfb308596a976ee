//! Operation compiler
//!
//! Turns one validated patch operation into update stages:
//!
//! | op      | stages                                                  |
//! |---------|---------------------------------------------------------|
//! | remove  | `$unset`, or an array rewrite for `arr.<index>` paths   |
//! | add     | `$set` appending the value to the array                 |
//! | replace | `$unset` then `$set`                                    |
//! | move    | `$set` from the source, then `$unset` of the source     |
//! | copy    | `$set` from the source                                  |
//!
//! Paths with empty segments (`a.`, `a..b`) are rejected as unexpected input.

use tracing::debug;

use crate::operation::{Operation, OperationSpec, Path};
use crate::value::Value;

use super::errors::{CompileError, CompileResult};
use super::fragment::{Expr, Fragment};
use super::policy::Policy;

/// Compiles patch operations under a list of policies.
#[derive(Debug, Default)]
pub struct Compiler {
    policies: Vec<Box<dyn Policy>>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a policy; policies run in registration order.
    pub fn with_policy(mut self, policy: impl Policy + 'static) -> Self {
        self.add_policy(policy);
        self
    }

    pub fn add_policy(&mut self, policy: impl Policy + 'static) {
        self.policies.push(Box::new(policy));
    }

    pub fn policies(&self) -> &[Box<dyn Policy>] {
        &self.policies
    }

    /// Compiles one operation.
    pub fn compile(&self, spec: &OperationSpec) -> CompileResult<Vec<Fragment>> {
        self.compile_spec(spec, RemoveIndex::Splice)
    }

    /// Compiles one operation; `mode` decides how `remove` treats a
    /// trailing integer segment.
    pub(crate) fn compile_spec(
        &self,
        spec: &OperationSpec,
        mode: RemoveIndex,
    ) -> CompileResult<Vec<Fragment>> {
        let op = spec
            .op
            .ok_or_else(|| CompileError::UnexpectedInput("operation kind is missing".into()))?;

        well_formed(&spec.path)?;
        if let (true, Some(from)) = (op.requires_from(), &spec.from) {
            well_formed(from)?;
        }

        if let Some(policy) = self.policies.iter().find(|p| !p.permits(spec)) {
            debug!(path = %spec.path, details = policy.details(), "policy rejected operation");
            return Err(CompileError::PolicyViolation(policy.details().to_string()));
        }

        let fragments = match op {
            Operation::Remove => remove(&spec.path, mode),
            Operation::Add => vec![append(&spec.path, required_value(spec)?)],
            Operation::Replace => vec![
                Fragment::Unset(spec.path.clone()),
                Fragment::set(spec.path.clone(), Expr::Literal(required_value(spec)?.clone())),
            ],
            Operation::Move => {
                let from = required_from(spec)?;
                vec![
                    Fragment::set(spec.path.clone(), Expr::field(from)),
                    Fragment::Unset(from.clone()),
                ]
            }
            Operation::Copy => {
                let from = required_from(spec)?;
                vec![Fragment::set(spec.path.clone(), Expr::field(from))]
            }
        };

        debug!(path = %spec.path, op = %op, fragments = fragments.len(), "compiled operation");
        Ok(fragments)
    }

    /// Compiles a batch into one pipeline; the first error aborts the batch.
    pub fn compile_all(&self, specs: &[OperationSpec]) -> CompileResult<Vec<Fragment>> {
        let mut pipeline = Vec::new();
        for spec in specs {
            pipeline.extend(self.compile(spec)?);
        }
        Ok(pipeline)
    }
}

fn required_value(spec: &OperationSpec) -> CompileResult<&Value> {
    spec.value.as_ref().ok_or_else(|| {
        CompileError::UnexpectedInput(format!("'{}' at '{}' requires a value", spec_op(spec), spec.path))
    })
}

fn required_from(spec: &OperationSpec) -> CompileResult<&Path> {
    spec.from.as_ref().ok_or_else(|| {
        CompileError::UnexpectedInput(format!("'{}' at '{}' requires a from path", spec_op(spec), spec.path))
    })
}

fn well_formed(path: &Path) -> CompileResult<()> {
    if path.is_well_formed() {
        Ok(())
    } else {
        Err(CompileError::UnexpectedInput(format!("malformed path '{}'", path)))
    }
}

fn spec_op(spec: &OperationSpec) -> &'static str {
    spec.op.map_or("", |op| op.name())
}

/// How `remove` treats a path ending in an integer segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RemoveIndex {
    /// The parent is an array: splice the element out.
    Splice,
    /// The parent is a map: the segment is a key, unset it.
    Key,
}

/// Removing `arr.<i>` rewrites `arr` without element `i`; anything else is
/// unset.
fn remove(path: &Path, mode: RemoveIndex) -> Vec<Fragment> {
    let (Some(index), Some(parent), RemoveIndex::Splice) =
        (path.trailing_index(), path.parent(), mode)
    else {
        return vec![Fragment::Unset(path.clone())];
    };

    let array = Expr::field(&parent);
    let head = Expr::Slice(vec![array.clone(), Expr::literal(index)]);
    let tail = Expr::Slice(vec![
        array.clone(),
        Expr::Add(vec![Expr::literal(1), Expr::literal(index)]),
        Expr::Size(Box::new(array)),
    ]);

    vec![Fragment::set(parent, Expr::ConcatArrays(vec![head, tail]))]
}

/// Appends the value as one element, even when it is itself an array.
fn append(path: &Path, value: &Value) -> Fragment {
    Fragment::set(
        path.clone(),
        Expr::ConcatArrays(vec![
            Expr::field(path),
            Expr::Literal(Value::Array(vec![value.clone()])),
        ]),
    )
}
