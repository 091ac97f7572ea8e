use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::failure::panic_message;
use crate::supplier::SupplierError;
use crate::value::{render_value, Value};

/// Errors while materializing a candidate value.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("could not generate value from '{source_name}': {reason}")]
    CouldNotGenerate { source_name: String, reason: String },

    #[error("candidate lookup failed: {0}")]
    Supplier(#[from] SupplierError),

    #[error("assignment is already complete")]
    AlreadyComplete,
}

type ValueThunk = dyn Fn() -> Result<Value, GenerationError> + Send + Sync;

/// One candidate value for one parameter, evaluated lazily.
///
/// Clones share the underlying thunk.
#[derive(Clone)]
pub struct PotentialAssignment {
    name: Arc<str>,
    thunk: Arc<ValueThunk>,
}

impl PotentialAssignment {
    /// A fixed value.
    pub fn for_value(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: Arc::from(name.into()),
            thunk: Arc::new(move || Ok(value.clone())),
        }
    }

    /// A value computed on demand. An `Err` from `compute` becomes a
    /// generation failure for the branch that tried to bind it.
    pub fn computed<F>(name: impl Into<String>, compute: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let name: Arc<str> = Arc::from(name.into());
        let source_name = name.clone();
        Self {
            name,
            thunk: Arc::new(move || {
                compute().map_err(|e| GenerationError::CouldNotGenerate {
                    source_name: source_name.to_string(),
                    reason: format!("{e:#}"),
                })
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Materialize the value. A panicking thunk is reported as a generation failure.
    pub fn value(&self) -> Result<Value, GenerationError> {
        match catch_unwind(AssertUnwindSafe(|| (self.thunk)())) {
            Ok(result) => result,
            Err(payload) => Err(GenerationError::CouldNotGenerate {
                source_name: self.name.to_string(),
                reason: panic_message(payload.as_ref()),
            }),
        }
    }

    /// Diagnostic rendering of a value produced by this source.
    pub fn description(&self, value: &Value) -> String {
        format!("{} <from {}>", render_value(value), self.name)
    }
}

impl fmt::Debug for PotentialAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PotentialAssignment")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
