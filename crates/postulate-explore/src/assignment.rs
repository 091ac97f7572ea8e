//! Partial assignments of values to a theory's parameters.
//!
//! Parameters are bound strictly left to right: constructor parameters
//! first, then method parameters. Every `assign_next` returns a new value;
//! an `Assignments` is never mutated after creation, so sibling search
//! branches can never observe each other's bindings.

use std::fmt;
use std::sync::Arc;

use postulate_model::failure::{assume_not_null, TheoryFailure};
use postulate_model::signature::ParameterSignature;
use postulate_model::source::{GenerationError, PotentialAssignment};
use postulate_model::value::Value;

use crate::supplier::SupplierContext;

#[derive(Debug, thiserror::Error)]
#[error("assignment is incomplete: {bound} of {total} parameters bound")]
pub struct IncompleteAssignment {
    pub bound: usize,
    pub total: usize,
}

/// A parameter bound to a materialized value, together with its source.
#[derive(Debug, Clone)]
pub struct Binding {
    pub source: PotentialAssignment,
    pub value: Value,
}

impl Binding {
    pub fn description(&self) -> String {
        self.source.description(&self.value)
    }
}

#[derive(Clone)]
pub struct Assignments {
    assigned: Vec<Binding>,
    constructor_signatures: Arc<[ParameterSignature]>,
    method_signatures: Arc<[ParameterSignature]>,
    context: Arc<SupplierContext>,
}

impl Assignments {
    /// The starting state of the search: nothing bound.
    pub fn all_unassigned(
        method_signatures: impl Into<Arc<[ParameterSignature]>>,
        constructor_signatures: impl Into<Arc<[ParameterSignature]>>,
        context: Arc<SupplierContext>,
    ) -> Self {
        Self {
            assigned: Vec::new(),
            constructor_signatures: constructor_signatures.into(),
            method_signatures: method_signatures.into(),
            context,
        }
    }

    /// Constructor plus method parameter count.
    pub fn parameter_count(&self) -> usize {
        self.constructor_signatures.len() + self.method_signatures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.assigned.len() == self.parameter_count()
    }

    /// The signature right after the bound prefix, or `None` when complete.
    pub fn next_unassigned(&self) -> Option<&ParameterSignature> {
        let next = self.assigned.len();
        let ctor_count = self.constructor_signatures.len();
        if next < ctor_count {
            self.constructor_signatures.get(next)
        } else {
            self.method_signatures.get(next - ctor_count)
        }
    }

    /// Signatures not yet bound, in assignment order.
    pub fn unassigned(&self) -> impl Iterator<Item = &ParameterSignature> {
        self.constructor_signatures
            .iter()
            .chain(self.method_signatures.iter())
            .skip(self.assigned.len())
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.assigned
    }

    pub fn bound_values(&self) -> Vec<Value> {
        self.assigned.iter().map(|b| b.value.clone()).collect()
    }

    /// Candidates for the next parameter, computed against the current bindings.
    pub fn potentials_for_next(&self) -> Result<Vec<PotentialAssignment>, GenerationError> {
        let signature = self.next_unassigned().ok_or(GenerationError::AlreadyComplete)?;
        self.context.potentials_for(signature, &self.bound_values())
    }

    /// A new assignment with `source`'s value bound to the next parameter.
    pub fn assign_next(&self, source: &PotentialAssignment) -> Result<Assignments, GenerationError> {
        if self.is_complete() {
            return Err(GenerationError::AlreadyComplete);
        }
        let value = source.value()?;
        let mut assigned = Vec::with_capacity(self.assigned.len() + 1);
        assigned.extend_from_slice(&self.assigned);
        assigned.push(Binding {
            source: source.clone(),
            value,
        });
        Ok(Self {
            assigned,
            constructor_signatures: self.constructor_signatures.clone(),
            method_signatures: self.method_signatures.clone(),
            context: self.context.clone(),
        })
    }

    pub fn constructor_arguments(&self) -> Result<Vec<Value>, IncompleteAssignment> {
        self.ensure_complete()?;
        let split = self.constructor_signatures.len();
        Ok(self.assigned[..split].iter().map(|b| b.value.clone()).collect())
    }

    pub fn method_arguments(&self) -> Result<Vec<Value>, IncompleteAssignment> {
        self.ensure_complete()?;
        let split = self.constructor_signatures.len();
        Ok(self.assigned[split..].iter().map(|b| b.value.clone()).collect())
    }

    /// Rendered descriptions of every bound value, constructor first.
    ///
    /// With `nulls_ok == false` a bound null makes the whole rendering
    /// unusable and is reported as an assumption violation.
    pub fn argument_strings(&self, nulls_ok: bool) -> Result<Vec<String>, TheoryFailure> {
        if !nulls_ok {
            assume_not_null(&self.bound_values())?;
        }
        Ok(self.assigned.iter().map(Binding::description).collect())
    }

    fn ensure_complete(&self) -> Result<(), IncompleteAssignment> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(IncompleteAssignment {
                bound: self.assigned.len(),
                total: self.parameter_count(),
            })
        }
    }
}

impl PartialEq for Assignments {
    fn eq(&self, other: &Self) -> bool {
        self.constructor_signatures == other.constructor_signatures
            && self.method_signatures == other.method_signatures
            && self.assigned.len() == other.assigned.len()
            && self
                .assigned
                .iter()
                .zip(&other.assigned)
                .all(|(a, b)| a.value == b.value)
    }
}

impl fmt::Debug for Assignments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assignments")
            .field("assigned", &self.bound_values())
            .field("parameters", &self.parameter_count())
            .finish()
    }
}
