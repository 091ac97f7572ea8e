use std::fmt;
use std::sync::Arc;

use postulate_explore::assignment::{Assignments, IncompleteAssignment};
use postulate_model::failure::TheoryFailure;
use postulate_model::value::Value;

use crate::class::TestMethod;

/// One independently executed and reported test unit: a method paired with
/// one complete assignment.
pub struct CompletedInvocation<T> {
    method: Arc<TestMethod<T>>,
    assignments: Assignments,
}

impl<T> CompletedInvocation<T> {
    pub fn new(method: Arc<TestMethod<T>>, assignments: Assignments) -> Self {
        Self {
            method,
            assignments,
        }
    }

    pub fn method(&self) -> &TestMethod<T> {
        &self.method
    }

    pub fn assignments(&self) -> &Assignments {
        &self.assignments
    }

    pub fn constructor_arguments(&self) -> Result<Vec<Value>, IncompleteAssignment> {
        self.assignments.constructor_arguments()
    }

    pub fn method_arguments(&self) -> Result<Vec<Value>, IncompleteAssignment> {
        self.assignments.method_arguments()
    }

    pub fn argument_strings(&self, nulls_ok: bool) -> Result<Vec<String>, TheoryFailure> {
        self.assignments.argument_strings(nulls_ok)
    }

    /// `name(arg1, arg2, ...)`, every bound argument rendered in order.
    pub fn display_name(&self) -> String {
        match self.assignments.argument_strings(true) {
            Ok(args) => format!("{}({})", self.method.name(), args.join(", ")),
            Err(_) => format!(
                "{}([Could not generate test input value strings])",
                self.method.name()
            ),
        }
    }
}

impl<T> Clone for CompletedInvocation<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            assignments: self.assignments.clone(),
        }
    }
}

impl<T> PartialEq for CompletedInvocation<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.method, &other.method) && self.assignments == other.assignments
    }
}

impl<T> fmt::Debug for CompletedInvocation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletedInvocation")
            .field("method", &self.method.name())
            .field("assignments", &self.assignments)
            .finish()
    }
}
