//! Execution of one completed invocation and classification of its outcome.

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;

use postulate_model::failure::{assume_not_null, panic_message, TheoryFailure, TheoryResult};

use crate::class::TheoryClass;
use crate::invocation::CompletedInvocation;

/// A body failure annotated with the combination of arguments that caused it.
#[derive(Debug, thiserror::Error)]
#[error("{}({})", .method, .args.join(", "))]
pub struct ParameterizedFailure {
    pub method: String,
    pub args: Vec<String>,
    #[source]
    pub cause: TheoryFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum InvocationFailure {
    #[error(transparent)]
    Parameterized(#[from] ParameterizedFailure),

    /// Invocations with no bound parameters surface the failure as raised.
    #[error(transparent)]
    Unwrapped(TheoryFailure),
}

impl InvocationFailure {
    pub fn cause(&self) -> &TheoryFailure {
        match self {
            InvocationFailure::Parameterized(p) => &p.cause,
            InvocationFailure::Unwrapped(f) => f,
        }
    }

    /// Display text followed by the underlying cause.
    pub fn message(&self) -> String {
        match self {
            InvocationFailure::Parameterized(p) => format!("{p}: {}", p.cause),
            InvocationFailure::Unwrapped(f) => f.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum Outcome {
    Passed,
    Skipped { reason: String },
    Failed(InvocationFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Passed,
    Skipped,
    Failed,
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Passed => OutcomeKind::Passed,
            Outcome::Skipped { .. } => OutcomeKind::Skipped,
            Outcome::Failed(_) => OutcomeKind::Failed,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// Skip reason or failure message; `None` for a pass.
    pub fn message(&self) -> Option<String> {
        match self {
            Outcome::Passed => None,
            Outcome::Skipped { reason } => Some(reason.clone()),
            Outcome::Failed(failure) => Some(failure.message()),
        }
    }
}

/// Run `invocation` against a fresh fixture built by `class`.
///
/// Null arguments for a method that does not accept them skip the invocation
/// before anything runs. An assumption violation from the factory, a hook or
/// the body is a skip. Any other failure, including a panic, fails the
/// invocation and is wrapped with the rendered arguments unless nothing was
/// bound.
pub fn execute<T: 'static>(class: &TheoryClass<T>, invocation: &CompletedInvocation<T>) -> Outcome {
    let nulls_ok = invocation.method().nulls_accepted();
    let outcome = classify(invocation, nulls_ok, run_phases(class, invocation, nulls_ok));
    tracing::debug!(
        invocation = %invocation.display_name(),
        outcome = ?outcome.kind(),
        "executed invocation"
    );
    outcome
}

fn run_phases<T: 'static>(
    class: &TheoryClass<T>,
    invocation: &CompletedInvocation<T>,
    nulls_ok: bool,
) -> TheoryResult {
    let constructor_args = invocation.constructor_arguments().map_err(anyhow::Error::from)?;
    if !nulls_ok {
        assume_not_null(&constructor_args)?;
    }
    let fixture = guarded(|| class.construct(&constructor_args))?;

    let method_args = invocation.method_arguments().map_err(anyhow::Error::from)?;
    if !nulls_ok {
        assume_not_null(&method_args)?;
    }

    let body = match class.before_hook() {
        Some(before) => guarded(|| before(&fixture)),
        None => Ok(()),
    }
    .and_then(|()| guarded(|| invocation.method().invoke(&fixture, &method_args)));

    let teardown = match class.after_hook() {
        Some(after) => guarded(|| after(&fixture)),
        None => Ok(()),
    };
    body.and(teardown)
}

fn classify<T>(invocation: &CompletedInvocation<T>, nulls_ok: bool, result: TheoryResult) -> Outcome {
    let cause = match result {
        Ok(()) => return Outcome::Passed,
        Err(failure) if failure.is_assumption_violation() => {
            return Outcome::Skipped {
                reason: failure.to_string(),
            }
        }
        Err(failure) => failure,
    };

    if invocation.assignments().parameter_count() == 0 {
        return Outcome::Failed(InvocationFailure::Unwrapped(cause));
    }
    match invocation.argument_strings(nulls_ok) {
        Ok(args) => Outcome::Failed(
            ParameterizedFailure {
                method: invocation.method().name().to_string(),
                args,
                cause,
            }
            .into(),
        ),
        Err(unusable) => Outcome::Skipped {
            reason: unusable.to_string(),
        },
    }
}

fn guarded<R>(f: impl FnOnce() -> TheoryResult<R>) -> TheoryResult<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(TheoryFailure::Panicked(panic_message(payload.as_ref()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guarded_turns_panic_into_failure() {
        let result: TheoryResult<u8> = guarded(|| panic!("kaboom"));
        match result {
            Err(TheoryFailure::Panicked(msg)) => assert_eq!(msg, "kaboom"),
            other => panic!("expected panic failure, got {other:?}"),
        }
    }

    #[test]
    fn test_parameterized_failure_message_lists_arguments() {
        let failure = InvocationFailure::from(ParameterizedFailure {
            method: "adds".into(),
            args: vec!["1 <from ints[0]>".into(), "\"x\" <from words[1]>".into()],
            cause: TheoryFailure::Assertion("expected: 2 but was: 3".into()),
        });
        assert_eq!(failure.to_string(), "adds(1 <from ints[0]>, \"x\" <from words[1]>)");
        assert_eq!(
            failure.message(),
            "adds(1 <from ints[0]>, \"x\" <from words[1]>): expected: 2 but was: 3"
        );
        assert!(matches!(failure.cause(), TheoryFailure::Assertion(_)));
        assert!(std::error::Error::source(&failure).is_some());
    }

    #[test]
    fn test_outcome_kinds() {
        assert_eq!(Outcome::Passed.kind(), OutcomeKind::Passed);
        assert!(Outcome::Passed.message().is_none());
        let skipped = Outcome::Skipped { reason: "n/a".into() };
        assert_eq!(skipped.kind(), OutcomeKind::Skipped);
        assert_eq!(skipped.message().as_deref(), Some("n/a"));
        let failed = Outcome::Failed(InvocationFailure::Unwrapped(TheoryFailure::Assertion("no".into())));
        assert!(failed.is_failed());
        assert_eq!(failed.message().as_deref(), Some("no"));
    }
}
