//! Failure signals raised by theory bodies and fixture factories.
//!
//! An assumption violation means "this combination is out of scope" and is
//! always reported as a skip. Everything else is a failure.

use std::any::Any;
use std::fmt::Debug;

use crate::value::Value;

#[derive(Debug, thiserror::Error)]
pub enum TheoryFailure {
    #[error("assumption violated: {0}")]
    AssumptionViolated(String),

    #[error("{0}")]
    Assertion(String),

    #[error("panicked: {0}")]
    Panicked(String),

    #[error(transparent)]
    Error(#[from] anyhow::Error),
}

impl TheoryFailure {
    pub fn is_assumption_violation(&self) -> bool {
        matches!(self, TheoryFailure::AssumptionViolated(_))
    }
}

pub type TheoryResult<T = ()> = Result<T, TheoryFailure>;

pub fn assume_true(condition: bool, message: impl Into<String>) -> TheoryResult {
    if condition {
        Ok(())
    } else {
        Err(TheoryFailure::AssumptionViolated(message.into()))
    }
}

pub fn assume_that<T: Debug>(actual: &T, predicate: impl FnOnce(&T) -> bool, expectation: &str) -> TheoryResult {
    if predicate(actual) {
        Ok(())
    } else {
        Err(TheoryFailure::AssumptionViolated(format!(
            "got: {actual:?}, expected: {expectation}"
        )))
    }
}

/// Assume every value is non-null.
pub fn assume_not_null(values: &[Value]) -> TheoryResult {
    match values.iter().position(Value::is_null) {
        None => Ok(()),
        Some(index) => Err(TheoryFailure::AssumptionViolated(format!(
            "argument {index} is null"
        ))),
    }
}

pub fn ensure(condition: bool, message: impl Into<String>) -> TheoryResult {
    if condition {
        Ok(())
    } else {
        Err(TheoryFailure::Assertion(message.into()))
    }
}

pub fn ensure_eq<T: PartialEq + Debug>(expected: T, actual: T) -> TheoryResult {
    if expected == actual {
        Ok(())
    } else {
        Err(TheoryFailure::Assertion(format!(
            "expected: {expected:?} but was: {actual:?}"
        )))
    }
}

pub fn fail(message: impl Into<String>) -> TheoryFailure {
    TheoryFailure::Assertion(message.into())
}

/// Extract a readable message from a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assume_not_null_names_first_null() {
        let values = vec![Value::Int(1), Value::Null, Value::Null];
        match assume_not_null(&values) {
            Err(TheoryFailure::AssumptionViolated(msg)) => assert_eq!(msg, "argument 1 is null"),
            other => panic!("expected assumption violation, got {other:?}"),
        }
        assert!(assume_not_null(&[Value::Int(1)]).is_ok());
    }

    #[test]
    fn test_assume_that_reports_actual_value() {
        let err = assume_that(&"a/b", |s| !s.contains('/'), "no slash").unwrap_err();
        assert!(err.is_assumption_violation());
        assert_eq!(err.to_string(), "assumption violated: got: \"a/b\", expected: no slash");
    }

    #[test]
    fn test_ensure_eq_is_an_assertion() {
        let err = ensure_eq(1, 2).unwrap_err();
        assert!(!err.is_assumption_violation());
        assert_eq!(err.to_string(), "expected: 1 but was: 2");
    }

    #[test]
    fn test_anyhow_errors_convert() {
        fn body() -> TheoryResult {
            Err(anyhow::anyhow!("disk on fire"))?;
            Ok(())
        }
        let err = body().unwrap_err();
        assert!(matches!(err, TheoryFailure::Error(_)));
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn test_panic_message_from_payloads() {
        let caught = std::panic::catch_unwind(|| panic!("boom {}", 1)).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "boom 1");
        let caught = std::panic::catch_unwind(|| std::panic::panic_any(7u8)).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "non-string panic payload");
    }
}
