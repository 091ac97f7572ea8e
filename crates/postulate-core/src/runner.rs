//! Lifecycle runner: turns a validated class into reported invocations.
//!
//! For every method the runner expands the all-unassigned state into complete
//! assignments, pairs each with the method and executes it. Plain tests ride
//! the same machinery with an empty method signature.

use std::sync::Arc;

use rayon::prelude::*;

use postulate_explore::assignment::Assignments;
use postulate_explore::expand::expand;
use postulate_explore::signal::DiscardedBranch;
use postulate_model::signature::ParameterSignature;

use crate::class::{TestMethod, TheoryClass};
use crate::config::{ExecutionMode, RunConfig};
use crate::execute::{execute, Outcome};
use crate::invocation::CompletedInvocation;
use crate::listener::RunListener;
use crate::report::{DiscardReport, InvocationReport, RunReport};
use crate::validate::{validate_class, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Class '{class}' failed validation: {}", join_errors(.errors))]
    Initialization {
        class: String,
        errors: Vec<ValidationError>,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Everything enumeration produced for one method.
#[derive(Debug)]
pub struct TheoryPlan<T> {
    pub method: Arc<TestMethod<T>>,
    pub invocations: Vec<CompletedInvocation<T>>,
    pub discarded: Vec<DiscardedBranch>,
    /// Whether `max_invocations_per_theory` cut the enumeration short.
    pub truncated: bool,
}

pub struct TheoryRunner<T> {
    class: TheoryClass<T>,
    config: RunConfig,
    constructor_signatures: Arc<[ParameterSignature]>,
}

impl<T: 'static> TheoryRunner<T> {
    /// Validate `class` and prepare it for running.
    pub fn new(class: TheoryClass<T>, config: RunConfig) -> Result<Self, RunnerError> {
        if let Err(errors) = validate_class(&class) {
            return Err(RunnerError::Initialization {
                class: class.name().to_string(),
                errors,
            });
        }
        let constructor_signatures: Arc<[ParameterSignature]> = class.constructor_signatures().into();
        Ok(Self {
            class,
            config,
            constructor_signatures,
        })
    }

    pub fn class(&self) -> &TheoryClass<T> {
        &self.class
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Plain tests first, then theories, each in declaration order.
    pub fn compute_test_methods(&self) -> Vec<Arc<TestMethod<T>>> {
        let (theories, plain): (Vec<_>, Vec<_>) = self
            .class
            .methods()
            .iter()
            .cloned()
            .partition(|m| m.is_theory());
        plain.into_iter().chain(theories).collect()
    }

    pub fn compute_invocations(&self, method: &Arc<TestMethod<T>>) -> Vec<CompletedInvocation<T>> {
        self.plan(method).invocations
    }

    /// Expand `method` from the all-unassigned state.
    pub fn plan(&self, method: &Arc<TestMethod<T>>) -> TheoryPlan<T> {
        let start = Assignments::all_unassigned(
            method.signatures(),
            self.constructor_signatures.clone(),
            self.class.context().clone(),
        );
        let expansion = expand(start, &self.config.expansion_config());
        tracing::debug!(
            method = method.name(),
            invocations = expansion.assignments.len(),
            discarded = expansion.discarded.len(),
            "computed invocations"
        );
        TheoryPlan {
            method: method.clone(),
            invocations: expansion
                .assignments
                .into_iter()
                .map(|assignments| CompletedInvocation::new(method.clone(), assignments))
                .collect(),
            discarded: expansion.discarded,
            truncated: expansion.truncated,
        }
    }

    /// Run every method of the class and report each invocation to `listener`.
    pub fn run(&self, listener: &mut dyn RunListener) -> RunReport {
        let mut report = RunReport::new(self.class.name());
        for method in self.compute_test_methods() {
            let plan = self.plan(&method);
            for branch in &plan.discarded {
                listener.discarded(method.name(), branch);
                if self.config.record_discarded {
                    report.discarded.push(DiscardReport::new(method.name(), branch));
                }
            }
            if plan.truncated {
                report.truncated.push(method.name().to_string());
            }
            self.run_plan(&plan, listener, &mut report);
        }

        tracing::info!(
            class = self.class.name(),
            passed = report.summary.passed,
            skipped = report.summary.skipped,
            failed = report.summary.failed,
            "run complete"
        );
        report
    }

    fn run_plan(&self, plan: &TheoryPlan<T>, listener: &mut dyn RunListener, report: &mut RunReport) {
        let method = plan.method.name();
        match self.config.execution {
            ExecutionMode::Sequential => {
                for invocation in &plan.invocations {
                    let name = invocation.display_name();
                    listener.test_started(&name);
                    let outcome = execute(&self.class, invocation);
                    listener.test_finished(&name, &outcome);
                    report.push(InvocationReport::new(method, name, &outcome));
                }
            }
            ExecutionMode::Parallel => {
                // Listener events are replayed in order once the batch is done.
                let outcomes: Vec<Outcome> = plan
                    .invocations
                    .par_iter()
                    .map(|invocation| execute(&self.class, invocation))
                    .collect();
                for (invocation, outcome) in plan.invocations.iter().zip(&outcomes) {
                    let name = invocation.display_name();
                    listener.test_started(&name);
                    listener.test_finished(&name, outcome);
                    report.push(InvocationReport::new(method, name, outcome));
                }
            }
        }
    }
}

impl<T> std::fmt::Debug for TheoryRunner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TheoryRunner")
            .field("class", &self.class)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postulate_explore::data_point::DataPoint;
    use postulate_model::signature::{Param, ParamType};

    fn class() -> TheoryClass<()> {
        TheoryClass::new("Ordering")
            .data_point(DataPoint::values("ints", ParamType::Int, vec![1, 2, 3]))
            .theory("first_theory", vec![Param::new(ParamType::Int)], |_, _| Ok(()))
            .test("first_test", |_| Ok(()))
            .theory("second_theory", vec![], |_, _| Ok(()))
            .test("second_test", |_| Ok(()))
    }

    #[test]
    fn test_plain_tests_come_first() {
        let runner = TheoryRunner::new(class(), RunConfig::default()).unwrap();
        let names: Vec<String> = runner
            .compute_test_methods()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, ["first_test", "second_test", "first_theory", "second_theory"]);
    }

    #[test]
    fn test_invocations_per_method() {
        let runner = TheoryRunner::new(class(), RunConfig::default()).unwrap();
        let methods = runner.compute_test_methods();
        let counts: Vec<usize> = methods
            .iter()
            .map(|m| runner.compute_invocations(m).len())
            .collect();
        assert_eq!(counts, [1, 1, 3, 1]);
    }

    #[test]
    fn test_cap_marks_plan_truncated() {
        let config = RunConfig {
            max_invocations_per_theory: 2,
            ..RunConfig::default()
        };
        let runner = TheoryRunner::new(class(), config).unwrap();
        let theory = runner.compute_test_methods()[2].clone();
        let plan = runner.plan(&theory);
        assert_eq!(plan.invocations.len(), 2);
        assert!(plan.truncated);
    }

    #[test]
    fn test_invalid_class_fails_initialization() {
        let class: TheoryClass<()> = TheoryClass::new("Bad")
            .theory("t", vec![Param::new(ParamType::Int).supplied_by("ghost")], |_, _| Ok(()));
        let err = TheoryRunner::new(class, RunConfig::default()).unwrap_err();
        let RunnerError::Initialization { class, errors } = &err;
        assert_eq!(class, "Bad");
        assert_eq!(errors.len(), 1);
        assert!(err.to_string().starts_with("Class 'Bad' failed validation: Unknown supplier"));
    }
}
