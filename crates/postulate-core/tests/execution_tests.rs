use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use postulate_core::config::RunConfig;
use postulate_core::execute::{execute, InvocationFailure, Outcome, OutcomeKind};
use postulate_core::listener::{RecordingListener, SilentListener};
use postulate_core::{TheoryClass, TheoryRunner};
use postulate_explore::data_point::DataPoint;
use postulate_model::failure::{ensure, fail, TheoryFailure};
use postulate_model::signature::{Param, ParamType};
use postulate_model::value::{Describe, Value, RENDER_FAILED};

#[derive(Debug)]
struct Scaled {
    factor: i64,
}

fn scaling_class() -> TheoryClass<Scaled> {
    TheoryClass::with_constructor(
        "Scaling",
        vec![Param::new(ParamType::Int).named("factor").from_data_points("factors")],
        |args: &[Value]| {
            let factor = args[0].as_int().unwrap_or(1);
            if factor == 0 {
                return Err(TheoryFailure::AssumptionViolated("zero factor".into()));
            }
            Ok(Scaled { factor })
        },
    )
    .data_point(DataPoint::values("factors", ParamType::Int, vec![0, 10, 20]).in_group("factors"))
    .data_point(DataPoint::values("inputs", ParamType::Int, vec![1, 2]).in_group("inputs"))
    .theory(
        "scales",
        vec![Param::new(ParamType::Int).from_data_points("inputs")],
        |fixture: &Scaled, args| ensure(fixture.factor * args[0].as_int().unwrap_or(0) < 40, "too big"),
    )
}

fn outcomes_of<T: 'static>(runner: &TheoryRunner<T>) -> Vec<(String, Outcome)> {
    runner
        .compute_test_methods()
        .iter()
        .flat_map(|method| runner.compute_invocations(method))
        .map(|invocation| (invocation.display_name(), execute(runner.class(), &invocation)))
        .collect()
}

#[test]
fn test_constructor_arguments_bind_before_method_arguments() {
    let runner = TheoryRunner::new(scaling_class(), RunConfig::default()).unwrap();
    let method = runner.compute_test_methods()[0].clone();
    let invocations = runner.compute_invocations(&method);
    assert_eq!(invocations.len(), 6);
    let last = &invocations[5];
    assert_eq!(last.constructor_arguments().unwrap(), vec![Value::Int(20)]);
    assert_eq!(last.method_arguments().unwrap(), vec![Value::Int(2)]);
    assert_eq!(last.display_name(), "scales(20 <from factors[2]>, 2 <from inputs[1]>)");
}

#[test]
fn test_factory_assumption_skips_and_failure_names_constructor_arguments() {
    let runner = TheoryRunner::new(scaling_class(), RunConfig::default()).unwrap();
    let results = outcomes_of(&runner);
    let kinds: Vec<OutcomeKind> = results.iter().map(|(_, o)| o.kind()).collect();
    assert_eq!(
        kinds,
        [
            OutcomeKind::Skipped,
            OutcomeKind::Skipped,
            OutcomeKind::Passed,
            OutcomeKind::Passed,
            OutcomeKind::Passed,
            OutcomeKind::Failed,
        ]
    );
    match &results[5].1 {
        Outcome::Failed(InvocationFailure::Parameterized(failure)) => {
            assert_eq!(failure.method, "scales");
            assert_eq!(failure.args, ["20 <from factors[2]>", "2 <from inputs[1]>"]);
            assert_eq!(failure.cause.to_string(), "too big");
        }
        other => panic!("expected parameterized failure, got {other:?}"),
    }
}

#[test]
fn test_plain_test_failure_is_not_wrapped() {
    let class: TheoryClass<()> = TheoryClass::new("Plain").test("broken", |_| Err(fail("boom")));
    let runner = TheoryRunner::new(class, RunConfig::default()).unwrap();
    let results = outcomes_of(&runner);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, "broken()");
    match &results[0].1 {
        Outcome::Failed(InvocationFailure::Unwrapped(TheoryFailure::Assertion(msg))) => assert_eq!(msg, "boom"),
        other => panic!("expected unwrapped failure, got {other:?}"),
    }
}

#[test]
fn test_panicking_body_fails_only_its_combination() {
    let class: TheoryClass<()> = TheoryClass::new("Panics")
        .data_point(DataPoint::values("nums", ParamType::Int, vec![1, 2]))
        .theory("explodes_on_two", vec![Param::new(ParamType::Int)], |_, args| {
            if args[0] == Value::Int(2) {
                panic!("bad input");
            }
            Ok(())
        });
    let runner = TheoryRunner::new(class, RunConfig::default()).unwrap();
    let mut listener = RecordingListener::new();
    let report = runner.run(&mut listener);
    assert_eq!(report.summary.passed, 1);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(
        report.invocations[1].message.as_deref(),
        Some("explodes_on_two(2 <from nums[1]>): panicked: bad input")
    );
}

#[test]
fn test_after_hook_runs_even_when_body_fails() {
    let before = Arc::new(AtomicUsize::new(0));
    let after = Arc::new(AtomicUsize::new(0));
    let (b, a) = (before.clone(), after.clone());
    let class: TheoryClass<()> = TheoryClass::new("Hooks")
        .data_point(DataPoint::values("nums", ParamType::Int, vec![1, 2]))
        .before_each(move |_| {
            b.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .after_each(move |_| {
            a.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .theory("always_fails", vec![Param::new(ParamType::Int)], |_, _| Err(fail("no")));
    let runner = TheoryRunner::new(class, RunConfig::default()).unwrap();
    let report = runner.run(&mut RecordingListener::new());
    assert_eq!(report.summary.failed, 2);
    assert_eq!(before.load(Ordering::SeqCst), 2);
    assert_eq!(after.load(Ordering::SeqCst), 2);
}

#[test]
fn test_before_hook_assumption_skips_without_running_body() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let class: TheoryClass<()> = TheoryClass::new("Gate")
        .before_each(|_| Err(TheoryFailure::AssumptionViolated("environment not ready".into())))
        .test("gated", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    let runner = TheoryRunner::new(class, RunConfig::default()).unwrap();
    let results = outcomes_of(&runner);
    assert_eq!(results[0].1.kind(), OutcomeKind::Skipped);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_body_failure_wins_over_teardown_failure() {
    let class: TheoryClass<()> = TheoryClass::new("Teardown")
        .after_each(|_| Err(fail("teardown failed")))
        .test("fails_first", |_| Err(fail("body failed")))
        .test("passes", |_| Ok(()));
    let runner = TheoryRunner::new(class, RunConfig::default()).unwrap();
    let messages: Vec<Option<String>> = outcomes_of(&runner).iter().map(|(_, o)| o.message()).collect();
    assert_eq!(
        messages,
        [Some("body failed".to_string()), Some("teardown failed".to_string())]
    );
}

#[derive(Debug)]
struct Unprintable;

impl Describe for Unprintable {
    fn type_name(&self) -> &str {
        "Unprintable"
    }

    fn describe(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        Err(fmt::Error)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn test_broken_rendering_degrades_to_placeholder() {
    let class: TheoryClass<()> = TheoryClass::new("Opaque")
        .data_point(DataPoint::value("thing", Value::opaque(Unprintable)))
        .theory(
            "rejects",
            vec![Param::new(ParamType::Named("Unprintable".into()))],
            |_, _| Err(fail("rejected")),
        );
    let runner = TheoryRunner::new(class, RunConfig::default()).unwrap();
    let results = outcomes_of(&runner);
    assert_eq!(results[0].0, format!("rejects({RENDER_FAILED} <from thing>)"));
    assert_eq!(
        results[0].1.message().as_deref(),
        Some(format!("rejects({RENDER_FAILED} <from thing>): rejected").as_str())
    );
}

#[test]
fn test_invocations_compare_by_method_and_values() {
    let runner = TheoryRunner::new(scaling_class(), RunConfig::default()).unwrap();
    let method = runner.compute_test_methods()[0].clone();
    let first = runner.compute_invocations(&method);
    let second = runner.compute_invocations(&method);
    assert_eq!(first, second);
    assert_ne!(first[0], first[1]);
}

#[test]
fn test_null_constructor_argument_skips_before_construction() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let class = TheoryClass::with_constructor(
        "Seeded",
        vec![Param::new(ParamType::Int).named("seed").from_data_points("seeds")],
        move |args: &[Value]| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(args[0].as_int().unwrap_or_default())
        },
    )
    .data_point(DataPoint::typed("absent", ParamType::Int, Value::Null).in_group("seeds"))
    .data_point(DataPoint::values("present", ParamType::Int, vec![5]).in_group("seeds"))
    .test("uses_seed", |seed: &i64| ensure(*seed == 5, "wrong seed"));
    let runner = TheoryRunner::new(class, RunConfig::default()).unwrap();
    let results = outcomes_of(&runner);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "uses_seed(null <from absent>)");
    assert_eq!(results[0].1.kind(), OutcomeKind::Skipped);
    assert_eq!(
        results[0].1.message().as_deref(),
        Some("assumption violated: argument 0 is null")
    );
    assert_eq!(results[1].1.kind(), OutcomeKind::Passed);
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[derive(Debug)]
struct Explosive;

impl Describe for Explosive {
    fn type_name(&self) -> &str {
        "Explosive"
    }

    fn describe(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        panic!("describe blew up")
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn test_panicking_rendering_does_not_stop_the_run() {
    let class: TheoryClass<()> = TheoryClass::new("Explosive")
        .data_point(DataPoint::value("bomb", Value::opaque(Explosive)))
        .theory(
            "rejects",
            vec![Param::new(ParamType::Named("Explosive".into()))],
            |_, _| Err(fail("rejected")),
        )
        .test("sibling", |_| Ok(()));
    let runner = TheoryRunner::new(class, RunConfig::default()).unwrap();
    let report = runner.run(&mut SilentListener);
    assert_eq!(report.summary.passed, 1);
    assert_eq!(report.summary.failed, 1);
    let failed = report.failures().next().unwrap();
    assert_eq!(failed.display_name, format!("rejects({RENDER_FAILED} <from bomb>)"));
    assert_eq!(
        failed.message.as_deref(),
        Some(format!("rejects({RENDER_FAILED} <from bomb>): rejected").as_str())
    );
}
