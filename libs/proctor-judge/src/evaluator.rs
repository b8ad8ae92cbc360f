/// Result Evaluator - Language-Agnostic Scoring Logic
///
/// **Core Responsibility:**
/// Compare raw case runs against expected values and build the `JudgeResult`.
///
/// **Critical Properties:**
/// - Knows nothing about V8
/// - Knows nothing about the problem store
/// - Pure function: (test cases, case runs) → JudgeResult
///
/// **Scoring Rules:**
/// - A case passes iff the canonical rendering of the returned value equals
///   the canonical rendering of `expected` (see `proctor_common::value`)
/// - A thrown error or an `undefined` return always fails
/// - passed = total_tests > 0 && pass_count == total_tests
///
/// **Reporting Rules:**
/// - Labels are `Case 1`, `Case 2`, ... in test case order
/// - Hidden cases are counted but their data is replaced by a placeholder
use proctor_common::types::{
    CaseStatus, ExecutionOutcome, JudgeResult, TestCase, HIDDEN_PLACEHOLDER,
};
use proctor_common::value::Value;
use tracing::debug;

use crate::harness::CaseRun;

/// Rendering used when the entry function returned nothing serializable
const UNDEFINED_RENDERING: &str = "undefined";

pub fn case_label(index: usize) -> String {
    format!("Case {}", index + 1)
}

/// Evaluate a single test case run
pub fn evaluate_case(index: usize, test_case: &TestCase, run: &CaseRun) -> ExecutionOutcome {
    let expected_rendering = test_case.expected.canonical();

    let (status, actual_rendering, error_message) = match run {
        CaseRun::Returned(value) => {
            let actual = value.canonical();
            let status = if actual == expected_rendering {
                CaseStatus::Passed
            } else {
                CaseStatus::Failed
            };
            (status, actual, None)
        }
        CaseRun::Undefined => (CaseStatus::Failed, UNDEFINED_RENDERING.to_string(), None),
        CaseRun::Threw(message) => (
            CaseStatus::Failed,
            format!("Error: {}", message),
            Some(message.clone()),
        ),
    };

    let mut outcome = ExecutionOutcome {
        case_label: case_label(index),
        status,
        input_rendering: Value::Array(test_case.input.clone()).canonical(),
        expected_rendering,
        actual_rendering,
        error_message,
        hidden: test_case.hidden,
    };

    if test_case.hidden {
        outcome.input_rendering = HIDDEN_PLACEHOLDER.to_string();
        outcome.expected_rendering = HIDDEN_PLACEHOLDER.to_string();
        outcome.actual_rendering = HIDDEN_PLACEHOLDER.to_string();
        outcome.error_message = None;
    }

    outcome
}

/// Feedback line for a submission whose cases all ran
pub fn summarize(pass_count: usize, total_tests: usize) -> String {
    if total_tests == 0 {
        "No test cases to run".to_string()
    } else if pass_count == total_tests {
        format!("All {} test cases passed", total_tests)
    } else {
        format!("{} of {} test cases passed", pass_count, total_tests)
    }
}

/// Aggregate per-case outcomes into the final result
pub fn aggregate_results(outcomes: Vec<ExecutionOutcome>) -> JudgeResult {
    let total_tests = outcomes.len();
    let pass_count = outcomes.iter().filter(|o| o.passed()).count();
    let passed = total_tests > 0 && pass_count == total_tests;

    debug!(pass_count, total_tests, passed, "Evaluation complete");

    JudgeResult {
        passed,
        pass_count,
        total_tests,
        results: outcomes,
        feedback: summarize(pass_count, total_tests),
    }
}

/// Evaluate all case runs and produce the final result.
///
/// `runs` comes from the sandbox and holds exactly one entry per test case.
pub fn evaluate(test_cases: &[TestCase], runs: &[CaseRun]) -> JudgeResult {
    let outcomes = test_cases
        .iter()
        .zip(runs)
        .enumerate()
        .map(|(idx, (test_case, run))| evaluate_case(idx, test_case, run))
        .collect();

    aggregate_results(outcomes)
}
