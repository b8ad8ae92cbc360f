use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder shown instead of hidden test case data
pub const HIDDEN_PLACEHOLDER: &str = "Hidden";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
}

impl Language {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "javascript" => Some(Language::JavaScript),
            _ => None,
        }
    }

    /// Human-facing name used in feedback messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::JavaScript => write!(f, "javascript"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Positional arguments, spread into the entry function call
    pub input: Vec<Value>,
    pub expected: Value,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "functionName", alias = "entryFunctionName")]
    pub entry_function_name: String,
    #[serde(default)]
    pub starter_code: BTreeMap<String, String>,
    pub test_cases: Vec<TestCase>,
}

impl Problem {
    /// Copy of the problem with hidden test cases removed, safe to show a candidate
    pub fn candidate_view(&self) -> Problem {
        Problem {
            test_cases: self
                .test_cases
                .iter()
                .filter(|tc| !tc.hidden)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseStatus {
    Passed,
    Failed,
}

/// Outcome of one test case, in candidate-facing form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    #[serde(rename = "case")]
    pub case_label: String,
    pub status: CaseStatus,
    #[serde(rename = "input")]
    pub input_rendering: String,
    #[serde(rename = "expected")]
    pub expected_rendering: String,
    #[serde(rename = "actual")]
    pub actual_rendering: String,
    #[serde(rename = "error", default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl ExecutionOutcome {
    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }
}

/// Complete, exception-free outcome of one submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeResult {
    pub passed: bool,
    pub pass_count: usize,
    pub total_tests: usize,
    pub results: Vec<ExecutionOutcome>,
    pub feedback: String,
}

/// Coarse classification of a result, used for metrics and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every test case passed
    Accepted,
    /// Code ran, at least one case failed
    WrongAnswer,
    /// Code never ran (entry missing, load failure, resource limit)
    ExecutionError,
    /// Rejected before a sandbox was created
    Rejected,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Accepted => "accepted",
            Verdict::WrongAnswer => "wrong_answer",
            Verdict::ExecutionError => "execution_error",
            Verdict::Rejected => "rejected",
        }
    }
}

impl JudgeResult {
    /// Input rejected before any execution took place
    pub fn rejected(feedback: impl Into<String>) -> Self {
        Self {
            passed: false,
            pass_count: 0,
            total_tests: 0,
            results: Vec::new(),
            feedback: feedback.into(),
        }
    }

    /// The submission could not run to completion; no case is scored
    pub fn execution_error(total_tests: usize, message: &str) -> Self {
        Self {
            passed: false,
            pass_count: 0,
            total_tests,
            results: Vec::new(),
            feedback: format!("Execution Error: {}", message),
        }
    }

    pub fn verdict(&self) -> Verdict {
        if self.passed {
            Verdict::Accepted
        } else if !self.results.is_empty() {
            Verdict::WrongAnswer
        } else if self.total_tests > 0 {
            Verdict::ExecutionError
        } else {
            Verdict::Rejected
        }
    }
}

/// Body of `POST /evaluate`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub problem_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_input: Option<serde_json::Value>,
}

impl EvaluateRequest {
    /// Custom-input dry runs are not judged
    pub fn is_custom_run(&self) -> bool {
        self.mode.as_deref() == Some("custom")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_language_parsing() {
        assert_eq!(Language::from_str("javascript"), Some(Language::JavaScript));
        assert_eq!(Language::from_str("ruby"), None);
        assert_eq!(Language::from_str("JavaScript"), None);
        assert_eq!(Language::JavaScript.to_string(), "javascript");
    }

    #[test]
    fn test_problem_accepts_both_entry_names() {
        let original: Problem = serde_json::from_value(json!({
            "id": "two-sum",
            "functionName": "twoSum",
            "testCases": [{"input": [[3, 3], 6], "expected": [0, 1], "hidden": true}]
        }))
        .unwrap();
        let aliased: Problem = serde_json::from_value(json!({
            "id": "two-sum",
            "entryFunctionName": "twoSum",
            "testCases": [{"input": [[3, 3], 6], "expected": [0, 1], "hidden": true}]
        }))
        .unwrap();

        assert_eq!(original, aliased);
        assert_eq!(original.entry_function_name, "twoSum");
        assert!(original.test_cases[0].hidden);
    }

    #[test]
    fn test_hidden_defaults_to_false() {
        let tc: TestCase = serde_json::from_value(json!({"input": [1], "expected": 2})).unwrap();
        assert!(!tc.hidden);
    }

    #[test]
    fn test_candidate_view_drops_hidden_cases() {
        let problem: Problem = serde_json::from_value(json!({
            "id": "p",
            "functionName": "f",
            "testCases": [
                {"input": [1], "expected": 1},
                {"input": [2], "expected": 2, "hidden": true}
            ]
        }))
        .unwrap();

        let view = problem.candidate_view();
        assert_eq!(view.test_cases.len(), 1);
        assert_eq!(view.entry_function_name, "f");
    }

    #[test]
    fn test_judge_result_wire_shape() {
        let result = JudgeResult {
            passed: false,
            pass_count: 0,
            total_tests: 1,
            results: vec![ExecutionOutcome {
                case_label: "Case 1".to_string(),
                status: CaseStatus::Failed,
                input_rendering: "[1]".to_string(),
                expected_rendering: "2".to_string(),
                actual_rendering: "Error: boom".to_string(),
                error_message: Some("boom".to_string()),
                hidden: false,
            }],
            feedback: "0 of 1 test cases passed".to_string(),
        };

        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(
            wire,
            json!({
                "passed": false,
                "passCount": 0,
                "totalTests": 1,
                "results": [{
                    "case": "Case 1",
                    "status": "Failed",
                    "input": "[1]",
                    "expected": "2",
                    "actual": "Error: boom",
                    "error": "boom"
                }],
                "feedback": "0 of 1 test cases passed"
            })
        );
    }

    #[test]
    fn test_rejected_shape() {
        let result = JudgeResult::rejected("Problem not found");
        assert!(!result.passed);
        assert_eq!(result.total_tests, 0);
        assert!(result.results.is_empty());
        assert_eq!(result.verdict(), Verdict::Rejected);
    }

    #[test]
    fn test_execution_error_keeps_total() {
        let result = JudgeResult::execution_error(3, "Script execution timed out.");
        assert_eq!(result.total_tests, 3);
        assert_eq!(result.feedback, "Execution Error: Script execution timed out.");
        assert_eq!(result.verdict(), Verdict::ExecutionError);
    }

    #[test]
    fn test_custom_mode_detection() {
        let req: EvaluateRequest = serde_json::from_value(json!({
            "code": "x", "language": "javascript", "problemId": "p", "mode": "custom"
        }))
        .unwrap();
        assert!(req.is_custom_run());

        let req: EvaluateRequest = serde_json::from_value(json!({
            "code": "x", "language": "javascript", "problemId": "p"
        }))
        .unwrap();
        assert!(!req.is_custom_run());
    }
}
