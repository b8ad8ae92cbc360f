/// Judge Service - High-Level Orchestration
///
/// **Responsibility:**
/// Turn `(code, language, problem_id)` into a `JudgeResult`, never an error.
///
/// **Architecture:**
/// 1. Reject trivial code, unsupported languages and oversized sources
/// 2. Resolve the problem through the injected `ProblemStore`
/// 3. Run the sandbox on its own thread (sandbox.rs)
/// 4. Score the raw runs (evaluator.rs)
///
/// This module is the glue layer - it knows nothing about:
/// - How code executes (sandbox's job)
/// - How scoring works (evaluator's job)
use crate::evaluator;
use crate::sandbox::{SandboxConfig, SandboxExecutor};
use crate::store::ProblemStore;
use proctor_common::config::{JudgeConfig, MIN_MEANINGFUL_CODE_CHARS};
use proctor_common::types::{JudgeResult, Language, Problem};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};

pub const FEEDBACK_TRIVIAL_CODE: &str = "No meaningful logic implemented";
pub const FEEDBACK_PROBLEM_NOT_FOUND: &str = "Problem not found";

/// Whether `code` is too short to be a real attempt, ignoring surrounding whitespace
pub fn is_trivial_code(code: &str) -> bool {
    code.trim().chars().count() < MIN_MEANINGFUL_CODE_CHARS
}

#[derive(Clone)]
pub struct JudgeService {
    store: Arc<dyn ProblemStore>,
    executor: SandboxExecutor,
    config: JudgeConfig,
    permits: Arc<Semaphore>,
}

impl JudgeService {
    pub fn new(store: Arc<dyn ProblemStore>, config: JudgeConfig) -> Self {
        let executor = SandboxExecutor::new(SandboxConfig::from(&config));
        let permits = Arc::new(Semaphore::new(config.max_concurrent));
        Self {
            store,
            executor,
            config,
            permits,
        }
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ProblemStore> {
        &self.store
    }

    /// Judge one submission against a stored problem.
    ///
    /// Guards run in order and short-circuit: trivial code, language,
    /// source size, problem lookup.
    #[instrument(skip(self, code), fields(code_len = code.len()))]
    pub async fn run(&self, code: &str, language: &str, problem_id: &str) -> JudgeResult {
        if is_trivial_code(code) {
            info!("Rejected trivial submission");
            return JudgeResult::rejected(FEEDBACK_TRIVIAL_CODE);
        }

        let supported = Language::JavaScript;
        if Language::from_str(language) != Some(supported) {
            info!("Rejected unsupported language");
            return JudgeResult::rejected(format!(
                "Only {} supported for now",
                supported.display_name()
            ));
        }

        if code.len() > self.config.max_source_bytes {
            info!("Rejected oversized submission");
            return JudgeResult::rejected(format!(
                "Source code exceeds maximum size of {} bytes",
                self.config.max_source_bytes
            ));
        }

        let problem = match self.store.get_problem(problem_id).await {
            Ok(Some(problem)) => problem,
            Ok(None) => {
                info!("Problem not found");
                return JudgeResult::rejected(FEEDBACK_PROBLEM_NOT_FOUND);
            }
            Err(e) => {
                error!(error = %e, "Problem lookup failed");
                return JudgeResult::rejected(format!("Problem lookup failed: {}", e));
            }
        };

        self.judge(&problem, code).await
    }

    /// Run `code` against an already-resolved problem
    pub async fn judge(&self, problem: &Problem, code: &str) -> JudgeResult {
        let total_tests = problem.test_cases.len();

        let permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return JudgeResult::execution_error(total_tests, "judge is shutting down"),
        };

        let started = Instant::now();
        let runs = self
            .executor
            .execute_isolated(
                code.to_string(),
                problem.test_cases.clone(),
                problem.entry_function_name.clone(),
                Some(permit),
            )
            .await;
        let execution_ms = started.elapsed().as_millis() as u64;

        match runs {
            Ok(runs) => {
                let result = evaluator::evaluate(&problem.test_cases, &runs);
                info!(
                    problem_id = %problem.id,
                    pass_count = result.pass_count,
                    total_tests = result.total_tests,
                    execution_ms,
                    "Submission judged"
                );
                result
            }
            Err(e) => {
                warn!(
                    problem_id = %problem.id,
                    error = %e,
                    execution_ms,
                    "Submission aborted"
                );
                JudgeResult::execution_error(total_tests, &e.to_string())
            }
        }
    }
}
