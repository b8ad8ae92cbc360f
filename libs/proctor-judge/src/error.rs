use std::fmt;
use thiserror::Error;

/// Sandbox stages; each one runs under its own wall-clock deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Trusted harness bootstrap
    Harness,
    /// Candidate source evaluation
    Candidate,
    /// Batch invocation of every test case
    Tests,
}

impl Stage {
    /// Script name V8 reports in stack traces
    pub fn script_name(&self) -> &'static str {
        match self {
            Stage::Harness => "[proctor:harness]",
            Stage::Candidate => "[proctor:candidate]",
            Stage::Tests => "[proctor:tests]",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Harness => write!(f, "harness"),
            Stage::Candidate => write!(f, "candidate"),
            Stage::Tests => write!(f, "tests"),
        }
    }
}

/// Failures that abort a whole submission.
/// Display text is what the candidate sees after `Execution Error: `.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("Script execution timed out.")]
    Timeout { stage: Stage, timeout_ms: u64 },

    #[error("Memory limit of {limit_mb} MB exceeded")]
    MemoryLimit { limit_mb: usize },

    #[error("{message}")]
    Script { stage: Stage, message: String },

    #[error("Function '{name}' is not defined. Did you change the function name?")]
    EntryNotFound { name: String },

    #[error("malformed harness report: {0}")]
    Protocol(String),

    #[error("sandbox thread failed: {0}")]
    Thread(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_match_candidate_facing_text() {
        let err = SandboxError::EntryNotFound {
            name: "twoSum".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Function 'twoSum' is not defined. Did you change the function name?"
        );

        let err = SandboxError::Timeout {
            stage: Stage::Tests,
            timeout_ms: 1000,
        };
        assert_eq!(err.to_string(), "Script execution timed out.");

        let err = SandboxError::MemoryLimit { limit_mb: 128 };
        assert_eq!(err.to_string(), "Memory limit of 128 MB exceeded");
    }

    #[test]
    fn test_stage_script_names_are_distinct() {
        assert_ne!(Stage::Harness.script_name(), Stage::Candidate.script_name());
        assert_ne!(Stage::Candidate.script_name(), Stage::Tests.script_name());
    }
}
