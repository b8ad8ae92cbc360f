// Judge limits, shared by the API server and the CLI

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Submissions shorter than this (after trimming) are treated as placeholders
pub const MIN_MEANINGFUL_CODE_CHARS: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// V8 heap ceiling for one submission
    pub memory_limit_mb: usize,
    /// Wall-clock deadline applied to each sandbox stage separately
    pub stage_timeout_ms: u64,
    pub max_source_bytes: usize,
    /// Upper bound on simultaneously live isolates
    pub max_concurrent: usize,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            memory_limit_mb: 128,
            stage_timeout_ms: 1000,
            max_source_bytes: 1024 * 1024,
            max_concurrent: 8,
        }
    }
}

impl JudgeConfig {
    /// Defaults overridden by `PROCTOR_*` environment variables
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            memory_limit_mb: parse_var(&lookup, "PROCTOR_MEMORY_LIMIT_MB", defaults.memory_limit_mb)?,
            stage_timeout_ms: parse_var(&lookup, "PROCTOR_STAGE_TIMEOUT_MS", defaults.stage_timeout_ms)?,
            max_source_bytes: parse_var(&lookup, "PROCTOR_MAX_SOURCE_BYTES", defaults.max_source_bytes)?,
            max_concurrent: parse_var(&lookup, "PROCTOR_MAX_CONCURRENT", defaults.max_concurrent)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.memory_limit_mb == 0 {
            return Err("memory_limit_mb must be greater than zero".to_string());
        }
        if self.memory_limit_mb.checked_mul(1024 * 1024).is_none() {
            return Err(format!(
                "memory_limit_mb {} does not fit in a byte count",
                self.memory_limit_mb
            ));
        }
        if self.stage_timeout_ms == 0 {
            return Err("stage_timeout_ms must be greater than zero".to_string());
        }
        if self.max_concurrent == 0 {
            return Err("max_concurrent must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn memory_limit_bytes(&self) -> usize {
        self.memory_limit_mb.saturating_mul(1024 * 1024)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("Invalid value for {}: '{}' ({})", key, raw, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = JudgeConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, JudgeConfig::default());
        assert_eq!(config.memory_limit_mb, 128);
        assert_eq!(config.stage_timeout_ms, 1000);
        assert_eq!(config.memory_limit_bytes(), 128 * 1024 * 1024);
    }

    #[test]
    fn test_env_overrides() {
        let config = JudgeConfig::from_lookup(lookup_from(&[
            ("PROCTOR_MEMORY_LIMIT_MB", "64"),
            ("PROCTOR_STAGE_TIMEOUT_MS", " 250 "),
            ("PROCTOR_MAX_CONCURRENT", "2"),
        ]))
        .unwrap();

        assert_eq!(config.memory_limit_mb, 64);
        assert_eq!(config.stage_timeout_ms, 250);
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.max_source_bytes, 1024 * 1024);
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let err = JudgeConfig::from_lookup(lookup_from(&[("PROCTOR_STAGE_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(err.contains("PROCTOR_STAGE_TIMEOUT_MS"));
    }

    #[test]
    fn test_oversized_memory_limit_rejected() {
        let huge = (usize::MAX / 1024).to_string();
        let err = JudgeConfig::from_lookup(lookup_from(&[("PROCTOR_MEMORY_LIMIT_MB", &huge)]))
            .unwrap_err();
        assert!(err.contains("memory_limit_mb"));

        let config = JudgeConfig {
            memory_limit_mb: usize::MAX,
            ..Default::default()
        };
        assert_eq!(config.memory_limit_bytes(), usize::MAX);
    }

    #[test]
    fn test_zero_limits_rejected() {
        let err = JudgeConfig::from_lookup(lookup_from(&[("PROCTOR_MAX_CONCURRENT", "0")]))
            .unwrap_err();
        assert!(err.contains("max_concurrent"));
    }
}
