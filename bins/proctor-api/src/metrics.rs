// Prometheus metrics for the judge API

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder,
};
use proctor_common::types::JudgeResult;

lazy_static! {
    pub static ref SUBMISSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "proctor_submissions_total",
        "Judged submissions by verdict",
        &["verdict"]
    )
    .expect("metric can be registered");
    pub static ref CUSTOM_RUNS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "proctor_custom_runs_total",
        "Custom-input runs answered without judging",
        &["language"]
    )
    .expect("metric can be registered");
    pub static ref JUDGE_DURATION_SECONDS: Histogram = register_histogram!(
        "proctor_judge_duration_seconds",
        "Wall-clock time spent judging one submission",
        vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .expect("metric can be registered");
}

pub fn record_submission(result: &JudgeResult, seconds: f64) {
    SUBMISSIONS_TOTAL
        .with_label_values(&[result.verdict().as_str()])
        .inc();
    JUDGE_DURATION_SECONDS.observe(seconds);
}

/// Render all registered metrics in the Prometheus text format
pub fn render() -> Result<String, String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| e.to_string())?;
    String::from_utf8(buffer).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_counter_increments() {
        let result = JudgeResult::rejected("Problem not found");
        let before = SUBMISSIONS_TOTAL.with_label_values(&["rejected"]).get();

        record_submission(&result, 0.001);

        let after = SUBMISSIONS_TOTAL.with_label_values(&["rejected"]).get();
        assert!(after > before);
    }

    #[test]
    fn test_render_includes_metrics() {
        record_submission(&JudgeResult::rejected("x"), 0.001);

        let text = render().unwrap();
        assert!(text.contains("proctor_submissions_total"));
        assert!(text.contains("proctor_judge_duration_seconds"));
    }
}
