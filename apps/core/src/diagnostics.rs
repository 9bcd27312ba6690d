//! Diagnostic Self-Test Module
//!
//! Runs every analysis task on a sample paragraph plus the remote connection
//! check. Used by `textlens --self-test` and for troubleshooting.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, info};

use crate::analysis::{AnalysisOrchestrator, Method};

pub const DEFAULT_SAMPLE: &str = "This is an amazing product! I absolutely love how easy it is to use. \
    The quality is excellent and the customer service was wonderful. \
    Highly recommended for everyone looking for a great solution.";

// --- Test Result Types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub category: String,
    pub passed: bool,
    pub duration_ms: u64,
    pub message: String,
    /// Cascade stage that answered, for analysis tests
    pub method: Option<Method>,
}

impl TestResult {
    fn pass(
        name: &str,
        category: &str,
        duration: Duration,
        message: &str,
        method: Option<Method>,
    ) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            passed: true,
            duration_ms: duration.as_millis() as u64,
            message: message.to_string(),
            method,
        }
    }

    fn fail(
        name: &str,
        category: &str,
        duration: Duration,
        message: &str,
        method: Option<Method>,
    ) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            passed: false,
            duration_ms: duration.as_millis() as u64,
            message: message.to_string(),
            method,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    /// passed / total, in percent
    pub success_rate: f64,
    pub total_duration_ms: u64,
    pub results: Vec<TestResult>,
}

// --- Main Test Runner ---

/// Runs all self-tests sequentially on `sample` (or [`DEFAULT_SAMPLE`]).
pub async fn run_self_test(
    orchestrator: &AnalysisOrchestrator,
    sample: Option<&str>,
) -> DiagnosticReport {
    info!("Running self-test");

    let sample = sample.unwrap_or(DEFAULT_SAMPLE);
    let start = Instant::now();
    let mut results = Vec::new();

    let mut record = |result: TestResult| {
        if result.passed {
            info!("  PASS {} - {} ({}ms)", result.name, result.message, result.duration_ms);
        } else {
            error!("  FAIL {} - {} ({}ms)", result.name, result.message, result.duration_ms);
        }
        results.push(result);
    };

    record(test_sentiment(orchestrator, sample).await);
    record(test_keywords(orchestrator, sample).await);
    record(test_emotion(orchestrator, sample).await);
    record(test_summary(orchestrator, sample).await);
    record(test_remote_connection(orchestrator).await);

    let total_tests = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let success_rate = if total_tests == 0 {
        0.0
    } else {
        (passed as f64 / total_tests as f64 * 10_000.0).round() / 100.0
    };

    let report = DiagnosticReport {
        total_tests,
        passed,
        failed: total_tests - passed,
        success_rate,
        total_duration_ms: start.elapsed().as_millis() as u64,
        results,
    };

    info!(
        "Self-test finished: {}/{} passed ({}%)",
        report.passed, report.total_tests, report.success_rate
    );
    report
}

fn sums_to_hundred(total: f64) -> bool {
    (total - 100.0).abs() <= 0.01
}

async fn test_sentiment(orchestrator: &AnalysisOrchestrator, sample: &str) -> TestResult {
    let start = Instant::now();
    let name = "sentiment";
    let category = "analysis";

    let result = orchestrator.analyze_sentiment(sample).await;
    if sums_to_hundred(result.report.scores.total()) {
        TestResult::pass(
            name,
            category,
            start.elapsed(),
            &format!("{} ({}%)", result.report.label, result.report.confidence),
            Some(result.method),
        )
    } else {
        TestResult::fail(
            name,
            category,
            start.elapsed(),
            &format!("Scores sum to {}", result.report.scores.total()),
            Some(result.method),
        )
    }
}

async fn test_keywords(orchestrator: &AnalysisOrchestrator, sample: &str) -> TestResult {
    let start = Instant::now();
    let name = "keywords";
    let category = "analysis";

    let result = orchestrator.extract_keywords(sample).await;
    if !result.report.keywords.is_empty() {
        let words: Vec<&str> = result
            .report
            .keywords
            .iter()
            .map(|k| k.word.as_str())
            .collect();
        TestResult::pass(
            name,
            category,
            start.elapsed(),
            &format!("Extracted {} keywords: {:?}", words.len(), words),
            Some(result.method),
        )
    } else {
        TestResult::fail(
            name,
            category,
            start.elapsed(),
            "No keywords extracted",
            Some(result.method),
        )
    }
}

async fn test_emotion(orchestrator: &AnalysisOrchestrator, sample: &str) -> TestResult {
    let start = Instant::now();
    let name = "emotion";
    let category = "analysis";

    let result = orchestrator.detect_emotion(sample).await;
    if sums_to_hundred(result.report.all_scores.total()) {
        TestResult::pass(
            name,
            category,
            start.elapsed(),
            &format!("{} ({}%)", result.report.primary, result.report.primary_score),
            Some(result.method),
        )
    } else {
        TestResult::fail(
            name,
            category,
            start.elapsed(),
            &format!("Scores sum to {}", result.report.all_scores.total()),
            Some(result.method),
        )
    }
}

async fn test_summary(orchestrator: &AnalysisOrchestrator, sample: &str) -> TestResult {
    let start = Instant::now();
    let name = "summary";
    let category = "analysis";

    let result = orchestrator.summarize_text(sample).await;
    if !result.report.summary.trim().is_empty() {
        TestResult::pass(
            name,
            category,
            start.elapsed(),
            &format!(
                "{} of {} words kept",
                result.report.summary_word_count, result.report.original_word_count
            ),
            Some(result.method),
        )
    } else {
        TestResult::fail(
            name,
            category,
            start.elapsed(),
            "Empty summary",
            Some(result.method),
        )
    }
}

async fn test_remote_connection(orchestrator: &AnalysisOrchestrator) -> TestResult {
    let start = Instant::now();
    let name = "remote_connection";
    let category = "remote";

    match orchestrator.check_connection().await {
        Ok(account) => TestResult::pass(
            name,
            category,
            start.elapsed(),
            &format!("Connected as {}", account),
            Some(Method::Remote),
        ),
        Err(e) => TestResult::fail(name, category, start.elapsed(), &e.to_string(), None),
    }
}
