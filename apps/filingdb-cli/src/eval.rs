//! Scores the engine against a labelled question set.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use filingdb_answer::Engine;
use filingdb_core::types::AnswerResponse;

/// One line of a JSONL test set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestCase {
    pub question: String,
    #[serde(default)]
    pub expect_abstain: bool,
    #[serde(default)]
    pub expected_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalDetail {
    pub question: String,
    pub abstained: bool,
    pub confidence: f32,
    pub correct: bool,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalReport {
    pub total: usize,
    pub answered: usize,
    pub abstained: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub avg_confidence: f64,
    pub citations_provided: usize,
    pub details: Vec<EvalDetail>,
}

/// Parses a JSONL file, skipping blank lines.
pub fn load_test_cases(path: &Path) -> Result<Vec<TestCase>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading test set {}", path.display()))?;
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).with_context(|| format!("{}:{}: malformed test case", path.display(), n + 1))
        })
        .collect()
}

/// An abstention is correct only when one was expected. An answer is correct
/// when it mentions any expected keyword (case-insensitive), or, with no
/// keywords given, when no abstention was expected.
pub fn is_correct(case: &TestCase, response: &AnswerResponse) -> bool {
    if response.abstained {
        return case.expect_abstain;
    }
    if case.expected_keywords.is_empty() {
        return !case.expect_abstain;
    }
    let answer = response.answer.to_lowercase();
    case.expected_keywords.iter().any(|k| answer.contains(&k.to_lowercase()))
}

pub fn evaluate(engine: &Engine, cases: &[TestCase]) -> EvalReport {
    let mut details = Vec::with_capacity(cases.len());
    let mut confidence_sum = 0.0f64;
    let mut citations_provided = 0;

    for case in cases {
        let response = engine.answer_question(&case.question);
        confidence_sum += f64::from(response.confidence);
        if !response.citations.is_empty() {
            citations_provided += 1;
        }
        details.push(EvalDetail {
            question: case.question.clone(),
            abstained: response.abstained,
            confidence: response.confidence,
            correct: is_correct(case, &response),
            answer: response.answer,
        });
    }

    let total = details.len();
    let abstained = details.iter().filter(|d| d.abstained).count();
    let correct = details.iter().filter(|d| d.correct).count();
    let ratio = |n: f64| if total == 0 { 0.0 } else { n / total as f64 };
    EvalReport {
        total,
        answered: total - abstained,
        abstained,
        correct,
        accuracy: ratio(correct as f64),
        avg_confidence: ratio(confidence_sum),
        citations_provided,
        details,
    }
}
