//! Extractive answers and citations from ranked chunks.

use std::collections::HashSet;

use filingdb_core::config::{AnswerConfig, TermPolicy};
use filingdb_core::traits::Retriever;
use filingdb_core::types::{AnswerResponse, Citation, RetrievalResult};
use filingdb_text::tokenize::tokenize;

use crate::policy::Decision;

pub const ABSTAIN_ANSWER: &str = "I am not confident enough in the indexed filings to answer this question.";

/// Builds the response for `question` from an already-ranked `result`.
///
/// Never produces text that is not present in a retrieved chunk: the answer
/// is a selection of sentences (or a leading excerpt) of the top chunk.
pub fn compose<R>(
    question: &str,
    result: &RetrievalResult,
    retriever: &R,
    decision: Decision,
    config: &AnswerConfig,
) -> AnswerResponse
where
    R: Retriever + ?Sized,
{
    if decision.abstain {
        let message = if result.is_empty() {
            "No relevant information found.".to_string()
        } else {
            format!("Confidence too low ({:.2}).", decision.confidence)
        };
        return abstention(decision.confidence, message);
    }

    let Some(top) = result.top().and_then(|hit| retriever.chunk(hit.chunk_id)) else {
        tracing::warn!("top-ranked chunk missing from the index");
        return abstention(decision.confidence, "Top-ranked passage is unavailable.".to_string());
    };

    let citations = result
        .iter()
        .filter_map(|hit| {
            retriever.chunk(hit.chunk_id).map(|chunk| Citation {
                source: chunk.source.clone(),
                chunk_id: chunk.chunk_id,
                text: chunk.text.clone(),
                score: hit.score,
            })
        })
        .collect();

    AnswerResponse {
        answer: extract_answer(question, &top.text, retriever.term_policy(), config),
        citations,
        confidence: decision.confidence,
        abstained: false,
        message: None,
    }
}

fn abstention(confidence: f32, message: String) -> AnswerResponse {
    AnswerResponse {
        answer: ABSTAIN_ANSWER.to_string(),
        citations: Vec::new(),
        confidence,
        abstained: true,
        message: Some(message),
    }
}

/// Sentences of `text` sharing the most terms with the question, in their
/// original order; a leading excerpt when no sentence overlaps. Terms are
/// normalized with `policy`, the one the index was built with.
pub fn extract_answer(question: &str, text: &str, policy: &TermPolicy, config: &AnswerConfig) -> String {
    let question_terms: HashSet<String> = tokenize(question, policy).into_iter().collect();

    let mut ranked: Vec<(usize, usize, &str)> = split_sentences(text)
        .into_iter()
        .enumerate()
        .filter(|(_, s)| s.chars().count() >= config.min_sentence_chars)
        .filter_map(|(position, sentence)| {
            let terms: HashSet<String> = tokenize(sentence, policy).into_iter().collect();
            let overlap = terms.intersection(&question_terms).count();
            (overlap > 0).then_some((overlap, position, sentence))
        })
        .collect();

    if ranked.is_empty() {
        return excerpt(text, config.excerpt_chars);
    }
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    ranked.truncate(config.max_sentences);
    ranked.sort_by_key(|&(_, position, _)| position);
    ranked.iter().map(|&(_, _, sentence)| sentence).collect::<Vec<_>>().join(" ")
}

/// Splits after `.`, `!` or `?` when followed by whitespace or the end of
/// the text. Slices are trimmed and never empty.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') && chars.peek().map_or(true, |&(_, next)| next.is_whitespace()) {
            let end = i + c.len_utf8();
            sentences.push(&text[start..end]);
            start = end;
        }
    }
    sentences.push(&text[start..]);
    sentences.into_iter().map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// At most `max_chars` leading characters, cut back to a word boundary
/// when one exists.
fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    let Some((cut, next)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };
    let head = &text[..cut];
    if next.is_whitespace() {
        return head.trim_end().to_string();
    }
    match head.rfind(char::is_whitespace) {
        Some(space) if space > 0 => head[..space].trim_end().to_string(),
        _ => head.to_string(),
    }
}
