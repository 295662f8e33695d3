use filingdb_core::types::RetrievalResult;

pub const DEFAULT_THRESHOLD: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub confidence: f32,
    pub abstain: bool,
}

/// Confidence is the top score. Abstains when the confidence is strictly
/// below `threshold`, and always on an empty result (confidence 0).
pub fn decide(result: &RetrievalResult, threshold: f32) -> Decision {
    match result.top() {
        Some(hit) => Decision { confidence: hit.score, abstain: hit.score < threshold },
        None => Decision { confidence: 0.0, abstain: true },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filingdb_core::types::ScoredChunk;

    fn result(scores: &[f32]) -> RetrievalResult {
        RetrievalResult::from_hits(
            scores.iter().enumerate().map(|(i, &score)| ScoredChunk { chunk_id: i as u32, score }).collect(),
        )
    }

    #[test]
    fn low_top_score_abstains() {
        let decision = decide(&result(&[0.08, 0.02]), DEFAULT_THRESHOLD);
        assert!(decision.abstain);
        assert!((decision.confidence - 0.08).abs() < f32::EPSILON);
    }

    #[test]
    fn high_top_score_answers() {
        let decision = decide(&result(&[0.2, 0.73]), DEFAULT_THRESHOLD);
        assert!(!decision.abstain);
        assert!((decision.confidence - 0.73).abs() < f32::EPSILON);
    }

    #[test]
    fn score_at_threshold_is_accepted() {
        assert!(!decide(&result(&[0.15]), 0.15).abstain);
    }

    #[test]
    fn empty_result_abstains_with_zero_confidence() {
        let decision = decide(&RetrievalResult::default(), DEFAULT_THRESHOLD);
        assert_eq!(decision, Decision { confidence: 0.0, abstain: true });
        assert!(decide(&RetrievalResult::default(), 0.0).abstain);
    }

    #[test]
    fn zero_threshold_never_abstains_on_results() {
        assert!(!decide(&result(&[0.0]), 0.0).abstain);
    }
}
