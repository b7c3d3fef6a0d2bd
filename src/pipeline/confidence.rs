/// Fixed confidence reported when extraction succeeds and the provider does
/// not score its own output. Vision transcription of handwriting is good but
/// never certain, so the default stays below review-free territory.
pub const DEFAULT_CONFIDENCE: f32 = 0.85;

/// Confidence for a successful extraction: the provider's own score when it
/// reports one (clamped into [0, 1]), the fixed default otherwise.
pub fn resolve_confidence(provider_score: Option<f32>) -> f32 {
    match provider_score {
        Some(score) => score.clamp(0.0, 1.0),
        None => DEFAULT_CONFIDENCE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_provider_score_uses_default() {
        assert_eq!(resolve_confidence(None), DEFAULT_CONFIDENCE);
    }

    #[test]
    fn provider_score_used_directly() {
        assert_eq!(resolve_confidence(Some(0.6)), 0.6);
    }

    #[test]
    fn provider_score_clamped_to_unit_interval() {
        assert_eq!(resolve_confidence(Some(1.7)), 1.0);
        assert_eq!(resolve_confidence(Some(-0.2)), 0.0);
    }
}
