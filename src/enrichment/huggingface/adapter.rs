//! Adapter layer: convert Hugging Face DTOs to sentiment candidates

use super::dto;
use crate::enrichment::domain::{ProviderFault, SentimentError};
use crate::model::SentimentScore;

/// Flatten a classification response into candidates, highest score first.
pub fn to_scores(
    response: dto::ClassificationResponse,
) -> Result<Vec<SentimentScore>, SentimentError> {
    let candidates = match response {
        dto::ClassificationResponse::Nested(batches) => {
            batches.into_iter().next().unwrap_or_default()
        }
        dto::ClassificationResponse::Flat(candidates) => candidates,
        dto::ClassificationResponse::Error(err) => {
            let message = match err.estimated_time {
                Some(secs) => format!("{} (ready in ~{:.0}s)", err.error, secs),
                None => err.error,
            };
            return Err(ProviderFault::InvalidResponse(message).into());
        }
    };

    if candidates.is_empty() {
        return Err(SentimentError::EmptyResult);
    }

    let mut scores: Vec<SentimentScore> = candidates
        .into_iter()
        .map(|c| SentimentScore {
            label: c.label,
            score: c.score,
        })
        .collect();
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(scores)
}
