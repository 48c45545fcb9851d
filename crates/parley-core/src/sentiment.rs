//! Sentiment snapshot reported by the analysis service.

use serde::{Deserialize, Serialize};

/// Lowest score the service reports (very negative).
pub const MIN_SCORE: f64 = -1.0;
/// Highest score the service reports (very positive).
pub const MAX_SCORE: f64 = 1.0;

/// Current sentiment classification of the conversation.
///
/// Wholly replaced on every inbound envelope; no history is kept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentimentSnapshot {
    /// Classification label (`positive`, `neutral`, `negative`).
    pub sentiment: String,
    /// Score in `[-1.0, 1.0]`.
    pub score: f64,
    /// Short explanation of the classification.
    pub reason: String,
}

impl Default for SentimentSnapshot {
    fn default() -> Self {
        Self {
            sentiment: "neutral".into(),
            score: 0.0,
            reason: "No messages yet".into(),
        }
    }
}

impl SentimentSnapshot {
    /// Score mapped onto `[0.0, 1.0]` for gauges. Out-of-range scores are clamped.
    pub fn normalized(&self) -> f64 {
        if self.score.is_nan() {
            return 0.5;
        }
        (self.score.clamp(MIN_SCORE, MAX_SCORE) - MIN_SCORE) / (MAX_SCORE - MIN_SCORE)
    }

    /// Tone derived from the label.
    pub fn tone(&self) -> Tone {
        match self.sentiment.trim().to_lowercase().as_str() {
            "positive" => Tone::Positive,
            "neutral" => Tone::Neutral,
            "negative" => Tone::Negative,
            _ => Tone::Other,
        }
    }
}

/// Coarse tone used by presentation for coloring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    /// Label was `positive`.
    Positive,
    /// Label was `neutral`.
    Neutral,
    /// Label was `negative`.
    Negative,
    /// Any label the client does not recognize.
    Other,
}
