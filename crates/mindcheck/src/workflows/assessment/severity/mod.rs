mod policy;
mod rules;

pub use policy::{SeverityBand, SeverityPolicy, SeverityPolicyError, SeverityPreset};

use std::fmt;

use serde::{Deserialize, Serialize};

use super::domain::QuestionnaireResponse;

/// Canonical three-level severity. Preset labels ("Mild", "Severe") map onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Low,
    Moderate,
    High,
}

impl SeverityTier {
    pub fn label(self) -> &'static str {
        match self {
            SeverityTier::Low => "Low",
            SeverityTier::Moderate => "Moderate",
            SeverityTier::High => "High",
        }
    }

    /// Normalizes any label vocabulary in use (Low/Mild, Moderate/Medium, High/Severe).
    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" | "mild" => Some(SeverityTier::Low),
            "moderate" | "medium" => Some(SeverityTier::Moderate),
            "high" | "severe" => Some(SeverityTier::High),
            _ => None,
        }
    }

    /// Minimum progress percentage displayed for the tier.
    pub fn progress_floor(self) -> u8 {
        match self {
            SeverityTier::Low => 30,
            SeverityTier::Moderate => 55,
            SeverityTier::High => 80,
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rule-based outcome for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityResult {
    pub score: u32,
    pub tier: SeverityTier,
    pub label: String,
    pub progress: u8,
}

/// Stateless scorer applying a [`SeverityPolicy`] to summed answers.
#[derive(Debug, Clone, Default)]
pub struct SeverityScorer {
    policy: SeverityPolicy,
}

impl SeverityScorer {
    pub fn new(policy: SeverityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SeverityPolicy {
        &self.policy
    }

    pub fn score(&self, responses: &QuestionnaireResponse, mood: u8) -> SeverityResult {
        let score = rules::raw_score(responses, mood);
        let band = self.policy.classify(score);

        SeverityResult {
            score,
            tier: band.tier,
            label: band.label.clone(),
            progress: rules::progress_percentage(score, band.tier),
        }
    }
}
