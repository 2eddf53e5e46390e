use serde::Serialize;

use super::classifier::RiskLevel;
use super::domain::{FeatureName, QuestionnaireResponse};
use super::severity::SeverityTier;

/// Answer on the self-harm item at or above which the safety notice is shown.
pub const SAFETY_NOTICE_THRESHOLD: u8 = 3;

pub const SAFETY_NOTICE: &str = "If you feel unsafe, please seek immediate professional help.";

pub const DISCLAIMER: &str = "Educational use only | Not a medical diagnosis";

/// Ordered actions suggested for a severity tier.
pub fn recommendations(tier: SeverityTier) -> [&'static str; 3] {
    match tier {
        SeverityTier::High => [
            "Seek professional mental health support",
            "Reach out to trusted family or friends",
            "Avoid isolation and harmful coping mechanisms",
        ],
        SeverityTier::Moderate => [
            "Practice stress management techniques",
            "Maintain regular sleep and routine",
            "Monitor symptoms regularly",
        ],
        SeverityTier::Low => [
            "Maintain healthy habits",
            "Stay socially connected",
            "Practice mindfulness or relaxation",
        ],
    }
}

pub fn explain(risk: RiskLevel, severity: &str) -> String {
    format!(
        "The system predicts a {} mental health risk with {} severity based on the provided inputs. \
         This assessment is generated using patterns learned from social media data.",
        risk.as_str().to_uppercase(),
        severity.to_lowercase()
    )
}

/// Reading guide for the progress percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressBand {
    NeedsImprovement,
    Manageable,
    CriticalAttention,
}

impl ProgressBand {
    pub fn from_progress(progress: u8) -> Self {
        if progress < 40 {
            ProgressBand::NeedsImprovement
        } else if progress <= 70 {
            ProgressBand::Manageable
        } else {
            ProgressBand::CriticalAttention
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProgressBand::NeedsImprovement => "Needs improvement",
            ProgressBand::Manageable => "Manageable condition",
            ProgressBand::CriticalAttention => "Critical attention advised",
        }
    }
}

pub fn safety_notice(responses: &QuestionnaireResponse) -> Option<&'static str> {
    responses
        .get(FeatureName::SuicidalityTotal)
        .filter(|value| value.get() >= SAFETY_NOTICE_THRESHOLD)
        .map(|_| SAFETY_NOTICE)
}
