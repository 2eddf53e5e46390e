use serde::{Deserialize, Serialize};

use super::SeverityTier;

/// Lower bound (inclusive) at which a tier starts, with the label shown to respondents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBand {
    pub lower_bound: u32,
    pub tier: SeverityTier,
    pub label: String,
}

impl SeverityBand {
    pub fn new(lower_bound: u32, tier: SeverityTier, label: impl Into<String>) -> Self {
        Self {
            lower_bound,
            tier,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeverityPolicyError {
    #[error("severity policy needs at least one band")]
    Empty,
    #[error("the first severity band must start at 0 (found {0})")]
    MissingBaseBand(u32),
    #[error("severity band bounds must strictly increase ({previous} then {next})")]
    UnorderedBounds { previous: u32, next: u32 },
    #[error("severity tiers must strictly increase with their bounds ({previous:?} then {next:?})")]
    UnorderedTiers {
        previous: SeverityTier,
        next: SeverityTier,
    },
}

/// Ordered thresholds mapping a raw score onto a severity tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeverityPolicy {
    bands: Vec<SeverityBand>,
}

impl SeverityPolicy {
    pub fn new(bands: Vec<SeverityBand>) -> Result<Self, SeverityPolicyError> {
        let first = bands.first().ok_or(SeverityPolicyError::Empty)?;
        if first.lower_bound != 0 {
            return Err(SeverityPolicyError::MissingBaseBand(first.lower_bound));
        }

        for pair in bands.windows(2) {
            let (previous, next) = (&pair[0], &pair[1]);
            if next.lower_bound <= previous.lower_bound {
                return Err(SeverityPolicyError::UnorderedBounds {
                    previous: previous.lower_bound,
                    next: next.lower_bound,
                });
            }
            if next.tier <= previous.tier {
                return Err(SeverityPolicyError::UnorderedTiers {
                    previous: previous.tier,
                    next: next.tier,
                });
            }
        }

        Ok(Self { bands })
    }

    pub fn bands(&self) -> &[SeverityBand] {
        &self.bands
    }

    /// Highest band whose lower bound does not exceed `score`.
    pub fn classify(&self, score: u32) -> &SeverityBand {
        self.bands
            .iter()
            .rev()
            .find(|band| band.lower_bound <= score)
            .unwrap_or(&self.bands[0])
    }
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        SeverityPreset::default().policy()
    }
}

/// Threshold sets that have been used for the same three-tier concept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityPreset {
    /// 12 / 6 with High, Moderate, Low.
    #[default]
    Standard,
    /// 10 / 5 with Severe, Moderate, Mild.
    Clinical,
    /// 8 / 4 with High, Moderate, Low; used by the shorter three-question forms.
    Brief,
}

impl SeverityPreset {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "clinical" => Some(Self::Clinical),
            "brief" => Some(Self::Brief),
            _ => None,
        }
    }

    pub fn policy(self) -> SeverityPolicy {
        let bands = match self {
            SeverityPreset::Standard => vec![
                SeverityBand::new(0, SeverityTier::Low, "Low"),
                SeverityBand::new(6, SeverityTier::Moderate, "Moderate"),
                SeverityBand::new(12, SeverityTier::High, "High"),
            ],
            SeverityPreset::Clinical => vec![
                SeverityBand::new(0, SeverityTier::Low, "Mild"),
                SeverityBand::new(5, SeverityTier::Moderate, "Moderate"),
                SeverityBand::new(10, SeverityTier::High, "Severe"),
            ],
            SeverityPreset::Brief => vec![
                SeverityBand::new(0, SeverityTier::Low, "Low"),
                SeverityBand::new(4, SeverityTier::Moderate, "Moderate"),
                SeverityBand::new(8, SeverityTier::High, "High"),
            ],
        };
        SeverityPolicy { bands }
    }
}
