use super::super::domain::QuestionnaireResponse;
use super::SeverityTier;

/// Score at which progress saturates at 100%.
const PROGRESS_SATURATION_SCORE: u32 = 20;

/// Sum of all answers plus half the mood rating (rounded down).
pub(crate) fn raw_score(responses: &QuestionnaireResponse, mood: u8) -> u32 {
    responses.total() + u32::from(mood / 2)
}

/// Linear progress capped at 100, then lifted to the tier's floor.
pub(crate) fn progress_percentage(score: u32, tier: SeverityTier) -> u8 {
    let linear = (score.saturating_mul(100) / PROGRESS_SATURATION_SCORE).min(100) as u8;
    linear.max(tier.progress_floor())
}
