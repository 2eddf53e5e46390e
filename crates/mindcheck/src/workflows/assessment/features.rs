use serde::{Deserialize, Serialize};

use super::domain::{FeatureName, FeatureVector, QuestionnaireResponse, FEATURE_COUNT};

/// How absent questionnaire features are treated when building a model input.
///
/// `DefaultToZero` silently lowers the computed signal for partially completed
/// forms. `RequireSafetyCritical` refuses to build a vector when a
/// safety-critical feature (self-harm indicators) was never answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingFeaturePolicy {
    #[default]
    DefaultToZero,
    RequireSafetyCritical,
}

impl MissingFeaturePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "default-to-zero" | "zero" => Some(Self::DefaultToZero),
            "require-safety-critical" | "strict" => Some(Self::RequireSafetyCritical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("assessment is missing safety-critical answers: {}", join_features(.missing))]
pub struct IncompleteAssessment {
    pub missing: Vec<FeatureName>,
}

fn join_features(features: &[FeatureName]) -> String {
    features
        .iter()
        .map(|feature| feature.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Maps questionnaire answers onto the fixed feature schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureVectorBuilder {
    policy: MissingFeaturePolicy,
}

impl FeatureVectorBuilder {
    pub fn new(policy: MissingFeaturePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MissingFeaturePolicy {
        self.policy
    }

    pub fn build(
        &self,
        responses: &QuestionnaireResponse,
    ) -> Result<FeatureVector, IncompleteAssessment> {
        if self.policy == MissingFeaturePolicy::RequireSafetyCritical {
            let missing: Vec<FeatureName> = FeatureName::SCHEMA
                .into_iter()
                .filter(|feature| feature.is_safety_critical() && !responses.contains(*feature))
                .collect();
            if !missing.is_empty() {
                return Err(IncompleteAssessment { missing });
            }
        }

        Ok(build_vector(responses))
    }
}

/// Emits one value per schema feature, in schema order; absent features become `0.0`.
pub fn build_vector(responses: &QuestionnaireResponse) -> FeatureVector {
    let mut values = [0.0; FEATURE_COUNT];
    for (slot, feature) in values.iter_mut().zip(FeatureName::SCHEMA) {
        *slot = responses
            .get(feature)
            .map(|value| f64::from(value.get()))
            .unwrap_or(0.0);
    }
    FeatureVector::new(values)
}
