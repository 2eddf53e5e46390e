mod forest;

pub use forest::{ArtifactError, ForestClassifier};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{FeatureVector, QuestionnaireResponse};
use super::features::{FeatureVectorBuilder, IncompleteAssessment};
use super::severity::SeverityTier;

/// Model-derived risk classes, named the way the training job labels them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    pub fn tier(self) -> SeverityTier {
        match self {
            RiskLevel::Low => SeverityTier::Low,
            RiskLevel::Medium => SeverityTier::Moderate,
            RiskLevel::High => SeverityTier::High,
        }
    }

    /// Accepts model class names as well as severity vocabulary ("medium", "Severe", "mild").
    pub fn from_label(raw: &str) -> Option<Self> {
        SeverityTier::from_label(raw).map(Self::from_tier)
    }

    pub fn from_tier(tier: SeverityTier) -> Self {
        match tier {
            SeverityTier::Low => RiskLevel::Low,
            SeverityTier::Moderate => RiskLevel::Medium,
            SeverityTier::High => RiskLevel::High,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability the classifier assigns to one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassProbability {
    pub risk: RiskLevel,
    pub probability: f64,
}

/// Read-only inference seam over a trained model.
pub trait RiskClassifier: Send + Sync {
    /// One entry per class the model knows about, in the model's class order.
    fn predict_proba(
        &self,
        features: &FeatureVector,
    ) -> Result<Vec<ClassProbability>, ClassifierError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier returned no class probabilities")]
    EmptyDistribution,
    #[error("classifier returned probability {probability} for class '{risk}'")]
    InvalidProbability { risk: RiskLevel, probability: f64 },
}

/// Model-path result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskPrediction {
    pub risk: RiskLevel,
    /// Highest class probability, rounded to two decimals.
    pub confidence: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum RiskModelError {
    #[error(transparent)]
    Incomplete(#[from] IncompleteAssessment),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

/// Adapter turning questionnaire answers into a [`RiskPrediction`] using a shared classifier.
#[derive(Clone)]
pub struct RiskModel {
    classifier: Arc<dyn RiskClassifier>,
    features: FeatureVectorBuilder,
}

impl RiskModel {
    pub fn new(classifier: Arc<dyn RiskClassifier>, features: FeatureVectorBuilder) -> Self {
        Self {
            classifier,
            features,
        }
    }

    pub fn predict_risk(
        &self,
        responses: &QuestionnaireResponse,
    ) -> Result<RiskPrediction, RiskModelError> {
        let vector = self.features.build(responses)?;
        let probabilities = self.classifier.predict_proba(&vector)?;
        let prediction = top_class(&probabilities)?;

        debug!(
            risk = %prediction.risk,
            confidence = prediction.confidence,
            "risk classifier prediction"
        );

        Ok(prediction)
    }
}

impl fmt::Debug for RiskModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiskModel")
            .field("features", &self.features)
            .finish_non_exhaustive()
    }
}

const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Arg-max over the distribution; ties keep the class listed first.
fn top_class(probabilities: &[ClassProbability]) -> Result<RiskPrediction, ClassifierError> {
    let mut best: Option<ClassProbability> = None;

    for entry in probabilities {
        let valid = entry.probability.is_finite()
            && entry.probability >= -PROBABILITY_TOLERANCE
            && entry.probability <= 1.0 + PROBABILITY_TOLERANCE;
        if !valid {
            return Err(ClassifierError::InvalidProbability {
                risk: entry.risk,
                probability: entry.probability,
            });
        }

        if best.map_or(true, |current| entry.probability > current.probability) {
            best = Some(*entry);
        }
    }

    let best = best.ok_or(ClassifierError::EmptyDistribution)?;
    let confidence = ((best.probability * 100.0).round() / 100.0).clamp(0.0, 1.0);

    Ok(RiskPrediction {
        risk: best.risk,
        confidence,
    })
}
