//! Questionnaire intake, risk scoring, guidance and report delivery.

pub mod classifier;
pub mod domain;
pub mod features;
pub mod guidance;
pub mod history;
pub mod notifier;
pub mod router;
pub mod service;
pub mod severity;
pub mod transport;

#[cfg(test)]
mod tests;

pub use classifier::{
    ArtifactError, ClassProbability, ClassifierError, ForestClassifier, RiskClassifier, RiskLevel,
    RiskModel, RiskModelError, RiskPrediction,
};
pub use domain::{
    catalog, AssessmentDescriptor, AssessmentKind, FeatureName, FeatureVector, InvalidMood,
    InvalidResponse, Mood, QuestionnaireResponse, ResponseValue,
};
pub use features::{build_vector, FeatureVectorBuilder, IncompleteAssessment, MissingFeaturePolicy};
pub use guidance::ProgressBand;
pub use history::{AssessmentHistoryEntry, HistoryResult, SessionId, SessionStore};
pub use notifier::{MailTransport, NotifyError, ReportMessage, ReportNotifier, TransportError};
pub use router::assessment_router;
pub use service::{
    AssessmentError, AssessmentReport, AssessmentRequest, AssessmentService, EmailStatus,
};
pub use severity::{SeverityPolicy, SeverityPreset, SeverityResult, SeverityScorer, SeverityTier};
pub use transport::{DisabledTransport, ReportTransport, SmtpMailTransport};
