use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::ScoringConfig;
use crate::workflows::assessment::classifier::{
    ClassProbability, ClassifierError, RiskClassifier, RiskLevel, RiskModel,
};
use crate::workflows::assessment::features::FeatureVectorBuilder;
use crate::workflows::assessment::history::SessionStore;
use crate::workflows::assessment::notifier::ReportNotifier;
use crate::workflows::assessment::severity::SeverityScorer;
use crate::workflows::assessment::domain::{
    AssessmentKind, FeatureName, FeatureVector, Mood, QuestionnaireResponse, ResponseValue,
};
use crate::workflows::assessment::notifier::{MailTransport, ReportMessage, TransportError};
use crate::workflows::assessment::service::{AssessmentRequest, AssessmentService};
use crate::workflows::assessment::{assessment_router, MissingFeaturePolicy, SeverityPreset};

/// Classifier that always returns the same distribution.
pub(super) struct FixedClassifier {
    distribution: Vec<ClassProbability>,
}

impl FixedClassifier {
    pub(super) fn new(high: f64, low: f64, medium: f64) -> Self {
        Self {
            distribution: vec![
                ClassProbability {
                    risk: RiskLevel::High,
                    probability: high,
                },
                ClassProbability {
                    risk: RiskLevel::Low,
                    probability: low,
                },
                ClassProbability {
                    risk: RiskLevel::Medium,
                    probability: medium,
                },
            ],
        }
    }
}

impl RiskClassifier for FixedClassifier {
    fn predict_proba(
        &self,
        _features: &FeatureVector,
    ) -> Result<Vec<ClassProbability>, ClassifierError> {
        Ok(self.distribution.clone())
    }
}

/// Classifier whose output carries no classes at all.
pub(super) struct EmptyClassifier;

impl RiskClassifier for EmptyClassifier {
    fn predict_proba(
        &self,
        _features: &FeatureVector,
    ) -> Result<Vec<ClassProbability>, ClassifierError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub(super) struct RecordingTransport {
    sent: Mutex<Vec<ReportMessage>>,
}

impl RecordingTransport {
    pub(super) fn sent(&self) -> Vec<ReportMessage> {
        self.sent.lock().expect("transport mutex poisoned").clone()
    }
}

impl MailTransport for RecordingTransport {
    fn send(&self, message: &ReportMessage) -> Result<(), TransportError> {
        self.sent
            .lock()
            .expect("transport mutex poisoned")
            .push(message.clone());
        Ok(())
    }
}

pub(super) type TestService = AssessmentService<Arc<RecordingTransport>>;

pub(super) fn scoring(preset: SeverityPreset, missing: MissingFeaturePolicy) -> ScoringConfig {
    ScoringConfig {
        severity_preset: preset,
        missing_features: missing,
    }
}

pub(super) fn build_service_with(
    config: ScoringConfig,
    classifier: Arc<dyn RiskClassifier>,
) -> (TestService, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    let service = AssessmentService::from_config(&config, classifier, transport.clone());
    (service, transport)
}

pub(super) fn build_service() -> (TestService, Arc<RecordingTransport>) {
    build_service_with(
        ScoringConfig::default(),
        Arc::new(FixedClassifier::new(0.1, 0.7, 0.2)),
    )
}

pub(super) fn build_service_with_store(store: SessionStore) -> TestService {
    let model = RiskModel::new(
        Arc::new(FixedClassifier::new(0.1, 0.7, 0.2)),
        FeatureVectorBuilder::default(),
    );
    AssessmentService::new(
        SeverityScorer::default(),
        model,
        ReportNotifier::new(Arc::new(RecordingTransport::default())),
        store,
    )
}

pub(super) fn responses(pairs: &[(FeatureName, u8)]) -> QuestionnaireResponse {
    pairs
        .iter()
        .map(|(feature, raw)| {
            (
                *feature,
                ResponseValue::try_from(*raw).expect("valid ordinal"),
            )
        })
        .collect()
}

pub(super) fn mood(raw: u8) -> Mood {
    Mood::try_from(raw).expect("valid mood")
}

/// Stress answers summing to 6; with mood 6 the standard score is 9.
pub(super) fn stress_request() -> AssessmentRequest {
    AssessmentRequest {
        assessment: AssessmentKind::Stress,
        responses: responses(&[
            (FeatureName::EconomicStressTotal, 3),
            (FeatureName::DomesticStressTotal, 2),
            (FeatureName::SentCompound, 1),
            (FeatureName::SentNeg, 0),
        ]),
        mood: mood(6),
        email: None,
    }
}

pub(super) fn overall_request(suicidality: Option<u8>) -> AssessmentRequest {
    let mut pairs = vec![
        (FeatureName::SentNeg, 2),
        (FeatureName::SentPos, 1),
        (FeatureName::LiwcAnxiety, 3),
        (FeatureName::LiwcSadness, 2),
        (FeatureName::EconomicStressTotal, 1),
        (FeatureName::IsolationTotal, 2),
        (FeatureName::SubstanceUseTotal, 0),
    ];
    if let Some(value) = suicidality {
        pairs.push((FeatureName::SuicidalityTotal, value));
    }
    AssessmentRequest {
        assessment: AssessmentKind::OverallAi,
        responses: responses(&pairs),
        mood: mood(4),
        email: None,
    }
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    assessment_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
