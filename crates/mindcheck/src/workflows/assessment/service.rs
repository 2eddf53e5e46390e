use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::classifier::{RiskClassifier, RiskLevel, RiskModel, RiskModelError, RiskPrediction};
use super::domain::{AssessmentKind, Mood, QuestionnaireResponse};
use super::features::FeatureVectorBuilder;
use super::guidance::{self, ProgressBand};
use super::history::{AssessmentHistoryEntry, HistoryResult, SessionId, SessionStore};
use super::notifier::{MailTransport, ReportNotifier};
use super::severity::{SeverityScorer, SeverityTier};
use crate::config::ScoringConfig;

/// One questionnaire submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub assessment: AssessmentKind,
    #[serde(default)]
    pub responses: QuestionnaireResponse,
    #[serde(default)]
    pub mood: Mood,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    Skipped,
    Sent,
    Failed,
}

/// Everything shown to the respondent after a submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentReport {
    pub assessment: AssessmentKind,
    pub assessment_label: &'static str,
    pub score: u32,
    pub severity: SeverityTier,
    pub severity_label: String,
    pub progress: u8,
    pub progress_band: ProgressBand,
    pub progress_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<RiskPrediction>,
    pub risk: RiskLevel,
    pub explanation: String,
    pub recommendations: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_notice: Option<&'static str>,
    pub email: EmailStatus,
    pub disclaimer: &'static str,
}

/// Service composing the severity scorer, risk model, notifier and session history.
pub struct AssessmentService<T> {
    scorer: SeverityScorer,
    model: RiskModel,
    notifier: ReportNotifier<T>,
    sessions: SessionStore,
}

impl<T> AssessmentService<T>
where
    T: MailTransport + 'static,
{
    pub fn new(
        scorer: SeverityScorer,
        model: RiskModel,
        notifier: ReportNotifier<T>,
        sessions: SessionStore,
    ) -> Self {
        Self {
            scorer,
            model,
            notifier,
            sessions,
        }
    }

    /// Wires the scorer and model from scoring configuration.
    pub fn from_config(
        config: &ScoringConfig,
        classifier: Arc<dyn RiskClassifier>,
        transport: T,
    ) -> Self {
        let scorer = SeverityScorer::new(config.severity_preset.policy());
        let model = RiskModel::new(
            classifier,
            FeatureVectorBuilder::new(config.missing_features),
        );
        Self::new(
            scorer,
            model,
            ReportNotifier::new(transport),
            SessionStore::default(),
        )
    }

    /// Score one submission, optionally email the report, and record it in the session history.
    pub fn assess(
        &self,
        session: &SessionId,
        request: AssessmentRequest,
    ) -> Result<AssessmentReport, AssessmentError> {
        let AssessmentRequest {
            assessment,
            responses,
            mood,
            email,
        } = request;

        let severity = self.scorer.score(&responses, mood.get());

        let prediction = if assessment.uses_model() {
            Some(self.model.predict_risk(&responses)?)
        } else {
            None
        };

        let (risk, guidance_tier) = match prediction {
            Some(prediction) => (prediction.risk, prediction.risk.tier()),
            None => (RiskLevel::from_tier(severity.tier), severity.tier),
        };

        let email = match email.as_deref().map(str::trim) {
            None | Some("") => EmailStatus::Skipped,
            Some(address) => {
                if self.notifier.notify(
                    address,
                    assessment.label(),
                    &severity.label,
                    severity.score,
                ) {
                    EmailStatus::Sent
                } else {
                    EmailStatus::Failed
                }
            }
        };

        self.sessions.append(
            session,
            AssessmentHistoryEntry {
                assessment,
                result: match prediction {
                    Some(prediction) => HistoryResult::Risk(prediction.risk),
                    None => HistoryResult::Score(severity.score),
                },
                severity: severity.label.clone(),
                recorded_at: Utc::now(),
            },
        );

        info!(
            assessment = assessment.slug(),
            score = severity.score,
            severity = %severity.label,
            risk = %risk,
            email = ?email,
            "assessment completed"
        );

        let band = ProgressBand::from_progress(severity.progress);
        Ok(AssessmentReport {
            assessment,
            assessment_label: assessment.label(),
            score: severity.score,
            severity: severity.tier,
            explanation: guidance::explain(risk, &severity.label),
            severity_label: severity.label,
            progress: severity.progress,
            progress_band: band,
            progress_label: band.label(),
            prediction,
            risk,
            recommendations: guidance::recommendations(guidance_tier).to_vec(),
            safety_notice: guidance::safety_notice(&responses),
            email,
            disclaimer: guidance::DISCLAIMER,
        })
    }

    /// Session history, oldest first.
    pub fn history(&self, session: &SessionId) -> Vec<AssessmentHistoryEntry> {
        self.sessions.history(session)
    }

    /// Ends the session, dropping its history.
    pub fn end_session(&self, session: &SessionId) -> bool {
        let cleared = self.sessions.clear(session);
        if cleared {
            info!(session = %session.0, "session history cleared");
        }
        cleared
    }
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Model(#[from] RiskModelError),
}
