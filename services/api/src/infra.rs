use metrics_exporter_prometheus::PrometheusHandle;
use mindcheck::config::AppConfig;
use mindcheck::error::AppError;
use mindcheck::workflows::assessment::{
    AssessmentKind, AssessmentService, FeatureName, ForestClassifier, Mood, ReportTransport,
    ResponseValue,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ProductionService = AssessmentService<ReportTransport>;

/// Loads the classifier artifact and mail transport. A missing or invalid artifact is fatal.
pub(crate) fn build_assessment_service(config: &AppConfig) -> Result<ProductionService, AppError> {
    let classifier = ForestClassifier::from_path(&config.model.artifact_path)?;
    let transport = ReportTransport::from_config(&config.mail)?;

    info!(
        preset = ?config.scoring.severity_preset,
        missing_features = ?config.scoring.missing_features,
        email_enabled = transport.is_enabled(),
        "assessment service configured"
    );

    Ok(AssessmentService::from_config(
        &config.scoring,
        Arc::new(classifier),
        transport,
    ))
}

pub(crate) fn parse_assessment(raw: &str) -> Result<AssessmentKind, String> {
    AssessmentKind::parse(raw).ok_or_else(|| {
        let known = AssessmentKind::ALL
            .iter()
            .map(|kind| kind.slug())
            .collect::<Vec<_>>()
            .join(", ");
        format!("unknown assessment '{raw}' (expected one of: {known})")
    })
}

/// Parses `feature=value`, where value is an ordinal or a scale label.
pub(crate) fn parse_answer(raw: &str) -> Result<(FeatureName, ResponseValue), String> {
    let (feature, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FEATURE=VALUE, got '{raw}'"))?;
    let feature = FeatureName::parse(feature)
        .ok_or_else(|| format!("unknown questionnaire feature '{}'", feature.trim()))?;
    let value = ResponseValue::parse(value).map_err(|err| err.to_string())?;
    Ok((feature, value))
}

pub(crate) fn parse_mood(raw: &str) -> Result<Mood, String> {
    let value = raw
        .trim()
        .parse::<u8>()
        .map_err(|err| format!("failed to parse '{raw}' as a mood rating ({err})"))?;
    Mood::try_from(value).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_accept_ordinals_and_labels() {
        assert_eq!(
            parse_answer("suicidality_total=Always").map(|(f, v)| (f, v.get())),
            Ok((FeatureName::SuicidalityTotal, 4))
        );
        assert_eq!(
            parse_answer(" sent_pos = 1 ").map(|(f, v)| (f, v.get())),
            Ok((FeatureName::SentPos, 1))
        );
        assert!(parse_answer("sent_pos").is_err());
        assert!(parse_answer("sent_pos=7").is_err());
        assert!(parse_answer("sent_pos=Sometimes maybe").is_err());
    }

    #[test]
    fn assessments_resolve_by_slug_or_label() {
        assert_eq!(parse_assessment("overall_ai"), Ok(AssessmentKind::OverallAi));
        assert_eq!(
            parse_assessment("Daily Well-Being Check"),
            Ok(AssessmentKind::DailyWellBeing)
        );
        assert!(parse_assessment("sleep")
            .expect_err("unknown")
            .contains("daily_well_being"));
    }

    #[test]
    fn mood_must_be_on_slider() {
        assert_eq!(parse_mood("10").map(Mood::get), Ok(10));
        assert!(parse_mood("0").is_err());
        assert!(parse_mood("high").is_err());
    }
}
