use crate::infra::{build_assessment_service, parse_answer, parse_assessment, parse_mood};
use clap::Args;
use mindcheck::config::AppConfig;
use mindcheck::error::AppError;
use mindcheck::telemetry;
use mindcheck::workflows::assessment::domain::ANSWER_SCALE;
use mindcheck::workflows::assessment::{
    catalog, AssessmentKind, AssessmentReport, AssessmentRequest, EmailStatus, FeatureName, Mood,
    ResponseValue, SessionId,
};

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Assessment to score (slug such as `stress` or label such as "Stress Test")
    #[arg(long, value_parser = parse_assessment)]
    pub(crate) assessment: AssessmentKind,
    /// Answer as FEATURE=VALUE, value 0-4 or Never/Rarely/Sometimes/Often/Always. Repeatable.
    #[arg(long, value_parser = parse_answer)]
    pub(crate) answer: Vec<(FeatureName, ResponseValue)>,
    /// Mood rating for today (1-10)
    #[arg(long, default_value = "5", value_parser = parse_mood)]
    pub(crate) mood: Mood,
    /// Email the plaintext report to this address
    #[arg(long)]
    pub(crate) email: Option<String>,
}

pub(crate) fn run_assessment(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        assessment,
        answer,
        mood,
        email,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let service = build_assessment_service(&config)?;

    let request = AssessmentRequest {
        assessment,
        responses: answer.into_iter().collect(),
        mood,
        email,
    };

    let report = service.assess(&SessionId("cli".to_string()), request)?;

    print!("{}", render_report(&report));
    Ok(())
}

pub(crate) fn run_catalog() {
    println!("Answer scale:");
    for (label, value) in ANSWER_SCALE {
        println!("  {value} = {label}");
    }

    for entry in catalog() {
        let mode = if entry.uses_model {
            "model-based"
        } else {
            "rule-based"
        };
        println!("\n{} [{}] ({mode})", entry.label, entry.assessment.slug());
        for question in entry.questions {
            println!("  - {:<24} {}", question.feature.as_str(), question.prompt);
        }
    }
}

pub(crate) fn render_report(report: &AssessmentReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", report.assessment_label));
    out.push_str(&format!(
        "Score: {} | Severity: {} | Progress: {}% ({})\n",
        report.score, report.severity_label, report.progress, report.progress_label
    ));
    if let Some(prediction) = report.prediction {
        out.push_str(&format!(
            "Predicted risk: {} (confidence {:.2})\n",
            prediction.risk.as_str().to_uppercase(),
            prediction.confidence
        ));
    }
    out.push_str(&format!("\n{}\n", report.explanation));

    out.push_str("\nRecommendations:\n");
    for recommendation in &report.recommendations {
        out.push_str(&format!("  - {recommendation}\n"));
    }

    if let Some(notice) = report.safety_notice {
        out.push_str(&format!("\n!! {notice}\n"));
    }

    match report.email {
        EmailStatus::Sent => out.push_str("\nReport emailed.\n"),
        EmailStatus::Failed => out.push_str("\nEmail delivery failed; see logs.\n"),
        EmailStatus::Skipped => {}
    }

    out.push_str(&format!("\n{}\n", report.disclaimer));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindcheck::workflows::assessment::{ProgressBand, RiskLevel, RiskPrediction, SeverityTier};

    fn report(prediction: Option<RiskPrediction>, safety_notice: Option<&'static str>) -> AssessmentReport {
        AssessmentReport {
            assessment: AssessmentKind::OverallAi,
            assessment_label: "Overall Mental Health (AI)",
            score: 14,
            severity: SeverityTier::High,
            severity_label: "High".to_string(),
            progress: 80,
            progress_band: ProgressBand::CriticalAttention,
            progress_label: ProgressBand::CriticalAttention.label(),
            prediction,
            risk: RiskLevel::High,
            explanation: "The system predicts a HIGH mental health risk.".to_string(),
            recommendations: vec!["Seek professional mental health support"],
            safety_notice,
            email: EmailStatus::Failed,
            disclaimer: "Educational use only | Not a medical diagnosis",
        }
    }

    #[test]
    fn renders_prediction_and_safety_notice() {
        let rendered = render_report(&report(
            Some(RiskPrediction {
                risk: RiskLevel::High,
                confidence: 0.97,
            }),
            Some("If you feel unsafe, please seek immediate professional help."),
        ));

        assert!(rendered.contains("Score: 14 | Severity: High | Progress: 80% (Critical attention advised)"));
        assert!(rendered.contains("Predicted risk: HIGH (confidence 0.97)"));
        assert!(rendered.contains("  - Seek professional mental health support"));
        assert!(rendered.contains("!! If you feel unsafe"));
        assert!(rendered.contains("Email delivery failed"));
    }

    #[test]
    fn omits_prediction_for_rule_based_reports() {
        let rendered = render_report(&report(None, None));
        assert!(!rendered.contains("Predicted risk"));
        assert!(!rendered.contains("!!"));
    }
}
