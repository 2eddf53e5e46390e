use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of dimensions in the feature schema shared with the training pipeline.
pub const FEATURE_COUNT: usize = 12;

/// Questionnaire features, declared in schema order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    SentNeg,
    SentPos,
    SentCompound,
    LiwcAnxiety,
    LiwcSadness,
    LiwcNegativeEmotion,
    LiwcPositiveEmotion,
    EconomicStressTotal,
    IsolationTotal,
    DomesticStressTotal,
    SubstanceUseTotal,
    SuicidalityTotal,
}

impl FeatureName {
    pub const SCHEMA: [FeatureName; FEATURE_COUNT] = [
        FeatureName::SentNeg,
        FeatureName::SentPos,
        FeatureName::SentCompound,
        FeatureName::LiwcAnxiety,
        FeatureName::LiwcSadness,
        FeatureName::LiwcNegativeEmotion,
        FeatureName::LiwcPositiveEmotion,
        FeatureName::EconomicStressTotal,
        FeatureName::IsolationTotal,
        FeatureName::DomesticStressTotal,
        FeatureName::SubstanceUseTotal,
        FeatureName::SuicidalityTotal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FeatureName::SentNeg => "sent_neg",
            FeatureName::SentPos => "sent_pos",
            FeatureName::SentCompound => "sent_compound",
            FeatureName::LiwcAnxiety => "liwc_anxiety",
            FeatureName::LiwcSadness => "liwc_sadness",
            FeatureName::LiwcNegativeEmotion => "liwc_negative_emotion",
            FeatureName::LiwcPositiveEmotion => "liwc_positive_emotion",
            FeatureName::EconomicStressTotal => "economic_stress_total",
            FeatureName::IsolationTotal => "isolation_total",
            FeatureName::DomesticStressTotal => "domestic_stress_total",
            FeatureName::SubstanceUseTotal => "substance_use_total",
            FeatureName::SuicidalityTotal => "suicidality_total",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Self::SCHEMA
            .into_iter()
            .find(|feature| feature.as_str().eq_ignore_ascii_case(needle))
    }

    /// Position of the feature inside a [`FeatureVector`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Features whose absence hides a potential safety concern.
    pub fn is_safety_critical(self) -> bool {
        matches!(self, FeatureName::SuicidalityTotal)
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Highest ordinal on the answer scale.
pub const MAX_RESPONSE: u8 = 4;

/// Labelled answer scale presented to respondents.
pub const ANSWER_SCALE: [(&str, u8); 5] = [
    ("Never", 0),
    ("Rarely", 1),
    ("Sometimes", 2),
    ("Often", 3),
    ("Always", 4),
];

/// Ordinal answer in the 0..=4 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ResponseValue(u8);

impl ResponseValue {
    pub const ZERO: ResponseValue = ResponseValue(0);

    pub fn get(self) -> u8 {
        self.0
    }

    /// Resolves a scale label such as "Often" (case-insensitive).
    pub fn from_label(label: &str) -> Option<Self> {
        ANSWER_SCALE
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(label.trim()))
            .map(|(_, value)| ResponseValue(*value))
    }

    /// Accepts either the ordinal ("3") or its scale label ("Often").
    pub fn parse(raw: &str) -> Result<Self, InvalidResponse> {
        let trimmed = raw.trim();
        if let Ok(number) = trimmed.parse::<u8>() {
            return ResponseValue::try_from(number);
        }
        Self::from_label(trimmed).ok_or_else(|| InvalidResponse::UnknownAnswer(trimmed.to_string()))
    }
}

impl TryFrom<u8> for ResponseValue {
    type Error = InvalidResponse;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= MAX_RESPONSE {
            Ok(ResponseValue(value))
        } else {
            Err(InvalidResponse::OutOfRange(value))
        }
    }
}

impl From<ResponseValue> for u8 {
    fn from(value: ResponseValue) -> Self {
        value.0
    }
}

/// Rejected questionnaire input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidResponse {
    #[error("response value {0} is outside the 0-4 scale")]
    OutOfRange(u8),
    #[error("unknown questionnaire feature '{0}'")]
    UnknownFeature(String),
    #[error("unknown answer '{0}' (expected a number 0-4 or Never/Rarely/Sometimes/Often/Always)")]
    UnknownAnswer(String),
}

/// Answers collected for one submission. Features that were not asked are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionnaireResponse {
    answers: BTreeMap<FeatureName, ResponseValue>,
}

impl QuestionnaireResponse {
    pub fn try_from_pairs<I>(pairs: I) -> Result<Self, InvalidResponse>
    where
        I: IntoIterator<Item = (FeatureName, u8)>,
    {
        pairs
            .into_iter()
            .map(|(feature, raw)| ResponseValue::try_from(raw).map(|value| (feature, value)))
            .collect()
    }

    pub fn get(&self, feature: FeatureName) -> Option<ResponseValue> {
        self.answers.get(&feature).copied()
    }

    pub fn contains(&self, feature: FeatureName) -> bool {
        self.answers.contains_key(&feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureName, ResponseValue)> + '_ {
        self.answers.iter().map(|(feature, value)| (*feature, *value))
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Sum of every collected answer.
    pub fn total(&self) -> u32 {
        self.answers.values().map(|value| u32::from(value.get())).sum()
    }
}

impl FromIterator<(FeatureName, ResponseValue)> for QuestionnaireResponse {
    fn from_iter<T: IntoIterator<Item = (FeatureName, ResponseValue)>>(iter: T) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}

/// Numeric model input aligned to [`FeatureName::SCHEMA`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn zeros() -> Self {
        Self([0.0; FEATURE_COUNT])
    }

    pub fn get(&self, feature: FeatureName) -> f64 {
        self.0[feature.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Self-reported mood for the day on a 1..=10 slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Mood(u8);

impl Mood {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Mood {
    fn default() -> Self {
        Mood(5)
    }
}

impl TryFrom<u8> for Mood {
    type Error = InvalidMood;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Mood(value))
        } else {
            Err(InvalidMood(value))
        }
    }
}

impl From<Mood> for u8 {
    fn from(value: Mood) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("mood {0} is outside the 1-10 range")]
pub struct InvalidMood(pub u8);

/// Assessments offered to respondents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
    Anxiety,
    Depression,
    Stress,
    DailyWellBeing,
    OverallAi,
}

/// One prompt and the feature its answer feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub feature: FeatureName,
    pub prompt: &'static str,
}

const fn question(feature: FeatureName, prompt: &'static str) -> Question {
    Question { feature, prompt }
}

const ANXIETY_QUESTIONS: [Question; 4] = [
    question(FeatureName::LiwcAnxiety, "I feel anxious or worried"),
    question(FeatureName::SentNeg, "I feel nervous or uneasy"),
    question(FeatureName::SentCompound, "My thoughts feel overwhelming"),
    question(FeatureName::IsolationTotal, "I avoid situations due to anxiety"),
];

const DEPRESSION_QUESTIONS: [Question; 4] = [
    question(FeatureName::LiwcSadness, "I feel sad or hopeless"),
    question(FeatureName::SentNeg, "I feel emotionally low"),
    question(FeatureName::IsolationTotal, "I prefer to stay alone"),
    question(FeatureName::SentPos, "I rarely feel motivated or happy"),
];

const STRESS_QUESTIONS: [Question; 4] = [
    question(FeatureName::EconomicStressTotal, "I feel financial pressure"),
    question(FeatureName::DomesticStressTotal, "I feel work or home stress"),
    question(FeatureName::SentCompound, "Stress affects my thinking"),
    question(FeatureName::SentNeg, "Stress causes negative emotions"),
];

const WELL_BEING_QUESTIONS: [Question; 4] = [
    question(FeatureName::SentPos, "I feel positive during the day"),
    question(FeatureName::IsolationTotal, "I feel socially connected"),
    question(
        FeatureName::DomesticStressTotal,
        "Daily responsibilities feel manageable",
    ),
    question(
        FeatureName::EconomicStressTotal,
        "Money worries affect my mood",
    ),
];

const OVERALL_QUESTIONS: [Question; 8] = [
    question(FeatureName::SentNeg, "I feel negative emotions"),
    question(FeatureName::SentPos, "I feel positive emotions"),
    question(FeatureName::LiwcAnxiety, "I feel anxious"),
    question(FeatureName::LiwcSadness, "I feel sad"),
    question(FeatureName::EconomicStressTotal, "I feel financial stress"),
    question(FeatureName::IsolationTotal, "I feel isolated"),
    question(FeatureName::SubstanceUseTotal, "I rely on substances"),
    question(FeatureName::SuicidalityTotal, "I have thoughts of self-harm"),
];

impl AssessmentKind {
    pub const ALL: [AssessmentKind; 5] = [
        AssessmentKind::Anxiety,
        AssessmentKind::Depression,
        AssessmentKind::Stress,
        AssessmentKind::DailyWellBeing,
        AssessmentKind::OverallAi,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AssessmentKind::Anxiety => "Anxiety Test",
            AssessmentKind::Depression => "Depression Test",
            AssessmentKind::Stress => "Stress Test",
            AssessmentKind::DailyWellBeing => "Daily Well-Being Check",
            AssessmentKind::OverallAi => "Overall Mental Health (AI)",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            AssessmentKind::Anxiety => "anxiety",
            AssessmentKind::Depression => "depression",
            AssessmentKind::Stress => "stress",
            AssessmentKind::DailyWellBeing => "daily_well_being",
            AssessmentKind::OverallAi => "overall_ai",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Self::ALL.into_iter().find(|kind| {
            kind.slug().eq_ignore_ascii_case(needle) || kind.label().eq_ignore_ascii_case(needle)
        })
    }

    pub fn questions(self) -> &'static [Question] {
        match self {
            AssessmentKind::Anxiety => &ANXIETY_QUESTIONS,
            AssessmentKind::Depression => &DEPRESSION_QUESTIONS,
            AssessmentKind::Stress => &STRESS_QUESTIONS,
            AssessmentKind::DailyWellBeing => &WELL_BEING_QUESTIONS,
            AssessmentKind::OverallAi => &OVERALL_QUESTIONS,
        }
    }

    /// Only the overall assessment is routed through the trained classifier.
    pub fn uses_model(self) -> bool {
        matches!(self, AssessmentKind::OverallAi)
    }
}

impl fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Catalog view of one assessment, as offered to respondents.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentDescriptor {
    pub assessment: AssessmentKind,
    pub label: &'static str,
    pub uses_model: bool,
    pub questions: &'static [Question],
}

pub fn catalog() -> Vec<AssessmentDescriptor> {
    AssessmentKind::ALL
        .into_iter()
        .map(|assessment| AssessmentDescriptor {
            assessment,
            label: assessment.label(),
            uses_model: assessment.uses_model(),
            questions: assessment.questions(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_indices_follow_declaration_order() {
        for (position, feature) in FeatureName::SCHEMA.iter().enumerate() {
            assert_eq!(feature.index(), position);
        }
        assert_eq!(FeatureName::SuicidalityTotal.index(), FEATURE_COUNT - 1);
    }

    #[test]
    fn feature_names_round_trip_through_their_wire_names() {
        for feature in FeatureName::SCHEMA {
            assert_eq!(FeatureName::parse(feature.as_str()), Some(feature));
            let json = serde_json::to_string(&feature).expect("serializes");
            assert_eq!(json, format!("\"{}\"", feature.as_str()));
        }
        assert_eq!(FeatureName::parse("mood_swings"), None);
    }

    #[test]
    fn response_values_outside_scale_are_rejected() {
        assert_eq!(ResponseValue::try_from(4).map(u8::from), Ok(4));
        assert_eq!(
            ResponseValue::try_from(5),
            Err(InvalidResponse::OutOfRange(5))
        );
        assert_eq!(ResponseValue::from_label("often").map(u8::from), Some(3));
        assert_eq!(ResponseValue::from_label("constantly"), None);
        assert_eq!(ResponseValue::parse(" 2 ").map(u8::from), Ok(2));
        assert_eq!(ResponseValue::parse("Always").map(u8::from), Ok(4));
        assert_eq!(
            ResponseValue::parse("12"),
            Err(InvalidResponse::OutOfRange(12))
        );
        assert!(matches!(
            ResponseValue::parse("sometimes-ish"),
            Err(InvalidResponse::UnknownAnswer(_))
        ));
    }

    #[test]
    fn questionnaire_deserializes_from_feature_map() {
        let responses: QuestionnaireResponse =
            serde_json::from_str(r#"{"liwc_anxiety": 3, "sent_neg": 1}"#).expect("parses");
        assert_eq!(responses.len(), 2);
        assert_eq!(responses.total(), 4);
        assert_eq!(
            responses.get(FeatureName::LiwcAnxiety).map(ResponseValue::get),
            Some(3)
        );

        let err = serde_json::from_str::<QuestionnaireResponse>(r#"{"sent_neg": 9}"#);
        assert!(err.is_err());
        let err = serde_json::from_str::<QuestionnaireResponse>(r#"{"sleep_quality": 1}"#);
        assert!(err.is_err());
    }

    #[test]
    fn mood_is_bounded_to_slider_range() {
        assert_eq!(Mood::try_from(1).map(u8::from), Ok(1));
        assert_eq!(Mood::try_from(10).map(u8::from), Ok(10));
        assert_eq!(Mood::try_from(0), Err(InvalidMood(0)));
        assert_eq!(Mood::try_from(11), Err(InvalidMood(11)));
        assert_eq!(Mood::default().get(), 5);
    }

    #[test]
    fn catalog_lists_every_assessment() {
        let entries = catalog();
        assert_eq!(entries.len(), AssessmentKind::ALL.len());
        let overall = entries
            .iter()
            .find(|entry| entry.uses_model)
            .expect("model-backed assessment");
        assert_eq!(overall.label, "Overall Mental Health (AI)");
        assert_eq!(overall.questions.len(), 8);
    }

    #[test]
    fn catalog_questions_only_reference_schema_features() {
        for kind in AssessmentKind::ALL {
            assert!(!kind.questions().is_empty());
            assert_eq!(AssessmentKind::parse(kind.slug()), Some(kind));
            assert_eq!(AssessmentKind::parse(kind.label()), Some(kind));
        }
        assert!(AssessmentKind::OverallAi
            .questions()
            .iter()
            .any(|question| question.feature.is_safety_critical()));
        assert_eq!(
            AssessmentKind::ALL
                .iter()
                .filter(|kind| kind.uses_model())
                .count(),
            1
        );
    }
}
