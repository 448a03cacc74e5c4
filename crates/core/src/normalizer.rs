//! Response normalization.
//!
//! The model is asked for strict JSON but may return anything: valid JSON,
//! JSON wrapped in prose or code fences, a plain-text refusal, or garbage.
//! This module recovers a typed [`OutputShape`] from that text, or produces a
//! well-defined fallback. It never fails for any input text.
//!
//! The refusal detection is a coarse substring scan over a fixed phrase list.
//! It can misclassify legitimate content that mentions one of the phrases
//! (an essay discussing "racism" educationally, for instance). That bias is
//! deliberate and documented; the phrase list is isolated in
//! [`RefusalLexicon`] so it can be hardened without touching the pipeline.

use crate::contracts::{OutputShape, SafetyStatus};
use serde_json::Value;
use tracing::{debug, warn};

/// Phrases that mark a model response as a moderation refusal.
pub const DEFAULT_REFUSAL_PHRASES: &[&str] = &[
    "cannot help",
    "inappropriate",
    "harmful",
    "unacceptable",
    "i'm sorry",
    "i am sorry",
    "i apologize",
    "not appropriate",
    "racism",
];

const GENERIC_REFUSAL_MESSAGE: &str = "I cannot help with that request.";

/// The configurable refusal predicate.
#[derive(Debug, Clone)]
pub struct RefusalLexicon {
    phrases: Vec<String>,
}

impl Default for RefusalLexicon {
    fn default() -> Self {
        Self::new(DEFAULT_REFUSAL_PHRASES.iter().map(|p| p.to_string()))
    }
}

impl RefusalLexicon {
    pub fn new(phrases: impl IntoIterator<Item = String>) -> Self {
        Self {
            phrases: phrases.into_iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// True when the lower-cased text starts with any refusal phrase.
    pub fn starts_with_refusal(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.phrases.iter().any(|p| lower.starts_with(p.as_str()))
    }

    /// True when the lower-cased text contains any refusal phrase.
    pub fn contains_refusal(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.phrases.iter().any(|p| lower.contains(p.as_str()))
    }
}

/// A normalizer result that represents a detected refusal, a provider block,
/// or an unrecoverable processing error rather than real content.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationFallback {
    pub status: SafetyStatus,
    pub explanation: String,
    pub subtopics: Vec<String>,
    pub prerequisites: Vec<String>,
    pub summary: String,
}

impl ModerationFallback {
    /// The model declined; its own text is the explanation.
    pub fn refusal(explanation: impl Into<String>) -> Self {
        Self {
            status: SafetyStatus::Inappropriate,
            explanation: explanation.into(),
            subtopics: Vec::new(),
            prerequisites: Vec::new(),
            summary: String::new(),
        }
    }

    /// The provider's own content filter blocked the response.
    pub fn blocked_content() -> Self {
        Self::refusal(
            "I apologize, but I cannot generate that type of content. \
             Let's focus on something else.",
        )
    }

    /// Unparseable output or a transport failure; degrade to a generic
    /// "let's start over" response.
    pub fn processing_error() -> Self {
        Self {
            status: SafetyStatus::NeedsHelp,
            explanation: "I encountered an error processing your request. \
                          Let me help you with something else."
                .to_string(),
            subtopics: vec!["Basic Overview".to_string()],
            prerequisites: Vec::new(),
            summary: "Let's start with the basics.".to_string(),
        }
    }
}

/// Outcome of normalizing one raw model response against a shape.
///
/// Callers pattern-match exhaustively instead of probing optional fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    Data(T),
    Fallback(ModerationFallback),
}

impl<T> Normalized<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Data(data) => Some(data),
            Self::Fallback(_) => None,
        }
    }
}

/// Recovers typed output from raw model text.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    lexicon: RefusalLexicon,
}

impl Normalizer {
    pub fn new(lexicon: RefusalLexicon) -> Self {
        Self { lexicon }
    }

    /// Normalizes `raw` against the shape `T`. Total: returns a fallback
    /// rather than an error for any malformed input.
    pub fn normalize<T: OutputShape>(&self, raw: &str) -> Normalized<T> {
        let text = raw.trim();

        // 1. Plain-text refusal: the whole response is the explanation.
        if self.lexicon.starts_with_refusal(text) {
            debug!("detected moderation response from text start");
            return Normalized::Fallback(ModerationFallback::refusal(text));
        }

        // 2. Strip code fences and surrounding prose down to one JSON object.
        let stripped = strip_to_json(text);
        if stripped.starts_with("I ") || stripped.starts_with("I'm ") || stripped.starts_with("Im ")
        {
            debug!("stripped response still reads as first-person prose");
            return Normalized::Fallback(ModerationFallback::refusal(stripped));
        }

        // 3. Strict parse, then moderation scan, then default-fill.
        match serde_json::from_str::<Value>(&stripped) {
            Ok(value) => {
                if let Some(message) = self.moderation_message(&value) {
                    debug!("detected moderation phrase in parsed response");
                    return Normalized::Fallback(ModerationFallback::refusal(message));
                }
                match T::from_model_value(&value) {
                    Ok(shape) => Normalized::Data(shape),
                    Err(missing) => {
                        warn!(%missing, "model response parsed but is missing a required field");
                        Normalized::Fallback(ModerationFallback::processing_error())
                    }
                }
            }
            Err(err) => {
                if self.lexicon.contains_refusal(&stripped) {
                    debug!("detected moderation phrase in unparseable response");
                    Normalized::Fallback(ModerationFallback::refusal(stripped))
                } else {
                    warn!(error = %err, "model response was not valid JSON");
                    Normalized::Fallback(ModerationFallback::processing_error())
                }
            }
        }
    }

    /// If the parsed object carries an `error` field or any refusal phrase,
    /// elects the most likely human-readable message for the fallback.
    fn moderation_message(&self, value: &Value) -> Option<String> {
        let has_error = value
            .get("error")
            .is_some_and(|e| !e.is_null() && *e != Value::String(String::new()));
        let serialized = value.to_string();
        if !has_error && !self.lexicon.contains_refusal(&serialized) {
            return None;
        }

        for key in ["error", "message", "explanation"] {
            if let Some(text) = value.get(key).and_then(Value::as_str) {
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
        }
        if let Some(object) = value.as_object() {
            for field in object.values() {
                if let Some(text) = field.as_str() {
                    if self.lexicon.contains_refusal(text) {
                        return Some(text.to_string());
                    }
                }
            }
        }
        Some(GENERIC_REFUSAL_MESSAGE.to_string())
    }
}

/// Removes Markdown code-fence delimiters, then extracts the substring
/// between the first `{` and the last `}` inclusive. Text without a brace
/// pair is returned trimmed as-is.
fn strip_to_json(text: &str) -> String {
    let unfenced = text.replace("```json", "").replace("```", "");
    let trimmed = unfenced.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => trimmed[start..=end].to_string(),
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{AnswerEvalOutput, ExplorationOutput, SafetyOutput};
    use serde_json::json;

    fn normalizer() -> Normalizer {
        Normalizer::default()
    }

    fn expect_fallback<T: OutputShape + std::fmt::Debug>(outcome: Normalized<T>) -> ModerationFallback {
        match outcome {
            Normalized::Fallback(fb) => fb,
            Normalized::Data(data) => panic!("expected fallback, got data: {data:?}"),
        }
    }

    #[test]
    fn plain_refusal_keeps_original_text_as_explanation() {
        let raw = "I'm sorry, I cannot assist with that request.";
        let fb = expect_fallback::<ExplorationOutput>(normalizer().normalize(raw));
        assert_eq!(fb.status, SafetyStatus::Inappropriate);
        assert_eq!(fb.explanation, raw);
        assert!(fb.subtopics.is_empty());
        assert!(fb.prerequisites.is_empty());
        assert_eq!(fb.summary, "");
    }

    #[test]
    fn fenced_json_with_surrounding_prose_round_trips() {
        let raw = "Here you go!\n```json\n{\"subtopics\":[\"A\",\"B\"],\"summary\":\"x\"}\n```\nHope that helps.";
        let outcome: Normalized<ExplorationOutput> = normalizer().normalize(raw);
        let Normalized::Data(shape) = outcome else {
            panic!("expected data");
        };
        assert_eq!(shape.subtopics, vec!["A", "B"]);
        assert!(shape.prerequisites.is_empty());
        assert_eq!(shape.summary, "x");
    }

    #[test]
    fn already_valid_json_is_idempotent() {
        let raw = r#"{"subtopics":["A"],"prerequisites":["P"],"summary":"s","broaderTopic":"B"}"#;
        let outcome: Normalized<ExplorationOutput> = normalizer().normalize(raw);
        let Normalized::Data(shape) = outcome else {
            panic!("expected data");
        };
        assert_eq!(shape.subtopics, vec!["A"]);
        assert_eq!(shape.prerequisites, vec!["P"]);
        assert_eq!(shape.summary, "s");
        assert_eq!(shape.broader_topic.as_deref(), Some("B"));
    }

    #[test]
    fn stripped_first_person_prose_is_a_refusal() {
        // The fence strip leaves first-person prose with no brace pair.
        let raw = "```\nI must decline this one.\n```";
        let fb = expect_fallback::<ExplorationOutput>(normalizer().normalize(raw));
        assert_eq!(fb.status, SafetyStatus::Inappropriate);
        assert_eq!(fb.explanation, "I must decline this one.");
    }

    #[test]
    fn error_field_becomes_moderation_message() {
        let raw = r#"{"error": "request was rejected"}"#;
        let fb = expect_fallback::<ExplorationOutput>(normalizer().normalize(raw));
        assert_eq!(fb.status, SafetyStatus::Inappropriate);
        assert_eq!(fb.explanation, "request was rejected");
    }

    #[test]
    fn embedded_refusal_phrase_elects_string_field() {
        let raw = r#"{"note": "This topic is not appropriate for students."}"#;
        let fb = expect_fallback::<ExplorationOutput>(normalizer().normalize(raw));
        assert_eq!(fb.explanation, "This topic is not appropriate for students.");
    }

    #[test]
    fn refusal_phrase_with_no_string_field_gets_generic_message() {
        // "error" carries a non-string payload; nothing readable to elect.
        let raw = r#"{"error": {"code": 42}}"#;
        let fb = expect_fallback::<ExplorationOutput>(normalizer().normalize(raw));
        assert_eq!(fb.explanation, "I cannot help with that request.");
    }

    #[test]
    fn garbage_falls_back_to_processing_error() {
        let fb = expect_fallback::<ExplorationOutput>(normalizer().normalize("{{{{ nonsense"));
        assert_eq!(fb.status, SafetyStatus::NeedsHelp);
        assert_eq!(fb.subtopics, vec!["Basic Overview"]);
        assert_eq!(fb.summary, "Let's start with the basics.");
    }

    #[test]
    fn unparseable_text_with_refusal_phrase_is_moderation() {
        let raw = "{ broken json, but this content is harmful";
        let fb = expect_fallback::<ExplorationOutput>(normalizer().normalize(raw));
        assert_eq!(fb.status, SafetyStatus::Inappropriate);
        assert!(fb.explanation.contains("harmful"));
    }

    #[test]
    fn missing_hard_field_downgrades_to_processing_error() {
        let raw = r#"{"feedback": "good effort"}"#;
        let fb = expect_fallback::<AnswerEvalOutput>(normalizer().normalize(raw));
        assert_eq!(fb.status, SafetyStatus::NeedsHelp);
    }

    #[test]
    fn fallback_totality_over_assorted_inputs() {
        let samples = [
            "",
            "   ",
            "null",
            "[1,2,3]",
            "\u{0}\u{1}",
            "{}",
            "}{",
            "```json```",
            "totally plain text",
        ];
        for raw in samples {
            // Must not panic, must always produce a value.
            let _: Normalized<ExplorationOutput> = normalizer().normalize(raw);
        }
    }

    #[test]
    fn safety_shape_passes_through_dangerous_status() {
        let raw = r#"{"status": "DANGEROUS", "explanation": "weapon instructions"}"#;
        let outcome: Normalized<SafetyOutput> = normalizer().normalize(raw);
        let Normalized::Data(shape) = outcome else {
            panic!("expected data");
        };
        assert_eq!(shape.status, SafetyStatus::Dangerous);
        assert_eq!(shape.explanation, "weapon instructions");
    }

    #[test]
    fn custom_lexicon_replaces_default_phrases() {
        let lexicon = RefusalLexicon::new(vec!["verboten".to_string()]);
        let normalizer = Normalizer::new(lexicon);
        let fb = expect_fallback::<ExplorationOutput>(normalizer.normalize("Verboten topic, sorry."));
        assert_eq!(fb.status, SafetyStatus::Inappropriate);

        // The stock phrases no longer trigger.
        let outcome: Normalized<ExplorationOutput> =
            normalizer.normalize(r#"{"summary": "i apologize for the delay"}"#);
        assert!(!outcome.is_fallback());
    }
}
