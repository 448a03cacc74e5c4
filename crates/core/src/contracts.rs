//! Per-agent input/output contracts.
//!
//! Every agent role has a fixed pair of shapes: the input struct the engine
//! serializes into the model call, and the output struct the normalizer must
//! recover from whatever text the model returns. Output fields are either
//! *required-with-default* (the shape supplies a value when the field is
//! absent or the wrong type) or *required-hard* (absence is a normalization
//! failure, downgraded by the caller to a generic fallback).
//!
//! Wire-level field names are camelCase because the instruction templates
//! document them that way to the model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Terminal safety classification of one piece of input or model output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyStatus {
    Safe,
    NeedsHelp,
    Dangerous,
    Inappropriate,
}

impl SafetyStatus {
    /// Parses the wire form (`"SAFE"`, `"NEEDS_HELP"`, ...) leniently.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SAFE" => Some(Self::Safe),
            "NEEDS_HELP" => Some(Self::NeedsHelp),
            "DANGEROUS" => Some(Self::Dangerous),
            "INAPPROPRIATE" => Some(Self::Inappropriate),
            _ => None,
        }
    }
}

/// A required-hard field was absent or had the wrong type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required field `{0}` in model response")]
pub struct MissingField(pub &'static str);

/// A typed view over a parsed model response.
///
/// Implementations declare, field by field, which values are default-filled
/// and which are required-hard. The normalizer calls this after it has
/// stripped and parsed the raw text.
pub trait OutputShape: Sized {
    fn from_model_value(value: &Value) -> Result<Self, MissingField>;
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn string_or(value: &Value, key: &str, default: &str) -> String {
    string_field(value, key).unwrap_or_else(|| default.to_string())
}

fn string_list_or(value: &Value, key: &str, default: &[&str]) -> Vec<String> {
    match value.get(key).and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        None => default.iter().map(|s| s.to_string()).collect(),
    }
}

fn require_string(value: &Value, key: &'static str) -> Result<String, MissingField> {
    string_field(value, key).ok_or(MissingField(key))
}

fn require_bool(value: &Value, key: &'static str) -> Result<bool, MissingField> {
    value.get(key).and_then(Value::as_bool).ok_or(MissingField(key))
}

// --- Exploration agent ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorationInput {
    pub user_prompt: String,
    pub latest_context_summary: String,
}

/// Structured learning path produced for a brand-new topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplorationOutput {
    pub subtopics: Vec<String>,
    pub broader_topic: Option<String>,
    pub prerequisites: Vec<String>,
    pub summary: String,
}

impl OutputShape for ExplorationOutput {
    fn from_model_value(value: &Value) -> Result<Self, MissingField> {
        Ok(Self {
            subtopics: string_list_or(value, "subtopics", &["Basic Overview"]),
            broader_topic: string_field(value, "broaderTopic"),
            prerequisites: string_list_or(value, "prerequisites", &[]),
            summary: string_or(value, "summary", "Let's explore this topic."),
        })
    }
}

// --- Interactive agent ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveInput {
    pub user_input: String,
    pub latest_context_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractiveOutput {
    pub response: String,
}

impl OutputShape for InteractiveOutput {
    fn from_model_value(value: &Value) -> Result<Self, MissingField> {
        Ok(Self {
            response: require_string(value, "response")?,
        })
    }
}

// --- Question agent ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    pub subtopic: String,
    pub broader_topic: String,
    pub latest_context_summary: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuestionKind {
    #[serde(rename = "MCQ")]
    Mcq,
    #[serde(rename = "inputQ")]
    Input,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionOutput {
    pub question: String,
    pub kind: QuestionKind,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl OutputShape for QuestionOutput {
    fn from_model_value(value: &Value) -> Result<Self, MissingField> {
        let kind = match string_or(value, "type", "MCQ").to_ascii_lowercase().as_str() {
            "inputq" => QuestionKind::Input,
            _ => QuestionKind::Mcq,
        };
        let options = string_list_or(
            value,
            "options",
            &["I understand it well", "I need more explanation"],
        );
        let correct_answer = string_field(value, "correctAnswer")
            .or_else(|| options.first().cloned())
            .unwrap_or_else(|| "I understand it well".to_string());
        Ok(Self {
            question: string_or(value, "question", "What do you understand about this topic?"),
            kind,
            options,
            correct_answer,
        })
    }
}

// --- Answer evaluation agent ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEvalInput {
    pub subtopic: String,
    pub broader_topic: String,
    pub question_asked: String,
    pub user_question_answer: String,
    pub latest_context_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerEvalOutput {
    pub is_correct: bool,
    pub feedback: String,
}

impl OutputShape for AnswerEvalOutput {
    fn from_model_value(value: &Value) -> Result<Self, MissingField> {
        Ok(Self {
            is_correct: require_bool(value, "isCorrect")?,
            feedback: require_string(value, "feedback")?,
        })
    }
}

// --- Intent classifier ---

/// One catalog entry handed to the classifier: an agent name plus a one-line
/// capability description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentDescriptor {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierInput {
    pub user_input: String,
    pub available_agents: Vec<AgentDescriptor>,
    pub latest_context_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierOutput {
    pub next_agent: String,
}

impl OutputShape for ClassifierOutput {
    fn from_model_value(value: &Value) -> Result<Self, MissingField> {
        Ok(Self {
            next_agent: require_string(value, "nextAgent")?,
        })
    }
}

// --- Safety agent ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyInput {
    pub user_input: String,
    pub latest_context_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SafetyOutput {
    pub status: SafetyStatus,
    pub explanation: String,
}

impl OutputShape for SafetyOutput {
    fn from_model_value(value: &Value) -> Result<Self, MissingField> {
        let status = string_field(value, "status")
            .and_then(|s| SafetyStatus::from_wire(&s))
            .unwrap_or(SafetyStatus::Safe);
        Ok(Self {
            status,
            explanation: string_or(value, "explanation", ""),
        })
    }
}

// --- Deep dive agent ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepDiveInput {
    pub subtopic: String,
    pub broader_topic: String,
    pub latest_context_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeepDiveOutput {
    pub breakdown: String,
    pub mermaid_diagram: Option<String>,
    pub analogy: Option<String>,
    pub code_example: Option<String>,
}

impl OutputShape for DeepDiveOutput {
    fn from_model_value(value: &Value) -> Result<Self, MissingField> {
        Ok(Self {
            breakdown: require_string(value, "breakdown")?,
            mermaid_diagram: string_field(value, "mermaidDiagram"),
            analogy: string_field(value, "analogy"),
            code_example: string_field(value, "codeExample"),
        })
    }
}

// --- Summary consolidation agent ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryInput {
    pub latest_context_summary: String,
    pub last_agent_input: Value,
    pub last_agent_output: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryOutput {
    pub updated_context_summary: String,
}

impl OutputShape for SummaryOutput {
    fn from_model_value(value: &Value) -> Result<Self, MissingField> {
        Ok(Self {
            updated_context_summary: require_string(value, "updatedContextSummary")?,
        })
    }
}

// --- Turn results ---

/// What every completed turn hands back to the caller: a human-presentable
/// explanation plus optional choices (MCQ options, suggested subtopics).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurnResult {
    pub status: SafetyStatus,
    pub explanation: String,
    pub choices: Vec<String>,
}

impl TurnResult {
    pub fn safe(explanation: impl Into<String>) -> Self {
        Self {
            status: SafetyStatus::Safe,
            explanation: explanation.into(),
            choices: Vec::new(),
        }
    }

    pub fn with_choices(mut self, choices: Vec<String>) -> Self {
        self.choices = choices;
        self
    }
}

/// Result of a session-summary consolidation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryResult {
    pub status: SafetyStatus,
    pub updated_context_summary: String,
}
