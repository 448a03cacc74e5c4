//! API Models
//!
//! Wire-level request and response types, kept separate from the engine's own
//! types so the HTTP contract (camelCase JSON, OpenAPI schemas) can evolve
//! without touching the core crate.

use mindflow_core::{SafetyStatus, SessionState, SummaryResult, TurnResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Wire mirror of the engine's safety classification.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiSafetyStatus {
    Safe,
    Dangerous,
    Inappropriate,
    NeedsHelp,
}

impl From<SafetyStatus> for ApiSafetyStatus {
    fn from(status: SafetyStatus) -> Self {
        match status {
            SafetyStatus::Safe => Self::Safe,
            SafetyStatus::Dangerous => Self::Dangerous,
            SafetyStatus::Inappropriate => Self::Inappropriate,
            SafetyStatus::NeedsHelp => Self::NeedsHelp,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    #[schema(value_type = String, format = Uuid)]
    pub session_id: Uuid,
}

#[derive(Deserialize, ToSchema)]
pub struct TurnPayload {
    #[schema(example = "Explain quantum computing")]
    pub text: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ExplanationPayload {
    #[schema(example = "Qubits")]
    pub subtopic: String,
}

/// The result of one pipeline turn, as returned to the client.
#[derive(Serialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    #[schema(example = "SAFE")]
    pub status: ApiSafetyStatus,
    pub explanation: String,
    pub choices: Vec<String>,
}

impl From<TurnResult> for TurnResponse {
    fn from(result: TurnResult) -> Self {
        Self {
            status: result.status.into(),
            explanation: result.explanation,
            choices: result.choices,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    #[schema(example = "SAFE")]
    pub status: ApiSafetyStatus,
    pub updated_context_summary: String,
}

impl From<SummaryResult> for SummaryResponse {
    fn from(result: SummaryResult) -> Self {
        Self {
            status: result.status.into(),
            updated_context_summary: result.updated_context_summary,
        }
    }
}

/// Read-only snapshot of one session's learning state.
#[derive(Serialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[schema(value_type = String, format = Uuid)]
    pub session_id: Uuid,
    pub current_topic: String,
    pub active_subtopic: String,
    pub learning_path: Vec<String>,
    pub awaiting_answer: bool,
    pub completed_subtopics: Vec<String>,
    pub mastered_concepts: Vec<String>,
    pub needs_review: Vec<String>,
}

impl SessionView {
    pub fn snapshot(session_id: Uuid, state: &SessionState) -> Self {
        Self {
            session_id,
            current_topic: state.current_topic.clone(),
            active_subtopic: state.active_subtopic.clone(),
            learning_path: state.learning_path.clone(),
            awaiting_answer: state.awaiting_answer(),
            completed_subtopics: state.progress.completed_subtopics.iter().cloned().collect(),
            mastered_concepts: state.progress.mastered_concepts.iter().cloned().collect(),
            needs_review: state.progress.needs_review.iter().cloned().collect(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
