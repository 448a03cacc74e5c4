//! Session state.
//!
//! One `SessionState` per learning conversation, owned exclusively by the
//! pipeline controller. Agents never touch it. The whole struct serializes
//! to plain JSON so callers that want durability can persist it themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Explanation,
    Quiz,
    Feedback,
    Summary,
}

/// One append-only history record. Entries are never edited or removed;
/// their concatenated contents form the rolling context summary passed to
/// every subsequent agent call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: HistoryKind,
    pub content: String,
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Progress {
    pub completed_subtopics: BTreeSet<String>,
    pub mastered_concepts: BTreeSet<String>,
    pub needs_review: BTreeSet<String>,
}

/// Mutable record of one learning conversation.
///
/// The "awaiting answer iff a question is pending" invariant is enforced by
/// construction: both facts live in the single `pending_question` option.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SessionState {
    pub current_topic: String,
    pub active_subtopic: String,
    pub learning_path: Vec<String>,
    pub progress: Progress,
    pub session_history: Vec<HistoryEntry>,
    pub difficulty: Difficulty,
    pending_question: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole state for a brand-new topic, keeping nothing from
    /// the previous conversation.
    pub fn replace_for_topic(&mut self, topic: &str, learning_path: Vec<String>) {
        let mut seen = BTreeSet::new();
        let unique_path = learning_path
            .into_iter()
            .filter(|subtopic| seen.insert(subtopic.clone()))
            .collect();
        *self = Self {
            current_topic: topic.to_string(),
            learning_path: unique_path,
            ..Self::default()
        };
    }

    pub fn awaiting_answer(&self) -> bool {
        self.pending_question.is_some()
    }

    pub fn last_question(&self) -> Option<&str> {
        self.pending_question.as_deref()
    }

    pub fn set_pending_question(&mut self, question: impl Into<String>) {
        self.pending_question = Some(question.into());
    }

    pub fn clear_pending_question(&mut self) {
        self.pending_question = None;
    }

    /// Appends to the session history. Timestamps are assigned here so
    /// append order always equals the order turns complete.
    pub fn record(&mut self, kind: HistoryKind, content: impl Into<String>, outcome: Option<String>) {
        self.session_history.push(HistoryEntry {
            timestamp: Utc::now(),
            kind,
            content: content.into(),
            outcome,
        });
    }

    /// The rolling context summary: all history contents, oldest first.
    pub fn context_summary(&self) -> String {
        self.session_history
            .iter()
            .map(|entry| entry.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
