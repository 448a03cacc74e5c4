//! The pipeline controller.
//!
//! One `LearningEngine` per conversation, owning its session state. Every
//! turn runs the same machine: safety gate first, then either the pending
//! answer bypass, the uncertainty short-circuit, or classifier dispatch.
//! Agent failures of any kind surface as well-formed turn results; a turn
//! never crashes the session.
//!
//! Turns take `&mut self`, so two turns for one session cannot run
//! concurrently. Callers that share an engine across tasks serialize turns
//! with an async mutex, which queues double-submits in arrival order.

use crate::{
    classifier::{AgentKind, IntentClassifier},
    contracts::{
        AnswerEvalInput, AnswerEvalOutput, DeepDiveInput, DeepDiveOutput, ExplorationInput,
        ExplorationOutput, InteractiveInput, InteractiveOutput, QuestionInput, QuestionKind,
        QuestionOutput, SafetyStatus, SummaryInput, SummaryOutput, SummaryResult, TurnResult,
    },
    crisis::ResourceLocator,
    invoker::{AgentInvoker, AgentRole},
    llm_client::CompletionClient,
    normalizer::{ModerationFallback, Normalized, Normalizer},
    safety::SafetyGate,
    session::{HistoryKind, SessionState},
};
use anyhow::Result;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tracing::{info, instrument};

/// Substrings that make a turn read as "I don't know the answer" rather
/// than a new request. Plain substring match on the lowered input; known to
/// false-positive on unrelated text that contains one of them.
const UNCERTAINTY_PHRASES: &[&str] = &[
    "not sure",
    "dont know",
    "don't know",
    "im unsure",
    "i'm unsure",
];

const UNCERTAINTY_RESPONSE: &str = "That's okay! Let me help you understand this better. \
     Would you like me to explain the topic again or give you a hint?";

const NO_PRIOR_QUESTION: &str =
    "I don't see a previous question to evaluate. What would you like to learn about?";

fn expresses_uncertainty(input: &str) -> bool {
    let lower = input.to_lowercase();
    UNCERTAINTY_PHRASES.iter().any(|p| lower.contains(p))
}

fn fallback_result(fb: ModerationFallback) -> TurnResult {
    TurnResult {
        status: fb.status,
        explanation: fb.explanation,
        choices: fb.subtopics,
    }
}

/// Deterministic quiz used when the question agent's output was unusable.
fn fallback_question(subtopic: &str) -> QuestionOutput {
    let options = vec![
        "I understand it well".to_string(),
        "I need more explanation".to_string(),
        "I have some questions".to_string(),
        "Let's move on to the next topic".to_string(),
    ];
    QuestionOutput {
        question: format!("What have you learned about {subtopic}?"),
        kind: QuestionKind::Mcq,
        correct_answer: options[0].clone(),
        options,
    }
}

/// Orchestrates one learning conversation.
pub struct LearningEngine {
    session: SessionState,
    invoker: AgentInvoker,
    gate: SafetyGate,
    classifier: IntentClassifier,
    client_ip: Option<String>,
}

impl LearningEngine {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        locator: Arc<dyn ResourceLocator>,
        timeout: Duration,
    ) -> Self {
        let invoker = AgentInvoker::new(client, timeout);
        Self {
            session: SessionState::new(),
            gate: SafetyGate::new(invoker.clone(), locator),
            classifier: IntentClassifier::new(invoker.clone()),
            invoker,
            client_ip: None,
        }
    }

    /// Swaps the refusal predicate everywhere it is consulted.
    pub fn with_normalizer(
        client: Arc<dyn CompletionClient>,
        locator: Arc<dyn ResourceLocator>,
        timeout: Duration,
        normalizer: Normalizer,
    ) -> Self {
        let invoker = AgentInvoker::new(client, timeout).with_normalizer(normalizer);
        Self {
            session: SessionState::new(),
            gate: SafetyGate::new(invoker.clone(), locator),
            classifier: IntentClassifier::new(invoker.clone()),
            invoker,
            client_ip: None,
        }
    }

    /// Client address used for the crisis-resource region lookup.
    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Processes one user turn end to end. Backs both "start a topic" and
    /// "submit an answer": the safety gate and the pending-question check
    /// decide what the input means.
    #[instrument(skip_all, fields(awaiting = self.session.awaiting_answer()))]
    pub async fn handle_turn(&mut self, input: &str) -> Result<TurnResult> {
        let report = self
            .gate
            .check(input, &self.session.context_summary(), self.client_ip.as_deref())
            .await?;
        if report.status != SafetyStatus::Safe {
            // Halted: no state mutation, no history entry.
            return Ok(TurnResult {
                status: report.status,
                explanation: report.explanation,
                choices: Vec::new(),
            });
        }

        // A pending question routes straight to answer evaluation; the
        // classifier is bypassed entirely.
        if let Some(question) = self.session.last_question().map(str::to_owned) {
            return self.evaluate_answer(question, input).await;
        }

        if expresses_uncertainty(input) {
            info!("uncertainty phrase detected; offering a hint instead of reclassifying");
            return Ok(TurnResult::safe(UNCERTAINTY_RESPONSE).with_choices(vec![
                "Explain again".to_string(),
                "Give me a hint".to_string(),
            ]));
        }

        let decision = self
            .classifier
            .classify(input, &self.session.context_summary())
            .await?;
        match decision {
            Some(AgentKind::Question) => self.ask_question().await,
            Some(AgentKind::AnswerEval) => Ok(TurnResult::safe(NO_PRIOR_QUESTION)),
            Some(AgentKind::Interactive) => self.interact(input).await,
            Some(AgentKind::Exploration) | None => self.explore(input).await,
        }
    }

    async fn evaluate_answer(&mut self, question: String, input: &str) -> Result<TurnResult> {
        let outcome: Normalized<AnswerEvalOutput> = self
            .invoker
            .invoke(
                AgentRole::AnswerEval,
                &AnswerEvalInput {
                    subtopic: self.session.active_subtopic.clone(),
                    broader_topic: self.session.current_topic.clone(),
                    question_asked: question,
                    user_question_answer: input.to_string(),
                    latest_context_summary: self.session.context_summary(),
                },
            )
            .await?;

        match outcome {
            Normalized::Data(eval) => {
                // Pending-question state is only cleared on a successful
                // evaluation, so a failed call can be retried.
                self.session.clear_pending_question();
                let subtopic = self.session.active_subtopic.clone();
                let outcome_label = if eval.is_correct {
                    self.session
                        .progress
                        .completed_subtopics
                        .insert(subtopic.clone());
                    self.session.progress.mastered_concepts.insert(subtopic);
                    "correct"
                } else {
                    self.session.progress.needs_review.insert(subtopic);
                    "needs review"
                };
                self.session.record(
                    HistoryKind::Feedback,
                    eval.feedback.clone(),
                    Some(outcome_label.to_string()),
                );
                Ok(TurnResult::safe(eval.feedback))
            }
            Normalized::Fallback(fb) => Ok(fallback_result(fb)),
        }
    }

    async fn ask_question(&mut self) -> Result<TurnResult> {
        let subtopic = self.session.active_subtopic.clone();
        let outcome: Normalized<QuestionOutput> = self
            .invoker
            .invoke(
                AgentRole::Question,
                &QuestionInput {
                    subtopic: subtopic.clone(),
                    broader_topic: self.session.current_topic.clone(),
                    latest_context_summary: self.session.context_summary(),
                },
            )
            .await?;

        let quiz = match outcome {
            Normalized::Data(quiz) => quiz,
            // A degraded quiz is still a quiz; substitute a deterministic one.
            Normalized::Fallback(_) => fallback_question(&subtopic),
        };

        self.session.set_pending_question(quiz.question.clone());
        self.session.record(HistoryKind::Quiz, quiz.question.clone(), None);
        let choices = match quiz.kind {
            QuestionKind::Mcq => quiz.options,
            QuestionKind::Input => Vec::new(),
        };
        Ok(TurnResult::safe(quiz.question).with_choices(choices))
    }

    async fn interact(&mut self, input: &str) -> Result<TurnResult> {
        let outcome: Normalized<InteractiveOutput> = self
            .invoker
            .invoke(
                AgentRole::Interactive,
                &InteractiveInput {
                    user_input: input.to_string(),
                    latest_context_summary: self.session.context_summary(),
                },
            )
            .await?;

        match outcome {
            Normalized::Data(reply) => {
                self.session
                    .record(HistoryKind::Explanation, reply.response.clone(), None);
                Ok(TurnResult::safe(reply.response))
            }
            Normalized::Fallback(fb) => Ok(fallback_result(fb)),
        }
    }

    async fn explore(&mut self, input: &str) -> Result<TurnResult> {
        let outcome: Normalized<ExplorationOutput> = self
            .invoker
            .invoke(
                AgentRole::Exploration,
                &ExplorationInput {
                    user_prompt: input.to_string(),
                    latest_context_summary: self.session.context_summary(),
                },
            )
            .await?;

        match outcome {
            Normalized::Data(exploration) => {
                // A brand-new topic replaces the session wholesale.
                self.session
                    .replace_for_topic(input, exploration.subtopics.clone());
                self.session
                    .record(HistoryKind::Explanation, exploration.summary.clone(), None);
                info!(topic = %input, subtopics = exploration.subtopics.len(), "started new topic");
                Ok(TurnResult::safe(exploration.summary).with_choices(exploration.subtopics))
            }
            Normalized::Fallback(fb) => Ok(fallback_result(fb)),
        }
    }

    /// Detailed breakdown of one subtopic, formatted as a single markdown
    /// document. Marks the subtopic active for subsequent quiz turns.
    pub async fn get_explanation(&mut self, subtopic: &str) -> Result<TurnResult> {
        let outcome: Normalized<DeepDiveOutput> = self
            .invoker
            .invoke(
                AgentRole::DeepDive,
                &DeepDiveInput {
                    subtopic: subtopic.to_string(),
                    broader_topic: self.session.current_topic.clone(),
                    latest_context_summary: self.session.context_summary(),
                },
            )
            .await?;

        match outcome {
            Normalized::Data(dive) => {
                let content = format_breakdown(subtopic, &dive);
                self.session.active_subtopic = subtopic.to_string();
                self.session
                    .record(HistoryKind::Explanation, content.clone(), None);
                Ok(TurnResult::safe(content))
            }
            Normalized::Fallback(fb) => Ok(fallback_result(fb)),
        }
    }

    /// Consolidates the session history into an updated context summary.
    pub async fn get_session_summary(&mut self) -> Result<SummaryResult> {
        let outcome: Normalized<SummaryOutput> = self
            .invoker
            .invoke(
                AgentRole::SummaryConsolidation,
                &SummaryInput {
                    latest_context_summary: self.session.context_summary(),
                    last_agent_input: Value::Null,
                    last_agent_output: Value::Null,
                },
            )
            .await?;

        Ok(match outcome {
            Normalized::Data(summary) => {
                self.session.record(
                    HistoryKind::Summary,
                    summary.updated_context_summary.clone(),
                    None,
                );
                SummaryResult {
                    status: SafetyStatus::Safe,
                    updated_context_summary: summary.updated_context_summary,
                }
            }
            Normalized::Fallback(fb) => SummaryResult {
                status: fb.status,
                updated_context_summary: fb.explanation,
            },
        })
    }
}

fn format_breakdown(subtopic: &str, dive: &DeepDiveOutput) -> String {
    let mut content = format!("# {subtopic}\n\n{}", dive.breakdown);
    if let Some(analogy) = &dive.analogy {
        content.push_str(&format!("\n\n## Analogy\n{analogy}"));
    }
    if let Some(diagram) = &dive.mermaid_diagram {
        content.push_str(&format!("\n\n## Diagram\n```mermaid\n{diagram}\n```"));
    }
    if let Some(code) = &dive.code_example {
        content.push_str(&format!("\n\n## Code Example\n```\n{code}\n```"));
    }
    content
}
