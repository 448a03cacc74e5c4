//! Agent invocation.
//!
//! An agent is a role instruction template bound to one model call and one
//! input/output contract. The invoker wires the template, the call, and the
//! normalizer together, and converts transport-level failures into the same
//! fallbacks the normalizer produces. It never propagates a raw network
//! error; only contract-level failures (input serialization) bubble up.

use crate::{
    instructions,
    llm_client::CompletionClient,
    normalizer::{ModerationFallback, Normalized, Normalizer},
};
use anyhow::Result;
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

use crate::contracts::OutputShape;

/// The closed set of agent roles. Requesting a role that does not exist is a
/// wiring bug, and the enum makes it unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRole {
    Safety,
    Classifier,
    Exploration,
    Interactive,
    Question,
    AnswerEval,
    DeepDive,
    SummaryConsolidation,
}

impl AgentRole {
    pub fn instructions(&self) -> &'static str {
        match self {
            Self::Safety => instructions::SAFETY_AGENT,
            Self::Classifier => instructions::AGENT_CLASSIFIER,
            Self::Exploration => instructions::EXPLORATION_AGENT,
            Self::Interactive => instructions::INTERACTIVE_AGENT,
            Self::Question => instructions::QUESTION_AGENT,
            Self::AnswerEval => instructions::ANSWER_EVAL_AGENT,
            Self::DeepDive => instructions::DEEP_DIVE_AGENT,
            Self::SummaryConsolidation => instructions::SUMMARY_CONSOLIDATION_AGENT,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Safety => "safety",
            Self::Classifier => "classifier",
            Self::Exploration => "exploration",
            Self::Interactive => "interactive",
            Self::Question => "question",
            Self::AnswerEval => "answerEval",
            Self::DeepDive => "deepDive",
            Self::SummaryConsolidation => "summaryConsolidation",
        }
    }
}

/// Binds instruction templates to model calls and normalizes the result.
#[derive(Clone)]
pub struct AgentInvoker {
    client: Arc<dyn CompletionClient>,
    normalizer: Normalizer,
    timeout: Duration,
}

impl AgentInvoker {
    pub fn new(client: Arc<dyn CompletionClient>, timeout: Duration) -> Self {
        Self {
            client,
            normalizer: Normalizer::default(),
            timeout,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Invokes one agent role. Timeouts, transport errors, and provider
    /// content-filter rejections come back as fallbacks, not errors.
    pub async fn invoke<I, T>(&self, role: AgentRole, input: &I) -> Result<Normalized<T>>
    where
        I: Serialize + Sync,
        T: OutputShape,
    {
        let payload = serde_json::to_value(input)?;
        debug!(agent = role.name(), "invoking agent");

        let call = self.client.complete(role.instructions(), payload);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(text)) => Ok(self.normalizer.normalize(&text)),
            Ok(Err(err)) => {
                if is_provider_safety_block(&err) {
                    warn!(agent = role.name(), "response blocked by provider safety filter");
                    Ok(Normalized::Fallback(ModerationFallback::blocked_content()))
                } else {
                    warn!(agent = role.name(), error = %err, "agent call failed");
                    Ok(Normalized::Fallback(ModerationFallback::processing_error()))
                }
            }
            Err(_) => {
                warn!(agent = role.name(), timeout = ?self.timeout, "agent call timed out");
                Ok(Normalized::Fallback(ModerationFallback::processing_error()))
            }
        }
    }
}

/// Provider-side content filters surface as errors rather than responses;
/// they deserve the apology fallback instead of the generic one.
fn is_provider_safety_block(err: &anyhow::Error) -> bool {
    let text = err.to_string();
    text.contains("SAFETY") || text.to_lowercase().contains("content_filter")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{ExplorationInput, ExplorationOutput, SafetyStatus};
    use crate::llm_client::MockCompletionClient;
    use anyhow::anyhow;

    fn exploration_input() -> ExplorationInput {
        ExplorationInput {
            user_prompt: "Explain quantum computing".into(),
            latest_context_summary: String::new(),
        }
    }

    #[tokio::test]
    async fn invoke_normalizes_successful_response() {
        let mut client = MockCompletionClient::new();
        client.expect_complete().times(1).returning(|_, _| {
            Ok(r#"{"subtopics":["Qubits","Gates"],"summary":"An intro"}"#.to_string())
        });

        let invoker = AgentInvoker::new(Arc::new(client), Duration::from_secs(5));
        let outcome: Normalized<ExplorationOutput> = invoker
            .invoke(AgentRole::Exploration, &exploration_input())
            .await
            .unwrap();

        let Normalized::Data(shape) = outcome else {
            panic!("expected data");
        };
        assert_eq!(shape.subtopics, vec!["Qubits", "Gates"]);
        assert_eq!(shape.summary, "An intro");
    }

    #[tokio::test]
    async fn transport_error_becomes_processing_fallback() {
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .returning(|_, _| Err(anyhow!("connection reset by peer")));

        let invoker = AgentInvoker::new(Arc::new(client), Duration::from_secs(5));
        let outcome: Normalized<ExplorationOutput> = invoker
            .invoke(AgentRole::Exploration, &exploration_input())
            .await
            .unwrap();

        let Normalized::Fallback(fb) = outcome else {
            panic!("expected fallback");
        };
        assert_eq!(fb.status, SafetyStatus::NeedsHelp);
    }

    #[tokio::test]
    async fn provider_safety_block_becomes_apology() {
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .returning(|_, _| Err(anyhow!("blocked: SAFETY")));

        let invoker = AgentInvoker::new(Arc::new(client), Duration::from_secs(5));
        let outcome: Normalized<ExplorationOutput> = invoker
            .invoke(AgentRole::Exploration, &exploration_input())
            .await
            .unwrap();

        let Normalized::Fallback(fb) = outcome else {
            panic!("expected fallback");
        };
        assert_eq!(fb.status, SafetyStatus::Inappropriate);
        assert!(fb.explanation.contains("cannot generate that type of content"));
    }

    #[tokio::test]
    async fn role_templates_are_distinct_and_named() {
        let roles = [
            AgentRole::Safety,
            AgentRole::Classifier,
            AgentRole::Exploration,
            AgentRole::Interactive,
            AgentRole::Question,
            AgentRole::AnswerEval,
            AgentRole::DeepDive,
            AgentRole::SummaryConsolidation,
        ];
        for role in roles {
            assert!(role.instructions().contains("OUTPUT FORMAT"));
            assert!(!role.name().is_empty());
        }
    }
}
