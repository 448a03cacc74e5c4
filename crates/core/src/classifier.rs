//! Intent classification.
//!
//! Given the user input and the catalog of routable agents, the classifier
//! selects which downstream agent handles the turn. Anything other than a
//! clean catalog member comes back as `None`, and the pipeline falls back to
//! the exploration branch.

use crate::{
    contracts::{AgentDescriptor, ClassifierInput, ClassifierOutput},
    invoker::{AgentInvoker, AgentRole},
    normalizer::Normalized,
};
use anyhow::Result;
use tracing::debug;

/// The routable agents the classifier may select between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Exploration,
    Interactive,
    Question,
    AnswerEval,
}

impl AgentKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exploration => "exploration",
            Self::Interactive => "interactive",
            Self::Question => "question",
            Self::AnswerEval => "answerEval",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Exploration => "Explores new topics",
            Self::Interactive => "Handles questions and answers",
            Self::Question => "Generates quiz questions",
            Self::AnswerEval => "Evaluates answers to questions",
        }
    }

    /// Case-insensitive match against the catalog names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "exploration" => Some(Self::Exploration),
            "interactive" => Some(Self::Interactive),
            "question" => Some(Self::Question),
            "answereval" => Some(Self::AnswerEval),
            _ => None,
        }
    }

    /// The catalog handed to the classifier on every call.
    pub fn catalog() -> Vec<AgentDescriptor> {
        [
            Self::Exploration,
            Self::Interactive,
            Self::Question,
            Self::AnswerEval,
        ]
        .iter()
        .map(|kind| AgentDescriptor {
            name: kind.name().to_string(),
            description: kind.description().to_string(),
        })
        .collect()
    }
}

pub struct IntentClassifier {
    invoker: AgentInvoker,
}

impl IntentClassifier {
    pub fn new(invoker: AgentInvoker) -> Self {
        Self { invoker }
    }

    /// Selects the next agent, or `None` when the model's choice is not a
    /// catalog member (the caller then treats the turn as a new topic).
    pub async fn classify(&self, input: &str, context_summary: &str) -> Result<Option<AgentKind>> {
        let outcome: Normalized<ClassifierOutput> = self
            .invoker
            .invoke(
                AgentRole::Classifier,
                &ClassifierInput {
                    user_input: input.to_string(),
                    available_agents: AgentKind::catalog(),
                    latest_context_summary: context_summary.to_string(),
                },
            )
            .await?;

        let selected = match outcome {
            Normalized::Data(output) => AgentKind::from_name(&output.next_agent),
            Normalized::Fallback(_) => None,
        };
        debug!(next_agent = ?selected.map(|k| k.name()), "classifier decision");
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::MockCompletionClient;
    use std::{sync::Arc, time::Duration};

    fn classifier_with_response(response: &'static str) -> IntentClassifier {
        let mut client = MockCompletionClient::new();
        client
            .expect_complete()
            .returning(move |_, _| Ok(response.to_string()));
        IntentClassifier::new(AgentInvoker::new(Arc::new(client), Duration::from_secs(5)))
    }

    #[test]
    fn catalog_lists_the_four_routable_agents() {
        let catalog = AgentKind::catalog();
        let names: Vec<_> = catalog.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["exploration", "interactive", "question", "answerEval"]);
    }

    #[test]
    fn names_round_trip_case_insensitively() {
        assert_eq!(AgentKind::from_name("answerEval"), Some(AgentKind::AnswerEval));
        assert_eq!(AgentKind::from_name(" ANSWEREVAL "), Some(AgentKind::AnswerEval));
        assert_eq!(AgentKind::from_name("poetry"), None);
    }

    #[tokio::test]
    async fn valid_decision_maps_to_agent_kind() {
        let classifier = classifier_with_response(r#"{"nextAgent":"question"}"#);
        let decision = classifier.classify("quiz me", "").await.unwrap();
        assert_eq!(decision, Some(AgentKind::Question));
    }

    #[tokio::test]
    async fn out_of_catalog_decision_yields_none() {
        let classifier = classifier_with_response(r#"{"nextAgent":"philosopher"}"#);
        let decision = classifier.classify("hmm", "").await.unwrap();
        assert_eq!(decision, None);
    }

    #[tokio::test]
    async fn unparseable_decision_yields_none() {
        let classifier = classifier_with_response("the next agent should be exploration");
        let decision = classifier.classify("hmm", "").await.unwrap();
        assert_eq!(decision, None);
    }
}
