//! MindFlow's learning orchestration engine.
//!
//! A turn flows through a fixed machine: the safety gate, then either the
//! pending-answer bypass or the intent classifier, then exactly one
//! downstream agent. Every agent call goes through the invoker and the
//! response normalizer, so malformed or refused model output degrades into
//! typed fallbacks instead of errors.

pub mod classifier;
pub mod contracts;
pub mod crisis;
pub mod instructions;
pub mod invoker;
pub mod llm_client;
pub mod normalizer;
pub mod pipeline;
pub mod safety;
pub mod session;

pub use classifier::{AgentKind, IntentClassifier};
pub use contracts::{SafetyStatus, SummaryResult, TurnResult};
pub use crisis::{CrisisResource, IpApiLocator, ResourceLocator, StaticLocator};
pub use invoker::{AgentInvoker, AgentRole};
pub use llm_client::{CompletionClient, OpenAICompatibleClient};
pub use normalizer::{Normalized, Normalizer, RefusalLexicon};
pub use pipeline::LearningEngine;
pub use safety::{SafetyGate, SafetyReport};
pub use session::{Difficulty, HistoryEntry, HistoryKind, Progress, SessionState};
