//! The safety gate.
//!
//! Every turn starts here, unconditionally. The gate classifies the raw
//! input (plus the rolling context summary) and, for learners in crisis,
//! rewrites the explanation into a structured support message with
//! region-appropriate hotline details.

use crate::{
    contracts::{SafetyInput, SafetyOutput, SafetyStatus},
    crisis::{CrisisResource, ResourceLocator, default_resources},
    invoker::{AgentInvoker, AgentRole},
    normalizer::Normalized,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Terminal classification of one input, ready to present to the learner.
#[derive(Debug, Clone, PartialEq)]
pub struct SafetyReport {
    pub status: SafetyStatus,
    pub explanation: String,
}

pub struct SafetyGate {
    invoker: AgentInvoker,
    locator: Arc<dyn ResourceLocator>,
}

impl SafetyGate {
    pub fn new(invoker: AgentInvoker, locator: Arc<dyn ResourceLocator>) -> Self {
        Self { invoker, locator }
    }

    /// Classifies `input`. For a NEEDS_HELP result the explanation is
    /// replaced with a crisis-support message; resource lookup failures fall
    /// back to the default entry and never fail the check.
    pub async fn check(
        &self,
        input: &str,
        context_summary: &str,
        ip_address: Option<&str>,
    ) -> Result<SafetyReport> {
        let outcome: Normalized<SafetyOutput> = self
            .invoker
            .invoke(
                AgentRole::Safety,
                &SafetyInput {
                    user_input: input.to_string(),
                    latest_context_summary: context_summary.to_string(),
                },
            )
            .await?;

        let (status, explanation) = match outcome {
            Normalized::Data(output) => (output.status, output.explanation),
            Normalized::Fallback(fb) => (fb.status, fb.explanation),
        };

        if status != SafetyStatus::Safe {
            info!(?status, "safety gate halted the turn");
        }

        // The invoker's processing fallback is also NEEDS_HELP, so a failed
        // or timed-out safety call lands here and yields support resources
        // rather than an error.
        let explanation = if status == SafetyStatus::NeedsHelp {
            match self.locator.locate(ip_address).await {
                Some(resource) => support_message(&resource),
                None => compact_support_message(&default_resources()),
            }
        } else {
            explanation
        };

        Ok(SafetyReport { status, explanation })
    }
}

/// The full structured support message, used when region lookup succeeded.
fn support_message(resource: &CrisisResource) -> String {
    let mut details: Vec<String> = Vec::new();
    if let Some(description) = &resource.description {
        details.push(format!("**{description}**"));
    }
    if !resource.phone.is_empty() {
        details.push(format!("📞 **Phone**: {}", resource.phone.join(", ")));
    }
    if let Some(website) = &resource.website {
        details.push(format!("🌐 **Website**: [Click here]({website})"));
    }
    if let Some(email) = &resource.email {
        details.push(format!("✉️ **Email**: [{email}](mailto:{email})"));
    }

    format!(
        "I understand you're going through a difficult time. Your life has value, \
         and there are people who want to help.\n\n\
         ### Immediate Support Available\n\n{}\n\n\
         **You're not alone.** These services are:\n\
         - Free and confidential\n\
         - Available 24/7\n\
         - Staffed by caring professionals\n\
         - Here to listen without judgment\n\n\
         Please reach out - taking that first step can make all the difference.",
        details.join("\n\n")
    )
}

/// The compact variant used when lookup was unavailable.
fn compact_support_message(resource: &CrisisResource) -> String {
    let description = resource.description.as_deref().unwrap_or("Crisis support");
    let website = resource.website.as_deref().unwrap_or("https://988lifeline.org/");
    format!(
        "I care about your wellbeing. Please reach out for support:\n\n\
         - **{description}**\n\
         - 📞 **Phone**: {}\n\
         - 🌐 **Website**: [Click here]({website})\n\n\
         You're not alone. These services are available 24/7 and ready to help.",
        resource.phone.join(", ")
    )
}
