use std::sync::Arc;

use tracing::{debug, warn};

use debtguard_core::contract::ContractDocument;
use debtguard_core::errors::GenerationError;
use debtguard_core::messages::{ConversationLog, RoleLabels};
use debtguard_core::provider::{GenerationRequest, Generator};

use crate::prompts::{connection_error, conversation_prompt, partner_instruction};

/// Result of one conversation call.
#[derive(Debug)]
pub enum TurnOutcome {
    Reply(String),
    Failed(GenerationError),
}

impl TurnOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Text of the assistant turn. Failures become an annotated turn
    /// instead of being dropped.
    pub fn into_content(self) -> String {
        match self {
            Self::Reply(text) => text,
            Self::Failed(err) => connection_error(&err.to_string()),
        }
    }
}

/// Contract-governed chat. A turn is opened (user message appended, request
/// built), resolved against the generator, then closed (assistant turn
/// appended). Opening and closing are synchronous so callers can render the
/// provisional log while the call is in flight.
pub struct ConversationEngine {
    generator: Arc<dyn Generator>,
}

impl ConversationEngine {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Appends the user turn and returns the request for the reply.
    /// Blank messages are ignored.
    pub fn open_turn(
        &self,
        log: &mut ConversationLog,
        contract: &ContractDocument,
        message: &str,
    ) -> Option<GenerationRequest> {
        if message.trim().is_empty() {
            return None;
        }
        log.push_user(message);
        Some(Self::build_request(log, contract))
    }

    /// Request for the next assistant turn given the log so far.
    pub fn build_request(log: &ConversationLog, contract: &ContractDocument) -> GenerationRequest {
        let transcript = log.render(RoleLabels::CHAT);
        GenerationRequest::new(conversation_prompt(&transcript))
            .with_system_instruction(partner_instruction(contract.as_str()))
    }

    pub async fn resolve(&self, request: GenerationRequest) -> TurnOutcome {
        match self.generator.invoke(request).await {
            Ok(text) => {
                debug!(chars = text.len(), "assistant reply received");
                TurnOutcome::Reply(text)
            }
            Err(err) => {
                warn!(error = %err, attempts = err.attempts, "conversation turn failed");
                TurnOutcome::Failed(err)
            }
        }
    }

    pub fn close_turn(log: &mut ConversationLog, outcome: TurnOutcome) {
        log.push_assistant(outcome.into_content());
    }

    /// All three steps in one call. Returns the log unchanged for blank messages.
    pub async fn send(
        &self,
        mut log: ConversationLog,
        contract: &ContractDocument,
        message: &str,
    ) -> ConversationLog {
        let Some(request) = self.open_turn(&mut log, contract, message) else {
            return log;
        };
        let outcome = self.resolve(request).await;
        Self::close_turn(&mut log, outcome);
        log
    }
}
