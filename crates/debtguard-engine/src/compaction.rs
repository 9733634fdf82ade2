use std::sync::Arc;

use tracing::{error, info};

use debtguard_core::errors::GenerationError;
use debtguard_core::messages::{ConversationLog, RoleLabels};
use debtguard_core::provider::{GenerationRequest, Generator};

use crate::error::COMPACTION_FAILED_MESSAGE;
use crate::prompts::compaction_prompt;

/// Compaction failed; carries the untouched log back to the caller.
#[derive(Debug, thiserror::Error)]
#[error("{}", COMPACTION_FAILED_MESSAGE)]
pub struct CompactionFailure {
    pub log: ConversationLog,
    #[source]
    pub error: GenerationError,
}

/// Replaces a conversation log with a single memory-summary turn.
pub struct Compactor {
    generator: Arc<dyn Generator>,
}

impl Compactor {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }

    /// Summarization request, or `None` when there is nothing to compact.
    /// No system instruction: the contract is not sent.
    pub fn prepare(log: &ConversationLog) -> Option<GenerationRequest> {
        if log.is_empty() {
            return None;
        }
        let transcript = log.render(RoleLabels::TRANSCRIPT);
        Some(GenerationRequest::new(compaction_prompt(&transcript)))
    }

    pub async fn summarize(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        self.generator.invoke(request).await
    }

    /// Swaps in the summary turn, or hands the log back untouched.
    pub fn apply(
        log: ConversationLog,
        result: Result<String, GenerationError>,
    ) -> Result<ConversationLog, CompactionFailure> {
        match result {
            Ok(summary) => {
                info!(turns_discarded = log.len(), "conversation compacted");
                Ok(ConversationLog::compacted(&summary))
            }
            Err(error) => {
                error!(error = %error, turns = log.len(), "compaction failed");
                Err(CompactionFailure { log, error })
            }
        }
    }

    pub async fn compact(&self, log: ConversationLog) -> Result<ConversationLog, CompactionFailure> {
        let Some(request) = Self::prepare(&log) else {
            return Ok(log);
        };
        let result = self.summarize(request).await;
        Self::apply(log, result)
    }
}
