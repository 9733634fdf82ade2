use std::sync::Arc;

use tracing::{debug, info, instrument};

use debtguard_core::contract::ContractDocument;
use debtguard_core::events::SynthesisStage;
use debtguard_core::input::InputSpec;
use debtguard_core::provider::{GenerationRequest, Generator};

use crate::error::EngineError;
use crate::fetch::{ContentFetcher, FetchError};
use crate::prompts::{contract_prompt, truncate_chars, CONTRACT_ARCHITECT_PROMPT};

pub use debtguard_settings::DEFAULT_MAX_CONTEXT_CHARS;

/// Turns a URL or pasted text into a governance contract.
pub struct ContractSynthesizer {
    generator: Arc<dyn Generator>,
    fetcher: Arc<dyn ContentFetcher>,
    max_context_chars: usize,
}

impl ContractSynthesizer {
    pub fn new(generator: Arc<dyn Generator>, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self {
            generator,
            fetcher,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }

    pub fn with_max_context_chars(mut self, max_chars: usize) -> Self {
        self.max_context_chars = max_chars;
        self
    }

    pub fn max_context_chars(&self) -> usize {
        self.max_context_chars
    }

    /// Blank input first, then the credential. Nothing leaves the process
    /// when either check fails.
    pub fn validate(&self, input: &InputSpec) -> Result<(), EngineError> {
        if input.is_blank() {
            return Err(EngineError::blank_input());
        }
        if !self.generator.has_credential() {
            return Err(EngineError::missing_credential());
        }
        Ok(())
    }

    /// Raw source text. URLs go through the fetcher; text passes through.
    pub async fn gather_context(&self, input: &InputSpec) -> Result<String, FetchError> {
        match input {
            InputSpec::Url(url) => self.fetcher.fetch_text(url).await,
            InputSpec::Text(text) => Ok(text.clone()),
        }
    }

    pub fn build_request(&self, context: &str) -> GenerationRequest {
        let context = truncate_chars(context, self.max_context_chars);
        GenerationRequest::new(contract_prompt(context))
            .with_system_instruction(CONTRACT_ARCHITECT_PROMPT)
    }

    pub async fn synthesize(&self, input: &InputSpec) -> Result<ContractDocument, EngineError> {
        self.synthesize_with(input, |_| {}).await
    }

    /// Same as [`Self::synthesize`], reporting each stage as it starts.
    #[instrument(skip_all, fields(kind = ?input.kind()))]
    pub async fn synthesize_with<F>(
        &self,
        input: &InputSpec,
        on_stage: F,
    ) -> Result<ContractDocument, EngineError>
    where
        F: Fn(SynthesisStage) + Send + Sync,
    {
        self.validate(input)?;

        if matches!(input, InputSpec::Url(_)) {
            on_stage(SynthesisStage::ExtractingSource);
        }
        let context = self.gather_context(input).await?;
        debug!(chars = context.chars().count(), "context gathered");

        on_stage(SynthesisStage::DraftingContract);
        let raw = self.generator.invoke(self.build_request(&context)).await?;

        let contract = ContractDocument::from_generated(&raw);
        if contract.is_empty() {
            return Err(EngineError::EmptyContract);
        }
        info!(length = contract.as_str().len(), "contract drafted");
        Ok(contract)
    }
}
