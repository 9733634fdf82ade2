use async_trait::async_trait;

use crate::errors::{GatewayError, GenerationError};

/// One generation call: the prompt and an optional, separately weighted
/// system instruction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into(), system_instruction: None }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }
}

/// A single-attempt transport to a text-generation backend.
///
/// `Ok(None)` means the backend answered but produced no usable text.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;

    /// Whether an access credential is configured. Never checked by the
    /// provider itself.
    fn has_credential(&self) -> bool;

    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, GatewayError>;
}

/// The resilient `invoke` contract consumed by synthesis, conversation and
/// compaction.
#[async_trait]
pub trait Generator: Send + Sync {
    fn has_credential(&self) -> bool;

    async fn invoke(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder() {
        let req = GenerationRequest::new("p");
        assert_eq!(req.prompt, "p");
        assert!(req.system_instruction.is_none());

        let req = req.with_system_instruction("sys");
        assert_eq!(req.system_instruction.as_deref(), Some("sys"));
    }
}
