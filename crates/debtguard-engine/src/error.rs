use debtguard_core::errors::GenerationError;
use debtguard_core::events::PendingAction;
use debtguard_core::phase::PhaseError;

use crate::fetch::FetchError;

pub const BLANK_INPUT_MESSAGE: &str = "Por favor, introduce una URL o texto de contexto.";
pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "Falta GEMINI_API_KEY en tu entorno. Configura tu clave de Gemini antes de continuar.";
pub const EMPTY_CONTRACT_MESSAGE: &str = "El modelo devolvió un contrato vacío.";
pub const COMPACTION_FAILED_MESSAGE: &str = "Error al compactar el contexto.";

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Missing credential. Reported inline during ingest.
    #[error("{0}")]
    Configuration(String),

    /// Blank input. Reported inline during ingest.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("{}", EMPTY_CONTRACT_MESSAGE)]
    EmptyContract,

    /// Surfaced through the blocking alert channel.
    #[error("{}", COMPACTION_FAILED_MESSAGE)]
    Compaction(#[source] GenerationError),

    #[error(transparent)]
    Phase(#[from] PhaseError),

    #[error("a {0} request is already in flight")]
    Busy(PendingAction),

    #[error("{0}")]
    Internal(String),
}

impl EngineError {
    pub fn missing_credential() -> Self {
        Self::Configuration(MISSING_CREDENTIAL_MESSAGE.to_string())
    }

    pub fn blank_input() -> Self {
        Self::Validation(BLANK_INPUT_MESSAGE.to_string())
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Validation(_) => "validation",
            Self::Fetch(_) => "fetch",
            Self::Generation(_) => "generation",
            Self::EmptyContract => "empty_contract",
            Self::Compaction(_) => "compaction",
            Self::Phase(_) => "phase",
            Self::Busy(_) => "busy",
            Self::Internal(_) => "internal",
        }
    }
}
