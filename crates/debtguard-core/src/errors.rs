/// Message surfaced once every attempt against the generation endpoint failed.
pub const GENERATION_EXHAUSTED_MESSAGE: &str = "Fallo en la API tras múltiples intentos.";

/// Failure of a single attempt against the generation endpoint.
/// Every variant is transient from the invoker's point of view.
#[derive(Clone, Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP error! status: {status}")]
    Status { status: u16, body: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Status { status: 429, .. } => "rate_limited",
            Self::Status { status: 401 | 403, .. } => "authentication_failed",
            Self::Status { status: 500..=599, .. } => "server_error",
            Self::Status { .. } => "http_status",
            Self::Network(_) => "network_error",
            Self::Decode(_) => "decode_error",
        }
    }

    pub fn from_status(status: u16, body: String) -> Self {
        Self::Status { status, body }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Raised by the invoker after the retry policy is exhausted.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{}", GENERATION_EXHAUSTED_MESSAGE)]
pub struct GenerationError {
    pub attempts: u32,
    #[source]
    pub last: GatewayError,
}

impl GenerationError {
    pub fn exhausted(attempts: u32, last: GatewayError) -> Self {
        Self { attempts, last }
    }
}
