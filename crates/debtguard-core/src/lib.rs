pub mod contract;
pub mod errors;
pub mod events;
pub mod ids;
pub mod input;
pub mod messages;
pub mod phase;
pub mod provider;
pub mod security;

pub use contract::ContractDocument;
pub use errors::{GatewayError, GenerationError};
pub use input::{InputKind, InputSpec};
pub use messages::{ChatTurn, ConversationLog, TurnRole};
pub use phase::{Phase, PhaseError};
pub use provider::{GenerationProvider, GenerationRequest, Generator};
