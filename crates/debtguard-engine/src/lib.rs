//! # debtguard-engine
//!
//! Contract synthesis, contract-governed conversation, and context
//! compaction, tied together by the Ingest → Contract → Workspace workflow.

pub mod compaction;
pub mod conversation;
pub mod error;
pub mod fetch;
pub mod prompts;
pub mod session;
pub mod synthesis;
pub mod workflow;

pub use compaction::{CompactionFailure, Compactor};
pub use conversation::{ConversationEngine, TurnOutcome};
pub use error::EngineError;
pub use fetch::{ContentFetcher, FetchError, ReaderProxy};
pub use session::Session;
pub use synthesis::ContractSynthesizer;
pub use workflow::{PendingCompaction, PendingTurn, Workflow};
