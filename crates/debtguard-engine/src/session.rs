use chrono::{DateTime, Utc};

use debtguard_core::contract::ContractDocument;
use debtguard_core::events::PendingAction;
use debtguard_core::ids::SessionId;
use debtguard_core::messages::ConversationLog;
use debtguard_core::phase::Phase;

/// Per-session workflow state. Mutated only through [`crate::Workflow`].
#[derive(Clone, Debug)]
pub struct Session {
    id: SessionId,
    created_at: DateTime<Utc>,
    pub(crate) phase: Phase,
    pub(crate) contract: ContractDocument,
    pub(crate) log: ConversationLog,
    pub(crate) pending: Option<PendingAction>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            created_at: Utc::now(),
            phase: Phase::Ingest,
            contract: ContractDocument::default(),
            log: ConversationLog::new(),
            pending: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn contract(&self) -> &ContractDocument {
        &self.contract
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn pending(&self) -> Option<PendingAction> {
        self.pending
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether a send with `message` would start a request right now.
    pub fn can_send(&self, message: &str) -> bool {
        self.phase == Phase::Workspace && !self.is_pending() && !message.trim().is_empty()
    }

    pub fn can_compact(&self) -> bool {
        self.phase == Phase::Workspace && !self.is_pending() && !self.log.is_empty()
    }
}
