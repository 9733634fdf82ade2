use serde::{Deserialize, Serialize};

use crate::ids::SessionId;
use crate::messages::TurnRole;
use crate::phase::Phase;

/// The Invoker-backed action currently in flight for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingAction {
    Synthesis,
    Conversation,
    Compaction,
}

impl std::fmt::Display for PendingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Synthesis => f.write_str("synthesis"),
            Self::Conversation => f.write_str("conversation"),
            Self::Compaction => f.write_str("compaction"),
        }
    }
}

/// Progress markers while a contract is being synthesized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisStage {
    ExtractingSource,
    DraftingContract,
}

impl SynthesisStage {
    pub fn label(self) -> &'static str {
        match self {
            Self::ExtractingSource => "Extrayendo repositorio con Jina Reader...",
            Self::DraftingContract => "Arquitecto IA redactando el Contract.md...",
        }
    }
}

/// Session lifecycle events for presentation layers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    #[serde(rename = "phase_changed")]
    PhaseChanged {
        session_id: SessionId,
        from: Phase,
        to: Phase,
    },

    #[serde(rename = "synthesis_stage")]
    SynthesisStage {
        session_id: SessionId,
        stage: SynthesisStage,
    },

    #[serde(rename = "pending_changed")]
    PendingChanged {
        session_id: SessionId,
        action: PendingAction,
        pending: bool,
    },

    #[serde(rename = "turn_appended")]
    TurnAppended {
        session_id: SessionId,
        index: usize,
        role: TurnRole,
        content: String,
    },

    #[serde(rename = "contract_updated")]
    ContractUpdated {
        session_id: SessionId,
        length: usize,
    },

    #[serde(rename = "compaction_complete")]
    CompactionComplete {
        session_id: SessionId,
        turns_discarded: usize,
    },

    /// Blocking notification. Only compaction failures use this channel.
    #[serde(rename = "alert")]
    Alert {
        session_id: SessionId,
        message: String,
    },
}

impl SessionEvent {
    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::PhaseChanged { session_id, .. }
            | Self::SynthesisStage { session_id, .. }
            | Self::PendingChanged { session_id, .. }
            | Self::TurnAppended { session_id, .. }
            | Self::ContractUpdated { session_id, .. }
            | Self::CompactionComplete { session_id, .. }
            | Self::Alert { session_id, .. } => session_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PhaseChanged { .. } => "phase_changed",
            Self::SynthesisStage { .. } => "synthesis_stage",
            Self::PendingChanged { .. } => "pending_changed",
            Self::TurnAppended { .. } => "turn_appended",
            Self::ContractUpdated { .. } => "contract_updated",
            Self::CompactionComplete { .. } => "compaction_complete",
            Self::Alert { .. } => "alert",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_serialization() {
        let id = SessionId::from_raw("sess_1");
        let event = SessionEvent::PhaseChanged {
            session_id: id.clone(),
            from: Phase::Ingest,
            to: Phase::Contract,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "phase_changed");
        assert_eq!(json["from"], "ingest");
        assert_eq!(json["to"], "contract");
        assert_eq!(event.session_id(), &id);
    }

    #[test]
    fn event_type_matches_serde_tag() {
        let event = SessionEvent::Alert {
            session_id: SessionId::from_raw("sess_1"),
            message: "Error al compactar el contexto.".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type());
    }

    #[test]
    fn stage_labels() {
        assert_eq!(
            SynthesisStage::ExtractingSource.label(),
            "Extrayendo repositorio con Jina Reader..."
        );
        assert_eq!(
            SynthesisStage::DraftingContract.label(),
            "Arquitecto IA redactando el Contract.md..."
        );
    }
}
