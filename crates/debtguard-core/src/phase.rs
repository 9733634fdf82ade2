use serde::{Deserialize, Serialize};

/// Stage of the Ingest → Contract → Workspace workflow. Only moves forward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Ingest,
    Contract,
    Workspace,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    #[error("invalid phase transition: {from} -> {to}")]
    InvalidTransition { from: Phase, to: Phase },
    #[error("{action} is not available during the {phase} phase")]
    NotAvailable { phase: Phase, action: &'static str },
}

impl Phase {
    /// One-based position in the workflow.
    pub fn step(self) -> u8 {
        match self {
            Self::Ingest => 1,
            Self::Contract => 2,
            Self::Workspace => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ingest => "Ingesta",
            Self::Contract => "Contrato",
            Self::Workspace => "Workspace",
        }
    }

    pub fn next(self) -> Option<Phase> {
        match self {
            Self::Ingest => Some(Self::Contract),
            Self::Contract => Some(Self::Workspace),
            Self::Workspace => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Move to `to`, which must be the immediate successor.
    pub fn advance(self, to: Phase) -> Result<Phase, PhaseError> {
        if self.next() == Some(to) {
            Ok(to)
        } else {
            Err(PhaseError::InvalidTransition { from: self, to })
        }
    }

    /// Fails with `NotAvailable` unless the current phase is `required`.
    pub fn require(self, required: Phase, action: &'static str) -> Result<(), PhaseError> {
        if self == required {
            Ok(())
        } else {
            Err(PhaseError::NotAvailable { phase: self, action })
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ingest => f.write_str("ingest"),
            Self::Contract => f.write_str("contract"),
            Self::Workspace => f.write_str("workspace"),
        }
    }
}
