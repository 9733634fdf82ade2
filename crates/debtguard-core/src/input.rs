use serde::{Deserialize, Serialize};

/// Which kind of source the user is providing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Url,
    Text,
}

/// Raw project description handed to contract synthesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum InputSpec {
    Url(String),
    Text(String),
}

impl InputSpec {
    pub fn new(kind: InputKind, value: impl Into<String>) -> Self {
        match kind {
            InputKind::Url => Self::Url(value.into()),
            InputKind::Text => Self::Text(value.into()),
        }
    }

    pub fn kind(&self) -> InputKind {
        match self {
            Self::Url(_) => InputKind::Url,
            Self::Text(_) => InputKind::Text,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::Url(v) | Self::Text(v) => v,
        }
    }

    /// True for empty or whitespace-only input.
    pub fn is_blank(&self) -> bool {
        self.value().trim().is_empty()
    }
}
