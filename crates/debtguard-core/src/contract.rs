use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static FENCE_MARKERS: LazyLock<Regex> = LazyLock::new(|| Regex::new("```markdown|```").unwrap());

/// The governance document every conversation turn is evaluated against.
///
/// One per session. User edits overwrite it in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractDocument(String);

impl ContractDocument {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Builds a document from raw model output, dropping every code-fence
    /// marker and surrounding whitespace.
    pub fn from_generated(raw: &str) -> Self {
        Self(FENCE_MARKERS.replace_all(raw, "").trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn replace(&mut self, text: impl Into<String>) {
        self.0 = text.into();
    }
}

impl std::fmt::Display for ContractDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
