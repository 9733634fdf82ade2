//! Wire types for the `generateContent` endpoint.

use serde::{Deserialize, Deserializer, Serialize};

use debtguard_core::provider::GenerationRequest;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()) }
    }
}

/// Used both for `contents[]` entries and for `systemInstruction`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self { parts: vec![Part::text(text)] }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

impl From<&GenerationRequest> for GenerateContentRequest {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            contents: vec![Content::text(request.prompt.clone())],
            system_instruction: request
                .system_instruction
                .as_ref()
                .map(|s| Content::text(s.clone())),
        }
    }
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response side. Any level may be `null`; positions are kept so that
/// `candidates[0]` and `parts[0]` mean the first entry even when it is null.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub candidates: Vec<Option<Candidate>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub parts: Vec<Option<Part>>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, if present and non-empty.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .as_ref()?
            .content
            .as_ref()?
            .parts
            .first()?
            .as_ref()?
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
    }
}
