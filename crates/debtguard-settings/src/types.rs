//! Settings types with compiled defaults.

use debtguard_core::security::ApiKey;
use serde::{Deserialize, Serialize};

/// Default generation API host.
pub const DEFAULT_GENERATION_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
/// Default content-extraction proxy; the target URL is appended verbatim.
pub const DEFAULT_READER_PREFIX: &str = "https://r.jina.ai/";
/// Maximum characters of source context sent for contract synthesis.
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 30_000;
/// Attempts per generation call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Backoff schedule between attempts, in milliseconds.
pub const DEFAULT_RETRY_DELAYS_MS: [u64; 5] = [1000, 2000, 4000, 8000, 16_000];

/// Root settings object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DebtguardSettings {
    pub generation: GenerationSettings,
    pub reader: ReaderSettings,
    pub retry: RetrySettings,
    pub synthesis: SynthesisSettings,
    pub logging: LoggingSettings,
    /// Read from `GEMINI_API_KEY`; never written to or read from the file.
    #[serde(skip)]
    pub api_key: Option<ApiKey>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationSettings {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GENERATION_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReaderSettings {
    pub proxy_prefix: String,
    pub timeout_secs: u64,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            proxy_prefix: DEFAULT_READER_PREFIX.to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    /// Delay after each failed attempt; the last entry repeats if
    /// `max_attempts` outgrows the list.
    pub delays_ms: Vec<u64>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delays_ms: DEFAULT_RETRY_DELAYS_MS.to_vec(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SynthesisSettings {
    pub max_context_chars: usize,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl DebtguardSettings {
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Reject values that would make the workflow unusable.
    pub fn validate(&self) -> crate::Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(crate::SettingsError::InvalidValue(
                "retry.maxAttempts must be at least 1".into(),
            ));
        }
        if self.synthesis.max_context_chars == 0 {
            return Err(crate::SettingsError::InvalidValue(
                "synthesis.maxContextChars must be at least 1".into(),
            ));
        }
        if self.generation.base_url.trim().is_empty() {
            return Err(crate::SettingsError::InvalidValue(
                "generation.baseUrl must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = DebtguardSettings::default();
        assert_eq!(s.generation.model, DEFAULT_MODEL);
        assert_eq!(s.reader.proxy_prefix, "https://r.jina.ai/");
        assert_eq!(s.retry.max_attempts, 5);
        assert_eq!(s.retry.delays_ms, vec![1000, 2000, 4000, 8000, 16_000]);
        assert_eq!(s.synthesis.max_context_chars, 30_000);
        assert!(!s.has_credential());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn api_key_never_serialized() {
        let s = DebtguardSettings {
            api_key: Some(ApiKey::new("secret")),
            ..Default::default()
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("apiKey"));
    }

    #[test]
    fn camel_case_keys() {
        let json = serde_json::to_value(DebtguardSettings::default()).unwrap();
        assert!(json["generation"]["baseUrl"].is_string());
        assert!(json["retry"]["delaysMs"].is_array());
        assert!(json["synthesis"]["maxContextChars"].is_number());
    }

    #[test]
    fn zero_attempts_invalid() {
        let mut s = DebtguardSettings::default();
        s.retry.max_attempts = 0;
        assert!(s.validate().is_err());
    }
}
