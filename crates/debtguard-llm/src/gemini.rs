//! Gemini `generateContent` transport. One HTTP attempt per call; retries
//! live in [`crate::invoker`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use debtguard_core::errors::GatewayError;
use debtguard_core::provider::{GenerationProvider, GenerationRequest};
use debtguard_core::security::ApiKey;

use crate::types::{GenerateContentRequest, GenerateContentResponse};

pub use debtguard_settings::{DEFAULT_GENERATION_BASE_URL as DEFAULT_BASE_URL, DEFAULT_MODEL};
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    /// Sent as the `key` query parameter. Absent keys are sent empty and
    /// rejected remotely.
    pub api_key: Option<ApiKey>,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(120),
        }
    }
}

pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// `{base}/v1beta/models/{model}:generateContent`, without the key.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn has_credential(&self) -> bool {
        self.config.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, GatewayError> {
        let body = GenerateContentRequest::from(request);
        let key = self.config.api_key.as_ref().map(ApiKey::expose).unwrap_or_default();

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", key)])
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::from_status(status.as_u16(), body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        let text = parsed.first_text().map(str::to_owned);
        debug!(has_text = text.is_some(), "generation response received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer, key: Option<&str>) -> GeminiProvider {
        GeminiProvider::new(GeminiConfig {
            base_url: server.uri(),
            model: "gemini-test".into(),
            api_key: key.map(ApiKey::new),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    const GENERATE_PATH: &str = "/v1beta/models/gemini-test:generateContent";

    #[tokio::test]
    async fn posts_prompt_and_system_instruction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(query_param("key", "AIza-test"))
            .and(body_json(json!({
                "contents": [{"parts": [{"text": "hola"}]}],
                "systemInstruction": {"parts": [{"text": "sé breve"}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "OK"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, Some("AIza-test"));
        let req = GenerationRequest::new("hola").with_system_instruction("sé breve");
        let text = provider.generate(&req).await.unwrap();
        assert_eq!(text.as_deref(), Some("OK"));
    }

    #[tokio::test]
    async fn omits_system_instruction_when_absent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(body_json(json!({"contents": [{"parts": [{"text": "solo"}]}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "r"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, Some("k"));
        let text = provider.generate(&GenerationRequest::new("solo")).await.unwrap();
        assert_eq!(text.as_deref(), Some("r"));
    }

    #[tokio::test]
    async fn well_formed_without_text_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Some("k"));
        let text = provider.generate(&GenerationRequest::new("p")).await.unwrap();
        assert!(text.is_none());
    }

    #[tokio::test]
    async fn non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Some("k"));
        let err = provider.generate(&GenerationRequest::new("p")).await.unwrap_err();
        match err {
            GatewayError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Some("k"));
        let err = provider.generate(&GenerationRequest::new("p")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[tokio::test]
    async fn missing_key_still_attempts_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("key", ""))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, None);
        assert!(!provider.has_credential());
        let err = provider.generate(&GenerationRequest::new("p")).await.unwrap_err();
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        let provider = GeminiProvider::new(GeminiConfig {
            base_url: "http://127.0.0.1:1".into(),
            api_key: Some(ApiKey::new("k")),
            timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();
        let err = provider.generate(&GenerationRequest::new("p")).await.unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
    }

    #[tokio::test]
    async fn invoker_recovers_after_four_server_errors() {
        use crate::invoker::{Invoker, RetryPolicy};
        use debtguard_core::provider::Generator;

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(4)
            .expect(4)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "OK"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let invoker = Invoker::new(provider_for(&server, Some("k")), RetryPolicy::immediate(5));
        let text = invoker.invoke(GenerationRequest::new("p")).await.unwrap();
        assert_eq!(text, "OK");
        assert_eq!(invoker.total_attempts(), 5);
    }

    #[tokio::test]
    async fn null_candidates_yield_sentinel_without_retry() {
        use crate::invoker::{Invoker, RetryPolicy, NO_RESPONSE_SENTINEL};
        use debtguard_core::provider::Generator;

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": null})))
            .expect(1)
            .mount(&server)
            .await;

        let invoker = Invoker::new(provider_for(&server, Some("k")), RetryPolicy::immediate(5));
        let text = invoker.invoke(GenerationRequest::new("p")).await.unwrap();
        assert_eq!(text, NO_RESPONSE_SENTINEL);
        assert_eq!(invoker.total_attempts(), 1);
    }

    #[test]
    fn endpoint_and_metadata() {
        let provider = GeminiProvider::new(GeminiConfig {
            base_url: "https://example.test/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            provider.endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash-preview-09-2025:generateContent"
        );
        assert_eq!(provider.name(), "google");
        assert_eq!(provider.model(), DEFAULT_MODEL);
        assert!(!provider.has_credential());
    }
}
