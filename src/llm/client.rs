//! Client for the external text-generation service.
//!
//! One prompt in, one raw text out. There is no retry loop here: a failed call
//! is reported as `ModelUnavailable` and the caller decides what to do with it.

use crate::config::ModelConfig;
use crate::error::{Result, RankerError};
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Anything that can turn a prompt into raw model output.
pub trait ModelClient {
    fn invoke(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;

    /// Human-readable model identifier for logs and reports.
    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if it carries any.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if parts.iter().all(|p| p.text.is_none()) {
            None
        } else {
            Some(text)
        }
    }
}

/// Stand-in used when model scoring is switched off: every call fails, so
/// every document is scored by text similarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledModel;

impl ModelClient for DisabledModel {
    async fn invoke(&self, _prompt: &str) -> Result<String> {
        Err(RankerError::ModelUnavailable("model scoring disabled".to_string()))
    }

    fn model_name(&self) -> &str {
        "disabled"
    }
}

/// Google Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model_name: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                RankerError::Configuration(
                    "No API key configured; pass --api-key or set GOOGLE_API_KEY".to_string(),
                )
            })?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| RankerError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model_name: config.model_name.clone(),
            endpoint: config.endpoint.clone(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model_name
        )
    }
}

impl ModelClient for GeminiClient {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        let request_body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        debug!("Calling {} (prompt length: {} chars)", self.model_name, prompt.len());

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Model endpoint returned {}: {}", status, message);
            return Err(RankerError::ModelUnavailable(format!(
                "status {}: {}",
                status.as_u16(),
                message
            )));
        }

        let generated: GenerateResponse = response.json().await?;
        generated
            .text()
            .ok_or_else(|| RankerError::ModelUnavailable("response carried no candidate text".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_model_always_unavailable() {
        let result = DisabledModel.invoke("anything").await;
        assert!(matches!(result, Err(RankerError::ModelUnavailable(_))));
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let config = ModelConfig::default();
        assert!(matches!(
            GeminiClient::new(&config),
            Err(RankerError::Configuration(_))
        ));

        let blank = ModelConfig::new("   ", "gemini-2.0-flash");
        assert!(GeminiClient::new(&blank).is_err());
    }

    #[test]
    fn test_url_uses_configured_model() {
        let mut config = ModelConfig::new("key", "gemini-1.5-pro");
        config.endpoint = "https://example.test/v1beta/".to_string();
        let client = GeminiClient::new(&config).unwrap();

        assert_eq!(
            client.url(),
            "https://example.test/v1beta/models/gemini-1.5-pro:generateContent"
        );
        assert_eq!(client.model_name(), "gemini-1.5-pro");
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "hello" }],
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_response_text_joins_parts_of_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"JD Match\": "}, {"text": "\"70%\"}"}], "role": "model"}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"JD Match\": \"70%\"}"));
    }

    #[test]
    fn test_blocked_response_has_no_text() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        assert!(response.text().is_none());

        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let response: GenerateResponse = serde_json::from_str(body).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_api_error_message_parsed() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        let parsed: ApiError = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "API key not valid.");
    }

    /// Answer one request with `status` and `body`; the handle yields the raw
    /// request that was received.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/v1beta", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .filter_map(|line| line.split_once(':'))
                        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });

        (endpoint, handle)
    }

    fn client_for(endpoint: String) -> GeminiClient {
        let mut config = ModelConfig::new("test-key", "gemini-2.0-flash");
        config.endpoint = endpoint;
        config.timeout_secs = Some(10);
        GeminiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_invoke_returns_candidate_text_unchanged() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"{"candidates": [{"content": {"parts": [{"text": "Sure {\"JD Match\": \"70%\"}"}]}}]}"#,
        )
        .await;

        let text = client_for(endpoint).invoke("rank this").await.unwrap();
        assert_eq!(text, r#"Sure {"JD Match": "70%"}"#);

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1beta/models/gemini-2.0-flash:generateContent"));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
        assert!(request.contains("rank this"));
    }

    #[tokio::test]
    async fn test_invoke_error_status_is_unavailable() {
        let (endpoint, server) = serve_once(
            "403 Forbidden",
            r#"{"error": {"code": 403, "message": "API key not valid.", "status": "PERMISSION_DENIED"}}"#,
        )
        .await;

        match client_for(endpoint).invoke("rank this").await {
            Err(RankerError::ModelUnavailable(message)) => {
                assert_eq!(message, "status 403: API key not valid.");
            }
            other => panic!("expected ModelUnavailable, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_invoke_undecodable_body_is_unavailable() {
        let (endpoint, server) = serve_once("200 OK", "<html>gateway hiccup</html>").await;

        assert!(matches!(
            client_for(endpoint).invoke("rank this").await,
            Err(RankerError::ModelUnavailable(_))
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_invoke_connection_refused_is_unavailable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/v1beta", listener.local_addr().unwrap());
        drop(listener);

        assert!(matches!(
            client_for(endpoint).invoke("rank this").await,
            Err(RankerError::ModelUnavailable(_))
        ));
    }
}
