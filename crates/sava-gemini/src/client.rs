// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Gemini `generateContent` API.
//!
//! Provides [`GeminiClient`], which builds requests, authenticates, and turns
//! every non-success reply into a classified provider error. It never retries;
//! endpoint rotation is the router's job.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use sava_core::{ProviderErrorKind, SavaError};
use tracing::debug;

use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

/// HTTP client for Gemini API communication.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Creates a new client with the API key baked into the default headers.
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, SavaError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(api_key)
                .map_err(|e| SavaError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| SavaError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Full URL of the `generateContent` method for `model`.
    pub fn endpoint_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    /// Sends one request to `model` and returns the decoded reply.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, SavaError> {
        let response = self
            .client
            .post(self.endpoint_url(model))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SavaError::Timeout {
                        duration: self.timeout,
                    }
                } else {
                    SavaError::provider(
                        ProviderErrorKind::Other,
                        model,
                        format!("HTTP request failed: {e}"),
                    )
                }
            })?;

        let status = response.status();
        debug!(status = %status, model, "generateContent response received");

        let body = response.text().await.map_err(|e| {
            SavaError::provider(
                ProviderErrorKind::Other,
                model,
                format!("failed to read response body: {e}"),
            )
        })?;

        if !status.is_success() {
            let kind = classify_failure(status, &body);
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Gemini API error {} ({}): {}",
                    status.as_u16(),
                    api_err.error.status,
                    api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(SavaError::provider(kind, model, message));
        }

        serde_json::from_str(&body).map_err(|e| {
            SavaError::provider(
                ProviderErrorKind::Other,
                model,
                format!("failed to parse API response: {e}"),
            )
        })
    }
}

/// Maps a non-success reply to the failure kind the router acts on.
pub fn classify_failure(status: StatusCode, body: &str) -> ProviderErrorKind {
    if status == StatusCode::NOT_FOUND {
        return ProviderErrorKind::EndpointNotFound;
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return ProviderErrorKind::QuotaExceeded;
    }

    let (api_status, message) = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => (api_err.error.status, api_err.error.message.to_lowercase()),
        Err(_) => (String::new(), body.to_lowercase()),
    };

    if api_status == "RESOURCE_EXHAUSTED" || message.contains("quota") {
        ProviderErrorKind::QuotaExceeded
    } else if api_status == "NOT_FOUND"
        || message.contains("not found")
        || message.contains("not supported")
    {
        ProviderErrorKind::EndpointNotFound
    } else {
        ProviderErrorKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-2.0-flash";
    const MODEL_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

    fn test_client(base_url: &str) -> GeminiClient {
        GeminiClient::new("test-api-key", base_url, Duration::from_secs(5)).unwrap()
    }

    fn test_request() -> GenerateContentRequest {
        GenerateContentRequest::user_prompt("Classify this", 256, 0.2)
    }

    #[tokio::test]
    async fn generate_content_success() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "CLASIFICACIÓN: Positivo"}]},
                            "finishReason": "STOP"}],
            "modelVersion": "gemini-2.0-flash-001"
        });

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let resp = test_client(&server.uri())
            .generate_content(MODEL, &test_request())
            .await
            .unwrap();
        assert_eq!(resp.text(), "CLASIFICACIÓN: Positivo");
        assert_eq!(resp.model_version.as_deref(), Some("gemini-2.0-flash-001"));
    }

    #[tokio::test]
    async fn client_sends_key_header_and_safety_settings() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header("x-goog-api-key", "test-api-key"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"maxOutputTokens": 256}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })))
            .mount(&server)
            .await;

        let result = test_client(&server.uri())
            .generate_content(MODEL, &test_request())
            .await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }

    #[tokio::test]
    async fn not_found_maps_to_endpoint_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": {"code": 404, "message": "models/gemini-9 is not found", "status": "NOT_FOUND"}
            })))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .generate_content("gemini-9", &test_request())
            .await
            .unwrap_err();
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::EndpointNotFound));
        assert!(err.to_string().contains("gemini-9"), "got: {err}");
    }

    #[tokio::test]
    async fn rate_limit_maps_to_quota_exceeded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .generate_content(MODEL, &test_request())
            .await
            .unwrap_err();
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::QuotaExceeded));
    }

    #[tokio::test]
    async fn server_error_maps_to_other() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri())
            .generate_content(MODEL, &test_request())
            .await
            .unwrap_err();
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::Other));
        assert!(err.to_string().contains("overloaded"));
    }

    #[tokio::test]
    async fn slow_server_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"candidates": []}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client =
            GeminiClient::new("k", &server.uri(), Duration::from_millis(50)).unwrap();
        let err = client.generate_content(MODEL, &test_request()).await.unwrap_err();
        assert!(matches!(err, SavaError::Timeout { .. }), "got: {err:?}");
    }

    #[test]
    fn classify_failure_reads_status_and_message() {
        assert_eq!(
            classify_failure(StatusCode::BAD_REQUEST, r#"{"error":{"code":400,"message":"model is not supported for generateContent","status":"INVALID_ARGUMENT"}}"#),
            ProviderErrorKind::EndpointNotFound
        );
        assert_eq!(
            classify_failure(StatusCode::FORBIDDEN, r#"{"error":{"code":403,"message":"x","status":"RESOURCE_EXHAUSTED"}}"#),
            ProviderErrorKind::QuotaExceeded
        );
        assert_eq!(
            classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ProviderErrorKind::Other
        );
    }

    #[test]
    fn endpoint_url_trims_trailing_slash() {
        let client = GeminiClient::new("k", "http://localhost:1234/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint_url("gemini-1.5-pro"),
            "http://localhost:1234/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }
}
