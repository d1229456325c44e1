// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation engine backed by a llama.cpp-compatible completion server.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use yal_config::model::EngineConfig;
use yal_core::YalError;
use yal_core::traits::{GenerationEngine, PluginAdapter};
use yal_core::types::{AdapterType, HealthStatus, SamplingParams};

use crate::client::{HttpError, JsonClient};
use crate::types::{CompletionRequest, CompletionResponse};

/// Talks to `POST {base_url}/completion`.
///
/// The server returns only the continuation; the prompt is prepended so
/// the result reads like a causal decode, which is what the orchestrator's
/// echo detection expects.
pub struct LlamaServerEngine {
    client: JsonClient,
    base_url: String,
}

impl LlamaServerEngine {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self, YalError> {
        let client = JsonClient::new(request_timeout).map_err(engine_error)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!(base_url = %base_url, "completion engine configured");
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, YalError> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }
}

fn engine_error(e: HttpError) -> YalError {
    YalError::GenerationFailed {
        message: e.to_string(),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl PluginAdapter for LlamaServerEngine {
    fn name(&self) -> &str {
        "llama-server"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Engine
    }

    async fn health_check(&self) -> Result<HealthStatus, YalError> {
        match self.client.ping(&self.url("health")).await {
            Ok(true) => Ok(HealthStatus::Healthy),
            Ok(false) => Ok(HealthStatus::Degraded("health endpoint not ready".into())),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), YalError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationEngine for LlamaServerEngine {
    async fn predict(
        &self,
        prompt: &str,
        params: &SamplingParams,
        cancel: CancellationToken,
    ) -> Result<String, YalError> {
        let body = CompletionRequest {
            prompt,
            n_predict: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            stream: false,
        };
        let url = self.url("completion");

        let response: CompletionResponse = tokio::select! {
            result = self.client.post::<_, CompletionResponse>(&url, &body) => {
                result.map_err(engine_error)?
            }
            _ = cancel.cancelled() => {
                return Err(YalError::GenerationFailed {
                    message: "generation cancelled".to_string(),
                    source: None,
                });
            }
        };

        debug!(
            tokens = response.tokens_predicted,
            stopped_limit = response.stopped_limit,
            "completion received"
        );
        Ok(format!("{prompt}{}", response.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine(server: &MockServer) -> LlamaServerEngine {
        LlamaServerEngine::new(format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn predict_sends_sampling_and_prepends_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/completion"))
            .and(body_json(json!({
                "prompt": "Hello",
                "n_predict": 256,
                "temperature": 0.5,
                "top_p": 0.5,
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": ", world",
                "tokens_predicted": 3
            })))
            .mount(&server)
            .await;

        let params = SamplingParams {
            max_tokens: 256,
            temperature: 0.5,
            top_p: 0.5,
        };
        let output = engine(&server)
            .predict("Hello", &params, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(output, "Hello, world");
    }

    #[tokio::test]
    async fn empty_content_reads_as_echo() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": ""})))
            .mount(&server)
            .await;

        let output = engine(&server)
            .predict("Hello", &SamplingParams::default(), CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(output, "Hello");
    }

    #[tokio::test]
    async fn server_error_is_generation_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("out of memory"))
            .expect(2)
            .mount(&server)
            .await;

        let err = engine(&server)
            .predict("Hello", &SamplingParams::default(), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, YalError::GenerationFailed { .. }));
        assert!(err.to_string().contains("out of memory"));
    }

    #[tokio::test]
    async fn cancelled_token_stops_waiting() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"content": "late"}))
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = engine(&server)
            .predict("Hello", &SamplingParams::default(), cancel)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cancelled"));
    }

    #[tokio::test]
    async fn health_reflects_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let status = engine(&server).health_check().await.unwrap();
        assert!(matches!(status, HealthStatus::Degraded(_)));
    }
}
