// SPDX-FileCopyrightText: 2026 Yal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON-over-HTTP client shared by the adapters.
//!
//! Provides [`JsonClient`], which posts a JSON body, decodes a JSON reply,
//! and retries transient errors once.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

/// Delay before retrying a transient error.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Failure of one JSON exchange.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// HTTP client posting JSON, with one retry on 429, 500 and 503.
#[derive(Debug, Clone)]
pub struct JsonClient {
    client: reqwest::Client,
    max_retries: u32,
}

impl JsonClient {
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(HttpError::Build)?;
        Ok(Self {
            client,
            max_retries: 1,
        })
    }

    /// Posts `body` to `url` and decodes the reply.
    pub async fn post<B, R>(&self, url: &str, body: &B) -> Result<R, HttpError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, url, "retrying request after transient error");
                tokio::time::sleep(RETRY_DELAY).await;
            }

            let response = self
                .client
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(HttpError::Request)?;

            let status = response.status();
            debug!(status = %status, attempt, url, "response received");

            if status.is_success() {
                let bytes = response.bytes().await.map_err(HttpError::Request)?;
                return serde_json::from_slice(&bytes).map_err(HttpError::Decode);
            }

            let body = response.text().await.unwrap_or_default();
            let error = HttpError::Status { status, body };
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, "transient error, will retry");
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error.unwrap_or(HttpError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            body: "request failed after retries".to_string(),
        }))
    }

    /// GETs `url` and reports whether it answered with a success status.
    pub async fn ping(&self, url: &str) -> Result<bool, HttpError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(HttpError::Request)?;
        Ok(response.status().is_success())
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> JsonClient {
        JsonClient::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn retries_once_on_429() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/x"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/x"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let reply: Value = client()
            .post(&format!("{}/x", server.uri()), &json!({}))
            .await
            .unwrap();
        assert_eq!(reply["ok"], true);
    }

    #[tokio::test]
    async fn gives_up_after_second_503() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .expect(2)
            .mount(&server)
            .await;

        let err = client()
            .post::<_, Value>(&format!("{}/x", server.uri()), &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Status { .. }));
        assert!(err.to_string().contains("busy"));
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        assert!(
            client()
                .post::<_, Value>(&server.uri(), &json!({}))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client()
            .post::<_, Value>(&server.uri(), &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Decode(_)));
    }
}
