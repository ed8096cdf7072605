//! Email delivery adapter

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::EmailEnvelope;
use crate::config::ContactConfig;
use crate::error::{ConfigError, DeliveryError};

/// Something that can deliver an email envelope
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message, returning the provider's message id
    async fn send(&self, envelope: &EmailEnvelope) -> Result<String, DeliveryError>;
}

/// Request body of the Resend `POST /emails` endpoint
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: Option<String>,
}

/// Resend HTTP API client
pub struct ResendMailer {
    http_client: reqwest::Client,
    api_url: String,
    api_key: String,
    timeout_secs: u64,
    max_retries: usize,
}

impl ResendMailer {
    /// Build a client from configuration, reading the key from the environment
    pub fn new(config: &ContactConfig) -> Result<Self, ConfigError> {
        let api_key = config.api_key()?;
        Self::with_api_key(config, api_key)
    }

    /// Build a client with an explicit key
    pub fn with_api_key(config: &ContactConfig, api_key: String) -> Result<Self, ConfigError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::Invalid {
                key: "contact",
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key,
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        })
    }

    fn emails_url(&self) -> String {
        format!("{}/emails", self.api_url)
    }

    async fn send_once(&self, envelope: &EmailEnvelope) -> Result<String, DeliveryError> {
        let request = SendRequest {
            from: &envelope.from,
            to: [&envelope.to],
            subject: &envelope.subject,
            html: &envelope.html,
            reply_to: envelope.reply_to.as_deref(),
        };

        let response = self
            .http_client
            .post(self.emails_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let id = match response.json::<SendResponse>().await {
            Ok(SendResponse { id: Some(id) }) => id,
            Ok(SendResponse { id: None }) => String::new(),
            Err(e) => {
                tracing::warn!("Email accepted but the response was unreadable: {}", e);
                String::new()
            }
        };
        Ok(id)
    }

    fn transport_error(&self, e: reqwest::Error) -> DeliveryError {
        if e.is_timeout() {
            DeliveryError::Timeout(self.timeout_secs)
        } else {
            DeliveryError::Unreachable(e.to_string())
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, envelope: &EmailEnvelope) -> Result<String, DeliveryError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(250))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(self.max_retries);

        (|| async { self.send_once(envelope).await })
            .retry(backoff)
            .when(DeliveryError::is_transient)
            .notify(|err, delay| {
                tracing::warn!("Email delivery failed ({}), retrying in {:?}", err, delay)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn envelope() -> EmailEnvelope {
        EmailEnvelope {
            from: "contact@resend.dev".to_string(),
            to: "owner@example.com".to_string(),
            reply_to: Some("jane@example.com".to_string()),
            subject: "Contact Form: Hi".to_string(),
            html: "<p>Hi</p>".to_string(),
        }
    }

    /// Serve `router` on an ephemeral port and return its base URL
    async fn spawn_provider(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config(api_url: String, max_retries: usize) -> ContactConfig {
        ContactConfig {
            to: "owner@example.com".to_string(),
            api_url,
            timeout_secs: 2,
            max_retries,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_sends_resend_payload() {
        let router = Router::new().route(
            "/emails",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body["to"][0], "owner@example.com");
                assert_eq!(body["reply_to"], "jane@example.com");
                assert_eq!(body["subject"], "Contact Form: Hi");
                Json(serde_json::json!({ "id": "msg_123" }))
            }),
        );
        let url = spawn_provider(router).await;
        let mailer = ResendMailer::with_api_key(&config(url, 0), "re_test".to_string()).unwrap();

        assert_eq!(mailer.send(&envelope()).await.unwrap(), "msg_123");
    }

    #[tokio::test]
    async fn test_rejection_carries_status_and_body() {
        let router = Router::new().route(
            "/emails",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "invalid `to` field") }),
        );
        let url = spawn_provider(router).await;
        let mailer = ResendMailer::with_api_key(&config(url, 3), "re_test".to_string()).unwrap();

        match mailer.send(&envelope()).await {
            Err(DeliveryError::Rejected { status, body }) => {
                assert_eq!(status, 422);
                assert!(body.contains("invalid `to` field"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/emails",
            post(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({})))
                    } else {
                        (StatusCode::OK, Json(serde_json::json!({ "id": "msg_retry" })))
                    }
                }
            }),
        );
        let url = spawn_provider(router).await;
        let mailer = ResendMailer::with_api_key(&config(url, 2), "re_test".to_string()).unwrap();

        assert_eq!(mailer.send(&envelope()).await.unwrap(), "msg_retry");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unreachable_provider() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mailer =
            ResendMailer::with_api_key(&config(format!("http://{}", addr), 0), "re_test".into())
                .unwrap();
        let err = mailer.send(&envelope()).await.unwrap_err();
        assert!(matches!(
            err,
            DeliveryError::Unreachable(_) | DeliveryError::Timeout(_)
        ));
    }

    fn hanging_provider() -> Router {
        Router::new().route(
            "/emails",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Json(serde_json::json!({ "id": "too_late" }))
            }),
        )
    }

    #[tokio::test]
    async fn test_hanging_provider_times_out() {
        let url = spawn_provider(hanging_provider()).await;
        let mut config = config(url, 0);
        config.timeout_secs = 1;
        let mailer = ResendMailer::with_api_key(&config, "re_test".to_string()).unwrap();

        let started = std::time::Instant::now();
        let err = mailer.send(&envelope()).await.unwrap_err();
        assert!(matches!(err, DeliveryError::Timeout(1)));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_timeout_reported_as_delivery_failure() {
        use crate::contact::{ContactHandler, ContactOutcome, ContactSubmission};

        let url = spawn_provider(hanging_provider()).await;
        let mut config = config(url, 0);
        config.timeout_secs = 1;
        let mailer = ResendMailer::with_api_key(&config, "re_test".to_string()).unwrap();
        let handler = ContactHandler::new(config, Arc::new(mailer));

        let submission = ContactSubmission {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            subject: "Hello".to_string(),
            message: "Are you there?".to_string(),
        };
        let outcome = handler.handle(submission).await;
        assert_eq!(outcome, ContactOutcome::DeliveryFailed);
        assert_eq!(outcome.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
