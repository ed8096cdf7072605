//! Contact request handling: validate, forward, report

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::{ContactSubmission, EmailEnvelope, Mailer, ResendMailer};
use crate::config::ContactConfig;
use crate::error::{ConfigError, SubmissionError};

/// Result of one contact request.
///
/// Each variant maps to a fixed status and a user-facing message; internal
/// error detail is logged, never carried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    Sent,
    Invalid(SubmissionError),
    /// The request body was not a JSON object of strings
    Malformed,
    Unconfigured,
    DeliveryFailed,
}

impl ContactOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            ContactOutcome::Sent => StatusCode::OK,
            ContactOutcome::Invalid(_) | ContactOutcome::Malformed => StatusCode::BAD_REQUEST,
            ContactOutcome::Unconfigured | ContactOutcome::DeliveryFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn body(&self) -> Value {
        match self {
            ContactOutcome::Sent => json!({ "message": "Message sent successfully" }),
            ContactOutcome::Invalid(err) => {
                let fields: Map<String, Value> = err
                    .fields
                    .iter()
                    .map(|f| (f.field.as_str().to_string(), Value::from(f.message)))
                    .collect();
                json!({ "error": "Invalid submission", "fields": fields })
            }
            ContactOutcome::Malformed => json!({ "error": "Invalid request body" }),
            ContactOutcome::Unconfigured => json!({ "error": "Email service not configured" }),
            ContactOutcome::DeliveryFailed => {
                json!({ "error": "Failed to send email. Please try again later." })
            }
        }
    }
}

impl IntoResponse for ContactOutcome {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

/// Stateless contact handler shared by all requests
pub struct ContactHandler {
    config: ContactConfig,
    mailer: Result<Arc<dyn Mailer>, ConfigError>,
}

impl ContactHandler {
    /// Handler delivering through the given mailer
    pub fn new(config: ContactConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            config,
            mailer: Ok(mailer),
        }
    }

    /// Handler that answers every valid submission with a configuration failure
    pub fn unconfigured(config: ContactConfig, reason: ConfigError) -> Self {
        Self {
            config,
            mailer: Err(reason),
        }
    }

    /// Build the Resend-backed handler from configuration.
    ///
    /// A missing credential or unusable setting does not prevent startup; it is
    /// logged here and reported on each submission.
    pub fn from_config(config: &ContactConfig) -> Self {
        let mailer = config
            .validate()
            .and_then(|_| ResendMailer::new(config));
        match mailer {
            Ok(mailer) => Self::new(config.clone(), Arc::new(mailer)),
            Err(e) => {
                tracing::error!("Contact form email delivery is not configured: {}", e);
                Self::unconfigured(config.clone(), e)
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.mailer.is_ok()
    }

    /// Run one submission through Received -> Validated -> Forwarded -> Succeeded/Failed
    pub async fn handle(&self, submission: ContactSubmission) -> ContactOutcome {
        tracing::debug!("Contact submission received");

        let valid = match submission.validate() {
            Ok(valid) => valid,
            Err(err) => {
                tracing::info!("Contact submission rejected: {}", err);
                return ContactOutcome::Invalid(err);
            }
        };
        tracing::debug!("Contact submission validated");

        let mailer = match &self.mailer {
            Ok(mailer) => mailer,
            Err(e) => {
                tracing::error!("Cannot forward contact submission: {}", e);
                return ContactOutcome::Unconfigured;
            }
        };

        let envelope = EmailEnvelope::for_submission(&valid, &self.config, Local::now());
        tracing::debug!("Forwarding contact submission to {}", envelope.to);

        match mailer.send(&envelope).await {
            Ok(id) => {
                tracing::info!("Contact email sent (id: {})", id);
                ContactOutcome::Sent
            }
            Err(e) => {
                tracing::error!("Failed to send contact email: {}", e);
                ContactOutcome::DeliveryFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DeliveryError, Field};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records envelopes and answers with a fixed result
    struct FakeMailer {
        sent: Mutex<Vec<EmailEnvelope>>,
        fail: bool,
    }

    impl FakeMailer {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                fail,
            })
        }
    }

    #[async_trait]
    impl Mailer for FakeMailer {
        async fn send(&self, envelope: &EmailEnvelope) -> Result<String, DeliveryError> {
            if self.fail {
                return Err(DeliveryError::Unreachable(
                    "connection refused (secret-internal-detail)".to_string(),
                ));
            }
            let mut sent = self.sent.lock().unwrap();
            sent.push(envelope.clone());
            Ok(format!("msg_{}", sent.len()))
        }
    }

    fn config() -> ContactConfig {
        ContactConfig {
            to: "owner@example.com".to_string(),
            ..Default::default()
        }
    }

    fn valid() -> ContactSubmission {
        ContactSubmission {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            subject: "Project inquiry".to_string(),
            message: "Please contact me about a project".to_string(),
        }
    }

    #[tokio::test]
    async fn test_success_forwards_envelope() {
        let mailer = FakeMailer::new(false);
        let handler = ContactHandler::new(config(), mailer.clone());

        let outcome = handler.handle(valid()).await;
        assert_eq!(outcome, ContactOutcome::Sent);
        assert_eq!(outcome.status(), StatusCode::OK);

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].reply_to.as_deref(), Some("jane@example.com"));
    }

    #[tokio::test]
    async fn test_duplicates_are_not_deduplicated() {
        let mailer = FakeMailer::new(false);
        let handler = ContactHandler::new(config(), mailer.clone());

        assert_eq!(handler.handle(valid()).await, ContactOutcome::Sent);
        assert_eq!(handler.handle(valid()).await, ContactOutcome::Sent);
        assert_eq!(mailer.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_submission_is_not_forwarded() {
        let mailer = FakeMailer::new(false);
        let handler = ContactHandler::new(config(), mailer.clone());
        let mut submission = valid();
        submission.email = "not-an-email".to_string();

        let outcome = handler.handle(submission).await;
        assert_eq!(outcome.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(&outcome, ContactOutcome::Invalid(err) if err.cites(Field::Email)));
        assert_eq!(
            outcome.body()["fields"]["email"],
            "Please enter a valid email address"
        );
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_is_generic() {
        let handler = ContactHandler::new(config(), FakeMailer::new(true));

        let outcome = handler.handle(valid()).await;
        assert_eq!(outcome, ContactOutcome::DeliveryFailed);
        assert_eq!(outcome.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = outcome.body().to_string();
        assert!(!body.contains("secret-internal-detail"));
        assert!(!body.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_unconfigured_is_distinct() {
        let handler = ContactHandler::unconfigured(
            config(),
            ConfigError::MissingCredential("RESEND_API_KEY".to_string()),
        );
        assert!(!handler.is_configured());

        let outcome = handler.handle(valid()).await;
        assert_eq!(outcome, ContactOutcome::Unconfigured);
        assert_eq!(outcome.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_ne!(outcome.body(), ContactOutcome::DeliveryFailed.body());
        assert!(!outcome.body().to_string().contains("RESEND_API_KEY"));
    }

    #[tokio::test]
    async fn test_validation_precedes_configuration() {
        let handler = ContactHandler::unconfigured(
            config(),
            ConfigError::MissingCredential("RESEND_API_KEY".to_string()),
        );
        let outcome = handler.handle(ContactSubmission::default()).await;
        assert_eq!(outcome.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_from_config_without_recipient_is_unconfigured() {
        let handler = ContactHandler::from_config(&ContactConfig::default());
        assert!(!handler.is_configured());
    }
}
