//! Outbound email built from a validated submission

use chrono::{DateTime, Local};
use serde::Serialize;

use super::ValidSubmission;
use crate::config::ContactConfig;
use crate::helpers::html_escape;

/// Provider-neutral email: `{from, to, replyTo, subject, html}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailEnvelope {
    pub from: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
}

impl EmailEnvelope {
    /// Compose the notification for a contact submission.
    ///
    /// Every user-supplied value is HTML-escaped before it reaches the body.
    pub fn for_submission(
        submission: &ValidSubmission,
        config: &ContactConfig,
        sent_at: DateTime<Local>,
    ) -> Self {
        let name = html_escape(&format!(
            "{} {}",
            submission.first_name, submission.last_name
        ));
        let first_name = html_escape(&submission.first_name);
        let email = html_escape(&submission.email);
        let subject = html_escape(&submission.subject);
        let message = html_escape(&submission.message);
        let sent_on = sent_at.format("%B %-d, %Y at %H:%M:%S");

        let html = format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #333; border-bottom: 2px solid #007bff; padding-bottom: 10px;">New Contact Form Submission</h2>
  <div style="background: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0;">
    <p style="margin: 5px 0;"><strong>Name:</strong> {name}</p>
    <p style="margin: 5px 0;"><strong>Email:</strong> <a href="mailto:{email}" style="color: #007bff;">{email}</a></p>
    <p style="margin: 5px 0;"><strong>Subject:</strong> {subject}</p>
  </div>
  <div style="background: white; padding: 20px; border: 1px solid #dee2e6; border-radius: 8px;">
    <h3 style="color: #495057; margin-top: 0;">Message:</h3>
    <p style="white-space: pre-wrap; line-height: 1.6; color: #212529;">{message}</p>
  </div>
  <div style="margin-top: 20px; padding: 15px; background: #e9ecef; border-radius: 8px; font-size: 12px; color: #6c757d;">
    <p style="margin: 0;">Reply directly to this email to respond to {first_name}</p>
    <p style="margin: 5px 0 0 0;">Sent on {sent_on}</p>
  </div>
</div>"#
        );

        Self {
            from: config.from.clone(),
            to: config.to.clone(),
            reply_to: Some(submission.email.clone()),
            subject: header_line(&format!("{}{}", config.subject_prefix, submission.subject)),
            html,
        }
    }
}

/// Collapse line breaks so a value is safe as a single header line
fn header_line(value: &str) -> String {
    value.split(['\r', '\n']).filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ")
}
