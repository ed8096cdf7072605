//! Verify the email provider credential with a test message

use anyhow::{Context, Result};

use crate::config::ContactConfig;
use crate::contact::{EmailEnvelope, Mailer, ResendMailer};

/// Resend API keys carry this prefix
const KEY_PREFIX: &str = "re_";

/// Fixed test message sent to the configured recipient
pub fn test_envelope(config: &ContactConfig) -> EmailEnvelope {
    EmailEnvelope {
        from: config.from.clone(),
        to: config.to.clone(),
        reply_to: None,
        subject: format!("{}Email delivery check", config.subject_prefix),
        html: "<p>This is a test message confirming that contact form delivery works.</p>"
            .to_string(),
    }
}

/// Whether `key` looks like a provider key
pub fn key_format_ok(key: &str) -> bool {
    key.starts_with(KEY_PREFIX) && key.len() > KEY_PREFIX.len()
}

pub async fn run(config: &ContactConfig) -> Result<()> {
    config.validate()?;
    let api_key = config.api_key()?;
    println!(
        "Found {} ({} characters)",
        config.api_key_env,
        api_key.len()
    );
    if !key_format_ok(&api_key) {
        anyhow::bail!(
            "{} does not look like a Resend API key (expected prefix {:?})",
            config.api_key_env,
            KEY_PREFIX
        );
    }

    let mailer = ResendMailer::with_api_key(config, api_key)?;
    let envelope = test_envelope(config);
    println!("Sending test message to {}...", envelope.to);

    let id = mailer
        .send(&envelope)
        .await
        .context("Test message was not accepted by the provider")?;
    println!("Test message accepted (id: {})", id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        assert!(key_format_ok("re_123abc"));
        assert!(!key_format_ok("re_"));
        assert!(!key_format_ok("sk_live_123"));
    }

    #[test]
    fn test_envelope_uses_configured_identities() {
        let config = ContactConfig {
            to: "owner@example.com".to_string(),
            ..Default::default()
        };
        let envelope = test_envelope(&config);
        assert_eq!(envelope.to, "owner@example.com");
        assert_eq!(envelope.from, "contact@resend.dev");
        assert_eq!(envelope.subject, "Contact Form: Email delivery check");
        assert!(envelope.reply_to.is_none());
    }
}
