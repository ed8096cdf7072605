//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub author: String,
    pub url: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    pub blog: BlogConfig,
    pub highlight: HighlightConfig,
    pub contact: ContactConfig,
    pub server: ServerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Portfolio".to_string(),
            author: String::new(),
            url: "http://localhost:4000".to_string(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),

            blog: BlogConfig::default(),
            highlight: HighlightConfig::default(),
            contact: ContactConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        config.blog.validate()?;
        Ok(config)
    }
}

/// Blog post discovery and derived-field settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    /// Glob patterns, relative to the content directory
    pub patterns: Vec<String>,
    /// Prefix removed from the relative path to form the slug
    pub strip_prefix: String,
    /// Prefix prepended to the slug to form the URL
    pub url_prefix: String,
    pub words_per_minute: usize,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            patterns: vec!["blog/**/*.md".to_string(), "blog/**/*.mdx".to_string()],
            strip_prefix: "blog/".to_string(),
            url_prefix: "/blog/".to_string(),
            words_per_minute: 200,
        }
    }
}

impl BlogConfig {
    fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.words_per_minute == 0 {
            return Err(ConfigError::Invalid {
                key: "blog.words_per_minute",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.patterns.is_empty() {
            return Err(ConfigError::Invalid {
                key: "blog.patterns",
                message: "at least one pattern is required".to_string(),
            });
        }
        Ok(())
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Contact form delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub from: String,
    pub to: String,
    pub subject_prefix: String,
    pub api_url: String,
    /// Name of the environment variable holding the provider API key
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_retries: usize,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            from: "contact@resend.dev".to_string(),
            to: String::new(),
            subject_prefix: "Contact Form: ".to_string(),
            api_url: "https://api.resend.com".to_string(),
            api_key_env: "RESEND_API_KEY".to_string(),
            timeout_secs: 10,
            max_retries: 0,
        }
    }
}

impl ContactConfig {
    /// Read the provider credential from the environment
    pub fn api_key(&self) -> std::result::Result<String, ConfigError> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(ConfigError::MissingCredential(self.api_key_env.clone())),
        }
    }

    /// Check that sender and recipient identities are usable
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.from.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "contact.from",
                message: "sender address is empty".to_string(),
            });
        }
        if self.to.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "contact.to",
                message: "recipient address is empty".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "contact.timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Development server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ip: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: "localhost".to_string(),
            port: 4000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.content_dir, "content");
        assert_eq!(config.blog.words_per_minute, 200);
        assert_eq!(config.blog.url_prefix, "/blog/");
        assert_eq!(config.contact.subject_prefix, "Contact Form: ");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: Jane's Portfolio
content_dir: posts
blog:
  url_prefix: /writing/
contact:
  to: jane@example.com
  timeout_secs: 5
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "Jane's Portfolio");
        assert_eq!(config.content_dir, "posts");
        assert_eq!(config.blog.url_prefix, "/writing/");
        assert_eq!(config.blog.strip_prefix, "blog/");
        assert_eq!(config.contact.to, "jane@example.com");
        assert_eq!(config.contact.timeout(), Duration::from_secs(5));
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_contact_requires_recipient() {
        let contact = ContactConfig::default();
        assert!(matches!(
            contact.validate(),
            Err(ConfigError::Invalid {
                key: "contact.to",
                ..
            })
        ));
    }

    #[test]
    fn test_missing_api_key() {
        let contact = ContactConfig {
            api_key_env: "PORTFOLIO_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        assert_eq!(
            contact.api_key(),
            Err(ConfigError::MissingCredential(
                "PORTFOLIO_TEST_UNSET_KEY".to_string()
            ))
        );
    }

    #[test]
    fn test_zero_words_per_minute_rejected() {
        let blog = BlogConfig {
            words_per_minute: 0,
            ..Default::default()
        };
        assert!(blog.validate().is_err());
    }
}
