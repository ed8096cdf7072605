//! Error types for content compilation and contact submissions

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A single validation failure found while compiling one document
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("{path}: malformed front-matter: {message}")]
    Frontmatter { path: PathBuf, message: String },

    #[error("{path}: missing required field `{field}`")]
    MissingField { path: PathBuf, field: &'static str },

    #[error("{path}: invalid date {value:?}")]
    InvalidDate { path: PathBuf, value: String },

    #[error("{path}: `{field}` is derived and must not be set in front-matter")]
    DerivedField { path: PathBuf, field: String },

    #[error("duplicate slug `{slug}` ({first} and {second})")]
    DuplicateSlug {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("{path}: {message}")]
    Read { path: PathBuf, message: String },
}

/// Failure of a whole compilation pass
#[derive(Debug, Error)]
pub enum CompileError {
    /// Every validation error found in the pass, in discovery order
    #[error("{}", render_errors(.0))]
    Invalid(Vec<ContentError>),

    #[error("invalid content pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

impl CompileError {
    /// Validation errors of this pass (empty for non-validation failures)
    pub fn errors(&self) -> &[ContentError] {
        match self {
            CompileError::Invalid(errors) => errors,
            _ => &[],
        }
    }
}

fn render_errors(errors: &[ContentError]) -> String {
    let mut out = format!("content compilation failed with {} error(s)", errors.len());
    for err in errors {
        out.push_str("\n  - ");
        out.push_str(&err.to_string());
    }
    out
}

/// A contact field that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Subject,
    Message,
}

impl Field {
    /// Name of the field as it appears in the JSON payload
    pub fn as_str(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::Subject => "subject",
            Field::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failing field and the user-facing reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

/// Contact submission rejected by server-side validation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid submission: {}", .fields.iter().map(|f| f.field.as_str()).collect::<Vec<_>>().join(", "))]
pub struct SubmissionError {
    pub fields: Vec<FieldError>,
}

impl SubmissionError {
    /// Whether the given field is among the failures
    pub fn cites(&self, field: Field) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

/// The email provider failed to accept a message
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("provider rejected the message with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("provider did not answer within {0}s")]
    Timeout(u64),

    #[error("provider unreachable: {0}")]
    Unreachable(String),
}

impl DeliveryError {
    /// Errors worth retrying: timeouts, connection failures, throttling and 5xx
    pub fn is_transient(&self) -> bool {
        match self {
            DeliveryError::Rejected { status, .. } => *status == 429 || *status >= 500,
            DeliveryError::Timeout(_) | DeliveryError::Unreachable(_) => true,
        }
    }
}

/// A required setting or credential is absent or unusable
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingCredential(String),

    #[error("invalid setting `{key}`: {message}")]
    Invalid { key: &'static str, message: String },
}
