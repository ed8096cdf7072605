//! Contact form payload and its server-side validation

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Field, FieldError, SubmissionError};

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// A contact form submission as received from the client.
///
/// Missing keys deserialize to empty strings so they surface as field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// A submission that passed validation, with surrounding whitespace trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactSubmission {
    /// Apply every rule and report all failing fields at once
    pub fn validate(&self) -> Result<ValidSubmission, SubmissionError> {
        let mut fields = Vec::new();

        let first_name = non_empty(
            &self.first_name,
            Field::FirstName,
            "First name is required",
            &mut fields,
        );
        let last_name = non_empty(
            &self.last_name,
            Field::LastName,
            "Last name is required",
            &mut fields,
        );

        let email = self.email.trim();
        if email.is_empty() {
            fields.push(FieldError {
                field: Field::Email,
                message: "Email is required",
            });
        } else if !is_valid_email(email) {
            fields.push(FieldError {
                field: Field::Email,
                message: "Please enter a valid email address",
            });
        }

        let subject = non_empty(&self.subject, Field::Subject, "Subject is required", &mut fields);
        let message = non_empty(&self.message, Field::Message, "Message is required", &mut fields);

        if !fields.is_empty() {
            return Err(SubmissionError { fields });
        }

        Ok(ValidSubmission {
            first_name,
            last_name,
            email: email.to_string(),
            subject,
            message,
        })
    }
}

fn non_empty(
    value: &str,
    field: Field,
    message: &'static str,
    fields: &mut Vec<FieldError>,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fields.push(FieldError { field, message });
    }
    trimmed.to_string()
}

/// local-part@domain with a dot in the domain and no whitespace anywhere
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}
