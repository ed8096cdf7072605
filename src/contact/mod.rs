//! Contact module - validates submissions and forwards them by email

mod envelope;
mod handler;
mod mailer;
mod submission;

pub use envelope::EmailEnvelope;
pub use handler::{ContactHandler, ContactOutcome};
pub use mailer::{Mailer, ResendMailer};
pub use submission::{is_valid_email, ContactSubmission, ValidSubmission};
