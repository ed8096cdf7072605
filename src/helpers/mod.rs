//! Small text helpers shared by the markdown pipeline and the contact mailer

mod html;

pub use html::*;
