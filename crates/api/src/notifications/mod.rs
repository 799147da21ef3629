//! Outbound notifications.

pub mod mailer;

pub use mailer::{EmailConfig, Mailer};
