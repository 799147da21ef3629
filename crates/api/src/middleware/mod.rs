//! Request middleware.
//!
//! - [`auth::require_session`] -- Access gate for bearer-protected routes.
//! - [`auth::AuthUser`] -- Extracts the identity the gate attached.

pub mod auth;
