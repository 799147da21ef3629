//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- Bearer-token encoding and verification.
//! - [`store`] -- Storage traits and the PostgreSQL implementation.
//! - [`session`] -- Session issuance, validation (with touch), and revocation.

pub mod jwt;
pub mod password;
pub mod session;
pub mod store;

/// The session manager as wired in production.
pub type Sessions = session::SessionManager<store::PgStore>;
