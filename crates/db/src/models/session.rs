//! Session model and DTOs.

use sqlx::FromRow;
use tessera_core::types::{DbId, Timestamp};

/// A row from the `sessions` table. One row per live bearer token.
///
/// `subject` is deliberately not a foreign key; a session whose user has
/// been deleted simply fails validation.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub subject: DbId,
    pub issuer: String,
    pub ip_address: String,
    pub last_access_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub subject: DbId,
    pub issuer: String,
    pub ip_address: String,
}
