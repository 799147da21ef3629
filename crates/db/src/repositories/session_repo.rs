//! Repository for the `sessions` table.

use sqlx::PgPool;
use tessera_core::types::DbId;

use crate::models::session::{CreateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, subject, issuer, ip_address, last_access_at, created_at, updated_at";

/// Provides CRUD operations for sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (subject, issuer, ip_address)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.subject)
            .bind(&input.issuer)
            .bind(&input.ip_address)
            .fetch_one(pool)
            .await
    }

    /// Find a session by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE id = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every session held by a subject, oldest first.
    pub async fn list_for_subject(
        pool: &PgPool,
        subject: DbId,
    ) -> Result<Vec<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions WHERE subject = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(subject)
            .fetch_all(pool)
            .await
    }

    /// Record a validated use: set `last_access_at` to now and overwrite the
    /// stored client IP.
    ///
    /// Returns `None` if the session disappeared in the meantime.
    pub async fn touch(
        pool: &PgPool,
        id: DbId,
        ip_address: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE sessions SET
                last_access_at = NOW(),
                ip_address = $2,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .bind(ip_address)
            .fetch_optional(pool)
            .await
    }

    /// Delete a single session. Returns the number of rows removed (0 or 1).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every session held by a subject. Returns the count removed.
    pub async fn delete_for_subject(pool: &PgPool, subject: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE subject = $1")
            .bind(subject)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
