//! Storage seams used by the session manager.
//!
//! The production implementation, [`PgStore`], delegates to the repositories
//! in `tessera_db`. Tests substitute an in-memory store.

use std::future::Future;

use tessera_core::types::DbId;
use tessera_db::models::session::{CreateSession, Session};
use tessera_db::models::user::User;
use tessera_db::repositories::{SessionRepo, UserRepo};
use tessera_db::DbPool;

/// Read access to user records.
pub trait CredentialStore: Send + Sync {
    fn find_user(
        &self,
        id: DbId,
    ) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send;
}

/// Persistence for session rows.
pub trait SessionStore: Send + Sync {
    fn create_session(
        &self,
        input: &CreateSession,
    ) -> impl Future<Output = Result<Session, sqlx::Error>> + Send;

    fn find_session(
        &self,
        id: DbId,
    ) -> impl Future<Output = Result<Option<Session>, sqlx::Error>> + Send;

    /// Set last-access to now and overwrite the client IP.
    /// `None` when the row no longer exists.
    fn touch_session(
        &self,
        id: DbId,
        ip_address: &str,
    ) -> impl Future<Output = Result<Option<Session>, sqlx::Error>> + Send;

    fn delete_session(&self, id: DbId) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;

    fn delete_sessions_for_subject(
        &self,
        subject: DbId,
    ) -> impl Future<Output = Result<u64, sqlx::Error>> + Send;
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CredentialStore for PgStore {
    async fn find_user(&self, id: DbId) -> Result<Option<User>, sqlx::Error> {
        UserRepo::find_by_id(&self.pool, id).await
    }
}

impl SessionStore for PgStore {
    async fn create_session(&self, input: &CreateSession) -> Result<Session, sqlx::Error> {
        SessionRepo::create(&self.pool, input).await
    }

    async fn find_session(&self, id: DbId) -> Result<Option<Session>, sqlx::Error> {
        SessionRepo::find_by_id(&self.pool, id).await
    }

    async fn touch_session(
        &self,
        id: DbId,
        ip_address: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        SessionRepo::touch(&self.pool, id, ip_address).await
    }

    async fn delete_session(&self, id: DbId) -> Result<u64, sqlx::Error> {
        SessionRepo::delete(&self.pool, id).await
    }

    async fn delete_sessions_for_subject(&self, subject: DbId) -> Result<u64, sqlx::Error> {
        SessionRepo::delete_for_subject(&self.pool, subject).await
    }
}
