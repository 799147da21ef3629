//! Session issuance, validation, and revocation.
//!
//! A session is a row in the session store plus a signed bearer token whose
//! `jti` names that row. [`SessionManager`] ties the two together and applies
//! the deployment's [`SessionPolicy`].
//!
//! ```text
//! ABSENT --issue--> ACTIVE --validate (touch)--> ACTIVE
//! ACTIVE --revoke / superseded by issue under Single--> ABSENT
//! ```
//!
//! There is no expired state; a session is live for exactly as long as its
//! row exists.

use tessera_core::session::SessionPolicy;
use tessera_core::types::DbId;
use tessera_db::models::session::{CreateSession, Session};
use tessera_db::models::user::User;

use crate::auth::jwt::{TokenCodec, TokenError};
use crate::auth::store::{CredentialStore, SessionStore};

/// Why a session operation was refused.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No token was presented at all.
    #[error("missing authorization header")]
    MissingHeader,

    /// The token could not be decoded or verified.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The token verifies but names no live session.
    #[error("session not found")]
    SessionNotFound,

    /// The session exists but belongs to a different subject than the token claims.
    #[error("session subject does not match token subject")]
    SubjectMismatch,

    /// The session's user no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// The store could not be reached or rejected the write.
    #[error("session store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Result of a successful validation.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    /// The session row as it stands after the touch.
    pub session: Session,
}

/// Result of a revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revoked {
    /// Rows removed. Zero is still a successful (idempotent) logout.
    pub sessions_deleted: u64,
}

/// Orchestrates the session lifecycle over a store and a token codec.
pub struct SessionManager<S> {
    store: S,
    codec: TokenCodec,
    policy: SessionPolicy,
}

impl<S> SessionManager<S>
where
    S: CredentialStore + SessionStore,
{
    pub fn new(store: S, codec: TokenCodec, policy: SessionPolicy) -> Self {
        Self {
            store,
            codec,
            policy,
        }
    }

    /// Create a session for `subject` and return its signed token.
    ///
    /// Under [`SessionPolicy::Single`] every earlier session of the subject is
    /// deleted first. That cleanup is best-effort and is not in the same
    /// transaction as the insert; a failure is logged and issuance proceeds.
    pub async fn issue(
        &self,
        subject: DbId,
        issuer: &str,
        client_ip: &str,
    ) -> Result<String, SessionError> {
        if self.policy.is_single() {
            match self.store.delete_sessions_for_subject(subject).await {
                Ok(0) => {}
                Ok(superseded) => {
                    tracing::debug!(%subject, superseded, "Superseded earlier sessions");
                }
                Err(e) => {
                    tracing::warn!(%subject, error = %e, "Failed to clear earlier sessions");
                }
            }
        }

        let session = self
            .store
            .create_session(&CreateSession {
                subject,
                issuer: issuer.to_string(),
                ip_address: client_ip.to_string(),
            })
            .await?;

        let token = match self
            .codec
            .encode(subject, issuer, session.id, session.created_at)
        {
            Ok(token) => token,
            Err(e) => {
                // Nobody can ever present this session; don't leave it behind.
                if let Err(cleanup) = self.store.delete_session(session.id).await {
                    tracing::warn!(session_id = %session.id, error = %cleanup, "Failed to remove unsigned session");
                }
                return Err(e.into());
            }
        };

        tracing::info!(%subject, session_id = %session.id, "Session issued");
        Ok(token)
    }

    /// Check a presented token and, on success, [`touch`](Self::touch) its session.
    ///
    /// Steps, failing fast:
    /// 1. decode and verify the token;
    /// 2. load the session named by `jti`;
    /// 3. require the session's subject to equal the token's `sub`;
    /// 4. load the user;
    /// 5. touch the session with `client_ip`.
    pub async fn validate(
        &self,
        token: &str,
        client_ip: &str,
    ) -> Result<Authenticated, SessionError> {
        let claims = self.codec.decode(token)?;

        let session = self
            .store
            .find_session(claims.jti)
            .await?
            .ok_or(SessionError::SessionNotFound)?;

        if session.subject != claims.sub {
            tracing::warn!(
                session_id = %session.id,
                token_subject = %claims.sub,
                "Token subject does not match session"
            );
            return Err(SessionError::SubjectMismatch);
        }

        let user = self
            .store
            .find_user(claims.sub)
            .await?
            .ok_or(SessionError::UserNotFound)?;

        let session = self.touch(session.id, client_ip).await?;

        Ok(Authenticated { user, session })
    }

    /// Record a validated use of a session: last-access becomes now and the
    /// stored IP becomes `client_ip`. Persisted immediately.
    pub async fn touch(&self, session_id: DbId, client_ip: &str) -> Result<Session, SessionError> {
        self.store
            .touch_session(session_id, client_ip)
            .await?
            .ok_or(SessionError::SessionNotFound)
    }

    /// End the session(s) behind a token.
    ///
    /// Under [`SessionPolicy::Single`] every session of the token's subject is
    /// deleted; under [`SessionPolicy::Multiple`] only the token's own session.
    pub async fn revoke(&self, token: &str) -> Result<Revoked, SessionError> {
        let claims = self.codec.decode(token)?;

        let sessions_deleted = match self.policy {
            SessionPolicy::Single => self.store.delete_sessions_for_subject(claims.sub).await?,
            SessionPolicy::Multiple => self.store.delete_session(claims.jti).await?,
        };

        tracing::info!(subject = %claims.sub, sessions_deleted, "Session revoked");
        Ok(Revoked { sessions_deleted })
    }
}
