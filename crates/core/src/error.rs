use crate::types::DbId;

/// Domain-level failures, independent of any transport.
///
/// The API crate maps each variant onto an HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Lookup by a non-id key (e.g. email) found nothing.
    #[error("Entity not found: {entity}")]
    Missing { entity: &'static str },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}
