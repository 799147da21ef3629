//! Bearer-token codec.
//!
//! Tokens are HS256-signed JWTs over a [`Claims`] payload. They carry no
//! expiry: a token stays usable exactly as long as the session row named by
//! its `jti` exists, so liveness is decided by the session store rather than
//! by the clock.

use std::collections::HashSet;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tessera_core::types::{DbId, Timestamp};

/// The only algorithm tokens may be signed or verified with.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims embedded in every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject -- the owning user's id.
    pub sub: DbId,
    /// Token id -- the id of the backing session row.
    pub jti: DbId,
    /// Principal class, e.g. `"user"`.
    pub iss: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Failure to produce or accept a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Not a JWT, or the payload does not match [`Claims`].
    #[error("malformed token")]
    Malformed,

    /// The signature does not verify under the configured secret.
    #[error("bad token signature")]
    BadSignature,

    /// The header names an algorithm other than [`TOKEN_ALGORITHM`].
    #[error("unexpected signing algorithm")]
    WrongAlgorithm,

    /// Encoding failed.
    #[error("token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Configuration for token signing.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
}

impl TokenConfig {
    /// Load token configuration from environment variables.
    ///
    /// | Env Var      | Required | Default |
    /// |--------------|----------|---------|
    /// | `JWT_SECRET` | **yes**  | --      |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");
        Self { secret }
    }
}

/// Signs and verifies bearer tokens with one fixed secret and algorithm.
///
/// Pure: never touches storage.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        // No exp claim is ever issued.
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Produce a signed token for the given session.
    pub fn encode(
        &self,
        subject: DbId,
        issuer: &str,
        session_id: DbId,
        issued_at: Timestamp,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject,
            jti: session_id,
            iss: issuer.to_string(),
            iat: issued_at.timestamp(),
        };

        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Verify a token and return its claims.
    ///
    /// The header's `alg` is checked first, so any readable header naming
    /// something other than [`TOKEN_ALGORITHM`] (including `none` and names
    /// jsonwebtoken does not know) is `WrongAlgorithm`, never `Malformed`.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        if let Some(alg) = header_algorithm(token) {
            if alg.parse::<Algorithm>().ok() != Some(TOKEN_ALGORITHM) {
                return Err(TokenError::WrongAlgorithm);
            }
        }

        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::WrongAlgorithm
                }
                _ => TokenError::Malformed,
            })
    }
}

/// The raw `alg` named by a token's header, if the header segment decodes.
fn header_algorithm(token: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct RawHeader {
        alg: String,
    }

    let segment = token.split('.').next()?;
    let bytes = URL_SAFE_NO_PAD.decode(segment.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<RawHeader>(&bytes).ok().map(|h| h.alg)
}
