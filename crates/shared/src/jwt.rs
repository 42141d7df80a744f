//! Session token verification.
//!
//! Sessions are issued outside this service. The backend only verifies the
//! bearer token and reads the subject, which is the auth user id that a
//! profile is attached to. HS256 (shared secret) and RS256 (PEM key pair)
//! are both supported; the algorithm is fixed by the constructor used.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("This configuration cannot issue tokens")]
    SigningUnavailable,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (auth user id)
    pub sub: String,
    /// Email known to the session provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Token identifier
    pub jti: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

/// Verification (and optionally signing) keys for session tokens.
#[derive(Clone)]
pub struct JwtConfig {
    algorithm: Algorithm,
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
    issuer: Option<String>,
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl JwtConfig {
    /// Creates an HS256 configuration from a shared secret.
    pub fn hs256(secret: &str, leeway_secs: u64) -> Result<Self, JwtError> {
        if secret.len() < 16 {
            return Err(JwtError::InvalidKey(
                "HS256 secret must be at least 16 bytes".to_string(),
            ));
        }

        Ok(Self {
            algorithm: Algorithm::HS256,
            encoding_key: Some(EncodingKey::from_secret(secret.as_bytes())),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: None,
            leeway_secs,
        })
    }

    /// Creates an RS256 configuration.
    ///
    /// The private key is optional: a verifier-only deployment only needs the
    /// public key of the session provider.
    pub fn rs256(
        private_key_pem: Option<&str>,
        public_key_pem: &str,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        let encoding_key = match private_key_pem.filter(|k| !k.trim().is_empty()) {
            Some(pem) => Some(
                EncodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| JwtError::InvalidKey(format!("Invalid private key: {}", e)))?,
            ),
            None => None,
        };

        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid public key: {}", e)))?;

        Ok(Self {
            algorithm: Algorithm::RS256,
            encoding_key,
            decoding_key,
            issuer: None,
            leeway_secs,
        })
    }

    /// Requires tokens to carry the given `iss` claim.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Issues a session token. Used by tests and local tooling; production
    /// sessions come from the external provider.
    pub fn issue_session_token(
        &self,
        auth_user_id: Uuid,
        email: Option<&str>,
        ttl_secs: i64,
    ) -> Result<String, JwtError> {
        let key = self
            .encoding_key
            .as_ref()
            .ok_or(JwtError::SigningUnavailable)?;

        let now = Utc::now();
        let claims = SessionClaims {
            sub: auth_user_id.to_string(),
            email: email.map(str::to_string),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(self.algorithm), &claims, key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Verifies a token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(ref issuer) = self.issuer {
            validation.set_issuer(&[issuer.as_str()]);
        }

        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidToken
                    | jsonwebtoken::errors::ErrorKind::InvalidSignature
                    | jsonwebtoken::errors::ErrorKind::InvalidIssuer
                    | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => JwtError::InvalidToken,
                    _ => JwtError::DecodingError(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

/// Extracts the auth user id from validated claims.
pub fn extract_auth_user_id(claims: &SessionClaims) -> Result<Uuid, JwtError> {
    Uuid::parse_str(&claims.sub).map_err(|_| JwtError::InvalidToken)
}
