//! Identity guard: bearer-token issuing and verification.
//!
//! Tokens are `base64url(claims JSON) . base64url(HMAC-SHA256 tag)`, claims
//! carrying the customer id, role, and expiry. Verification is stateless;
//! resolving the subject against the account store (it may have been deleted
//! since issue) happens in the auth extractor.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Argon2, password_hash::rand_core::OsRng};

use oakline_core::{CustomerId, Role};

type HmacSha256 = Hmac<Sha256>;

/// Authentication failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer credential on the request.
    #[error("missing credential")]
    MissingCredential,

    /// Credential is not a well-formed token.
    #[error("malformed credential")]
    MalformedCredential,

    /// Signature does not match the payload.
    #[error("invalid signature")]
    InvalidSignature,

    /// Token expiry is in the past.
    #[error("credential expired")]
    Expired,

    /// Token names an identity that no longer exists.
    #[error("unknown identity")]
    UnknownIdentity,

    /// Wrong email or password at login.
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Claims carried inside a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Customer record ID of the subject.
    pub sub: CustomerId,
    /// Role at issue time. Re-resolved against the account store on use.
    pub role: Role,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Signs and verifies bearer tokens. Stateless - no storage access.
#[derive(Clone)]
pub struct IdentityGuard {
    secret: SecretString,
    ttl_days: i64,
}

impl IdentityGuard {
    /// Create a guard with the given signing secret and issued-token TTL.
    #[must_use]
    pub const fn new(secret: SecretString, ttl_days: i64) -> Self {
        Self { secret, ttl_days }
    }

    /// Issue a signed token for a customer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MalformedCredential` if the claims fail to
    /// serialize (practically unreachable).
    pub fn issue(&self, sub: CustomerId, role: Role) -> Result<String, AuthError> {
        let claims = TokenClaims {
            sub,
            role,
            exp: (Utc::now() + Duration::days(self.ttl_days)).timestamp(),
        };
        let payload =
            serde_json::to_vec(&claims).map_err(|_| AuthError::MalformedCredential)?;
        let tag = self.mac()?.chain_update(&payload).finalize().into_bytes();

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(tag)
        ))
    }

    /// Verify a token's signature and expiry, returning its claims.
    ///
    /// # Errors
    ///
    /// Returns the matching `AuthError` for malformed input, a bad
    /// signature, or an expired token.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let (payload_b64, tag_b64) = token
            .split_once('.')
            .ok_or(AuthError::MalformedCredential)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::MalformedCredential)?;
        let tag = URL_SAFE_NO_PAD
            .decode(tag_b64)
            .map_err(|_| AuthError::MalformedCredential)?;

        // Constant-time comparison via the Mac verifier.
        self.mac()?
            .chain_update(&payload)
            .verify_slice(&tag)
            .map_err(|_| AuthError::InvalidSignature)?;

        let claims: TokenClaims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::MalformedCredential)?;

        if claims.exp < Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| AuthError::InvalidSignature)
    }
}

/// Verify a login password against its stored Argon2 hash.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Hash a password for storage (used by the seeding CLI).
///
/// # Errors
///
/// Returns a message if hashing fails.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| e.to_string())
}
