//! Credential hashing and signed-token primitives.
//!
//! Passwords are hashed with Argon2id in PHC string format (the salt lives
//! inside the string) and verified with the library's constant-time
//! comparison. Password-reset tokens are versioned HMAC-SHA256 envelopes,
//! `v1.<payload>.<sig>`, carrying the user id and expiry as base64 JSON;
//! verification fails closed on any malformed, tampered, or expired token.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use super::user::UserId;

type HmacSha256 = Hmac<Sha256>;

const RESET_TOKEN_VERSION: &str = "v1";

/// Number of random bytes behind an opaque API token.
const API_TOKEN_BYTES: usize = 32;

/// Errors raised while producing credential or token material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthCryptoError {
    /// The password could not be hashed.
    #[error("credential hashing failed: {message}")]
    Hashing {
        /// Library-provided failure description.
        message: String,
    },
    /// The token payload could not be encoded or signed.
    #[error("token signing failed: {message}")]
    Signing {
        /// Library-provided failure description.
        message: String,
    },
}

/// Salted password hashing with constant-time verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialHasher;

impl CredentialHasher {
    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthCryptoError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AuthCryptoError::Hashing {
                message: err.to_string(),
            })
    }

    /// Verify a password against a stored PHC hash string.
    ///
    /// A malformed stored hash verifies as false rather than erroring; the
    /// caller must never learn why authentication failed.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            debug!("stored credential hash failed to parse");
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Mint a fresh opaque API token.
pub fn mint_api_token() -> String {
    let mut bytes = [0u8; API_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[derive(Debug, Serialize, Deserialize)]
struct ResetClaims {
    user_id: i32,
    expires_at: i64,
}

/// Issues and verifies signed password-reset tokens.
#[derive(Clone)]
pub struct ResetTokenSigner {
    secret: Vec<u8>,
}

impl ResetTokenSigner {
    /// Create a signer over the application secret key.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issue a token for `user` that stops verifying at `expires_at`.
    pub fn issue(
        &self,
        user: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<String, AuthCryptoError> {
        let claims = ResetClaims {
            user_id: user.0,
            expires_at: expires_at.timestamp(),
        };
        let payload_bytes =
            serde_json::to_vec(&claims).map_err(|err| AuthCryptoError::Signing {
                message: err.to_string(),
            })?;
        let payload_part = URL_SAFE_NO_PAD.encode(payload_bytes);

        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(|err| {
            AuthCryptoError::Signing {
                message: err.to_string(),
            }
        })?;
        mac.update(payload_part.as_bytes());
        let sig_part = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{RESET_TOKEN_VERSION}.{payload_part}.{sig_part}"))
    }

    /// Verify a token, returning the embedded user id when the signature
    /// checks out and the expiry has not passed.
    ///
    /// Fails closed: any parsing, signature, or expiry failure yields
    /// `None`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Option<UserId> {
        let mut parts = token.split('.');
        let (version, payload_part, sig_part) =
            (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || version != RESET_TOKEN_VERSION {
            return None;
        }

        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(payload_part.as_bytes());
        let expected = URL_SAFE_NO_PAD.decode(sig_part).ok()?;
        mac.verify_slice(&expected).ok()?;

        let payload_bytes = URL_SAFE_NO_PAD.decode(payload_part).ok()?;
        let claims: ResetClaims = serde_json::from_slice(&payload_bytes).ok()?;
        if claims.expires_at <= now.timestamp() {
            return None;
        }
        Some(UserId(claims.user_id))
    }
}
