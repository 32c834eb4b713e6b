//! Identity service: registration, credentials, API tokens, password reset.
//!
//! Uniqueness of handles and addresses is validated check-then-act for
//! friendly messages, with the storage unique indexes as the concurrent
//! backstop; a constraint violation surfaces as the same validation error
//! after rollback. Credential checks never reveal whether the handle or
//! the password was wrong.

use std::sync::Arc;

use chrono::Duration;
use mockable::Clock;
use serde_json::json;
use tracing::info;
use zeroize::Zeroizing;

use super::auth::{AuthCryptoError, CredentialHasher, ResetTokenSigner, mint_api_token};
use super::error::Error;
use super::ports::{
    ApiTokenRecord, Mailer, NewUserRecord, OutboundMail, ProfileUpdate, UserRepository,
    UserStoreError,
};
use super::user::{Email, User, UserId, Username};

/// Lifetime of a freshly minted API token, in seconds.
const API_TOKEN_TTL_SECS: i64 = 3600;

/// An existing token with at least this long to live is reused rather than
/// replaced, so concurrent clients do not churn each other's tokens.
const API_TOKEN_REUSE_GRACE_SECS: i64 = 60;

/// Lifetime of a password-reset token, in seconds.
const RESET_TOKEN_TTL_SECS: i64 = 600;

/// Application service for user identity.
pub struct IdentityService<U, M> {
    users: Arc<U>,
    mailer: Arc<M>,
    clock: Arc<dyn Clock>,
    hasher: CredentialHasher,
    signer: ResetTokenSigner,
    reset_sender: String,
}

impl<U, M> IdentityService<U, M>
where
    U: UserRepository,
    M: Mailer,
{
    /// Create the service over its collaborators.
    ///
    /// `secret` keys the password-reset token signatures; `reset_sender` is
    /// the from-address on reset emails.
    pub fn new(
        users: Arc<U>,
        mailer: Arc<M>,
        clock: Arc<dyn Clock>,
        secret: impl Into<Vec<u8>>,
        reset_sender: impl Into<String>,
    ) -> Self {
        Self {
            users,
            mailer,
            clock,
            hasher: CredentialHasher,
            signer: ResetTokenSigner::new(secret),
            reset_sender: reset_sender.into(),
        }
    }

    /// Register a new user with a unique handle and address.
    pub fn register(
        &self,
        username: Username,
        email: Email,
        password: Zeroizing<String>,
    ) -> Result<User, Error> {
        if self.users.find_by_username(username.as_str())?.is_some() {
            return Err(duplicate_field_error("username"));
        }
        if self.users.find_by_email(email.as_str())?.is_some() {
            return Err(duplicate_field_error("email"));
        }

        let password_hash = self.hash_password(&password)?;
        let record = NewUserRecord {
            username,
            email,
            password_hash,
        };
        let user = match self.users.insert(&record) {
            Ok(user) => user,
            // Lost the race with a concurrent registration; report it the
            // same way the pre-check would have.
            Err(UserStoreError::Duplicate { field }) => return Err(duplicate_field_error(field)),
            Err(err) => return Err(err.into()),
        };
        info!(user = %user.id, username = %user.username, "registered new user");
        Ok(user)
    }

    /// Check a handle and password pair.
    ///
    /// Returns the user on success and `None` on any failure; callers never
    /// learn whether the handle or the password was wrong.
    pub fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, Error> {
        let Some(user) = self.users.find_by_username(username)? else {
            return Ok(None);
        };
        let Some(stored_hash) = self.users.password_hash(user.id)? else {
            return Ok(None);
        };
        if self.hasher.verify(password, &stored_hash) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Replace the user's password.
    pub fn change_password(
        &self,
        user: UserId,
        password: Zeroizing<String>,
    ) -> Result<(), Error> {
        let hash = self.hash_password(&password)?;
        self.users.set_password_hash(user, &hash)?;
        Ok(())
    }

    /// Apply a partial profile update, enforcing handle uniqueness when the
    /// handle changes.
    pub fn update_profile(&self, user: UserId, update: &ProfileUpdate) -> Result<User, Error> {
        if let Some(username) = &update.username
            && let Some(existing) = self.users.find_by_username(username.as_str())?
            && existing.id != user
        {
            return Err(duplicate_field_error("username"));
        }
        match self.users.update_profile(user, update) {
            Ok(user) => Ok(user),
            Err(UserStoreError::Duplicate { field }) => Err(duplicate_field_error(field)),
            Err(err) => Err(err.into()),
        }
    }

    /// Issue an API token for the user, reusing the current one while it
    /// still has a comfortable margin before expiry.
    pub fn issue_api_token(&self, user: UserId) -> Result<ApiTokenRecord, Error> {
        let now = self.clock.utc();
        if let Some(current) = self.users.api_token(user)?
            && current.expires_at > now + Duration::seconds(API_TOKEN_REUSE_GRACE_SECS)
        {
            return Ok(current);
        }

        let record = ApiTokenRecord {
            token: mint_api_token(),
            expires_at: now + Duration::seconds(API_TOKEN_TTL_SECS),
        };
        self.users
            .store_api_token(user, &record.token, record.expires_at)?;
        Ok(record)
    }

    /// Invalidate the user's current API token immediately.
    pub fn revoke_api_token(&self, user: UserId) -> Result<(), Error> {
        let Some(current) = self.users.api_token(user)? else {
            return Ok(());
        };
        let expired_at = self.clock.utc() - Duration::seconds(1);
        self.users.store_api_token(user, &current.token, expired_at)?;
        Ok(())
    }

    /// Resolve a bearer token to its user.
    ///
    /// Fails closed: unknown and expired tokens both yield `None`.
    pub fn check_token(&self, token: &str) -> Result<Option<User>, Error> {
        let Some((user, expires_at)) = self.users.find_by_api_token(token)? else {
            return Ok(None);
        };
        if expires_at <= self.clock.utc() {
            return Ok(None);
        }
        Ok(Some(user))
    }

    /// Record request activity for the user.
    pub fn touch_last_seen(&self, user: UserId) -> Result<(), Error> {
        self.users.touch_last_seen(user, self.clock.utc())?;
        Ok(())
    }

    /// Start a password reset for the address, when it belongs to a user.
    ///
    /// An unknown address succeeds silently so the endpoint cannot be used
    /// to probe which addresses are registered.
    pub fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        let Some(user) = self.users.find_by_email(email)? else {
            return Ok(());
        };

        let token = self.issue_password_reset_token(user.id)?;
        let mail = OutboundMail {
            subject: "Reset your password".to_owned(),
            sender: self.reset_sender.clone(),
            recipients: vec![user.email.to_string()],
            text_body: format!(
                "Dear {},\n\nTo reset your password, submit this token with \
                 your new password:\n\n{token}\n\nIf you have not requested \
                 a password reset, simply ignore this message.",
                user.username
            ),
            html_body: None,
        };
        self.mailer.send(mail)?;
        info!(user = %user.id, "sent password reset email");
        Ok(())
    }

    /// Issue a signed password-reset token for the user.
    pub fn issue_password_reset_token(&self, user: UserId) -> Result<String, Error> {
        let expires_at = self.clock.utc() + Duration::seconds(RESET_TOKEN_TTL_SECS);
        self.signer
            .issue(user, expires_at)
            .map_err(crypto_error)
    }

    /// Resolve a password-reset token to its user when the signature checks
    /// out and the token has not expired.
    pub fn verify_password_reset_token(&self, token: &str) -> Option<UserId> {
        self.signer.verify(token, self.clock.utc())
    }

    /// Complete a password reset.
    pub fn reset_password(
        &self,
        token: &str,
        password: Zeroizing<String>,
    ) -> Result<User, Error> {
        let Some(user_id) = self.verify_password_reset_token(token) else {
            return Err(Error::invalid_request(
                "password reset token is invalid or expired",
            ));
        };
        let Some(user) = self.users.find_by_id(user_id)? else {
            return Err(Error::invalid_request(
                "password reset token is invalid or expired",
            ));
        };

        let hash = self.hash_password(&password)?;
        self.users.set_password_hash(user.id, &hash)?;
        info!(user = %user.id, "password reset completed");
        Ok(user)
    }

    fn hash_password(&self, password: &str) -> Result<String, Error> {
        self.hasher.hash(password).map_err(crypto_error)
    }
}

fn duplicate_field_error(field: &str) -> Error {
    Error::invalid_request(format!("{field} is already taken"))
        .with_details(json!({ "field": field }))
}

fn crypto_error(err: AuthCryptoError) -> Error {
    Error::internal(err.to_string())
}
