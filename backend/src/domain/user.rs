//! User identity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Validation errors returned by the user newtype constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Username is empty once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Username exceeds the storage bound.
    #[error("username must be at most {max} characters")]
    UsernameTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Username contains whitespace.
    #[error("username must not contain whitespace")]
    UsernameContainsWhitespace,
    /// Email is empty once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Email exceeds the storage bound.
    #[error("email must be at most {max} characters")]
    EmailTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Email is not of the `local@domain` shape.
    #[error("email must contain a local part and a domain")]
    MalformedEmail,
}

/// Stable numeric user identifier assigned by storage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(pub i32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum username length in characters.
pub const USERNAME_MAX: usize = 64;
/// Maximum email length in characters.
pub const EMAIL_MAX: usize = 120;

/// Unique handle a user registers and signs in with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if username.chars().any(char::is_whitespace) {
            return Err(UserValidationError::UsernameContainsWhitespace);
        }
        if username.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        Ok(Self(username))
    }

    /// Borrow the handle as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unique contact address for a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if email.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => return Err(UserValidationError::MalformedEmail),
        }
        Ok(Self(email))
    }

    /// Borrow the address as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Registered application user.
///
/// Credential and token material lives behind the identity service and its
/// repository port; this aggregate only carries what other components may
/// read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable identifier assigned by storage.
    pub id: UserId,
    /// Unique handle.
    pub username: Username,
    /// Unique contact address.
    pub email: Email,
    /// Free-form profile text.
    pub about_me: Option<String>,
    /// Last time the serving layer saw this user.
    pub last_seen: Option<DateTime<Utc>>,
    /// Watermark for the unread direct-message counter.
    pub last_message_read_time: Option<DateTime<Utc>>,
}
