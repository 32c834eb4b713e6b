//! Status post model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::search::Searchable;
use super::user::UserId;

/// Maximum post body length in characters.
pub const POST_BODY_MAX: usize = 140;

/// Validation errors returned by [`PostBody::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostValidationError {
    /// Body is empty once trimmed.
    #[error("post body must not be empty")]
    EmptyBody,
    /// Body exceeds the storage bound.
    #[error("post body must be at most {max} characters")]
    BodyTooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// Stable numeric post identifier assigned by storage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PostId(pub i32);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bounded status text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostBody(String);

impl PostBody {
    /// Validate and construct a [`PostBody`].
    pub fn new(body: impl Into<String>) -> Result<Self, PostValidationError> {
        let body = body.into();
        if body.trim().is_empty() {
            return Err(PostValidationError::EmptyBody);
        }
        if body.chars().count() > POST_BODY_MAX {
            return Err(PostValidationError::BodyTooLong { max: POST_BODY_MAX });
        }
        Ok(Self(body))
    }

    /// Borrow the text as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PostBody {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for PostBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<PostBody> for String {
    fn from(value: PostBody) -> Self {
        value.0
    }
}

impl TryFrom<String> for PostBody {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A published status post.
///
/// Posts are immutable after creation; only cascading user deletion removes
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Stable identifier assigned by storage.
    pub id: PostId,
    /// Author of the post.
    pub author: UserId,
    /// Bounded status text.
    pub body: PostBody,
    /// Creation time, the feed ordering key.
    pub timestamp: DateTime<Utc>,
    /// Detected language code, when detection ran.
    pub language: Option<String>,
}

impl Searchable for Post {
    const TABLE: &'static str = "posts";

    fn search_id(&self) -> i32 {
        self.id.0
    }

    fn search_fields(&self) -> Vec<(String, String)> {
        vec![("body".to_owned(), self.body.as_str().to_owned())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("  \n ")]
    fn body_rejects_blank(#[case] raw: &str) {
        let err = PostBody::new(raw).expect_err("blank rejected");
        assert_eq!(err, PostValidationError::EmptyBody);
    }

    #[rstest]
    fn body_rejects_overlong() {
        let err = PostBody::new("x".repeat(POST_BODY_MAX + 1)).expect_err("overlong rejected");
        assert_eq!(err, PostValidationError::BodyTooLong { max: POST_BODY_MAX });
    }

    #[rstest]
    fn body_counts_characters_not_bytes() {
        let body = PostBody::new("é".repeat(POST_BODY_MAX)).expect("multibyte fits");
        assert_eq!(body.as_str().chars().count(), POST_BODY_MAX);
    }
}
