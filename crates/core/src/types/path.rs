//! Storage object path type.
//!
//! Every photo object lives in the storage bucket under the owning user's
//! namespace: `{user_id}/{object_name}.{ext}`. The owner prefix is what the
//! account-deletion flow lists and removes in bulk, so paths that do not
//! follow this shape must never be written.

use core::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::id::UserId;

/// Errors that can occur when parsing a [`StoragePath`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum StoragePathError {
    /// The input string is empty.
    #[error("storage path cannot be empty")]
    Empty,
    /// The path has no `/` separating owner prefix from object name.
    #[error("storage path must be of the form {{user_id}}/{{object}}")]
    MissingSeparator,
    /// The owner prefix is not a valid user UUID.
    #[error("storage path owner prefix is not a valid user id: {0}")]
    InvalidOwner(uuid::Error),
    /// The object name (after the owner prefix) is empty.
    #[error("storage path object name cannot be empty")]
    EmptyObjectName,
}

/// Path of one photo object in the storage bucket.
///
/// Invariant: the first path segment is the hyphenated UUID of the owning
/// user. [`StoragePath::for_user`] is the only way uploads mint new paths,
/// which keeps the owner-prefix invariant by construction.
///
/// ## Examples
///
/// ```
/// use photoload_core::{StoragePath, UserId};
///
/// let user = UserId::new();
/// let path = StoragePath::for_user(user, "jpg");
/// assert_eq!(path.owner(), user);
/// assert!(path.as_str().ends_with(".jpg"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct StoragePath(String);

impl TryFrom<String> for StoragePath {
    type Error = StoragePathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<StoragePath> for String {
    fn from(path: StoragePath) -> Self {
        path.0
    }
}

impl StoragePath {
    /// Mint a fresh path under the user's namespace with a random object
    /// name and the given file extension.
    #[must_use]
    pub fn for_user(owner: UserId, extension: &str) -> Self {
        Self(format!("{owner}/{}.{extension}", Uuid::new_v4()))
    }

    /// Parse a `StoragePath` from its string form, validating the owner
    /// prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, has no `/`, has an owner
    /// prefix that is not a UUID, or an empty object name.
    pub fn parse(s: &str) -> Result<Self, StoragePathError> {
        if s.is_empty() {
            return Err(StoragePathError::Empty);
        }

        let (owner, object) = s.split_once('/').ok_or(StoragePathError::MissingSeparator)?;

        UserId::parse(owner).map_err(StoragePathError::InvalidOwner)?;

        if object.is_empty() {
            return Err(StoragePathError::EmptyObjectName);
        }

        Ok(Self(s.to_owned()))
    }

    /// The owning user, taken from the path prefix.
    ///
    /// # Panics
    ///
    /// Never panics for values produced by `for_user`/`parse`; the owner
    /// prefix is validated at construction.
    #[must_use]
    pub fn owner(&self) -> UserId {
        self.0
            .split_once('/')
            .and_then(|(owner, _)| UserId::parse(owner).ok())
            .unwrap_or_else(|| unreachable!("owner prefix validated at construction"))
    }

    /// The object name after the owner prefix.
    #[must_use]
    pub fn object_name(&self) -> &str {
        self.0.split_once('/').map_or("", |(_, object)| object)
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `StoragePath` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StoragePath {
    type Err = StoragePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for StoragePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_for_user_shape() {
        let user = UserId::new();
        let path = StoragePath::for_user(user, "png");
        assert!(path.as_str().starts_with(&format!("{user}/")));
        assert!(path.as_str().ends_with(".png"));
        assert_eq!(path.owner(), user);
    }

    #[test]
    fn test_for_user_paths_are_unique() {
        let user = UserId::new();
        let a = StoragePath::for_user(user, "jpg");
        let b = StoragePath::for_user(user, "jpg");
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_valid() {
        let user = UserId::new();
        let raw = format!("{user}/abc.jpg");
        let path = StoragePath::parse(&raw).unwrap();
        assert_eq!(path.owner(), user);
        assert_eq!(path.object_name(), "abc.jpg");
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(StoragePath::parse(""), Err(StoragePathError::Empty)));
    }

    #[test]
    fn test_parse_missing_separator() {
        assert!(matches!(
            StoragePath::parse("no-slash-here"),
            Err(StoragePathError::MissingSeparator)
        ));
    }

    #[test]
    fn test_parse_bad_owner() {
        assert!(matches!(
            StoragePath::parse("not-a-uuid/photo.jpg"),
            Err(StoragePathError::InvalidOwner(_))
        ));
    }

    #[test]
    fn test_parse_empty_object() {
        let user = UserId::new();
        assert!(matches!(
            StoragePath::parse(&format!("{user}/")),
            Err(StoragePathError::EmptyObjectName)
        ));
    }
}
