//! Core user domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A newtype wrapper for the opaque user IDs assigned by the identity provider.
///
/// This helps disambiguate user IDs from other strings, leading to better
/// compile time errors, and keeps queries from accidentally mixing up the
/// owner column with free text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(String);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the user ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What a user is allowed to do in the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May manage their own transactions only.
    User,
    /// May additionally manage users, categories, and all transactions.
    Admin,
}

impl Role {
    /// The lowercase tag stored in the role column.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Read a role back from its stored tag.
    ///
    /// Unknown tags read as [Role::User] so that a bad row can never grant
    /// admin access.
    pub fn from_db(tag: &str) -> Self {
        match tag {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user of the application, mirrored from the identity provider.
///
/// Rows are created lazily the first time a user records a transaction and
/// refreshed from the session identity on each create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The opaque ID assigned by the identity provider.
    pub id: UserId,
    /// The email address on the profile.
    pub email: String,
    /// The first name on the profile, if any.
    pub first_name: Option<String>,
    /// The last name on the profile, if any.
    pub last_name: Option<String>,
    /// What the user is allowed to do.
    pub role: Role,
    /// When the row was created, as recorded by the store.
    pub created_at: String,
    /// When the row was last updated, as recorded by the store.
    pub updated_at: String,
}
