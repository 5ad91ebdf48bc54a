//! User model returned by the account search endpoint

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric or string user id; older Memos releases serialize it as a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => write!(f, "{}", id.trim()),
        }
    }
}

/// A user account on the remote instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
}

impl User {
    /// Account reference used by the memo listing filter, e.g. `users/1`.
    #[must_use]
    pub fn account_ref(&self) -> String {
        let id = self.id.to_string();
        if id.starts_with("users/") {
            id
        } else {
            format!("users/{id}")
        }
    }
}

/// Result of `users:search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSearch {
    #[serde(default)]
    pub users: Vec<User>,
}
