use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt::Display};

/// Catalog identifier for a user (e.g., "U001")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog user with their category preference and interests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub user_id: UserId,
    pub category_preference: String,
    pub interests: BTreeSet<String>,
}

impl User {
    /// Creates a user, parsing a comma-separated interests string
    pub fn new(user_id: UserId, category_preference: impl Into<String>, interests: &str) -> Self {
        Self {
            user_id,
            category_preference: category_preference.into(),
            interests: parse_interests(interests),
        }
    }
}

/// Splits a comma-separated interests string into a set of trimmed tags
pub fn parse_interests(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
