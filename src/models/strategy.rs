use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

/// Scoring strategy used to rank products for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Most popular products in the user's preferred category
    Basic,
    /// Products whose content resembles what the user already liked
    Content,
    /// Products liked by users with similar likes and interests
    Collaborative,
    /// Rank fusion of the three strategies above
    Hybrid,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Basic => "basic",
            Strategy::Content => "content",
            Strategy::Collaborative => "collaborative",
            Strategy::Hybrid => "hybrid",
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Strategy::Basic),
            "content" => Ok(Strategy::Content),
            "collaborative" => Ok(Strategy::Collaborative),
            "hybrid" => Ok(Strategy::Hybrid),
            other => Err(AppError::InvalidInput(format!(
                "Unknown strategy '{}', expected one of basic, content, collaborative, hybrid",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("hybrid".parse::<Strategy>().unwrap(), Strategy::Hybrid);
        assert_eq!("content".parse::<Strategy>().unwrap(), Strategy::Content);
        assert!(matches!(
            "popular".parse::<Strategy>(),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_strategy_serialization() {
        let json = serde_json::to_string(&Strategy::Collaborative).unwrap();
        assert_eq!(json, "\"collaborative\"");
        assert_eq!(Strategy::Basic.to_string(), "basic");
    }
}
