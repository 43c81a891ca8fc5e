use std::fmt::Display;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Catalog identifier for a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A product as returned to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub product_id: ProductId,
    pub title: String,
    pub category: String,
    pub tags: String,
    pub popularity_score: f64,
    /// Normalized category + tags text used by the similarity index
    #[serde(skip)]
    pub content_features: String,
}

impl Product {
    /// Creates a product and derives its content features
    pub fn new(
        product_id: ProductId,
        title: impl Into<String>,
        category: impl Into<String>,
        tags: impl Into<String>,
        popularity_score: f64,
    ) -> Self {
        let category = category.into();
        let tags = tags.into();
        let content_features = content_features(&category, &tags);

        Self {
            product_id,
            title: title.into(),
            category,
            tags,
            popularity_score,
            content_features,
        }
    }
}

fn punctuation() -> &'static Regex {
    static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
    PUNCTUATION.get_or_init(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"))
}

/// Lower-cases `category tags`, blanks out punctuation and collapses whitespace
pub fn content_features(category: &str, tags: &str) -> String {
    let raw = format!("{} {}", category, tags).to_lowercase();
    punctuation()
        .replace_all(&raw, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
