use chrono::{DateTime, Utc};
use serde::Serialize;

mod catalog;
mod interaction;
mod product;
mod strategy;
mod user;

pub use catalog::Catalog;
pub use interaction::Interactions;
pub use product::{content_features, Product, ProductId};
pub use strategy::Strategy;
pub use user::{parse_interests, User, UserId};

/// Products split by the user's preferred category, each sorted by popularity
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CatalogSplit {
    pub category_products: Vec<Product>,
    pub other_products: Vec<Product>,
}

/// A ranking and the likes it was computed against
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserRecommendations {
    pub recommendations: Vec<Product>,
    pub user_likes: Vec<ProductId>,
}

/// Read-only aggregate over the catalog and the interaction relation
#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub total_users: usize,
    pub total_products: usize,
    pub total_interactions: usize,
    pub top_products: Vec<ProductLikes>,
    pub generated_at: DateTime<Utc>,
}

/// Like count for a single product
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductLikes {
    pub product_id: ProductId,
    pub title: String,
    pub category: String,
    pub likes: usize,
}
