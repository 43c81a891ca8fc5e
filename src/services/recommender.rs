use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    db::InteractionStore,
    error::{AppError, AppResult},
    models::{
        Analytics, Catalog, CatalogSplit, Interactions, Product, ProductId, ProductLikes,
        Strategy, User, UserId, UserRecommendations,
    },
};

use super::scoring::Scorer;
use super::similarity::SimilarityIndex;

/// Products listed in the analytics snapshot
const TOP_LIKED: usize = 10;

/// Recommendation engine shared by all request handlers
///
/// The catalog and the similarity index never change after construction.
/// The interaction relation sits behind a single lock: readers score against
/// a consistent snapshot, writers hold the lock across mutate and persist.
pub struct Recommender {
    catalog: Catalog,
    similarity: SimilarityIndex,
    interactions: RwLock<Interactions>,
    store: Arc<dyn InteractionStore>,
}

impl Recommender {
    /// Builds the engine around already loaded interactions
    pub fn new(catalog: Catalog, interactions: Interactions, store: Arc<dyn InteractionStore>) -> Self {
        let similarity = SimilarityIndex::build(catalog.products());
        Self {
            catalog,
            similarity,
            interactions: RwLock::new(interactions),
            store,
        }
    }

    /// Loads the persisted interactions from `store` and builds the engine
    pub async fn load(catalog: Catalog, store: Arc<dyn InteractionStore>) -> AppResult<Self> {
        let interactions = store.load().await?;

        let stale = interactions
            .iter()
            .flat_map(|(_, products)| products.iter())
            .filter(|&&product_id| catalog.product(product_id).is_none())
            .count();
        if stale > 0 {
            tracing::warn!(
                stale,
                store = store.name(),
                "Interactions reference products missing from the catalog"
            );
        }

        Ok(Self::new(catalog, interactions, store))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn user(&self, user_id: &UserId) -> AppResult<&User> {
        self.catalog
            .user(user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    fn products_at(&self, positions: Vec<usize>) -> Vec<Product> {
        let products = self.catalog.products();
        positions
            .into_iter()
            .map(|position| products[position].clone())
            .collect()
    }

    /// Top `top_n` products for a user under `strategy`
    pub async fn recommend(
        &self,
        user_id: &UserId,
        strategy: Strategy,
        top_n: usize,
    ) -> AppResult<Vec<Product>> {
        Ok(self
            .recommend_with_likes(user_id, strategy, top_n)
            .await?
            .recommendations)
    }

    /// Top `top_n` products together with the user's likes, both read from
    /// the same interaction snapshot
    pub async fn recommend_with_likes(
        &self,
        user_id: &UserId,
        strategy: Strategy,
        top_n: usize,
    ) -> AppResult<UserRecommendations> {
        let user = self.user(user_id)?;

        let (positions, user_likes) = {
            let interactions = self.interactions.read().await;
            let positions = Scorer::new(&self.catalog, &self.similarity, &interactions)
                .rank(user, strategy, top_n);
            let user_likes: Vec<ProductId> = interactions
                .get(user_id)
                .map(|liked| liked.iter().copied().collect())
                .unwrap_or_default();
            (positions, user_likes)
        };

        tracing::debug!(
            user_id = %user_id,
            strategy = %strategy,
            top_n,
            returned = positions.len(),
            "Recommendations ranked"
        );

        Ok(UserRecommendations {
            recommendations: self.products_at(positions),
            user_likes,
        })
    }

    /// Records that a user likes a product and persists the whole relation
    ///
    /// Returns whether the like was new. A failed write undoes the insert.
    pub async fn add_interaction(&self, user_id: &UserId, product_id: ProductId) -> AppResult<bool> {
        self.user(user_id)?;
        if self.catalog.product(product_id).is_none() {
            return Err(AppError::NotFound(format!("Product {} not found", product_id)));
        }

        let mut interactions = self.interactions.write().await;
        let inserted = interactions.add(user_id.clone(), product_id);

        if let Err(e) = self.store.save(&interactions).await {
            if inserted {
                interactions.remove(user_id, product_id);
            }
            tracing::error!(
                error = %e,
                user_id = %user_id,
                product_id = %product_id,
                store = self.store.name(),
                "Failed to persist interaction"
            );
            return Err(e);
        }

        tracing::info!(
            user_id = %user_id,
            product_id = %product_id,
            inserted,
            "Interaction recorded"
        );

        Ok(inserted)
    }

    /// Product ids the user liked, ascending
    pub async fn user_likes(&self, user_id: &UserId) -> AppResult<Vec<ProductId>> {
        self.user(user_id)?;
        let interactions = self.interactions.read().await;
        Ok(interactions
            .get(user_id)
            .map(|liked| liked.iter().copied().collect())
            .unwrap_or_default())
    }

    /// Most popular products inside and outside the user's preferred category
    pub fn catalog_split(&self, user_id: &UserId, top_n: usize) -> AppResult<CatalogSplit> {
        let user = self.user(user_id)?;
        let category = &user.category_preference;

        let mut inside = self.catalog.popular_in_category(category);
        inside.truncate(top_n);
        let mut outside = self.catalog.popular_outside_category(category);
        outside.truncate(top_n);

        Ok(CatalogSplit {
            category_products: self.products_at(inside),
            other_products: self.products_at(outside),
        })
    }

    /// Totals and the most liked catalog products
    pub async fn analytics(&self) -> Analytics {
        let interactions = self.interactions.read().await;

        let mut counts: BTreeMap<ProductId, usize> = BTreeMap::new();
        for (_, liked) in interactions.iter() {
            for &product_id in liked {
                *counts.entry(product_id).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(ProductId, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let top_products = ranked
            .into_iter()
            .filter_map(|(product_id, likes)| {
                self.catalog.product(product_id).map(|product| ProductLikes {
                    product_id,
                    title: product.title.clone(),
                    category: product.category.clone(),
                    likes,
                })
            })
            .take(TOP_LIKED)
            .collect();

        Analytics {
            total_users: self.catalog.users().len(),
            total_products: self.catalog.products().len(),
            total_interactions: interactions.total(),
            top_products,
            generated_at: Utc::now(),
        }
    }
}
