use std::collections::HashMap;

use super::{Product, ProductId, User, UserId};

/// Immutable user and product tables loaded at startup
///
/// Products keep their load order for the lifetime of the catalog. The
/// similarity index addresses products by position, so rankings sort index
/// vectors and never reorder `products` itself.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    users: Vec<User>,
    products: Vec<Product>,
    user_index: HashMap<UserId, usize>,
    product_index: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Builds the catalog. Rows with a duplicate id are dropped (first wins).
    pub fn new(users: Vec<User>, products: Vec<Product>) -> Self {
        let mut catalog = Self::default();

        for user in users {
            if catalog.user_index.contains_key(&user.user_id) {
                tracing::warn!(user_id = %user.user_id, "Duplicate user id in catalog, keeping first");
                continue;
            }
            catalog.user_index.insert(user.user_id.clone(), catalog.users.len());
            catalog.users.push(user);
        }

        for product in products {
            if catalog.product_index.contains_key(&product.product_id) {
                tracing::warn!(product_id = %product.product_id, "Duplicate product id in catalog, keeping first");
                continue;
            }
            catalog
                .product_index
                .insert(product.product_id, catalog.products.len());
            catalog.products.push(product);
        }

        catalog
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn user(&self, user_id: &UserId) -> Option<&User> {
        self.user_index.get(user_id).map(|&idx| &self.users[idx])
    }

    pub fn product(&self, product_id: ProductId) -> Option<&Product> {
        self.product_index
            .get(&product_id)
            .map(|&idx| &self.products[idx])
    }

    /// Row position of a product, `None` for ids not in the catalog
    pub fn product_position(&self, product_id: ProductId) -> Option<usize> {
        self.product_index.get(&product_id).copied()
    }

    /// Positions of products in `category`, by popularity descending.
    /// Ties keep catalog order.
    pub fn popular_in_category(&self, category: &str) -> Vec<usize> {
        self.popular_where(|product| product.category == category)
    }

    /// Positions of products outside `category`, by popularity descending
    pub fn popular_outside_category(&self, category: &str) -> Vec<usize> {
        self.popular_where(|product| product.category != category)
    }

    fn popular_where(&self, keep: impl Fn(&Product) -> bool) -> Vec<usize> {
        let mut positions: Vec<usize> = self
            .products
            .iter()
            .enumerate()
            .filter(|(_, product)| keep(product))
            .map(|(idx, _)| idx)
            .collect();

        // sort_by is stable, so equal scores stay in catalog order
        positions.sort_by(|&a, &b| {
            self.products[b]
                .popularity_score
                .total_cmp(&self.products[a].popularity_score)
        });
        positions
    }
}
