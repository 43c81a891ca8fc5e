use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{ProductId, UserId};

/// The "user likes product" relation
///
/// Ordered maps keep every scan over users and products deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Interactions {
    likes: BTreeMap<UserId, BTreeSet<ProductId>>,
}

impl Interactions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a like. Returns false if the pair was already present.
    pub fn add(&mut self, user_id: UserId, product_id: ProductId) -> bool {
        self.likes.entry(user_id).or_default().insert(product_id)
    }

    /// Undoes a like recorded by [`Interactions::add`], dropping the user
    /// entry again if it is left empty
    pub fn remove(&mut self, user_id: &UserId, product_id: ProductId) {
        if let Some(products) = self.likes.get_mut(user_id) {
            products.remove(&product_id);
            if products.is_empty() {
                self.likes.remove(user_id);
            }
        }
    }

    /// Liked products of a user, `None` if the user has no interaction record
    pub fn get(&self, user_id: &UserId) -> Option<&BTreeSet<ProductId>> {
        self.likes.get(user_id)
    }

    #[cfg(test)]
    fn contains(&self, user_id: &UserId, product_id: ProductId) -> bool {
        self.likes
            .get(user_id)
            .is_some_and(|products| products.contains(&product_id))
    }

    /// Users with an interaction record, in id order
    pub fn users(&self) -> impl Iterator<Item = &UserId> {
        self.likes.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &BTreeSet<ProductId>)> {
        self.likes.iter()
    }

    /// Number of users with an interaction record
    pub fn user_count(&self) -> usize {
        self.likes.len()
    }

    /// Total number of (user, product) likes
    pub fn total(&self) -> usize {
        self.likes.values().map(BTreeSet::len).sum()
    }
}

impl FromIterator<(UserId, ProductId)> for Interactions {
    fn from_iter<I: IntoIterator<Item = (UserId, ProductId)>>(iter: I) -> Self {
        let mut interactions = Interactions::new();
        for (user_id, product_id) in iter {
            interactions.add(user_id, product_id);
        }
        interactions
    }
}
