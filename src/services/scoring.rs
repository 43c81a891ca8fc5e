use std::collections::{BTreeSet, HashMap};

use crate::models::{Catalog, Interactions, ProductId, Strategy, User, UserId};

use super::fusion::fuse_rankings;
use super::similarity::SimilarityIndex;

/// Weight of like-history cosine in the combined user similarity
const INTERACTION_WEIGHT: f64 = 0.7;
/// Weight of interest overlap in the combined user similarity
const INTEREST_WEIGHT: f64 = 0.3;
/// Neighbours consulted by the collaborative strategy
const NEIGHBOURS: usize = 5;

const COLLABORATIVE_FUSION_WEIGHT: f64 = 0.6;
const CONTENT_FUSION_WEIGHT: f64 = 0.3;
const BASIC_FUSION_WEIGHT: f64 = 0.1;

/// Ranks catalog products for a user against one consistent snapshot of
/// the catalog, the similarity index and the interaction relation
///
/// Every ranking is a list of catalog positions, best first.
pub struct Scorer<'a> {
    catalog: &'a Catalog,
    similarity: &'a SimilarityIndex,
    interactions: &'a Interactions,
}

impl<'a> Scorer<'a> {
    pub fn new(
        catalog: &'a Catalog,
        similarity: &'a SimilarityIndex,
        interactions: &'a Interactions,
    ) -> Self {
        Self {
            catalog,
            similarity,
            interactions,
        }
    }

    /// Dispatches to the handler for `strategy`
    pub fn rank(&self, user: &User, strategy: Strategy, top_n: usize) -> Vec<usize> {
        match strategy {
            Strategy::Basic => self.basic(user, top_n),
            Strategy::Content => self.content_based(user, top_n),
            Strategy::Collaborative => self.collaborative(user, top_n),
            Strategy::Hybrid => self.hybrid(user, top_n),
        }
    }

    /// Most popular products in the user's preferred category
    pub fn basic(&self, user: &User, top_n: usize) -> Vec<usize> {
        let mut ranked = self.catalog.popular_in_category(&user.category_preference);
        ranked.truncate(top_n);
        ranked
    }

    /// Products most similar, on average, to the ones the user liked
    pub fn content_based(&self, user: &User, top_n: usize) -> Vec<usize> {
        let liked = match self.interactions.get(&user.user_id) {
            Some(liked) if !liked.is_empty() => liked,
            _ => {
                log_substitution(&user.user_id, Strategy::Content, Strategy::Basic, "no likes");
                return self.basic(user, top_n);
            }
        };

        let liked_positions: Vec<usize> = liked
            .iter()
            .filter_map(|&product_id| self.catalog.product_position(product_id))
            .collect();

        if liked_positions.is_empty() {
            log_substitution(
                &user.user_id,
                Strategy::Content,
                Strategy::Basic,
                "no liked product in catalog",
            );
            return self.basic(user, top_n);
        }

        let mut scores = vec![0.0; self.similarity.product_count()];
        for &position in &liked_positions {
            for (score, similarity) in scores.iter_mut().zip(self.similarity.row(position)) {
                *score += similarity;
            }
        }
        let count = liked_positions.len() as f64;
        for score in scores.iter_mut() {
            *score /= count;
        }

        let mut ranked: Vec<usize> = (0..scores.len()).collect();
        ranked.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let products = self.catalog.products();
        ranked
            .into_iter()
            .filter(|&position| !liked.contains(&products[position].product_id))
            .take(top_n)
            .collect()
    }

    /// Products liked by the users most similar in likes and interests
    pub fn collaborative(&self, user: &User, top_n: usize) -> Vec<usize> {
        let Some(liked) = self.interactions.get(&user.user_id) else {
            log_substitution(&user.user_id, Strategy::Collaborative, Strategy::Basic, "no likes");
            return self.basic(user, top_n);
        };

        if self.interactions.user_count() < 2 {
            log_substitution(
                &user.user_id,
                Strategy::Collaborative,
                Strategy::Basic,
                "no other users with likes",
            );
            return self.basic_unliked(user, liked, top_n);
        }

        let users: Vec<&UserId> = self.interactions.users().collect();
        let rows: Vec<BTreeSet<usize>> = users
            .iter()
            .map(|user_id| self.interaction_row(user_id))
            .collect();
        let Some(target) = users.iter().position(|&user_id| *user_id == user.user_id) else {
            return self.basic_unliked(user, liked, top_n);
        };

        let similarities: Vec<f64> = users
            .iter()
            .zip(&rows)
            .map(|(&other_id, row)| {
                let interests = self
                    .catalog
                    .user(other_id)
                    .map(|other| jaccard(&user.interests, &other.interests))
                    .unwrap_or(0.0);
                INTERACTION_WEIGHT * binary_cosine(&rows[target], row) + INTEREST_WEIGHT * interests
            })
            .collect();

        let mut neighbours: Vec<usize> = (0..users.len()).filter(|&i| i != target).collect();
        neighbours.sort_by(|&a, &b| similarities[b].total_cmp(&similarities[a]));
        neighbours.truncate(NEIGHBOURS);

        let mut candidates: Vec<(usize, f64)> = Vec::new();
        let mut slots: HashMap<usize, usize> = HashMap::new();
        for &neighbour in &neighbours {
            let weight = similarities[neighbour];
            if weight <= 0.0 {
                continue;
            }
            for &position in &rows[neighbour] {
                let slot = *slots.entry(position).or_insert_with(|| {
                    candidates.push((position, 0.0));
                    candidates.len() - 1
                });
                candidates[slot].1 += weight;
            }
        }

        let products = self.catalog.products();
        candidates.retain(|&(position, _)| !liked.contains(&products[position].product_id));

        if candidates.is_empty() {
            log_substitution(
                &user.user_id,
                Strategy::Collaborative,
                Strategy::Content,
                "no unseen products from neighbours",
            );
            return self.content_based(user, top_n);
        }

        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
        let mut ranked: Vec<usize> = candidates
            .into_iter()
            .take(top_n)
            .map(|(position, _)| position)
            .collect();

        if ranked.len() < top_n {
            for position in self.content_based(user, top_n) {
                if ranked.len() >= top_n {
                    break;
                }
                if !ranked.contains(&position) {
                    ranked.push(position);
                }
            }
        }

        ranked
    }

    /// Rank fusion of the collaborative, content-based and basic rankings
    pub fn hybrid(&self, user: &User, top_n: usize) -> Vec<usize> {
        let collaborative = self.collaborative(user, top_n);
        let content = self.content_based(user, top_n);
        let basic = self.basic(user, top_n);

        fuse_rankings(
            &[
                (collaborative.as_slice(), COLLABORATIVE_FUSION_WEIGHT),
                (content.as_slice(), CONTENT_FUSION_WEIGHT),
                (basic.as_slice(), BASIC_FUSION_WEIGHT),
            ],
            top_n,
        )
    }

    fn basic_unliked(&self, user: &User, liked: &BTreeSet<ProductId>, top_n: usize) -> Vec<usize> {
        let products = self.catalog.products();
        self.catalog
            .popular_in_category(&user.category_preference)
            .into_iter()
            .filter(|&position| !liked.contains(&products[position].product_id))
            .take(top_n)
            .collect()
    }

    /// Catalog positions liked by a user; ids missing from the catalog are dropped
    fn interaction_row(&self, user_id: &UserId) -> BTreeSet<usize> {
        self.interactions
            .get(user_id)
            .map(|liked| {
                liked
                    .iter()
                    .filter_map(|&product_id| self.catalog.product_position(product_id))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn log_substitution(user_id: &UserId, from: Strategy, to: Strategy, reason: &str) {
    tracing::debug!(user_id = %user_id, from = %from, to = %to, reason, "Strategy substituted");
}

/// |a ∩ b| / |a ∪ b|, 0 when both sets are empty
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Cosine between two binary rows given as their sets of set columns
fn binary_cosine(a: &BTreeSet<usize>, b: &BTreeSet<usize>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count() as f64;
    shared / ((a.len() as f64).sqrt() * (b.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;

    fn interests(raw: &str) -> BTreeSet<String> {
        crate::models::parse_interests(raw)
    }

    fn product(id: u64, category: &str, tags: &str, popularity: f64) -> Product {
        Product::new(ProductId(id), format!("P{}", id), category, tags, popularity)
    }

    /// P1..P4 from the worked examples plus a few fillers
    fn catalog() -> Catalog {
        Catalog::new(
            vec![
                User::new(UserId::new("U1"), "Electronics", "Gaming,Music"),
                User::new(UserId::new("U2"), "Electronics", "Gaming"),
                User::new(UserId::new("U3"), "Books", "Reading"),
                User::new(UserId::new("U4"), "Toys", ""),
            ],
            vec![
                product(1, "Electronics", "audio headphones", 90.0),
                product(2, "Electronics", "paperback reader", 70.0),
                product(3, "Books", "paperback reader novel", 95.0),
                product(4, "Electronics", "gaming console", 60.0),
                product(5, "Toys", "lego bricks", 40.0),
            ],
        )
    }

    fn likes(pairs: &[(&str, u64)]) -> Interactions {
        pairs
            .iter()
            .map(|&(user, product)| (UserId::new(user), ProductId(product)))
            .collect()
    }

    fn ids(catalog: &Catalog, positions: &[usize]) -> Vec<u64> {
        positions
            .iter()
            .map(|&position| catalog.products()[position].product_id.0)
            .collect()
    }

    fn user(catalog: &Catalog, id: &str) -> User {
        catalog.user(&UserId::new(id)).unwrap().clone()
    }

    #[test]
    fn test_basic_by_popularity() {
        let catalog = catalog();
        let index = SimilarityIndex::build(catalog.products());
        let interactions = Interactions::new();
        let scorer = Scorer::new(&catalog, &index, &interactions);

        let ranked = scorer.basic(&user(&catalog, "U1"), 2);
        assert_eq!(ids(&catalog, &ranked), vec![1, 2]);
    }

    #[test]
    fn test_basic_empty_category() {
        let catalog = Catalog::new(
            vec![User::new(UserId::new("U1"), "Garden", "")],
            vec![product(1, "Books", "novel", 1.0)],
        );
        let index = SimilarityIndex::build(catalog.products());
        let interactions = Interactions::new();
        let scorer = Scorer::new(&catalog, &index, &interactions);

        assert!(scorer.basic(&user(&catalog, "U1"), 5).is_empty());
    }

    #[test]
    fn test_content_based_excludes_liked() {
        let catalog = catalog();
        let index = SimilarityIndex::build(catalog.products());
        let interactions = likes(&[("U1", 3)]);
        let scorer = Scorer::new(&catalog, &index, &interactions);

        let ranked = scorer.content_based(&user(&catalog, "U1"), 1);
        assert_eq!(ids(&catalog, &ranked), vec![2]);
    }

    #[test]
    fn test_content_based_without_likes_matches_basic() {
        let catalog = catalog();
        let index = SimilarityIndex::build(catalog.products());
        let interactions = likes(&[("U2", 1)]);
        let scorer = Scorer::new(&catalog, &index, &interactions);
        let u1 = user(&catalog, "U1");

        for top_n in 0..6 {
            assert_eq!(scorer.content_based(&u1, top_n), scorer.basic(&u1, top_n));
        }
    }

    #[test]
    fn test_content_based_only_stale_likes_falls_back() {
        let catalog = catalog();
        let index = SimilarityIndex::build(catalog.products());
        let interactions = likes(&[("U1", 99)]);
        let scorer = Scorer::new(&catalog, &index, &interactions);
        let u1 = user(&catalog, "U1");

        assert_eq!(scorer.content_based(&u1, 3), scorer.basic(&u1, 3));
    }

    #[test]
    fn test_content_based_no_padding() {
        let catalog = catalog();
        let index = SimilarityIndex::build(catalog.products());
        let interactions = likes(&[("U1", 1), ("U1", 2), ("U1", 3), ("U1", 99)]);
        let scorer = Scorer::new(&catalog, &index, &interactions);

        let ranked = scorer.content_based(&user(&catalog, "U1"), 5);
        assert_eq!(ranked.len(), 2);
        assert!(!ids(&catalog, &ranked).iter().any(|id| [1, 2, 3].contains(id)));
    }

    #[test]
    fn test_collaborative_recommends_neighbour_like() {
        let catalog = catalog();
        let index = SimilarityIndex::build(catalog.products());
        let interactions = likes(&[("U1", 1), ("U2", 1), ("U2", 4)]);
        let scorer = Scorer::new(&catalog, &index, &interactions);

        let ranked = scorer.collaborative(&user(&catalog, "U1"), 1);
        assert_eq!(ids(&catalog, &ranked), vec![4]);
    }

    #[test]
    fn test_collaborative_supplements_with_content() {
        let catalog = catalog();
        let index = SimilarityIndex::build(catalog.products());
        let interactions = likes(&[("U1", 1), ("U2", 1), ("U2", 4)]);
        let scorer = Scorer::new(&catalog, &index, &interactions);

        let ranked = ids(&catalog, &scorer.collaborative(&user(&catalog, "U1"), 3));
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0], 4);
        assert!(!ranked.contains(&1));
        let unique: BTreeSet<u64> = ranked.iter().copied().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_collaborative_single_user_falls_back_to_basic() {
        let catalog = catalog();
        let index = SimilarityIndex::build(catalog.products());
        let interactions = likes(&[("U1", 1)]);
        let scorer = Scorer::new(&catalog, &index, &interactions);

        let ranked = scorer.collaborative(&user(&catalog, "U1"), 2);
        assert_eq!(ids(&catalog, &ranked), vec![2, 4]);
    }

    #[test]
    fn test_collaborative_without_record_is_basic() {
        let catalog = catalog();
        let index = SimilarityIndex::build(catalog.products());
        let interactions = likes(&[("U2", 1), ("U3", 3)]);
        let scorer = Scorer::new(&catalog, &index, &interactions);
        let u1 = user(&catalog, "U1");

        assert_eq!(scorer.collaborative(&u1, 3), scorer.basic(&u1, 3));
    }

    #[test]
    fn test_collaborative_nothing_new_falls_back_to_content() {
        let catalog = catalog();
        let index = SimilarityIndex::build(catalog.products());
        // U2 liked nothing U1 has not already seen
        let interactions = likes(&[("U1", 1), ("U1", 4), ("U2", 1)]);
        let scorer = Scorer::new(&catalog, &index, &interactions);
        let u1 = user(&catalog, "U1");

        assert_eq!(scorer.collaborative(&u1, 2), scorer.content_based(&u1, 2));
    }

    #[test]
    fn test_collaborative_caps_neighbours_and_accumulates() {
        let users = ["A", "B", "C", "D", "E", "F", "U0"]
            .iter()
            .map(|&id| User::new(UserId::new(id), "Misc", ""))
            .collect();
        let products = (1..=12)
            .map(|id| product(id, "Misc", &format!("tag{}", id), 10.0))
            .collect();
        let catalog = Catalog::new(users, products);
        let index = SimilarityIndex::build(catalog.products());

        // Everyone shares product 1 with U0. C has the closest history (cosine
        // 1/sqrt(2)); A, B, D and E tie at 1/sqrt(3); F is sixth at 1/2.
        let interactions = likes(&[
            ("U0", 1),
            ("A", 1),
            ("A", 2),
            ("A", 4),
            ("B", 1),
            ("B", 2),
            ("B", 5),
            ("C", 1),
            ("C", 3),
            ("D", 1),
            ("D", 6),
            ("D", 7),
            ("E", 1),
            ("E", 8),
            ("E", 9),
            ("F", 1),
            ("F", 10),
            ("F", 11),
            ("F", 12),
        ]);
        let scorer = Scorer::new(&catalog, &index, &interactions);
        let u0 = user(&catalog, "U0");

        // 2 is liked by A and B, each less similar than C, yet outranks C's 3
        assert_eq!(ids(&catalog, &scorer.collaborative(&u0, 2)), vec![2, 3]);

        // Eight candidates fill the list without a content top-up; F's likes
        // never enter because F is outside the five nearest users
        let ranked = ids(&catalog, &scorer.collaborative(&u0, 8));
        assert_eq!(ranked, vec![2, 3, 4, 5, 6, 7, 8, 9]);
        assert!(![10, 11, 12].iter().any(|id| ranked.contains(id)));
    }

    #[test]
    fn test_collaborative_ignores_dissimilar_users() {
        let catalog = catalog();
        let index = SimilarityIndex::build(catalog.products());
        // U4 shares neither likes nor interests with U1
        let interactions = likes(&[("U1", 1), ("U4", 5)]);
        let scorer = Scorer::new(&catalog, &index, &interactions);
        let u1 = user(&catalog, "U1");

        assert_eq!(scorer.collaborative(&u1, 2), scorer.content_based(&u1, 2));
    }

    #[test]
    fn test_hybrid_fuses_in_weight_order() {
        let catalog = Catalog::new(
            vec![
                User::new(UserId::new("U1"), "Electronics", ""),
                User::new(UserId::new("U2"), "Electronics", ""),
            ],
            vec![
                product(1, "Electronics", "audio headphones", 90.0),
                product(2, "Electronics", "paperback reader", 70.0),
                product(3, "Books", "paperback reader", 95.0),
                product(4, "Garden", "shovel", 60.0),
            ],
        );
        let index = SimilarityIndex::build(catalog.products());
        let interactions = likes(&[("U1", 3), ("U2", 3), ("U2", 4)]);
        let scorer = Scorer::new(&catalog, &index, &interactions);
        let u1 = user(&catalog, "U1");

        assert_eq!(ids(&catalog, &scorer.collaborative(&u1, 1)), vec![4]);
        assert_eq!(ids(&catalog, &scorer.content_based(&u1, 1)), vec![2]);
        assert_eq!(ids(&catalog, &scorer.basic(&u1, 1)), vec![1]);
        assert_eq!(ids(&catalog, &scorer.hybrid(&u1, 1)), vec![4]);
    }

    #[test]
    fn test_rankings_are_deterministic_and_bounded() {
        let catalog = catalog();
        let index = SimilarityIndex::build(catalog.products());
        let interactions = likes(&[("U1", 1), ("U2", 1), ("U2", 4), ("U3", 3), ("U3", 2)]);
        let scorer = Scorer::new(&catalog, &index, &interactions);

        for id in ["U1", "U2", "U3", "U4"] {
            let u = user(&catalog, id);
            for strategy in [
                Strategy::Basic,
                Strategy::Content,
                Strategy::Collaborative,
                Strategy::Hybrid,
            ] {
                for top_n in 0..6 {
                    let first = scorer.rank(&u, strategy, top_n);
                    assert_eq!(first, scorer.rank(&u, strategy, top_n));
                    assert!(first.len() <= top_n);
                    if matches!(strategy, Strategy::Content | Strategy::Collaborative) {
                        let liked = interactions.get(&u.user_id);
                        assert!(first.iter().all(|&p| liked
                            .map_or(true, |l| !l.contains(&catalog.products()[p].product_id))));
                    }
                }
            }
        }
    }

    #[test]
    fn test_jaccard_bounds() {
        let a = interests("Gaming,Music");
        let b = interests("Music,Travel,Cooking");
        let score = jaccard(&a, &b);
        assert!((score - 0.25).abs() < 1e-12);
        assert_eq!(jaccard(&a, &a), 1.0);
        assert_eq!(jaccard(&BTreeSet::new(), &BTreeSet::new()), 0.0);
    }

    #[test]
    fn test_binary_cosine() {
        let a: BTreeSet<usize> = [0, 1].into_iter().collect();
        let b: BTreeSet<usize> = [1].into_iter().collect();
        assert!((binary_cosine(&a, &b) - 1.0 / 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(binary_cosine(&a, &BTreeSet::new()), 0.0);
    }
}
