use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::models::Product;

use super::stop_words::is_stop_word;

/// Sparse term-weight vector: `(term index, weight)` pairs sorted by term index
type SparseVector = Vec<(usize, f64)>;

/// Dense product × product cosine similarity over TF-IDF vectors of the
/// products' content features
///
/// Row and column `i` belong to the product at position `i` of the slice the
/// index was built from.
#[derive(Debug, Clone, Default)]
pub struct SimilarityIndex {
    size: usize,
    scores: Vec<f64>,
}

impl SimilarityIndex {
    /// Vectorizes every product and computes all pairwise similarities
    ///
    /// An empty catalog or an empty vocabulary yields an all-zero matrix.
    pub fn build(products: &[Product]) -> Self {
        let size = products.len();
        let documents: Vec<&str> = products
            .iter()
            .map(|product| product.content_features.as_str())
            .collect();

        let vectorizer = TfIdfVectorizer::fit(&documents);
        let mut index = Self {
            size,
            scores: vec![0.0; size * size],
        };

        if vectorizer.vocabulary_len() == 0 {
            tracing::warn!(products = size, "Empty content vocabulary, similarity is all zero");
            return index;
        }

        let vectors: Vec<SparseVector> = documents
            .iter()
            .map(|document| vectorizer.transform(document))
            .collect();

        for i in 0..size {
            if vectors[i].is_empty() {
                continue;
            }
            index.scores[i * size + i] = 1.0;
            for j in (i + 1)..size {
                let score = dot(&vectors[i], &vectors[j]);
                index.scores[i * size + j] = score;
                index.scores[j * size + i] = score;
            }
        }

        tracing::info!(
            products = size,
            vocabulary = vectorizer.vocabulary_len(),
            "Content similarity index built"
        );

        index
    }

    /// Number of products covered by the index
    pub fn product_count(&self) -> usize {
        self.size
    }

    /// Similarities of product `position` to every product
    pub fn row(&self, position: usize) -> &[f64] {
        &self.scores[position * self.size..(position + 1) * self.size]
    }

    #[cfg(test)]
    fn score(&self, a: usize, b: usize) -> f64 {
        self.scores[a * self.size + b]
    }
}

fn token_pattern() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"))
}

/// Lower-cased terms of two or more word characters, stop words removed
fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|term| !is_stop_word(term))
        .map(str::to_string)
        .collect()
}

/// Term frequency × smoothed inverse document frequency, L2-normalized
struct TfIdfVectorizer {
    /// term → dimension, in lexical order
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    fn fit(documents: &[&str]) -> Self {
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for document in documents {
            let unique: BTreeSet<String> = tokenize(document).into_iter().collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (position, (term, df)) in doc_freq.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, position);
        }

        Self { vocabulary, idf }
    }

    fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in tokenize(document) {
            if let Some(&dim) = self.vocabulary.get(&term) {
                *counts.entry(dim).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(dim, count)| (dim, count * self.idf[dim]))
            .collect();

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in vector.iter_mut() {
                *weight /= norm;
            }
        }
        vector
    }
}

/// Dot product of two sparse vectors sorted by dimension
fn dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}
