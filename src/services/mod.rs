pub mod fusion;
pub mod recommender;
pub mod scoring;
pub mod similarity;
mod stop_words;

pub use recommender::Recommender;
pub use scoring::Scorer;
pub use similarity::SimilarityIndex;
