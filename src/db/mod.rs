pub mod catalog;
pub mod interactions;

pub use catalog::load_catalog;
pub use interactions::{InteractionStore, JsonFileStore};

#[cfg(test)]
pub use interactions::MockInteractionStore;
