use std::path::PathBuf;

use crate::{
    error::{AppError, AppResult},
    models::Interactions,
};

/// Durable storage for the interaction relation
///
/// Saves always receive the complete relation and overwrite whatever was
/// stored before.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait InteractionStore: Send + Sync {
    /// Loads the stored relation. A store that does not exist yet is empty.
    async fn load(&self) -> AppResult<Interactions>;

    /// Replaces the stored relation with `interactions`
    async fn save(&self, interactions: &Interactions) -> AppResult<()>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Interaction store backed by a single JSON file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl InteractionStore for JsonFileStore {
    async fn load(&self) -> AppResult<Interactions> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No interaction file, starting empty");
                return Ok(Interactions::new());
            }
            Err(e) => {
                return Err(AppError::Persistence(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let interactions: Interactions = serde_json::from_slice(&bytes)?;

        tracing::info!(
            path = %self.path.display(),
            users = interactions.user_count(),
            interactions = interactions.total(),
            "Interactions loaded"
        );

        Ok(interactions)
    }

    async fn save(&self, interactions: &Interactions) -> AppResult<()> {
        let json = serde_json::to_vec(interactions)?;

        tokio::fs::write(&self.path, json).await.map_err(|e| {
            tracing::error!(error = %e, path = %self.path.display(), "Interaction write failed");
            AppError::Persistence(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            interactions = interactions.total(),
            "Interactions persisted"
        );

        Ok(())
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}
