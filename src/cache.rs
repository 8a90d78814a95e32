use std::path::{Path, PathBuf};

use crate::error::CacheError;
use crate::types::activity::Activity;

/// JSON snapshot of previously fetched activities.
#[derive(Debug, Clone)]
pub struct ActivityCache {
    path: PathBuf,
}

impl ActivityCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// `None` when no snapshot has been written yet.
    pub async fn load(&self) -> Result<Option<Vec<Activity>>, CacheError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let activities: Vec<Activity> = serde_json::from_slice(&bytes)?;
        tracing::info!(
            "Loaded {} cached activities from {}",
            activities.len(),
            self.path.display()
        );
        Ok(Some(activities))
    }

    pub async fn store(&self, activities: &[Activity]) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(activities)?;
        tokio::fs::write(&self.path, bytes).await?;
        tracing::info!(
            "Stored {} activities in {}",
            activities.len(),
            self.path.display()
        );
        Ok(())
    }
}
