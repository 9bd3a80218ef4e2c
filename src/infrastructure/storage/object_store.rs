use crate::application::ports::object_storage::{ObjectStorage, StoredObject};
use crate::shared::error::AppError;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ObjectStoreError> for AppError {
    fn from(err: ObjectStoreError) -> Self {
        AppError::Storage(err.to_string())
    }
}

/// ローカルファイルシステムに書き込む ObjectStorage 実装。
pub struct LocalObjectStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStorage {
    pub fn new(root: PathBuf, public_base_url: String) -> Self {
        Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// ルート外への書き込みを防ぐ。相対パスで `..` を含まないこと。
    fn resolve(&self, path: &str) -> Result<PathBuf, ObjectStoreError> {
        if path.trim().is_empty() {
            return Err(ObjectStoreError::InvalidPath("path is empty".to_string()));
        }
        let relative = Path::new(path);
        let ok = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !ok {
            return Err(ObjectStoreError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn store(&self, path: &str, bytes: &[u8]) -> Result<StoredObject, AppError> {
        let target = self.resolve(path).map_err(AppError::from)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(ObjectStoreError::from)?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(ObjectStoreError::from)?;

        debug!("Stored object: {} ({} bytes)", path, bytes.len());
        Ok(StoredObject {
            path: path.to_string(),
            public_url: format!("{}/{}", self.public_base_url, path),
        })
    }

    async fn delete(&self, path: &str) -> Result<(), AppError> {
        let target = self.resolve(path).map_err(AppError::from)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ObjectStoreError::from(err).into()),
        }
    }
}
