//! Media storage backends for uploaded files.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use arbor_common::{AppError, AppResult};

/// Storage backend trait for uploaded media files.
///
/// Keys are file names relative to the uploads root; backends must not
/// interpret them beyond joining onto their own base location.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Save file data under the given key, creating parent directories
    /// as needed.
    async fn save(&self, key: &str, data: &[u8]) -> AppResult<()>;

    /// Read a stored file back.
    async fn load(&self, key: &str) -> AppResult<Vec<u8>>;

    /// Delete a file. Deleting a missing file is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check if a file exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;
}

/// Local filesystem storage rooted at the configured uploads directory.
#[derive(Clone)]
pub struct LocalMediaStore {
    base_path: PathBuf,
}

impl LocalMediaStore {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn full_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn save(&self, key: &str, data: &[u8]) -> AppResult<()> {
        let path = self.full_path(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        Ok(())
    }

    async fn load(&self, key: &str) -> AppResult<Vec<u8>> {
        let path = self.full_path(key);

        tokio::fs::read(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read file: {e}")))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.full_path(key);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete file: {e}"))),
        }
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        tokio::fs::try_exists(self.full_path(key))
            .await
            .map_err(|e| AppError::Storage(format!("Failed to stat file: {e}")))
    }
}

/// In-memory storage backend for tests.
#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently held, sorted.
    pub fn keys(&self) -> Vec<String> {
        let files = self.files.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut keys: Vec<String> = files.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl MediaStore for MemoryStore {
    async fn save(&self, key: &str, data: &[u8]) -> AppResult<()> {
        let mut files = self.files.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        files.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    async fn load(&self, key: &str) -> AppResult<Vec<u8>> {
        let files = self.files.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        files
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::Storage(format!("No such file: {key}")))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut files = self.files.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        files.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let files = self.files.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(files.contains_key(key))
    }
}

/// Shared handle to the configured storage backend.
pub type SharedMediaStore = std::sync::Arc<dyn MediaStore>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path().to_path_buf());

        store.save("photo.jpg", b"abc").await.unwrap();
        assert!(store.exists("photo.jpg").await.unwrap());
        assert_eq!(store.load("photo.jpg").await.unwrap(), b"abc");

        store.delete("photo.jpg").await.unwrap();
        assert!(!store.exists("photo.jpg").await.unwrap());
    }

    #[tokio::test]
    async fn test_local_store_delete_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalMediaStore::new(dir.path().to_path_buf());

        store.delete("never-existed.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_overwrites() {
        let store = MemoryStore::new();
        store.save("a.png", b"one").await.unwrap();
        store.save("a.png", b"two").await.unwrap();
        assert_eq!(store.load("a.png").await.unwrap(), b"two");
        assert_eq!(store.keys(), vec!["a.png".to_string()]);
    }
}
