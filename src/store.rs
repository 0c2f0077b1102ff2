//! # Persisted Key-Value Store
//!
//! A named JSON file holding a flat map of keys to values. The state container
//! uses it to cache the last-known wallpapers, favorites and settings so a cold
//! start can render something before the host shell answers.
//!
//! `set` only touches memory; nothing reaches disk until `save`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{AppError, Result};

#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl JsonStore {
    /// Opens the store at `path`.
    ///
    /// A missing file yields an empty store. An unreadable or corrupt file is
    /// logged and also yields an empty store; the next `save` overwrites it.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<Map<String, Value>>(&content) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(
                        "store: {} is not valid JSON, starting empty: {e}",
                        path.display()
                    );
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                tracing::warn!("store: failed to read {}: {e}", path.display());
                Map::new()
            }
        };

        Self { path, entries: Mutex::new(entries) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and decodes a key. `Ok(None)` when the key is absent.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let value = self.entries.lock().await.get(key).cloned();
        match value {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| AppError::Store(format!("Failed to decode {key}: {e}"))),
            None => Ok(None),
        }
    }

    /// Encodes and stores a key in memory.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| AppError::Store(format!("Failed to encode {key}: {e}")))?;
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    /// Writes all entries to disk.
    ///
    /// Writes to a sibling temp file first and renames it over the store, so a
    /// crash mid-write leaves the previous snapshot intact.
    pub async fn save(&self) -> Result<()> {
        let content = {
            let entries = self.entries.lock().await;
            serde_json::to_string_pretty(&*entries)?
        };

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Store(format!("Failed to create store dir: {e}")))?;
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| AppError::Store(format!("Failed to write store: {e}")))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| AppError::Store(format!("Failed to replace store file: {e}")))?;

        tracing::debug!("store: saved {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallpaper::{sample, Wallpaper};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::load(dir.path().join("absent.dat")).await;
        let value: Option<Vec<Wallpaper>> = store.get("wallpapers").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_set_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/wallpaper-store.dat");

        let store = JsonStore::load(&path).await;
        store.set("wallpapers", &vec![sample("a", "snow")]).await.unwrap();
        store.set("count", &3u32).await.unwrap();
        store.save().await.unwrap();

        let reloaded = JsonStore::load(&path).await;
        let wallpapers: Vec<Wallpaper> = reloaded.get("wallpapers").await.unwrap().unwrap();
        assert_eq!(wallpapers.len(), 1);
        assert_eq!(wallpapers[0].id, "a");
        assert_eq!(reloaded.get::<u32>("count").await.unwrap(), Some(3));
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_set_without_save_does_not_touch_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.dat");
        let store = JsonStore::load(&path).await;
        store.set("favorites", &Vec::<Wallpaper>::new()).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.dat");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonStore::load(&path).await;
        assert!(store.get::<Value>("settings").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_wrong_shape_is_store_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::load(dir.path().join("store.dat")).await;
        store.set("wallpapers", "not a list").await.unwrap();
        let err = store.get::<Vec<Wallpaper>>("wallpapers").await.unwrap_err();
        assert!(matches!(err, AppError::Store(_)));
    }
}
