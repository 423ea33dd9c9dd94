use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        RwLock,
    },
};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};

use crate::error::MediaError;

/// Filename-keyed blob cache. `write` never replaces an existing entry.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool, MediaError>;
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), MediaError>;
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, MediaError>;
}

/// Keys are single path segments; hidden names are reserved for temp files.
pub fn check_key(key: &str) -> Result<(), MediaError> {
    let bad = key.is_empty()
        || key.starts_with('.')
        || key.contains(|c| matches!(c, '/' | '\\' | '\0'));
    if bad {
        Err(MediaError::InvalidKey(key.to_string()))
    } else {
        Ok(())
    }
}

pub struct FsStore {
    root: PathBuf,
    seq: AtomicU64,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str) -> Result<PathBuf, MediaError> {
        check_key(key)?;
        Ok(self.root.join(key))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!(".{}.{}.{}.tmp", key, std::process::id(), n))
    }

    async fn write_new(path: &Path, bytes: &[u8]) -> Result<(), MediaError> {
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await;
        match file {
            Ok(mut file) => {
                file.write_all(bytes).await?;
                file.flush().await?;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ContentStore for FsStore {
    async fn exists(&self, key: &str) -> Result<bool, MediaError> {
        match fs::metadata(self.path(key)?).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), MediaError> {
        let path = self.path(key)?;
        if self.exists(key).await? {
            return Ok(());
        }
        fs::create_dir_all(&self.root).await?;

        // Stage the bytes, then link them in place so readers never see a partial file
        // and a concurrent writer that got there first keeps its content.
        let temp = self.temp_path(key);
        fs::write(&temp, bytes).await?;
        let linked = fs::hard_link(&temp, &path).await;
        let _ = fs::remove_file(&temp).await;
        match linked {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => {
                log::debug!(target: "zetta", "hard link unavailable ({}), writing in place", e);
                Self::write_new(&path, bytes).await
            }
        }
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, MediaError> {
        match fs::read(self.path(key)?).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.files.write().ok()?.remove(key)
    }

    pub fn len(&self) -> usize {
        self.files.read().map(|files| files.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> MediaError {
    MediaError::Io(std::io::Error::new(ErrorKind::Other, "memory store lock poisoned"))
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn exists(&self, key: &str) -> Result<bool, MediaError> {
        check_key(key)?;
        Ok(self.files.read().map_err(|_| poisoned())?.contains_key(key))
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), MediaError> {
        check_key(key)?;
        self.files
            .write()
            .map_err(|_| poisoned())?
            .entry(key.to_string())
            .or_insert_with(|| bytes.to_vec());
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, MediaError> {
        check_key(key)?;
        Ok(self.files.read().map_err(|_| poisoned())?.get(key).cloned())
    }
}
