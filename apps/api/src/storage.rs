//! Single-file JSON document store.
//!
//! Every operation re-reads the file from disk; nothing is cached between calls.
//! Mutations hold an async mutex for the whole read → modify → write cycle, so two
//! concurrent requests can never overwrite each other's changes. Writes go to a temp
//! file in the target directory and are renamed over the original.

use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Background write task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A JSON document of type `T` persisted as the entire content of one file.
///
/// Cloning shares the lock, so all clones serialize against each other.
pub struct JsonFileStore<T> {
    path: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonFileStore<T> {
    fn clone(&self) -> Self {
        Self {
            path: Arc::clone(&self.path),
            lock: Arc::clone(&self.lock),
            _doc: PhantomData,
        }
    }
}

impl<T> JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            lock: Arc::new(Mutex::new(())),
            _doc: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the current document. A missing or blank file reads as `T::default()`.
    pub async fn read(&self) -> Result<T, StoreError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Runs `f` against a fresh copy of the document under the store lock.
    ///
    /// `f` returns its result together with a flag telling whether it changed the
    /// document; the file is rewritten only when that flag is set.
    pub async fn mutate<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut T) -> (R, bool),
    {
        let _guard = self.lock.lock().await;
        let mut doc = self.load().await?;
        let (result, changed) = f(&mut doc);
        if changed {
            self.persist(&doc).await?;
        }
        Ok(result)
    }

    async fn load(&self) -> Result<T, StoreError> {
        let raw = match tokio::fs::read_to_string(self.path.as_path()).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} does not exist yet, using empty document", self.path.display());
                return Ok(T::default());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.to_path_buf(),
                    source,
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            path: self.path.to_path_buf(),
            source,
        })
    }

    async fn persist(&self, doc: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        let path = Arc::clone(&self.path);
        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes)).await??;
        debug!("Wrote {}", self.path.display());
        Ok(())
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
