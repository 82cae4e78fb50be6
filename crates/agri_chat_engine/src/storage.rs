//! Keyed document storage on disk, the client-local store behind chat history.
//!
//! Each key maps to `{dir}/{key}.json`. Writes go through a temporary file in
//! the same directory and are renamed into place, so a reader sees either the
//! previous document or the new one.

use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("{0:?} exists but is not a directory")]
    NotADirectory(PathBuf),
    #[error("failed to serialize stored document: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage I/O on {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`. Keys are limited to ASCII letters, digits, `_` and `-`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    /// Returns the stored document, or `None` if nothing was ever stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    /// Replaces the document under `key`, creating the storage directory if needed.
    pub fn set(&self, key: &str, content: &str) -> Result<(), StorageError> {
        let target = self.path_for(key)?;
        self.prepare_dir()?;

        let io_err = |source: io::Error| StorageError::Io {
            path: target.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(content.as_bytes()).map_err(io_err)?;
        tmp.as_file_mut().sync_all().map_err(io_err)?;
        tmp.persist(&target).map_err(|err| io_err(err.error))?;
        Ok(())
    }

    fn prepare_dir(&self) -> Result<(), StorageError> {
        match fs::metadata(&self.dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StorageError::NotADirectory(self.dir.clone())),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
            Err(source) => Err(StorageError::Io {
                path: self.dir.clone(),
                source,
            }),
        }
    }
}
