// fluidize-core/src/ports/storage.rs

// What the core needs from a byte store, without knowing how it is done.
// The local adapter maps these onto std::fs; a future object-store
// backend only has to honor the same narrow contract.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::FluidizeError;

pub trait Storage: Send + Sync {
    /// Reads a whole file as UTF-8.
    fn read(&self, path: &Path) -> Result<String, FluidizeError>;

    /// Writes a whole file, creating parent directories. Must be atomic
    /// per file: a crash may lose the write, never truncate it.
    fn write(&self, path: &Path, contents: &str) -> Result<(), FluidizeError>;

    /// Recursively copies the *contents* of `source` into `destination`.
    fn copy_dir(&self, source: &Path, destination: &Path) -> Result<(), FluidizeError>;

    /// Removes a directory tree. Removing an absent tree is a no-op.
    fn remove_dir(&self, path: &Path) -> Result<(), FluidizeError>;

    /// Creates a directory along with any missing parents.
    fn create_dir(&self, path: &Path) -> Result<(), FluidizeError>;

    /// Creates exactly one new directory. Returns `false` when it
    /// already exists; run-number allocation leans on this primitive.
    fn create_dir_exclusive(&self, path: &Path) -> Result<bool, FluidizeError>;

    fn exists(&self, path: &Path) -> bool;

    /// Immediate subdirectories of `path`, sorted by name.
    fn list_dirs(&self, path: &Path) -> Result<Vec<PathBuf>, FluidizeError>;
}

// --- TYPED HELPERS ---
// Serialization stays out of the trait so implementations only ever
// move bytes.

pub fn read_json<T: DeserializeOwned>(store: &dyn Storage, path: &Path) -> Result<T, FluidizeError> {
    let contents = store.read(path)?;
    Ok(serde_json::from_str(&contents)?)
}

pub fn write_json<T: Serialize>(
    store: &dyn Storage,
    path: &Path,
    value: &T,
) -> Result<(), FluidizeError> {
    let mut contents = serde_json::to_string_pretty(value)?;
    contents.push('\n');
    store.write(path, &contents)
}

pub fn read_yaml<T: DeserializeOwned>(store: &dyn Storage, path: &Path) -> Result<T, FluidizeError> {
    let contents = store.read(path)?;
    Ok(serde_yaml::from_str(&contents)?)
}

pub fn write_yaml<T: Serialize>(
    store: &dyn Storage,
    path: &Path,
    value: &T,
) -> Result<(), FluidizeError> {
    let contents = serde_yaml::to_string(value)?;
    store.write(path, &contents)
}
