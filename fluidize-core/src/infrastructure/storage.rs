// fluidize-core/src/infrastructure/storage.rs

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::FluidizeError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::storage::Storage;

/// `Storage` adapter backed by the local filesystem.
#[derive(Debug, Default, Clone)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    fn read(&self, path: &Path) -> Result<String, FluidizeError> {
        std::fs::read_to_string(path)
            .map_err(|e| FluidizeError::Infrastructure(InfrastructureError::Io(e)))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), FluidizeError> {
        atomic_write(path, contents).map_err(FluidizeError::Infrastructure)
    }

    fn copy_dir(&self, source: &Path, destination: &Path) -> Result<(), FluidizeError> {
        std::fs::create_dir_all(destination)
            .map_err(|e| FluidizeError::Infrastructure(InfrastructureError::Io(e)))?;

        let mut options = fs_extra::dir::CopyOptions::new();
        options.content_only = true;
        options.overwrite = true;

        fs_extra::dir::copy(source, destination, &options)
            .map(|_| ())
            .map_err(|e| FluidizeError::Infrastructure(InfrastructureError::Copy(e)))
    }

    fn remove_dir(&self, path: &Path) -> Result<(), FluidizeError> {
        match std::fs::remove_dir_all(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FluidizeError::Infrastructure(InfrastructureError::Io(e))),
        }
    }

    fn create_dir(&self, path: &Path) -> Result<(), FluidizeError> {
        std::fs::create_dir_all(path)
            .map_err(|e| FluidizeError::Infrastructure(InfrastructureError::Io(e)))
    }

    fn create_dir_exclusive(&self, path: &Path) -> Result<bool, FluidizeError> {
        if let Some(parent) = path.parent() {
            self.create_dir(parent)?;
        }
        match std::fs::create_dir(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(FluidizeError::Infrastructure(InfrastructureError::Io(e))),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn list_dirs(&self, path: &Path) -> Result<Vec<PathBuf>, FluidizeError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut dirs: Vec<PathBuf> = std::fs::read_dir(path)
            .map_err(|e| FluidizeError::Infrastructure(InfrastructureError::Io(e)))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();
        Ok(dirs)
    }
}
