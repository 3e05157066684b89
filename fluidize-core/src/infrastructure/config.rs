// fluidize-core/src/infrastructure/config.rs

use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::FluidizeError;
use crate::infrastructure::layout::Layout;
use crate::ports::storage::Storage;

pub const BASE_PATH_ENV: &str = "FLUIDIZE_BASE_PATH";
const DEFAULT_DIR: &str = ".fluidize";

/// Lightweight configuration: where the store lives on disk.
///
/// Resolution order follows the usual layering: explicit path, then the
/// `FLUIDIZE_BASE_PATH` environment variable, then `$HOME/.fluidize`.
#[derive(Debug, Clone)]
pub struct FluidizeConfig {
    pub base_path: PathBuf,
}

impl FluidizeConfig {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var(BASE_PATH_ENV) {
            info!(base = %val, "Using base path from environment");
            return Self::new(val);
        }
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(home.join(DEFAULT_DIR))
    }

    pub fn layout(&self) -> Layout {
        Layout::new(&self.base_path)
    }

    /// Bootstraps the store skeleton (`projects/`, `simulations/`).
    pub fn ensure_directories(&self, store: &dyn Storage) -> Result<(), FluidizeError> {
        let layout = self.layout();
        store.create_dir(&layout.projects_path())?;
        store.create_dir(&layout.simulations_path())?;
        debug!(base = %self.base_path.display(), "Store directories ready");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::LocalStorage;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_directories_creates_skeleton() -> Result<()> {
        let dir = tempdir()?;
        let config = FluidizeConfig::new(dir.path());

        config.ensure_directories(&LocalStorage::new())?;

        assert!(dir.path().join("projects").is_dir());
        assert!(dir.path().join("simulations").is_dir());
        Ok(())
    }

    #[test]
    fn test_layout_shares_base() {
        let config = FluidizeConfig::new("/srv/fluidize");
        assert_eq!(
            config.layout().projects_path(),
            PathBuf::from("/srv/fluidize/projects")
        );
    }
}
