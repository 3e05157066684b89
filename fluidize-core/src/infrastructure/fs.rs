// fluidize-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::Path;

/// Write content to a file atomically using a temporary file.
///
/// The temporary file is created in the target's own directory (so the
/// final rename never crosses a filesystem), filled, then persisted over
/// the target. Parent directories are created on demand. The target is
/// either fully written or untouched; a crash cannot leave partial data.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    if !parent.exists() {
        std::fs::create_dir_all(parent).map_err(InfrastructureError::Io)?;
    }

    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(InfrastructureError::Io)?;

    temp_file
        .write_all(content.as_ref())
        .map_err(InfrastructureError::Io)?;

    // Atomic rename (persist)
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_file_and_parents() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("a").join("b").join("graph.json");

        atomic_write(&file_path, "{}")?;

        assert!(file_path.exists());
        assert_eq!(fs::read_to_string(file_path)?, "{}");
        Ok(())
    }

    #[test]
    fn test_atomic_write_overwrites_existing() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("test.txt");

        atomic_write(&file_path, "Initial")?;
        atomic_write(&file_path, "Updated")?;

        assert_eq!(fs::read_to_string(file_path)?, "Updated");
        Ok(())
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() -> Result<()> {
        let dir = tempdir()?;
        atomic_write(dir.path().join("out.yaml"), "status: ok\n")?;

        let entries: Vec<_> = fs::read_dir(dir.path())?.collect();
        assert_eq!(entries.len(), 1);
        Ok(())
    }
}
