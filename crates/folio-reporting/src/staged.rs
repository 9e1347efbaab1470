use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// Write `contents` to `path` through a temp file in the same directory.
///
/// The temp file is renamed over `path` only after every byte is written
/// and flushed. If the process dies first, the temp file is removed on drop
/// (best effort) and `path` keeps whatever it held before.
pub fn write_staged(path: &Path, contents: &str) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_new_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.txt");
        write_staged(&path, "PAGE 1\n")?;
        assert_eq!(std::fs::read_to_string(&path)?, "PAGE 1\n");
        Ok(())
    }

    #[test]
    fn test_replaces_existing_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "old contents that are longer")?;
        write_staged(&path, "new")?;
        assert_eq!(std::fs::read_to_string(&path)?, "new");

        // No temp files left behind
        let leftovers = std::fs::read_dir(dir.path())?.count();
        assert_eq!(leftovers, 1);
        Ok(())
    }

    #[test]
    fn test_missing_directory_fails() {
        let result = write_staged(Path::new("/nonexistent/folio/dir/out.txt"), "x");
        assert!(result.is_err());
    }
}
