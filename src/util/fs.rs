use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

/// Replaces the feed at `path` with `content` in one step.
///
/// The feed is staged next to its destination, flushed to disk and renamed
/// into place, so a reader polling the file sees either the old feed or the
/// new one.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let staged = staging_path(path);

    // create_new refuses a pre-existing file or symlink at the staging name
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&staged)
        .with_context(|| format!("Cannot stage feed at '{}'", staged.display()))?;

    let result = fill(file, &staged, content).and_then(|()| publish(&staged, path));
    if result.is_err() {
        let _ = fs::remove_file(&staged);
    }
    result
}

/// Sibling of `path` named after the current time in nanoseconds.
fn staging_path(path: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    path.with_extension(format!("tmp.{nanos:016x}"))
}

fn fill(mut file: File, staged: &Path, content: &[u8]) -> Result<()> {
    file.write_all(content)
        .with_context(|| format!("Cannot write staged feed '{}'", staged.display()))?;
    file.sync_all()
        .with_context(|| format!("Cannot flush staged feed '{}'", staged.display()))
}

fn publish(staged: &Path, path: &Path) -> Result<()> {
    // rename does not overwrite on Windows
    #[cfg(windows)]
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("Cannot replace existing feed '{}'", path.display()))?;
    }

    fs::rename(staged, path).with_context(|| {
        format!(
            "Cannot move staged feed '{}' into place at '{}'",
            staged.display(),
            path.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_creates_file() {
        let dir = std::env::temp_dir().join("syndicate_fs_test_create");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("feed.xml");

        write_atomic(&path, b"<rss/>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<rss/>");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = std::env::temp_dir().join("syndicate_fs_test_replace");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("feed.xml");
        std::fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");

        // No temp files left behind
        let leftovers = std::fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .count();
        assert_eq!(leftovers, 0);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_staging_path_is_sibling() {
        let path = Path::new("/srv/site/feed.xml");
        let staged = staging_path(path);
        assert_eq!(staged.parent(), path.parent());
        assert!(staged
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("feed.tmp."));
    }

    #[test]
    fn test_write_atomic_missing_directory_fails() {
        let path = std::env::temp_dir()
            .join("syndicate_fs_test_missing_dir")
            .join("nested")
            .join("feed.xml");
        let result = write_atomic(&path, b"x");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Cannot stage feed"));
    }
}
