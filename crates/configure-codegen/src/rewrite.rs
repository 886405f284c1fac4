//! Read-modify-write of generated files

use crate::errors::CodegenError;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// What happened to a file during a rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteStatus {
    /// New content differs and was (or, in dry-run mode, would be) written
    Updated,
    /// Regenerated content is byte-identical to the file
    Unchanged,
    /// The file carries no zone to rewrite
    Skipped,
}

/// Apply `transform` to the content of `path`
///
/// `transform` returns `None` when the file has nothing it can rewrite.
/// The file is only written when the content changes and `dry_run` is off.
pub fn rewrite_file<F>(
    path: &Path,
    dry_run: bool,
    transform: F,
) -> Result<RewriteStatus, CodegenError>
where
    F: FnOnce(&str) -> Result<Option<String>, CodegenError>,
{
    let io_err = |source: std::io::Error| CodegenError::Io {
        path: path.to_path_buf(),
        source,
    };

    let content = fs::read_to_string(path).map_err(io_err)?;
    let Some(updated) = transform(&content)? else {
        debug!("Nothing to rewrite in {:?}", path);
        return Ok(RewriteStatus::Skipped);
    };

    if updated == content {
        return Ok(RewriteStatus::Unchanged);
    }
    if !dry_run {
        write_atomic(path, &updated).map_err(io_err)?;
        debug!("Rewrote {:?}", path);
    }
    Ok(RewriteStatus::Updated)
}

/// Write to a sibling temp file then rename over the target
///
/// The target keeps its permissions; the temp file never outlives a failure.
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let result =
        write_temp(path, &temp_path, content).and_then(|()| fs::rename(&temp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_temp(path: &Path, temp_path: &Path, content: &str) -> std::io::Result<()> {
    let permissions = fs::metadata(path)?.permissions();
    let mut file = fs::File::create(temp_path)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    file.set_permissions(permissions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(content: &str) -> Option<(TempDir, std::path::PathBuf)> {
        let temp_dir = TempDir::new().ok()?;
        let path = temp_dir.path().join("file.rs");
        fs::write(&path, content).ok()?;
        Some((temp_dir, path))
    }

    #[test]
    fn test_rewrite_statuses() {
        let Some((_temp_dir, path)) = setup("old\n") else {
            return;
        };

        let skipped = rewrite_file(&path, false, |_| Ok(None));
        assert!(skipped.is_ok_and(|s| s == RewriteStatus::Skipped));

        let unchanged = rewrite_file(&path, false, |c| Ok(Some(c.to_string())));
        assert!(unchanged.is_ok_and(|s| s == RewriteStatus::Unchanged));

        let updated = rewrite_file(&path, false, |_| Ok(Some("new\n".to_string())));
        assert!(updated.is_ok_and(|s| s == RewriteStatus::Updated));
        assert_eq!(fs::read_to_string(&path).unwrap_or_default(), "new\n");
    }

    #[test]
    fn test_dry_run_leaves_file_alone() {
        let Some((_temp_dir, path)) = setup("old\n") else {
            return;
        };
        let status = rewrite_file(&path, true, |_| Ok(Some("new\n".to_string())));
        assert!(status.is_ok_and(|s| s == RewriteStatus::Updated));
        assert_eq!(fs::read_to_string(&path).unwrap_or_default(), "old\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_rewrite_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let Some((_temp_dir, path)) = setup("old\n") else {
            return;
        };
        if fs::set_permissions(&path, fs::Permissions::from_mode(0o750)).is_err() {
            return;
        }
        let status = rewrite_file(&path, false, |_| Ok(Some("new\n".to_string())));
        assert!(status.is_ok_and(|s| s == RewriteStatus::Updated));
        let mode = fs::metadata(&path).map(|m| m.permissions().mode() & 0o777);
        assert!(mode.is_ok_and(|m| m == 0o750));
    }

    #[test]
    fn test_failed_write_leaves_no_temp_file() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        // A file cannot be renamed over a non-empty directory
        let path = temp_dir.path().join("target.rs");
        if fs::create_dir(&path).is_err() || fs::write(path.join("keep"), "x").is_err() {
            return;
        }
        assert!(write_atomic(&path, "new\n").is_err());
        assert!(!temp_dir.path().join("target.rs.tmp").exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let result = rewrite_file(&temp_dir.path().join("absent.rs"), false, |_| Ok(None));
        assert!(matches!(result, Err(CodegenError::Io { .. })));
    }
}
