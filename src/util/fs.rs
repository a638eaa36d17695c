//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::Path;

use glob::{glob, Pattern};

/// Remove a file, treating "already gone" as success.
///
/// Returns whether a file was actually removed.
pub fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Best-effort removal of files in `dir` matching a glob `pattern`.
///
/// `dir` is matched literally, so brackets or wildcards in the path are
/// safe. Errors are logged and skipped. Returns the number of files removed.
pub fn remove_matching(dir: &Path, pattern: &str) -> usize {
    let escaped = Pattern::escape(&dir.to_string_lossy());
    let pattern_str = Path::new(&escaped).join(pattern).to_string_lossy().into_owned();

    let entries = match glob(&pattern_str) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("invalid glob pattern {}: {}", pattern_str, e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!("failed to remove {}: {}", path.display(), e),
            },
            Ok(_) => {}
            Err(e) => tracing::warn!("glob error: {}", e),
        }
    }

    removed
}

/// Ensure a directory exists, creating it and its parents if necessary.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Mark a file executable by owner, group and others (`rwxrwxr-x`).
#[cfg(unix)]
pub fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o775))
}

#[cfg(not(unix))]
pub fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
