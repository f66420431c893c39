//! Watch set and the startup tree walk

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use super::backend::WatchBackend;
use crate::{Error, Result};

/// Directory name that is never watched or tested
pub const EXCLUDED_DIR_NAME: &str = "vendor";

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// Directories currently registered with the watch backend.
///
/// Append-only: removed directories stay in the set, since the OS drops the
/// watch on its own when the directory disappears.
#[derive(Debug)]
pub struct WatchSet<B> {
    backend: B,
    dirs: HashSet<PathBuf>,
}

// ═══════════════════════════════════════════════════════════════════════════
// PUBLIC API
// ═══════════════════════════════════════════════════════════════════════════

impl<B: WatchBackend> WatchSet<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            dirs: HashSet::new(),
        }
    }

    /// Register `dir` with the backend and remember it.
    ///
    /// Returns `false` if it was already a member. A directory that was
    /// removed and recreated under the same name is registered again, since
    /// the old OS watch died with the old directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WatchRegistration`] if the backend rejects the path.
    pub fn add(&mut self, dir: &Path) -> Result<bool> {
        tracing::debug!(path = %dir.display(), "Adding watch");
        self.backend.add(dir)?;
        Ok(self.dirs.insert(dir.to_path_buf()))
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.dirs.contains(dir)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }
}

/// Whether `path` names an excluded (`vendor`) entry
pub fn is_excluded(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name == EXCLUDED_DIR_NAME)
}

/// Walk `root` once and watch it and every directory below it.
///
/// `vendor` directories are pruned together with their whole subtree. The
/// root itself is always watched, whatever its name.
///
/// # Errors
///
/// Returns [`Error::Traversal`] if any directory cannot be listed and
/// [`Error::WatchRegistration`] if the backend rejects one. Either way no
/// partial set is returned.
pub fn build_watch_set<B: WatchBackend>(root: &Path, backend: B) -> Result<WatchSet<B>> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry.path()))
        .try_fold(WatchSet::new(backend), |mut set, entry| {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                Error::traversal(path, e)
            })?;
            if entry.file_type().is_dir() {
                set.add(entry.path())?;
            }
            Ok(set)
        })
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::testing::MemoryBackend;

    fn project() -> Result<TempDir> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a/b"))?;
        fs::create_dir_all(root.join("vendor/dep/inner"))?;
        fs::create_dir_all(root.join("c/vendor/lib"))?;
        fs::write(root.join("a/x.go"), "package a")?;
        fs::write(root.join("vendor/y.go"), "package vendor")?;
        Ok(temp_dir)
    }

    #[test]
    fn test_is_excluded() {
        assert!(is_excluded(Path::new("/proj/vendor")));
        assert!(is_excluded(Path::new("vendor")));
        assert!(!is_excluded(Path::new("/proj/vendored")));
        assert!(!is_excluded(Path::new("/proj/vendor/y.go")));
    }

    #[test]
    fn test_build_watches_all_directories_except_vendor() -> Result<()> {
        let temp_dir = project()?;
        let root = temp_dir.path();

        let set = build_watch_set(root, MemoryBackend::default())?;

        assert!(set.contains(root));
        assert!(set.contains(&root.join("a")));
        assert!(set.contains(&root.join("a/b")));
        assert!(set.contains(&root.join("c")));
        assert!(!set.contains(&root.join("vendor")));
        assert!(!set.contains(&root.join("vendor/dep")));
        assert!(!set.contains(&root.join("vendor/dep/inner")));
        assert!(!set.contains(&root.join("c/vendor")));
        assert!(!set.contains(&root.join("c/vendor/lib")));
        assert_eq!(set.len(), 4);
        Ok(())
    }

    #[test]
    fn test_files_are_not_watched() -> Result<()> {
        let temp_dir = project()?;
        let set = build_watch_set(temp_dir.path(), MemoryBackend::default())?;

        assert!(!set.contains(&temp_dir.path().join("a/x.go")));
        assert!(set.backend().added().iter().all(|p| p.is_dir()));
        Ok(())
    }

    #[test]
    fn test_root_named_vendor_is_still_watched() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("vendor");
        fs::create_dir_all(root.join("pkg"))?;

        let set = build_watch_set(&root, MemoryBackend::default())?;
        assert!(set.contains(&root));
        assert!(set.contains(&root.join("pkg")));
        Ok(())
    }

    #[test]
    fn test_missing_root_is_a_traversal_error() {
        let result = build_watch_set(
            Path::new("/definitely/not/here/rtest"),
            MemoryBackend::default(),
        );
        assert!(matches!(result, Err(Error::Traversal { .. })));
    }

    #[test]
    fn test_rejected_directory_fails_the_whole_build() -> Result<()> {
        let temp_dir = project()?;
        let backend = MemoryBackend::rejecting(temp_dir.path().join("a/b"));

        let result = build_watch_set(temp_dir.path(), backend);
        assert!(matches!(result, Err(Error::WatchRegistration { .. })));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_is_a_traversal_error() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = project()?;
        let locked = temp_dir.path().join("a");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

        let readable = fs::read_dir(&locked).is_ok();
        let result = build_watch_set(temp_dir.path(), MemoryBackend::default());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;

        if readable {
            // Root ignores permission bits, so the walk cannot fail here
            eprintln!(
                "SKIPPED test_unreadable_directory_is_a_traversal_error: \
                 {} stayed readable with mode 000 (running as root?)",
                locked.display()
            );
            return Ok(());
        }
        assert!(matches!(result, Err(Error::Traversal { .. })));
        Ok(())
    }

    #[test]
    fn test_add_reports_new_membership() -> Result<()> {
        let mut set = WatchSet::new(MemoryBackend::default());
        assert!(set.add(Path::new("/proj/a"))?);
        assert!(!set.add(Path::new("/proj/a"))?);
        assert_eq!(set.len(), 1);
        // Re-adding still reaches the backend
        assert_eq!(set.backend().added().len(), 2);
        Ok(())
    }
}
