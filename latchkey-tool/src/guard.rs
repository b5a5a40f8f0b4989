//! Path allow-list enforcement.
//!
//! Every mutation and every read goes through [`PathGuard::check`] before
//! touching the filesystem. A path that escapes the allow-list — via `..`,
//! a symlink, or simply naming a directory outside it — is rejected before
//! any syscall that would act on it.

use latchkey_core::DomainError;
use std::path::{Path, PathBuf};

/// An allow-list of filesystem roots a conversation may operate under.
#[derive(Debug, Clone)]
pub struct PathGuard {
    roots: Vec<PathBuf>,
}

impl PathGuard {
    /// Build a guard from a set of allowed root directories. Roots are
    /// canonicalized at construction time; a root that doesn't currently
    /// exist is kept as given and will simply never match.
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        let roots = roots
            .into_iter()
            .map(|r| std::fs::canonicalize(&r).unwrap_or(r))
            .collect();
        Self { roots }
    }

    /// Check `path` against the allow-list, resolving symlinks first.
    ///
    /// Returns the canonicalized path on success. A path whose parent
    /// exists but the leaf itself does not (e.g. a file about to be
    /// created) is checked against its canonicalized parent instead.
    pub fn check(&self, path: &Path) -> Result<PathBuf, DomainError> {
        let resolved = self.resolve(path)?;
        if self.roots.iter().any(|root| resolved.starts_with(root)) {
            Ok(resolved)
        } else {
            tracing::warn!(path = %path.display(), "path outside allow-list rejected");
            Err(DomainError::InvalidArgument(format!(
                "path '{}' is outside the allowed directories",
                path.display()
            )))
        }
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, DomainError> {
        if let Ok(canon) = std::fs::canonicalize(path) {
            return Ok(canon);
        }
        let parent = path.parent().unwrap_or(Path::new("/"));
        let canon_parent = std::fs::canonicalize(parent).map_err(|e| {
            DomainError::NotFound(format!("parent of '{}' not found: {e}", path.display()))
        })?;
        let leaf = path
            .file_name()
            .ok_or_else(|| DomainError::InvalidArgument(format!("'{}' has no file name", path.display())))?;
        Ok(canon_parent.join(leaf))
    }
}
