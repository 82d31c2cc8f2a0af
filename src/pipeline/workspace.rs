use std::path::{Path, PathBuf};

use crate::foundation::error::{CardreelError, CardreelResult};

const WORKSPACE_PREFIX: &str = "cardreel-";

/// Exclusively owned scratch directory for one generation.
///
/// Removed recursively when dropped, on success, error and unwind alike. Removal failures are
/// logged and swallowed so they never replace the pipeline's own outcome.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<tempfile::TempDir>,
    path: PathBuf,
}

impl Workspace {
    /// Create a uniquely named directory under `root`, or under the OS temp dir when `None`.
    pub fn create(root: Option<&Path>) -> CardreelResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| CardreelError::workspace(format!("create temp directory: {e}")))?;

        let path = dir.path().to_path_buf();
        tracing::debug!(workspace = %path.display(), "workspace created");
        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Remove the directory now. Returns whether removal succeeded.
    pub fn close(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        let Some(dir) = self.dir.take() else {
            return true;
        };
        match dir.close() {
            Ok(()) => {
                tracing::debug!(workspace = %self.path.display(), "workspace removed");
                true
            }
            Err(e) => {
                tracing::warn!(
                    workspace = %self.path.display(),
                    error = %e,
                    "failed to remove workspace"
                );
                false
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/workspace.rs"]
mod tests;
