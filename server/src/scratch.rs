//! Per-request scratch directories.
//!
//! Every request gets its own directory under the configured root. The
//! [`ScratchDir`] guard deletes it when dropped, on success, error and
//! unwinding alike. The [`ScratchRegistry`] remembers live directories so a
//! shutdown sweep can remove anything a guard never got to.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, warn};

/// Bookkeeping of live scratch directories.
#[derive(Debug)]
pub struct ScratchRegistry {
    root: PathBuf,
    active: Mutex<HashSet<PathBuf>>,
}

impl ScratchRegistry {
    /// Create a registry rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Arc<Self>> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Arc::new(Self {
            root,
            active: Mutex::new(HashSet::new()),
        }))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a uniquely named scratch directory.
    pub fn create(self: &Arc<Self>) -> io::Result<ScratchDir> {
        let dir = tempfile::Builder::new()
            .prefix("report-")
            .tempdir_in(&self.root)?;
        self.active.lock().insert(dir.path().to_path_buf());
        debug!("Created scratch directory {}", dir.path().display());
        Ok(ScratchDir {
            dir: Some(dir),
            registry: Arc::clone(self),
        })
    }

    /// Number of directories currently registered.
    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }

    /// Remove every directory still registered. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let paths: Vec<PathBuf> = self.active.lock().drain().collect();
        let mut removed = 0;
        for path in paths {
            match fs::remove_dir_all(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove scratch directory {}: {}", path.display(), e),
            }
        }
        removed
    }

    fn release(&self, path: &Path) {
        self.active.lock().remove(path);
    }
}

/// RAII guard owning one scratch directory.
#[derive(Debug)]
pub struct ScratchDir {
    dir: Option<TempDir>,
    registry: Arc<ScratchRegistry>,
}

impl ScratchDir {
    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            None => self.registry.root(),
        }
    }

    /// Write `contents` to `file_name` inside the directory.
    ///
    /// Only the final component of `file_name` is used.
    pub fn write_file(&self, file_name: &str, contents: &[u8]) -> io::Result<PathBuf> {
        let name = Path::new(file_name)
            .file_name()
            .filter(|n| !n.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("upload"));
        let path = self.path().join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            self.registry.release(&path);
            if let Err(e) = dir.close() {
                warn!("Failed to remove scratch directory {}: {}", path.display(), e);
            } else {
                debug!("Removed scratch directory {}", path.display());
            }
        }
    }
}
