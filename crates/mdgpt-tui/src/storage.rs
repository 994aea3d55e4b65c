//! Persistence for the editor buffer: one UTF-8 file, replaced wholesale on
//! every save.  No versioning, no migration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

pub struct BufferStore {
    path: PathBuf,
}

impl BufferStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted buffer.  A missing file is an empty buffer, not an
    /// error.
    pub fn load(&self) -> anyhow::Result<String> {
        if !self.path.is_file() {
            return Ok(String::new());
        }
        std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))
    }

    /// Replace the persisted buffer with `text`.
    pub fn save(&self, text: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        debug!(path = %self.path.display(), bytes = text.len(), "persisting buffer");
        std::fs::write(&self.path, text)
            .with_context(|| format!("writing {}", self.path.display()))
    }

    /// Remove the persisted buffer.  Clearing an already-absent buffer is
    /// not an error.
    pub fn clear(&self) -> anyhow::Result<()> {
        if self.path.is_file() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("removing {}", self.path.display()))?;
        }
        Ok(())
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in_tempdir() -> (tempfile::TempDir, BufferStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = BufferStore::new(dir.path().join("nested").join("buffer.md"));
        (dir, store)
    }

    #[test]
    fn load_absent_file_is_empty() {
        let (_dir, store) = store_in_tempdir();
        assert_eq!(store.load().unwrap(), "");
    }

    #[test]
    fn saved_buffer_round_trips() {
        let (_dir, store) = store_in_tempdir();
        store.save("# Title\n\nsome *markdown*\n").unwrap();
        assert_eq!(store.load().unwrap(), "# Title\n\nsome *markdown*\n");
    }

    #[test]
    fn save_replaces_wholesale() {
        let (_dir, store) = store_in_tempdir();
        store.save("first").unwrap();
        store.save("second").unwrap();
        assert_eq!(store.load().unwrap(), "second");
    }

    #[test]
    fn clear_removes_persisted_value() {
        let (_dir, store) = store_in_tempdir();
        store.save("content").unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), "");
    }

    #[test]
    fn clear_on_absent_file_is_ok() {
        let (_dir, store) = store_in_tempdir();
        store.clear().unwrap();
    }
}
