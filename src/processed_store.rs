/*!
 * Record of posts that were already turned into videos.
 *
 * The qualifier consults the store before spending any synthesis on a
 * candidate, and the orchestrator marks a post once its parts are rendered.
 */

use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;

/// Set of post ids already processed
pub trait ProcessedStore: Send + Sync + Debug {
    /// Whether `post_id` was already processed
    fn contains(&self, post_id: &str) -> bool;

    /// Record `post_id` as processed
    fn mark_processed(&self, post_id: &str) -> io::Result<()>;
}

/// Store backed by the output directory: a post counts as processed when
/// `{output_dir}/{post_id}` exists.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ProcessedStore for DirectoryStore {
    fn contains(&self, post_id: &str) -> bool {
        FileManager::dir_exists(FileManager::post_dir(&self.root, post_id))
    }

    fn mark_processed(&self, post_id: &str) -> io::Result<()> {
        std::fs::create_dir_all(FileManager::post_dir(&self.root, post_id))
    }
}

/// In-memory store, mostly for tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    ids: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `ids`
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Mutex::new(ids.into_iter().map(Into::into).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.lock().is_empty()
    }
}

impl ProcessedStore for MemoryStore {
    fn contains(&self, post_id: &str) -> bool {
        self.ids.lock().contains(post_id)
    }

    fn mark_processed(&self, post_id: &str) -> io::Result<()> {
        self.ids.lock().insert(post_id.to_string());
        Ok(())
    }
}
