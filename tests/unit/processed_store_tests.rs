/*!
 * Tests for the processed post stores
 */

use anyhow::Result;
use storyparts::file_utils::FileManager;
use storyparts::processed_store::{DirectoryStore, MemoryStore, ProcessedStore};
use crate::common;

/// A post directory in the output folder marks the post as processed
#[test]
fn test_directory_store_withExistingPostDir_shouldContainPost() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    FileManager::ensure_dir(temp_dir.path().join("abc123"))?;
    let store = DirectoryStore::new(temp_dir.path());

    assert!(store.contains("abc123"));
    assert!(!store.contains("def456"));
    Ok(())
}

/// Marking creates the post directory, and survives a new store instance
#[test]
fn test_directory_store_markProcessed_shouldPersistAcrossInstances() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    DirectoryStore::new(temp_dir.path()).mark_processed("xyz789")?;

    let reopened = DirectoryStore::new(temp_dir.path());
    assert!(reopened.contains("xyz789"));
    assert!(FileManager::dir_exists(temp_dir.path().join("xyz789")));
    Ok(())
}

/// A stray file with the post id is not a processed post
#[test]
fn test_directory_store_withFileNamedLikePost_shouldNotContainPost() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "abc123", "not a directory")?;

    assert!(!DirectoryStore::new(temp_dir.path()).contains("abc123"));
    Ok(())
}

/// The store can be shared behind a trait object
#[test]
fn test_memory_store_asTraitObject_shouldTrackIds() -> Result<()> {
    let memory = MemoryStore::with_ids(["seen"]);
    let store: &dyn ProcessedStore = &memory;

    assert!(store.contains("seen"));
    assert!(!store.contains("new"));
    store.mark_processed("new")?;
    store.mark_processed("new")?;

    assert!(store.contains("new"));
    assert_eq!(memory.len(), 2);
    Ok(())
}
