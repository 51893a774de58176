//! Per-document serialization of read-modify-write cycles.
//!
//! Only in-process callers are serialized; two processes editing the same
//! document/index pair concurrently remain undefined behavior.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

static DOCUMENT_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Runs `operation` while holding the lock for `document_path`.
///
/// Entries leave the registry once no caller holds or waits on them.
pub(crate) fn with_document_lock<T>(document_path: &Path, operation: impl FnOnce() -> T) -> T {
    let key = lock_key(document_path);
    let lock = {
        let mut locks = DOCUMENT_LOCKS.lock();
        Arc::clone(
            locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    };
    let result = {
        let _guard = lock.lock();
        operation()
    };

    // New handles are only cloned under the registry lock, so a count of one
    // means the registry holds the last reference.
    let mut locks = DOCUMENT_LOCKS.lock();
    drop(lock);
    if locks
        .get(&key)
        .is_some_and(|entry| Arc::strong_count(entry) == 1)
    {
        locks.remove(&key);
    }
    result
}

/// Absolute key for `path`: the deepest existing ancestor is canonicalized
/// and the not-yet-created components are appended unchanged.
fn lock_key(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return missing
                .iter()
                .rev()
                .fold(canonical, |key, component| key.join(component));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return absolute,
        }
    }
}
