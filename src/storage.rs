//! Key-value persistence boundary.
//!
//! The history blob and theme identifier live behind this minimal get/set/
//! remove interface so any string-valued store can back them. The default
//! backend is one file per key with atomic tmp+rename writes.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// String-valued store keyed by short, fixed names.
///
/// `get` treats unreadable values as absent; callers decide what absence
/// means. `set`/`remove` report I/O errors so callers can degrade (history
/// persistence is best-effort by contract).
pub trait KvStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// One file per key under a root directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Creates the directory best-effort; a failure surfaces on first `set`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let _ = fs::create_dir_all(&dir);
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let mut f = fs::File::create(&tmp)?;
        f.write_all(value.as_bytes())?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            // Removing an absent key is not an error.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().expect("storage mutex poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.inner
            .lock()
            .expect("storage mutex poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.inner.lock().expect("storage mutex poisoned").remove(key);
        Ok(())
    }
}
