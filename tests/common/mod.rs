//! Shared fixtures for the store integration tests.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use typed_kv::{KvStore, StoreOptions};

/// Record used across the tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Human {
    pub name: String,
    pub height: f64,
}

impl Human {
    pub fn new(name: &str, height: f64) -> Self {
        Self {
            name: name.to_string(),
            height,
        }
    }
}

/// A store in its own temporary directory. The directory is removed when
/// the fixture is dropped, so keep it alive for the whole test.
pub struct TestStore {
    pub dir: TempDir,
    pub store: KvStore,
}

impl TestStore {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        let store = KvStore::open_with_options(dir.path().join("store.redb"), options)?;
        Ok(Self { dir, store })
    }

    /// Close the store and open the same file again with `options`.
    pub fn reopen(self, options: StoreOptions) -> anyhow::Result<Self> {
        let path = self.store.path().to_path_buf();
        self.store.close();
        let store = KvStore::open_with_options(path, options)?;
        Ok(Self {
            dir: self.dir,
            store,
        })
    }
}
