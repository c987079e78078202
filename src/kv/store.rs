//! KV Store implementation using redb.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::logging::{debug, info, trace};

use super::codec::{decode, encode};
use super::options::StoreOptions;

/// A typed key-value store backed by a single redb file.
///
/// Keys are non-empty strings. Values are any `serde` type and are stored as
/// JSON inside one bucket (a redb table) whose name is fixed when the store
/// is opened.
///
/// # Example
///
/// ```ignore
/// use serde::{Deserialize, Serialize};
/// use typed_kv::KvStore;
///
/// #[derive(Serialize, Deserialize)]
/// struct Human {
///     name: String,
///     height: f64,
/// }
///
/// let store = KvStore::open("humans.redb")?;
/// store.set("human:1", &Human { name: "Dante".into(), height: 5.4 })?;
///
/// let human: Human = store.get("human:1")?;
/// assert_eq!(human.height, 5.4);
///
/// for key in store.keys()? {
///     println!("{key}");
/// }
///
/// store.delete("human:1")?;
/// store.close();
/// ```
///
/// # Concurrency
///
/// The engine handle sits behind a readers-writer lock owned by the store.
/// [`set`](Self::set) and [`delete`](Self::delete) take it exclusively;
/// every read takes it shared. Share a store between threads with `&KvStore`
/// or `Arc<KvStore>`.
///
/// # Persistence
///
/// Each write is one engine transaction, durably committed before the call
/// returns. The file and its lock are released when the store is closed or
/// dropped.
pub struct KvStore {
    db: RwLock<Database>,
    path: PathBuf,
    bucket: String,
}

impl KvStore {
    /// Open the store at `path` with default options, creating the file if
    /// it does not exist.
    ///
    /// ```ignore
    /// // Works with &str, String, &Path, PathBuf
    /// let store = KvStore::open("data.redb")?;
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, StoreOptions::default())
    }

    /// Open the store at `path` with custom options.
    ///
    /// The bucket is created in the same call if the file does not have it
    /// yet. Every failure here is reported as [`Error::Open`].
    pub fn open_with_options(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref();
        debug!(
            path = %path.display(),
            bucket = %options.bucket,
            "opening KV store"
        );

        if options.bucket.is_empty() {
            let reason = io::Error::new(io::ErrorKind::InvalidInput, "bucket name required");
            return Err(Error::open(path, redb::Error::Io(reason)));
        }

        let file = open_backing_file(path, options.file_mode)
            .map_err(|e| Error::open(path, redb::Error::Io(e)))?;

        let mut builder = Database::builder();
        if let Some(cache_size) = options.cache_size {
            builder.set_cache_size(cache_size);
        }
        let db = builder.create_file(file).map_err(|e| Error::open(path, e))?;

        let txn = db.begin_write().map_err(|e| Error::open(path, e))?;
        txn.open_table(bucket_table(&options.bucket))
            .map_err(|e| Error::open(path, e))?;
        txn.commit().map_err(|e| Error::open(path, e))?;

        info!(path = %path.display(), bucket = %options.bucket, "KV store opened");
        Ok(Self {
            db: RwLock::new(db),
            path: path.to_path_buf(),
            bucket: options.bucket,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the bucket this store reads and writes.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Store `value` at `key`, replacing any previous value.
    ///
    /// Fails with [`Error::Serialization`] when the value has no JSON form,
    /// including NaN and infinite floats anywhere inside it.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        if key.is_empty() {
            return Err(Error::KeyRequired);
        }
        let bytes = encode(value)?;
        debug!(key = key, bytes = bytes.len(), "set");

        let db = self.write_lock();
        let txn = db.begin_write().map_err(Error::write)?;
        {
            let mut table = txn.open_table(self.table()).map_err(Error::write)?;
            table.insert(key, bytes.as_slice()).map_err(Error::write)?;
        }
        txn.commit().map_err(Error::write)
    }

    /// Decode the value stored at `key`.
    ///
    /// Fails with [`Error::NoSuchKey`] when the key is absent and with
    /// [`Error::Deserialization`] when the stored JSON does not fit `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        trace!(key = key, "get");

        let db = self.read_lock();
        let txn = db.begin_read().map_err(Error::read)?;
        let table = txn.open_table(self.table()).map_err(Error::read)?;
        let Some(bytes) = table.get(key).map_err(Error::read)? else {
            return Err(Error::NoSuchKey {
                key: key.to_string(),
            });
        };
        decode(key, bytes.value())
    }

    /// Whether `key` is present, without decoding its value.
    pub fn contains_key(&self, key: &str) -> Result<bool> {
        let db = self.read_lock();
        let txn = db.begin_read().map_err(Error::read)?;
        let table = txn.open_table(self.table()).map_err(Error::read)?;
        let found = table.get(key).map_err(Error::read)?.is_some();
        Ok(found)
    }

    /// All keys in ascending byte order.
    pub fn keys(&self) -> Result<Vec<String>> {
        trace!(bucket = %self.bucket, "keys");

        let db = self.read_lock();
        let txn = db.begin_read().map_err(Error::read)?;
        let table = txn.open_table(self.table()).map_err(Error::read)?;

        let mut keys = Vec::new();
        for entry in table.iter().map_err(Error::read)? {
            let (key, _) = entry.map_err(Error::read)?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }

    /// Visit every entry in ascending key order, decoding each value as `T`.
    ///
    /// The whole walk runs in one read transaction, so `visit` sees a
    /// consistent snapshot. Each call receives a freshly decoded value that it
    /// owns outright. The first error returned by `visit` stops the walk and is
    /// returned unchanged; store failures are converted with `E::from`.
    ///
    /// ```ignore
    /// let mut tall = Vec::new();
    /// store.get_all(|key, human: Human| -> typed_kv::Result<()> {
    ///     if human.height > 6.0 {
    ///         tall.push(key.to_string());
    ///     }
    ///     Ok(())
    /// })?;
    /// ```
    pub fn get_all<T, E, F>(&self, mut visit: F) -> std::result::Result<(), E>
    where
        T: DeserializeOwned,
        E: From<Error>,
        F: FnMut(&str, T) -> std::result::Result<(), E>,
    {
        trace!(bucket = %self.bucket, "get_all");

        let db = self.read_lock();
        let txn = db.begin_read().map_err(Error::read)?;
        let table = txn.open_table(self.table()).map_err(Error::read)?;

        for entry in table.iter().map_err(Error::read)? {
            let (key, bytes) = entry.map_err(Error::read)?;
            let key = key.value();
            let value = decode(key, bytes.value())?;
            visit(key, value)?;
        }
        Ok(())
    }

    /// Remove `key`. Removing an absent key succeeds.
    pub fn delete(&self, key: &str) -> Result<()> {
        debug!(key = key, "delete");

        let db = self.write_lock();
        let txn = db.begin_write().map_err(Error::write)?;
        {
            let mut table = txn.open_table(self.table()).map_err(Error::write)?;
            table.remove(key).map_err(Error::write)?;
        }
        txn.commit().map_err(Error::write)
    }

    /// Number of entries in the bucket.
    pub fn len(&self) -> Result<u64> {
        let db = self.read_lock();
        let txn = db.begin_read().map_err(Error::read)?;
        let table = txn.open_table(self.table()).map_err(Error::read)?;
        table.len().map_err(Error::read)
    }

    /// Whether the bucket has no entries.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Release the engine handle and the file lock.
    ///
    /// Dropping the store has the same effect; `close` makes the release
    /// point explicit.
    pub fn close(self) {
        let db = self.db.into_inner().unwrap_or_else(PoisonError::into_inner);
        drop(db);
        info!(path = %self.path.display(), "KV store closed");
    }

    // Helper methods

    fn table(&self) -> TableDefinition<'_, &'static str, &'static [u8]> {
        bucket_table(&self.bucket)
    }

    // A panicking holder cannot leave the engine half-written: its
    // transaction is aborted on drop, so the poisoned guard is safe to reuse.
    fn read_lock(&self) -> RwLockReadGuard<'_, Database> {
        self.db.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Database> {
        self.db.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn bucket_table(name: &str) -> TableDefinition<'_, &'static str, &'static [u8]> {
    TableDefinition::new(name)
}

fn open_backing_file(path: &Path, mode: u32) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true).truncate(false);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    options.open(path)
}
