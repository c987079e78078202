//! A typed key-value store over a single-file B-tree.
//!
//! typed-kv maps string keys to any `serde` value inside one named bucket of
//! a [redb](https://docs.rs/redb) database file. Every operation is a single
//! engine transaction, and a per-store readers-writer lock lets many threads
//! share one store.
//!
//! # Quick Start
//!
//! ```ignore
//! use typed_kv::prelude::*;
//!
//! let store = KvStore::open("app.redb")?;
//!
//! store.set("hello", "world")?;
//! let greeting: String = store.get("hello")?;
//!
//! assert_eq!(store.keys()?, vec!["hello".to_string()]);
//! store.delete("hello")?;
//! ```
//!
//! # Modules
//!
//! - [`kv`] - The store and its options
//! - [`error`] - Error types
//! - [`prelude`] - Convenient re-exports
//!
//! # Feature Flags
//!
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `cli` - Build the `typed-kv` command-line binary
//! - `full` - Enable all features

pub mod error;
pub mod kv;
mod logging;
pub mod prelude;

pub use error::{Error, Result};
pub use kv::{ConfigError, KvStore, StoreOptions};
