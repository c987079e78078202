//! Convenient re-exports for common usage patterns.
//!
//! ```ignore
//! use typed_kv::prelude::*;
//!
//! let store = KvStore::open_with_options("app.redb", StoreOptions::new().bucket("users"))?;
//! ```

pub use crate::error::{Error, Result};
pub use crate::kv::{ConfigError, KvStore, StoreOptions};
