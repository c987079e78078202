//! Typed key-value store module.
//!
//! A [`KvStore`] wraps one redb file and one bucket. Values are encoded as
//! JSON with `serde_json` and decoded back into the type the caller asks for.

mod codec;
mod options;
mod store;

pub use options::{ConfigError, DEFAULT_BUCKET, DEFAULT_FILE_MODE, StoreOptions};
pub use store::KvStore;
