//! Error types for the typed-kv library.
//!
//! Every store operation returns [`Error`]. Engine failures are carried as
//! [`redb::Error`] so callers can still inspect the underlying cause.

use std::path::PathBuf;

use thiserror::Error;

use crate::logging::warn;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The backing file could not be created, opened, or prepared.
    #[error("failed to open store at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: redb::Error,
    },

    /// The requested key is not present in the bucket.
    #[error("no such key \"{key}\"")]
    NoSuchKey { key: String },

    /// Keys must be non-empty.
    #[error("key required")]
    KeyRequired,

    /// A value could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Stored bytes could not be decoded into the requested type.
    #[error("deserialization error for key \"{key}\": {source}")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A read-write transaction failed.
    #[error("write failed: {0}")]
    Write(#[source] redb::Error),

    /// A read-only transaction failed.
    #[error("read failed: {0}")]
    Read(#[source] redb::Error),
}

/// A [`Result`] type alias using the crate [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn open<S: Into<redb::Error>>(path: impl Into<PathBuf>, source: S) -> Self {
        let path = path.into();
        let source = source.into();
        warn!(path = %path.display(), error = %source, "open failed");
        Self::Open { path, source }
    }

    pub(crate) fn write<S: Into<redb::Error>>(source: S) -> Self {
        let source = source.into();
        warn!(error = %source, "write transaction failed");
        Self::Write(source)
    }

    pub(crate) fn read<S: Into<redb::Error>>(source: S) -> Self {
        let source = source.into();
        warn!(error = %source, "read transaction failed");
        Self::Read(source)
    }

    /// Returns `true` if this is a missing-key error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoSuchKey { .. })
    }

    /// Returns `true` if the value could not be encoded or decoded.
    pub fn is_codec(&self) -> bool {
        matches!(self, Self::Serialization(_) | Self::Deserialization { .. })
    }

    /// The key this error refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::NoSuchKey { key } | Self::Deserialization { key, .. } => Some(key),
            _ => None,
        }
    }
}
