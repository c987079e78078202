//! Store options and their TOML form.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Bucket used when none is configured.
pub const DEFAULT_BUCKET: &str = "typed-kv";

/// Permission bits for a newly created store file (owner read/write).
pub const DEFAULT_FILE_MODE: u32 = 0o600;

/// Options applied when opening a [`KvStore`](super::KvStore).
///
/// Every field is optional in the TOML form:
///
/// ```toml
/// bucket = "sessions"
/// file_mode = 0o640
/// cache_size = 67108864
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreOptions {
    /// Name of the bucket the store reads and writes.
    pub bucket: String,
    /// Unix permission bits used when the file is created. Ignored elsewhere.
    pub file_mode: u32,
    /// Engine page cache size in bytes. `None` keeps the engine default.
    pub cache_size: Option<usize>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            file_mode: DEFAULT_FILE_MODE,
            cache_size: None,
        }
    }
}

impl StoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bucket name.
    #[must_use]
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    /// Set the permission bits for a newly created file.
    #[must_use]
    pub const fn file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    /// Set the engine cache size.
    #[must_use]
    pub const fn cache_size(mut self, bytes: usize) -> Self {
        self.cache_size = Some(bytes);
        self
    }

    /// Load options from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e))?;
        Self::from_toml_str(&content)
    }

    /// Parse options from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }
}

/// Errors raised while loading [`StoreOptions`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{0}': {1}")]
    Io(String, #[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = StoreOptions::default();
        assert_eq!(options.bucket, DEFAULT_BUCKET);
        assert_eq!(options.file_mode, 0o600);
        assert_eq!(options.cache_size, None);
    }

    #[test]
    fn test_builder() {
        let options = StoreOptions::new()
            .bucket("sessions")
            .file_mode(0o640)
            .cache_size(1024 * 1024);
        assert_eq!(options.bucket, "sessions");
        assert_eq!(options.file_mode, 0o640);
        assert_eq!(options.cache_size, Some(1024 * 1024));
    }

    #[test]
    fn test_parse_partial_toml() -> anyhow::Result<()> {
        let options = StoreOptions::from_toml_str(r#"bucket = "humans""#)?;
        assert_eq!(options.bucket, "humans");
        assert_eq!(options.file_mode, DEFAULT_FILE_MODE);
        assert_eq!(options.cache_size, None);
        Ok(())
    }

    #[test]
    fn test_parse_full_toml() -> anyhow::Result<()> {
        let toml = r#"
bucket = "sessions"
file_mode = 0o640
cache_size = 67108864
"#;
        let options = StoreOptions::from_toml_str(toml)?;
        assert_eq!(
            options,
            StoreOptions::new()
                .bucket("sessions")
                .file_mode(0o640)
                .cache_size(67_108_864)
        );
        Ok(())
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = StoreOptions::from_toml_str("buckets = \"typo\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = StoreOptions::from_file("/nonexistent/typed-kv.toml");
        assert!(matches!(result, Err(ConfigError::Io(path, _)) if path.contains("typed-kv.toml")));
    }
}
