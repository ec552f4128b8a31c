//! Store configuration.

use std::path::{Path, PathBuf};

/// Configuration for opening a [`DefinitionStore`](crate::DefinitionStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Where snapshots are read from and written to. `None` keeps the
    /// store in memory only.
    pub snapshot_path: Option<PathBuf>,

    /// Whether to start empty if the snapshot file doesn't exist.
    pub create_if_missing: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            create_if_missing: true,
        }
    }
}

impl StoreConfig {
    /// Creates a new in-memory configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the snapshot file.
    #[must_use]
    pub fn snapshot_path(mut self, path: impl AsRef<Path>) -> Self {
        self.snapshot_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets whether to start empty if the snapshot file is missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StoreConfig::default();
        assert!(config.create_if_missing);
        assert!(config.snapshot_path.is_none());
    }

    #[test]
    fn builder_pattern() {
        let config = StoreConfig::new()
            .snapshot_path("/tmp/xrmlink.cbor")
            .create_if_missing(false);

        assert!(!config.create_if_missing);
        assert_eq!(
            config.snapshot_path.as_deref(),
            Some(Path::new("/tmp/xrmlink.cbor"))
        );
    }
}
