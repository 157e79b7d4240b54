//! Configuration for SegKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, SegKvError};

/// Main configuration for a SegKV engine instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all segment files.
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── {file_prefix}_000001.log   (oldest segment)
    ///     ├── {file_prefix}_000002.log
    ///     └── {file_prefix}_000003.log   (active segment)
    pub data_dir: PathBuf,

    /// Filename prefix for segment files
    pub file_prefix: String,

    // -------------------------------------------------------------------------
    // Rotation Configuration
    // -------------------------------------------------------------------------
    /// Max size of the active segment before rotation (in bytes)
    pub segment_size_limit: u64,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync the active segment
    pub sync_strategy: SyncStrategy,
}

/// Segment sync strategy
#[derive(Debug, Clone, Copy)]
pub enum SyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced records (balanced durability/performance)
    EveryNRecords { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./segkv_data"),
            file_prefix: "segment".to_string(),
            segment_size_limit: 4 * 1024 * 1024, // 4 MB
            sync_strategy: SyncStrategy::EveryWrite,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validate the configuration before opening an engine
    pub fn validate(&self) -> Result<()> {
        if self.segment_size_limit == 0 {
            return Err(SegKvError::Config(
                "segment_size_limit must be greater than zero".to_string(),
            ));
        }
        if self.file_prefix.is_empty() {
            return Err(SegKvError::Config(
                "file_prefix must not be empty".to_string(),
            ));
        }
        if self.file_prefix.contains(std::path::is_separator) {
            return Err(SegKvError::Config(format!(
                "file_prefix must not contain a path separator: {:?}",
                self.file_prefix
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all segment files)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the segment filename prefix
    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.file_prefix = prefix.into();
        self
    }

    /// Set the per-segment size limit (in bytes)
    pub fn segment_size_limit(mut self, bytes: u64) -> Self {
        self.config.segment_size_limit = bytes;
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
