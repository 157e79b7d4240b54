//! Engine Module
//!
//! The storage engine that owns the segment list.
//!
//! ## Responsibilities
//! - Discover and replay existing segments on startup
//! - Route appends to the single active segment
//! - Rotate to a new segment when the size threshold would be exceeded
//! - Fan reads out across segments newest → oldest

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Result, SegKvError};
use crate::record;
use crate::segment::Segment;

/// The main storage engine
///
/// ## Concurrency Model: Single-Threaded
///
/// Every operation blocks on file I/O and returns before the next may
/// begin. Writes take `&mut self`, so the borrow checker serializes all
/// mutation; there are no locks because there is no concurrency. A
/// production extension would need a single-writer lock around rotation
/// and a read-write lock per segment index.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Segments ordered newest → oldest; front is the only write target.
    /// Invariant: never empty after `open`, and only the front is active.
    segments: Vec<Segment>,

    /// Id assigned to the next segment created by rotation
    next_segment_id: u64,
}

impl Engine {
    /// Segment file extension
    const SEGMENT_EXT: &'static str = "log";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory if it doesn't exist
    /// 2. Discover existing segment files by name
    /// 3. Replay each one oldest → newest to rebuild its index
    /// 4. Resume the highest-id segment as active, seal the rest
    /// 5. If no segments exist, create segment 1
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        // Discover existing segments; foreign files are ignored
        let mut segment_ids: Vec<u64> = Vec::new();
        for entry in fs::read_dir(&config.data_dir)? {
            let entry = entry?;
            let file_path = entry.path();

            if file_path.is_file() {
                if let Some(id) = Self::parse_segment_id(&file_path, &config.file_prefix) {
                    segment_ids.push(id);
                }
            }
        }
        segment_ids.sort_unstable();

        // Replay oldest → newest, then flip so the newest is at the front
        let mut segments = Vec::with_capacity(segment_ids.len());
        let mut records_indexed = 0u64;
        let mut records_skipped = 0u64;

        for &id in &segment_ids {
            let path = Self::segment_path_with_dir(&config.data_dir, &config.file_prefix, id);
            let segment = Segment::open(&path, id, config.sync_strategy)?;

            let report = segment.replay_report();
            records_indexed += report.records_indexed;
            records_skipped += report.records_skipped;
            tracing::debug!(
                segment_id = id,
                records = report.records_indexed,
                skipped = report.records_skipped,
                bytes = report.bytes_scanned,
                "replayed segment"
            );

            segments.push(segment);
        }
        segments.reverse();

        // All but the newest are permanently read-only
        for segment in segments.iter_mut().skip(1) {
            segment.seal()?;
        }

        if !segments.is_empty() {
            if records_skipped > 0 {
                tracing::warn!(
                    segments = segments.len(),
                    records_indexed,
                    records_skipped,
                    "recovery complete with skipped records"
                );
            } else {
                tracing::info!(
                    segments = segments.len(),
                    records_indexed,
                    "recovery complete"
                );
            }
        }

        let next_segment_id = segment_ids.last().map(|&id| id + 1).unwrap_or(1);

        let mut engine = Self {
            config,
            segments,
            next_segment_id,
        };

        // Fresh start: segment 1 becomes the sole member and write target
        if engine.segments.is_empty() {
            engine.create_segment()?;
        }

        Ok(engine)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses the default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    /// Set a key-value pair
    ///
    /// Steps:
    /// 1. Encode the record
    /// 2. Rotate first if the active segment would exceed the size limit
    /// 3. Append to the active segment — a record is never split across two
    ///    segments, so an oversized record lands whole in a fresh one
    pub fn set(&mut self, key: i64, value: &[u8]) -> Result<()> {
        let encoded = record::encode(key, value)?;
        let n = encoded.len() as u64;

        // An empty active segment is already as fresh as a rotation would
        // make it, so an oversized record goes straight in.
        let active_bytes = self.active().total_bytes();
        if active_bytes > 0 && active_bytes + n > self.config.segment_size_limit {
            self.rotate()?;
        }

        self.segments[0].append(key, &encoded)
    }

    /// Get a value by key
    ///
    /// Scans segments newest → oldest and returns the first hit. This scan
    /// order makes last-write-wins hold globally: a key rewritten after a
    /// rotation lives in a newer segment, which is checked first.
    pub fn get(&self, key: i64) -> Result<Option<Vec<u8>>> {
        for segment in &self.segments {
            match segment.get(key) {
                Ok(value) => return Ok(Some(value)),
                Err(SegKvError::KeyNotFound) => continue,
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(key, "key not found in any segment");
        Ok(None)
    }

    /// Close the engine gracefully
    ///
    /// Seals the active segment so pending writes are synced to disk.
    pub fn close(mut self) -> Result<()> {
        if let Some(active) = self.segments.first_mut() {
            active.seal()?;
        }
        Ok(())
    }

    // =========================================================================
    // Rotation
    // =========================================================================

    /// Seal the active segment and create the next one
    fn rotate(&mut self) -> Result<()> {
        if let Some(active) = self.segments.first_mut() {
            active.seal()?;
        }
        self.create_segment()
    }

    /// Create a new segment and make it the active write target
    fn create_segment(&mut self) -> Result<()> {
        let id = self.next_segment_id;
        self.next_segment_id += 1;

        let path = self.segment_path(id);
        let segment = Segment::open(&path, id, self.config.sync_strategy)?;
        self.segments.insert(0, segment);

        tracing::info!(segment_id = id, path = %path.display(), "created active segment");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the number of segments (active + sealed)
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Get the id of the active segment
    pub fn active_segment_id(&self) -> u64 {
        self.active().id()
    }

    /// Get the cumulative bytes written to the active segment
    pub fn active_total_bytes(&self) -> u64 {
        self.active().total_bytes()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// The active segment — front of the list (invariant: list never empty)
    fn active(&self) -> &Segment {
        &self.segments[0]
    }

    /// Generate the file path for a segment with the given id
    fn segment_path(&self, id: u64) -> PathBuf {
        Self::segment_path_with_dir(&self.config.data_dir, &self.config.file_prefix, id)
    }

    /// Generate a segment path given a directory, prefix, and id
    fn segment_path_with_dir(dir: &Path, prefix: &str, id: u64) -> PathBuf {
        dir.join(format!("{}_{:06}.{}", prefix, id, Self::SEGMENT_EXT))
    }

    /// Parse a segment id from a filename
    /// "segment_000042.log" → Some(42)
    fn parse_segment_id(path: &Path, prefix: &str) -> Option<u64> {
        if path.extension()?.to_str()? != Self::SEGMENT_EXT {
            return None;
        }
        let name = path.file_stem()?.to_string_lossy();
        let id_str = name.strip_prefix(prefix)?.strip_prefix('_')?;
        id_str.parse().ok()
    }

    /// Compact sealed segments (future — merges them, dropping superseded keys)
    #[allow(dead_code)]
    fn compact(&mut self) -> Result<()> {
        todo!("Implement compaction of sealed segments in V2")
    }
}
