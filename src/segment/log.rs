//! Segment
//!
//! Owns one append-only log file: durable appends while active, point
//! lookups for its whole lifetime.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::{Result, SegKvError};
use crate::record::{self, DELIMITER};

use super::replay::{replay, ReplayReport};
use super::SegmentIndex;

/// Segment lifecycle state
///
/// Tagged state rather than a type hierarchy, so a future compaction pass
/// can select sealed segments from a homogeneous list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    /// Sole write target of the engine
    Active,

    /// Permanently read-only after a rotation
    Sealed,
}

/// One append-only log file plus its in-memory index
pub struct Segment {
    /// Monotonically increasing segment id (1-based)
    id: u64,

    /// Path of the segment file
    path: PathBuf,

    /// Key → byte span of the most recent record; owns the write cursor
    index: SegmentIndex,

    /// Exclusive append handle — `Some` only while active
    writer: Option<File>,

    /// Active or Sealed
    state: SegmentState,

    /// How often appends are fsynced
    sync_strategy: SyncStrategy,

    /// Appends since the last fsync (EveryNRecords bookkeeping)
    unsynced_records: usize,

    /// Replay summary from open (all zeroes for a fresh segment)
    replay_report: ReplayReport,
}

impl Segment {
    /// Open or create a segment
    ///
    /// If the file exists it is replayed first to rebuild the index; a
    /// missing file means a fresh segment with nothing to recover. Either
    /// way the file is then opened in append mode and the segment starts
    /// out active.
    pub fn open(path: &Path, id: u64, sync_strategy: SyncStrategy) -> Result<Self> {
        let (index, replay_report) = if path.exists() {
            let (index, report) = replay(path)?;
            debug_assert_eq!(index.cursor(), std::fs::metadata(path)?.len());
            (index, report)
        } else {
            (SegmentIndex::new(), ReplayReport::default())
        };

        let writer = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            id,
            path: path.to_path_buf(),
            index,
            writer: Some(writer),
            state: SegmentState::Active,
            sync_strategy,
            unsynced_records: 0,
            replay_report,
        })
    }

    /// Append one encoded record and index it
    ///
    /// The bytes are made durable according to the sync strategy before the
    /// index is updated. Fails with `SegmentSealed` after a rotation.
    pub fn append(&mut self, key: i64, encoded: &[u8]) -> Result<()> {
        let writer = match (self.state, self.writer.as_mut()) {
            (SegmentState::Active, Some(writer)) => writer,
            _ => return Err(SegKvError::SegmentSealed { id: self.id }),
        };

        writer.write_all(encoded)?;

        match self.sync_strategy {
            SyncStrategy::EveryWrite => writer.sync_data()?,
            SyncStrategy::EveryNRecords { count } => {
                self.unsynced_records += 1;
                if self.unsynced_records >= count {
                    writer.sync_data()?;
                    self.unsynced_records = 0;
                }
            }
        }

        self.index.add(key, encoded.len() as u64);
        Ok(())
    }

    /// Get the value for a key — point lookup via the index
    ///
    /// Opens a transient read handle, seeks to the record's offset, reads
    /// exactly its span, and returns the value as freshly owned bytes.
    /// Returns `KeyNotFound` if the key has no live entry in this segment.
    pub fn get(&self, key: i64) -> Result<Vec<u8>> {
        let location = self.index.lookup(key).ok_or(SegKvError::KeyNotFound)?;
        if location.size == 0 {
            return Err(SegKvError::KeyNotFound);
        }

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(location.offset))?;

        let mut frame = vec![0u8; location.size as usize];
        file.read_exact(&mut frame)?;

        if frame.pop() != Some(DELIMITER) {
            return Err(SegKvError::CorruptRecord(format!(
                "record at offset {} is not delimiter-terminated",
                location.offset
            )));
        }

        let rec = record::decode(&frame)?;
        debug_assert_eq!(rec.key, key);
        Ok(rec.value.to_vec())
    }

    /// Seal the segment: flush pending writes and drop the append handle
    ///
    /// Idempotent; a sealed segment only serves reads.
    pub fn seal(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.sync_data()?;
        }
        self.state = SegmentState::Sealed;
        Ok(())
    }

    /// Cumulative bytes written to this segment
    ///
    /// Single source of truth is the index cursor, which tracks every byte
    /// consumed during replay and every byte appended since.
    pub fn total_bytes(&self) -> u64 {
        self.index.cursor()
    }

    // =========================================================================
    // Accessors (for the engine, tests, and debugging)
    // =========================================================================

    /// Segment id
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Path of the segment file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current lifecycle state
    pub fn state(&self) -> SegmentState {
        self.state
    }

    /// Check if the segment has been sealed
    pub fn is_sealed(&self) -> bool {
        self.state == SegmentState::Sealed
    }

    /// Number of live keys in this segment's index
    pub fn entry_count(&self) -> usize {
        self.index.len()
    }

    /// Replay summary captured when the segment was opened
    pub fn replay_report(&self) -> ReplayReport {
        self.replay_report
    }
}
