//! Segment Index
//!
//! In-memory mapping from key to the byte span of its most recent record
//! within one segment file, plus the running write cursor.

use std::collections::HashMap;

/// Byte span of one encoded record within a segment file
///
/// The span covers the full frame including the trailing delimiter. Spans of
/// distinct records never overlap: a record's offset equals the file length
/// at the moment it was appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Byte offset of the record's first byte
    pub offset: u64,

    /// Total encoded length, delimiter included
    pub size: u64,
}

/// Per-segment index: key → most recent Location
///
/// Append-only bookkeeping: `add` always records at the current cursor, so
/// offsets are monotonically non-decreasing. Last write wins per key; the
/// superseded Location is dropped and its file span becomes unreachable.
#[derive(Debug, Default)]
pub struct SegmentIndex {
    entries: HashMap<i64, Location>,
    cursor: u64,
}

impl SegmentIndex {
    /// Create an empty index with the cursor at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key at the current cursor and advance by `size`
    pub fn add(&mut self, key: i64, size: u64) {
        self.entries.insert(
            key,
            Location {
                offset: self.cursor,
                size,
            },
        );
        self.cursor += size;
    }

    /// Advance the cursor without adding an entry
    ///
    /// Used by replay to step over a corrupt span so the cursor keeps
    /// tracking the real file position.
    pub fn advance(&mut self, size: u64) {
        self.cursor += size;
    }

    /// Look up the most recent Location for a key
    pub fn lookup(&self, key: i64) -> Option<Location> {
        self.entries.get(&key).copied()
    }

    /// Current write cursor — equals the sum of all span sizes consumed
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Number of live keys in the index
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index holds no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all entries and zero the cursor
    pub fn reset(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}
