//! Segment Module
//!
//! One segment = one append-only log file + one in-memory index.
//!
//! ## Responsibilities
//! - Durable sequential appends to the segment file
//! - O(1) point lookups via the in-memory index
//! - Index rebuild by replaying the file on startup (crash recovery)
//! - Active → Sealed lifecycle (sealed segments are read-only)
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ Record 1:  <key> ',' <value> 0x00        │
//! ├──────────────────────────────────────────┤
//! │ Record 2:  <key> ',' <value> 0x00        │
//! ├──────────────────────────────────────────┤
//! │ ...                                      │
//! └──────────────────────────────────────────┘
//! ```
//! No header, no length prefix, no checksum. A record superseding an earlier
//! write of the same key is simply appended; the older span becomes
//! unreachable garbage until a future compaction pass reclaims it.

mod index;
mod log;
mod replay;

pub use index::{Location, SegmentIndex};
pub use log::{Segment, SegmentState};
pub use replay::ReplayReport;
