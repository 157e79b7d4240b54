//! # SegKV
//!
//! A minimal log-structured key-value store with:
//! - Append-only segment files for sequential write durability
//! - Per-segment in-memory indexes for O(1) point lookups
//! - Crash recovery by replaying segment files on startup
//! - Size-based segment rotation
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Engine                                │
//! │         (rotation · newest-first read fan-out)               │
//! └───────┬─────────────────────┬─────────────────────┬─────────┘
//!         │                     │                     │
//!         ▼                     ▼                     ▼
//!  ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//!  │  Segment 3  │       │  Segment 2  │       │  Segment 1  │
//!  │  (active)   │       │  (sealed)   │       │  (sealed)   │
//!  ├─────────────┤       ├─────────────┤       ├─────────────┤
//!  │ Index + Log │       │ Index + Log │       │ Index + Log │
//!  └─────────────┘       └─────────────┘       └─────────────┘
//! ```
//!
//! Writes are encoded by the record codec and appended to the active
//! segment, which keeps a key → byte-span index. Reads consult each
//! segment's index newest → oldest, so the most recent write always wins.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod segment;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, SegKvError};
pub use config::{Config, SyncStrategy};
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SegKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
