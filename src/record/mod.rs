//! Record Module
//!
//! Encoding and decoding of key-value records in their on-disk framing.
//!
//! ## Wire Format
//! ```text
//! ┌──────────────────┬─────┬───────────────────┬────────────┐
//! │ Key (decimal)    │ ',' │ Value (raw bytes) │ 0x00       │
//! └──────────────────┴─────┴───────────────────┴────────────┘
//! ```
//!
//! The key is rendered as a signed decimal integer. Only the FIRST comma
//! separates key from value, so values may contain commas. The value must
//! not contain the delimiter byte itself; `encode` rejects such values.

mod codec;

pub use codec::{decode, encode, Record, DELIMITER};
