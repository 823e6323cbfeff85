//! Seqdelta: greedy ADD/COPY delta encoding between two byte buffers.
//!
//! A diff is a plain-text stream of instructions: `A<len>:<bytes>` appends
//! literal bytes and `C<len>,<offset>` appends a run copied from the old
//! buffer.  Replaying the instructions against the old buffer reproduces
//! the new buffer exactly.
//!
//! The crate provides:
//! - An 8-byte sequence index and greedy match finder (`hash`)
//! - The instruction format: serialization, parsing, replay (`diff`)
//! - High-level encode/decode APIs (`engine`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use seqdelta::engine;
//!
//! let old = b"abcdefghij";
//! let new = b"abcdefghijXYZ";
//!
//! let diff = engine::encode(old, new);
//! assert_eq!(diff, b"C10,0A3:XYZ");
//! let decoded = engine::decode(old, &diff).unwrap();
//! assert_eq!(decoded, new);
//! ```

pub mod diff;
pub mod engine;
pub mod hash;
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;
