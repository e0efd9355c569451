//! Imgpatch: IMGDIFF2 image patch application in Rust.
//!
//! Reconstructs a target image (an Android recovery image) from a source
//! image (the matching boot image), an IMGDIFF2 patch stream, and an
//! optional bonus data blob. The crate provides:
//! - The wire-format parser (`format`)
//! - The chunk-processing engine (`engine`)
//! - Raw-deflate parameter replay (`deflate`)
//! - File and OTA-archive entry points (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use std::io::Cursor;
//!
//! let source = std::fs::read("boot.img").unwrap();
//! let patch = std::fs::read("recovery-from-boot.p").unwrap();
//!
//! let mut output = Cursor::new(Vec::new());
//! let stats = imgpatch::apply(&source, &patch, None, &mut output).unwrap();
//! assert_eq!(stats.output_len, output.get_ref().len() as u64);
//! ```

pub mod deflate;
pub mod delta;
pub mod engine;
pub mod error;
pub mod format;
pub mod io;
pub mod source;

#[cfg(feature = "cli")]
pub mod cli;

pub use engine::{ApplyStats, apply, apply_with};
pub use error::ApplyError;
