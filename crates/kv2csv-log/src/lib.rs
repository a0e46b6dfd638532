//! # kv2csv log conversion
//!
//! Streaming converter for semi-structured log files whose lines embed
//! arbitrary `key=value` fields (optionally quoted), turning them into a
//! uniform CSV file.
//!
//! ## Overview
//!
//! The field set of such a log is unknown until the whole file has been
//! read, but a CSV header must be complete before the first data row is
//! written. The crate therefore runs two streaming passes over the input,
//! keeping memory bounded on arbitrarily large files:
//!
//! 1. [`discover_fields`] scans the file once and collects the union of
//!    every field name seen, sorted lexicographically.
//! 2. [`write_csv`] scans the file a second time and writes one CSV record
//!    per non-blank line, with one cell per discovered field name and
//!    empty cells where a line lacks a field.
//!
//! ```text
//! ┌──────────────┐  discover_fields  ┌──────────────┐
//! │   .log file  │ ────────────────▶ │ Vec<String>  │ (sorted field names)
//! │  (streaming) │                   └──────┬───────┘
//! └──────────────┘                          │ write_csv
//!        ▲                                  ▼
//!        └────────── second scan ──▶  <name>.csv
//! ```
//!
//! The sorted field list is the only state bridging the passes; line
//! records are built and discarded per line.
//!
//! ## Field grammar
//!
//! [`extract_fields`](fields::extract_fields) tokenizes loosely-quoted
//! `key=value` pairs from free-form text with a small hand-rolled scanner;
//! see the [`fields`] module for the exact rules. A line that matches
//! nothing yields an empty record, never an error.
//!
//! ## Decoding policy
//!
//! Input is decoded as UTF-8 with lossy replacement of invalid sequences.
//! Bad bytes never fail a pass; only real I/O errors do, surfaced as
//! [`ConvertError`].
//!
//! ## Example
//!
//! ```no_run
//! use kv2csv_log::{discover_fields, write_csv, NoProgress};
//! use std::path::Path;
//!
//! let input = Path::new("firewall.log");
//! let fields = discover_fields(input, &mut NoProgress)?;
//! let rows = write_csv(input, &fields, Path::new("firewall.log.csv"), &mut NoProgress)?;
//! println!("{rows} rows across {} columns", fields.len());
//! # Ok::<(), kv2csv_log::ConvertError>(())
//! ```
//!
//! Both passes report byte-level progress through the [`Progress`] trait;
//! pass [`NoProgress`] when no reporting is wanted.

/// The two streaming conversion passes and their error type.
pub mod convert;
/// Line-level `key=value` field extraction.
pub mod fields;
/// Progress reporting seam.
pub mod progress;


pub use convert::{discover_fields, write_csv, ConvertError};
pub use fields::extract_fields;
pub use progress::{NoProgress, Progress};
