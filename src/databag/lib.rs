//! # Databag
//!
//! Databag is a **schemaless attribute bag**: a string-keyed map of dynamically
//! typed values that serializes to a JSON object and persists as a single
//! database column. It is meant for the "metadata" column every table ends up
//! with, where the application wants to stash arbitrary key/value pairs without
//! a migration for each one.
//!
//! ```text
//! ┌──────────────────────┐  encode_json / value()   ┌────────────────────┐
//! │  AttributeBag        │ ───────────────────────▶ │  {"k": ...}  bytes │
//! │  key → Value         │ ◀─────────────────────── │  column / wire     │
//! └──────────────────────┘  decode_json / scan()    └────────────────────┘
//! ```
//!
//! ## The Contract in One Paragraph
//!
//! Reads never fail. The typed accessors (`get_string`, `get_int64`, ...)
//! return the zero value of their shape when a key is missing, null, or holds a
//! different variant, and they never coerce between numeric widths. Decoding
//! JSON yields floats for every number, so integer accessors see nothing after a
//! decode unless the caller opts into [`AttributeBag::normalize_integers`] (or
//! [`ScanConfig::normalize_integers`]). Writes, decodes and scans are
//! fallible only where the input can be malformed, and every failure is a
//! [`BagError`] returned to the immediate caller.
//!
//! ## Null vs Empty
//!
//! A bag with no backing map ([`AttributeBag::null`], also the `Default`) is
//! what a SQL `NULL` scans into. It reads as empty, encodes as `{}`, and must
//! not be written to. [`AttributeBag::new`] gives an allocated, empty bag.
//!
//! ## Threading
//!
//! The bag is a plain value: reads take `&self`, mutations take `&mut self`,
//! and there is no internal locking. Share it across threads the way any other
//! owned value is shared.
//!
//! ## Module Overview
//!
//! - [`bag`]: [`AttributeBag`], typed accessors, predicates and equality
//! - [`value`]: the closed [`Value`] enum and [`Opaque`] native values
//! - [`json`]: serde impls and the JSON encode / decode entry points
//! - [`driver`]: [`DriverValue`] and the [`ColumnCodec`] storage seam
//! - [`config`]: [`ScanConfig`], plain serde settings a host embeds in its own config
//! - [`error`]: Error types

pub mod bag;
pub mod config;
pub mod driver;
pub mod error;
pub mod json;
pub mod value;

pub use bag::{zero_time, AttributeBag};
pub use config::{ScanConfig, TextScan};
pub use driver::{ColumnCodec, DriverValue};
pub use error::{BagError, Result};
pub use value::{Opaque, Value};
