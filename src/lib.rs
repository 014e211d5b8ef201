//! Firehose core library.
//!
//! This crate models the output of static analysis tools as a single
//! `Analysis` document and reads/writes it as XML or JSON.
//!
//! High-level modules:
//! - `models`: The document tree (metadata, results, locations, custom fields).
//! - `xml`: Owned element tree over `quick-xml`, used by every model codec.
//! - `json`: Descriptor-driven JSON encoding shared by the models.
//! - `visitor`: Pre-order traversal, read-only and mutating.
//! - `fixup`: Absolute path and content hash resolution for referenced files.
//! - `document`: Load/save helpers with wire-format detection.
//! - `report`: GCC-style diagnostic rendering.
//! - `config`: Discovery and effective configuration resolution.
//! - `cli`: CLI argument parsing (binary uses this).
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod fixup;
pub mod json;
pub mod models;
pub mod report;
pub mod visitor;
pub mod xml;

pub use error::{Error, Result};
pub use models::*;
