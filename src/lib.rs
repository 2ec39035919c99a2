//! # Recordbase
//!
//! An embeddable, single-file flat-table record store. A [`database::Table`]
//! declares a fixed set of named, typed columns; a [`database::Database`]
//! persists fixed-width records against that schema in one binary file,
//! supporting insertion, in-place update, linear search, tombstone-based
//! removal, and threshold-triggered compaction.
//!
//! #### Authorship
//!
//! - Max Fierro, 2/24/2024 (maxfierro@berkeley.edu)

pub mod database;
pub mod utils;

pub use database::{Database, Field, FieldType, Record, Result, StoreError, Table};
