//! # Store Error Module
//!
//! This module defines the errors that can happen while a [`crate::database`]
//! file is being created, loaded, or mutated. Every public operation on
//! [`crate::database::Database`] returns a [`Result`] carrying one of these
//! variants instead of silently doing nothing on failure.
//!
//! #### Authorship
//!
//! - Max Fierro, 2/24/2024 (maxfierro@berkeley.edu)

use std::{error::Error, fmt, io};

use crate::utils::most_similar;

/* ERROR WRAPPER */

/// Wrapper for all store-related errors that could happen during runtime.
#[derive(Debug)]
pub enum StoreError {
    /// A field referenced by name does not exist in the table, or exists
    /// under a different type than the one requested.
    Schema {
        field: String,
        reason: String,
        candidates: Vec<String>,
    },

    /// An identifier is zero, exceeds the current record count, or names a
    /// slot that has already been tombstoned.
    NotFound { id: u32 },

    /// The underlying file operation failed.
    Io(io::Error),

    /// The file's header or record area is inconsistent with the schema it
    /// declares (truncated record, mismatched field name, negative field
    /// count, and so on).
    Corrupt { reason: String },

    /// The database handle has no schema bound to it. Unreachable through
    /// [`crate::database::Database::create`] and
    /// [`crate::database::Database::load`], which always return a fully
    /// initialized handle or an error; kept for parity with the documented
    /// error taxonomy.
    NotLoaded,
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(source) => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema {
                field,
                reason,
                candidates,
            } => {
                if candidates.is_empty() {
                    write!(f, "field '{field}': {reason}")
                } else {
                    let suggestion = most_similar(
                        field,
                        candidates
                            .iter()
                            .map(|s| &s[..])
                            .collect(),
                    );
                    write!(
                        f,
                        "field '{field}': {reason}. Perhaps you meant '{suggestion}'?"
                    )
                }
            }
            Self::NotFound { id } => {
                write!(f, "no live record with identifier {id}")
            }
            Self::Io(source) => write!(f, "I/O error: {source}"),
            Self::Corrupt { reason } => {
                write!(f, "corrupt database file: {reason}")
            }
            Self::NotLoaded => {
                write!(f, "database handle has no schema bound to it")
            }
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(source: io::Error) -> Self {
        StoreError::Io(source)
    }
}

/// Convenience alias used throughout [`crate::database`].
pub type Result<T> = std::result::Result<T, StoreError>;
