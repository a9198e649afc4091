//! Error types surfaced by the overlay library.
//!
//! Identity mismatches and projection misses are ordinary states handled
//! inside [`TrackedShip`](crate::ship::TrackedShip); only failures a caller can
//! act on are represented here.

use std::path::PathBuf;

use thiserror::Error;

use crate::memory::Address;

/// Failure reading the external process's memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    /// No readable region covers the requested range.
    #[error("no readable memory at {address} ({len} bytes)")]
    Unmapped {
        /// Start of the requested range.
        address: Address,
        /// Length of the requested range in bytes.
        len: usize,
    },
    /// Applying an offset to an address overflowed the address space.
    #[error("offset {offset:#x} from {base} overflows the address space")]
    AddressOverflow {
        /// Address the offset was applied to.
        base: Address,
        /// Offset that overflowed.
        offset: u64,
    },
}

/// Reasons a ship record could not be created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// The actor's raw kind label has no entry in the name table.
    #[error("unknown ship kind `{0}`")]
    UnknownKind(String),
    /// The actor's memory could not be read while resolving it.
    #[error("failed to resolve actor: {0}")]
    Access(#[from] AccessError),
}

/// Failure loading configuration, name tables or replay scenes.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The document was not valid JSON for the expected shape.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
