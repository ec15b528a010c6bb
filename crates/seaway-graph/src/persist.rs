//! Binary encoding of a [`VisGraph`].
//!
//! The payload is a bincode envelope: a four-byte magic, a format
//! version, then the obstacle graph and visibility graph. The layout is
//! private to this crate; files are only ever read back by the same
//! code that wrote them.

use serde::{Deserialize, Serialize};

use crate::builder::VisGraph;

/// Leading bytes of every encoded graph.
pub const MAGIC: [u8; 4] = *b"SWVG";

/// Version written by [`to_bytes`].
pub const FORMAT_VERSION: u32 = 1;

/// Errors from encoding or decoding a graph.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Serialization failed.
    #[error("failed to encode graph: {0}")]
    Encode(#[source] bincode::Error),

    /// The bytes are not a graph this crate wrote.
    #[error("failed to decode graph: {0}")]
    Decode(#[source] bincode::Error),

    /// The magic bytes did not match.
    #[error("not a graph file")]
    BadMagic,

    /// The file was written by an incompatible format version.
    #[error("unsupported graph format version {found} (expected {FORMAT_VERSION})")]
    UnsupportedVersion {
        /// Version found in the header.
        found: u32,
    },
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    magic: [u8; 4],
    version: u32,
    graph: &'a VisGraph,
}

#[derive(Deserialize)]
struct Header {
    magic: [u8; 4],
    version: u32,
}

/// Encode `graph`.
///
/// # Errors
///
/// Returns [`PersistError::Encode`] if serialization fails.
pub fn to_bytes(graph: &VisGraph) -> Result<Vec<u8>, PersistError> {
    bincode::serialize(&EnvelopeRef {
        magic: MAGIC,
        version: FORMAT_VERSION,
        graph,
    })
    .map_err(PersistError::Encode)
}

/// Decode a graph written by [`to_bytes`].
///
/// # Errors
///
/// Returns [`PersistError::BadMagic`] or
/// [`PersistError::UnsupportedVersion`] if the header does not match,
/// and [`PersistError::Decode`] if the payload is malformed.
pub fn from_bytes(bytes: &[u8]) -> Result<VisGraph, PersistError> {
    let header: Header = bincode::deserialize(bytes).map_err(PersistError::Decode)?;
    if header.magic != MAGIC {
        return Err(PersistError::BadMagic);
    }
    if header.version != FORMAT_VERSION {
        return Err(PersistError::UnsupportedVersion {
            found: header.version,
        });
    }
    let (_, graph): (Header, VisGraph) =
        bincode::deserialize(bytes).map_err(PersistError::Decode)?;
    Ok(graph)
}
