//! Error type for filesystem operations.

use std::path::PathBuf;

use seaway_graph::{GraphError, PersistError};

/// Errors from reading sources or reading and writing graph files.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// The filesystem operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A graph file could not be encoded or decoded.
    #[error(transparent)]
    Persist(#[from] PersistError),

    /// A ring file is not valid JSON of the expected shape.
    #[error("invalid ring file: {0}")]
    Json(#[from] serde_json::Error),

    /// Building or merging the graph failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// An operation needs at least one input file.
    #[error("no input graph files")]
    NoInputs,

    /// A specific file could not be opened or read.
    #[error("{path}: {source}")]
    File {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },
}

impl IoError {
    pub(crate) fn file(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::File { path, source }
    }
}
