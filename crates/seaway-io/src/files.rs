//! Graph files on disk.
//!
//! A graph folder holds up to two files: `default`, built from the
//! coastline as given, and `meridian`, built from the coastline in the
//! rotated frame. Each file is one graph in the `seaway_graph::persist`
//! encoding.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use seaway_graph::{GraphError, GraphVariant, VisGraph, merge_graphs, persist};

use crate::error::IoError;

/// File name of the default graph inside a graph folder.
pub const DEFAULT_GRAPH_FILE: &str = "default";

/// File name of the meridian graph inside a graph folder.
pub const MERIDIAN_GRAPH_FILE: &str = "meridian";

/// Locations of the graph files in one folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphFilePaths {
    folder: PathBuf,
}

impl GraphFilePaths {
    /// Paths inside `folder`.
    #[must_use]
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// The graph folder.
    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// `folder/default`: the graph built from unshifted input.
    #[must_use]
    pub fn default_graph_path(&self) -> PathBuf {
        self.folder.join(DEFAULT_GRAPH_FILE)
    }

    /// `folder/meridian`: the graph built in the rotated frame.
    #[must_use]
    pub fn meridian_graph_path(&self) -> PathBuf {
        self.folder.join(MERIDIAN_GRAPH_FILE)
    }

    /// Path of the graph built in `variant`'s frame.
    #[must_use]
    pub fn path_for(&self, variant: GraphVariant) -> PathBuf {
        match variant {
            GraphVariant::Default => self.default_graph_path(),
            GraphVariant::Meridian => self.meridian_graph_path(),
        }
    }
}

/// Encode `graph` and write it to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`IoError::Persist`] if encoding fails and [`IoError::File`]
/// if the file cannot be written.
pub fn save_graph(graph: &VisGraph, path: &Path) -> Result<(), IoError> {
    let bytes = persist::to_bytes(graph)?;
    std::fs::write(path, &bytes).map_err(IoError::file(path))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "graph saved");
    Ok(())
}

/// Read and decode the graph at `path`.
///
/// # Errors
///
/// Returns [`IoError::File`] if the file cannot be read and
/// [`IoError::Persist`] if it is not a valid graph file.
pub fn load_graph(path: &Path) -> Result<VisGraph, IoError> {
    let bytes = std::fs::read(path).map_err(IoError::file(path))?;
    let graph = persist::from_bytes(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        vertices = graph.graph().point_count(),
        visibility_edges = graph.visgraph().edge_count(),
        "graph loaded"
    );
    Ok(graph)
}

/// Load `inputs` on a pool of `load_threads` threads, merge them, and
/// save the result to `output`.
///
/// Returns the merged graph.
///
/// # Errors
///
/// Returns [`IoError::NoInputs`] if `inputs` is empty, and otherwise
/// the first load or save failure.
pub fn merge_graph_files(
    inputs: &[PathBuf],
    output: &Path,
    load_threads: usize,
) -> Result<VisGraph, IoError> {
    if inputs.is_empty() {
        return Err(IoError::NoInputs);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(load_threads.max(1))
        .build()
        .map_err(GraphError::from)?;
    let graphs = pool.install(|| {
        inputs
            .par_iter()
            .map(|path| load_graph(path))
            .collect::<Result<Vec<_>, _>>()
    })?;

    let merged = merge_graphs(&graphs);
    save_graph(&merged, output)?;
    Ok(merged)
}
