//! seaway-io: Filesystem I/O for seaway.
//!
//! Reads coastline rings from disk, builds graphs from them, and
//! saves, loads and merges graph files. All geometry lives in
//! `seaway-graph`; this crate only moves bytes between it and the
//! filesystem.

pub mod error;
pub mod files;
pub mod generate;
pub mod source;

pub use error::IoError;
pub use files::{GraphFilePaths, load_graph, merge_graph_files, save_graph};
pub use generate::{GeneratedGraph, GraphGenerator};
pub use source::{JsonRingReader, VertexSource};
