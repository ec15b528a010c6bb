//! Graph generation from coastline files.

use std::path::{Path, PathBuf};

use seaway_graph::diagnostics::build_with_diagnostics;
use seaway_graph::{
    BuildConfig, BuildDiagnostics, Clock, Graph, GraphVariant, VertexRange, VisGraph,
};

use crate::error::IoError;
use crate::files::{GraphFilePaths, save_graph};
use crate::source::{JsonRingReader, VertexSource};

/// Result of [`GraphGenerator::generate`].
#[derive(Debug, Clone)]
pub struct GeneratedGraph {
    /// Where the graph was written.
    pub path: PathBuf,
    /// Size and timing of the build.
    pub diagnostics: BuildDiagnostics,
}

/// Builds graph files from a [`VertexSource`].
#[derive(Debug, Clone, Default)]
pub struct GraphGenerator<S = JsonRingReader> {
    source: S,
    config: BuildConfig,
}

impl<S: VertexSource> GraphGenerator<S> {
    /// Generator reading rings from `source` and building with `config`.
    #[must_use]
    pub const fn new(source: S, config: BuildConfig) -> Self {
        Self { source, config }
    }

    /// Build settings used for every graph.
    #[must_use]
    pub const fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the `variant` graph of the rings in `input` and save it in
    /// `out_folder`, which is created if needed.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError`] if reading, building or saving fails.
    pub fn generate<C: Clock>(
        &self,
        input: &Path,
        out_folder: &Path,
        variant: GraphVariant,
        clock: &C,
    ) -> Result<GeneratedGraph, IoError> {
        let rings = variant.project_rings(&self.source.read(input)?);
        std::fs::create_dir_all(out_folder)?;

        let (graph, diagnostics) = build_with_diagnostics(&rings, &self.config, clock)?;
        let path = GraphFilePaths::new(out_folder).path_for(variant);
        save_graph(&graph, &path)?;
        Ok(GeneratedGraph { path, diagnostics })
    }

    /// Build shard `split` of `splits` of the `variant` graph of the
    /// rings in `input`, shuffling vertices with `seed`, and save it to
    /// `out_file`.
    ///
    /// Shards generated with the same input, variant and seed for every
    /// split merge into the full graph. Returns the vertex range swept.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Graph`] if `split` is out of range, and any
    /// read, build or save failure.
    pub fn generate_for_vertex_range(
        &self,
        input: &Path,
        out_file: &Path,
        variant: GraphVariant,
        split: usize,
        splits: usize,
        seed: u64,
    ) -> Result<VertexRange, IoError> {
        let rings = variant.project_rings(&self.source.read(input)?);
        let vertex_count = Graph::from_rings(&rings).point_count();
        let range = VertexRange::for_split(vertex_count, split, splits)?;

        let shard = VisGraph::build_shuffled_range(&rings, range, seed, &self.config)?;
        if let Some(parent) = out_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        save_graph(&shard, out_file)?;
        Ok(range)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use seaway_graph::Coordinate;

    use super::*;
    use crate::files::{load_graph, merge_graph_files};

    struct FixedClock;

    impl Clock for FixedClock {
        type Instant = ();

        fn now(&self) {}

        fn elapsed(&self, _since: &()) -> Duration {
            Duration::from_millis(3)
        }
    }

    /// In-memory source that ignores the path.
    struct Rings(Vec<Vec<Coordinate>>);

    impl VertexSource for Rings {
        fn read(&self, _path: &Path) -> Result<Vec<Vec<Coordinate>>, IoError> {
            Ok(self.0.clone())
        }
    }

    fn islands() -> Rings {
        let square = |lon: f64| {
            vec![
                Coordinate::new(lon, 0.0),
                Coordinate::new(lon + 1.0, 0.0),
                Coordinate::new(lon + 1.0, 1.0),
                Coordinate::new(lon, 1.0),
            ]
        };
        Rings(vec![square(10.0), square(13.0), square(170.0)])
    }

    #[test]
    fn generates_both_variants_into_one_folder() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("graphs");
        let generator = GraphGenerator::new(islands(), BuildConfig::default());

        let default = generator
            .generate(Path::new("-"), &folder, GraphVariant::Default, &FixedClock)
            .unwrap();
        let meridian = generator
            .generate(Path::new("-"), &folder, GraphVariant::Meridian, &FixedClock)
            .unwrap();

        let paths = GraphFilePaths::new(&folder);
        assert_eq!(default.path, paths.default_graph_path());
        assert_eq!(meridian.path, paths.meridian_graph_path());
        assert_eq!(default.diagnostics.vertex_count, 12);
        assert_eq!(default.diagnostics.duration, Duration::from_millis(3));

        let shifted = load_graph(&meridian.path).unwrap();
        // 170 shifts to -100 in the rotated frame.
        assert!(
            shifted
                .graph()
                .points()
                .iter()
                .any(|p| (p.x - -100.0).abs() < 1e-9)
        );
    }

    #[test]
    fn shard_files_merge_into_the_full_graph() {
        let dir = tempfile::tempdir().unwrap();
        let generator = GraphGenerator::new(islands(), BuildConfig::default());

        let full = generator
            .generate(Path::new("-"), dir.path(), GraphVariant::Default, &FixedClock)
            .unwrap();

        let shards: Vec<PathBuf> = (0..3)
            .map(|split| {
                let path = dir.path().join("shards").join(format!("{split}"));
                let range = generator
                    .generate_for_vertex_range(
                        Path::new("-"),
                        &path,
                        GraphVariant::Default,
                        split,
                        3,
                        11,
                    )
                    .unwrap();
                assert_eq!(range, VertexRange::for_split(12, split, 3).unwrap());
                path
            })
            .collect();

        let merged = merge_graph_files(&shards, &dir.path().join("merged"), 2).unwrap();
        assert_eq!(merged, load_graph(&full.path).unwrap());
    }

    #[test]
    fn out_of_range_split_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let generator = GraphGenerator::new(islands(), BuildConfig::default());
        let result = generator.generate_for_vertex_range(
            Path::new("-"),
            &dir.path().join("shard"),
            GraphVariant::Default,
            3,
            3,
            0,
        );
        assert!(matches!(result, Err(IoError::Graph(_))));
    }
}
