//! Coastline sources.
//!
//! A [`VertexSource`] turns a file into polygon rings of geographic
//! coordinates. [`JsonRingReader`] reads the simplest useful format: a
//! JSON array of rings, each an array of `[longitude, latitude]` pairs.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use seaway_graph::Coordinate;

use crate::error::IoError;

/// Fewest distinct vertices a ring needs to enclose an area.
const MIN_RING_VERTICES: usize = 3;

/// Reads polygon rings from a file.
pub trait VertexSource {
    /// Rings stored at `path`, without a repeated closing vertex.
    ///
    /// # Errors
    ///
    /// Returns an [`IoError`] if the file cannot be read or parsed.
    fn read(&self, path: &Path) -> Result<Vec<Vec<Coordinate>>, IoError>;
}

/// Reads rings from a JSON array of `[lon, lat]` arrays.
///
/// A ring whose last vertex repeats its first has the repeat dropped.
/// Rings left with fewer than three vertices are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRingReader;

impl JsonRingReader {
    /// Parse rings from any reader.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Json`] if the input is not an array of rings.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<Vec<Coordinate>>, IoError> {
        let raw: Vec<Vec<[f64; 2]>> = serde_json::from_reader(reader)?;
        let total = raw.len();
        let rings: Vec<Vec<Coordinate>> = raw
            .into_iter()
            .filter_map(|ring| {
                let mut ring: Vec<Coordinate> = ring
                    .into_iter()
                    .map(|[lon, lat]| Coordinate::new(lon, lat))
                    .collect();
                if ring.len() > 1 && ring.first() == ring.last() {
                    ring.pop();
                }
                (ring.len() >= MIN_RING_VERTICES).then_some(ring)
            })
            .collect();
        if rings.len() < total {
            tracing::debug!(skipped = total - rings.len(), "skipped degenerate rings");
        }
        Ok(rings)
    }
}

impl VertexSource for JsonRingReader {
    fn read(&self, path: &Path) -> Result<Vec<Vec<Coordinate>>, IoError> {
        let file = File::open(path).map_err(IoError::file(path))?;
        let rings = Self::parse(BufReader::new(file))?;
        tracing::info!(path = %path.display(), rings = rings.len(), "rings read");
        Ok(rings)
    }
}
