use tracing::debug;

use crate::{
    element::FH,
    error::Error,
    grid::Grid,
    math::BoundingBox,
};

/// Absolute tolerance when comparing node coordinates to the bounding box.
pub const COORD_TOLERANCE: f64 = 1e-6;

/// A face whose longest edge exceeds this multiple of its shortest edge is
/// considered stretched across the domain.
pub const ELONGATION_RATIO: f64 = 2.0;

/// Parameters for detecting the faces created by the periodic wrap around of a
/// grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryParams {
    /// Absolute tolerance used to decide whether a node lies on a side of the
    /// bounding box.
    pub tolerance: f64,
    /// Ratio of the longest to the shortest edge above which a face counts as
    /// a boundary face.
    pub elongation_ratio: f64,
}

impl Default for BoundaryParams {
    fn default() -> Self {
        Self {
            tolerance: COORD_TOLERANCE,
            elongation_ratio: ELONGATION_RATIO,
        }
    }
}

impl BoundaryParams {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_elongation_ratio(mut self, ratio: f64) -> Self {
        self.elongation_ratio = ratio;
        self
    }
}

/// Why a face was classified as a boundary face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    /// The face touches two opposite sides of the bounding box.
    OppositeSides,
    /// The longest edge of the face is too long compared to its shortest edge.
    Elongated,
}

/// Whether any coordinate is strictly closer than `tolerance` to `value`.
fn touches(coords: &[f64; 3], value: f64, tolerance: f64) -> bool {
    coords.iter().any(|c| (c - value).abs() < tolerance)
}

impl Grid {
    /// Classify a face against the bounding box `bbox` of the full grid.
    ///
    /// The opposite sides test runs first: a face with one node on the
    /// minimum and one node on the maximum longitude (or latitude) spans the
    /// whole domain. Otherwise the edge lengths of the face are compared.
    /// Returns `None` for interior faces.
    pub fn classify_face(
        &self,
        f: FH,
        bbox: &BoundingBox,
        params: &BoundaryParams,
    ) -> Option<BoundaryKind> {
        let (lon, lat) = self.face_coords(f);
        let tol = params.tolerance;
        if (touches(&lon, bbox.lon_min, tol) && touches(&lon, bbox.lon_max, tol))
            || (touches(&lat, bbox.lat_min, tol) && touches(&lat, bbox.lat_max, tol))
        {
            return Some(BoundaryKind::OppositeSides);
        }
        let lengths = self.face_edge_lengths(f);
        let max = lengths.iter().copied().fold(f64::MIN, f64::max);
        let min = lengths.iter().copied().fold(f64::MAX, f64::min);
        if max > params.elongation_ratio * min {
            return Some(BoundaryKind::Elongated);
        }
        None
    }

    pub fn is_boundary_face(&self, f: FH, bbox: &BoundingBox, params: &BoundaryParams) -> bool {
        self.classify_face(f, bbox, params).is_some()
    }

    /// All boundary faces of the grid, in increasing order. The bounding box
    /// is computed once for the whole grid.
    pub fn boundary_faces(&self, params: &BoundaryParams) -> Result<Vec<FH>, Error> {
        let bbox = self.bounds()?;
        let faces: Vec<FH> = self
            .faces()
            .filter(|f| self.is_boundary_face(*f, &bbox, params))
            .collect();
        debug!(
            "Found {} boundary faces out of {}",
            faces.len(),
            self.num_faces()
        );
        Ok(faces)
    }
}

/// Check whether face `f` is a boundary face with the default parameters.
pub fn is_boundary(grid: &Grid, f: FH, bbox: &BoundingBox) -> bool {
    grid.is_boundary_face(f, bbox, &BoundaryParams::default())
}
