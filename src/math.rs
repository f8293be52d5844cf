use glam::DVec2;

use crate::{
    element::EH,
    error::Error,
    grid::Grid,
};

/// How the length of an edge is measured from the coordinates of its nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    /// Euclidean distance, treating longitude / latitude as planar x / y.
    Planar,
    /// Great circle arc length on the unit sphere. Coordinates are in degrees.
    #[default]
    GreatCircle,
    /// Great circle arc length on the unit sphere. Coordinates are in radians.
    GreatCircleRadians,
}

impl DistanceMetric {
    /// Distance between two points given as (longitude, latitude).
    pub fn distance(self, a: DVec2, b: DVec2) -> f64 {
        match self {
            DistanceMetric::Planar => a.distance(b),
            DistanceMetric::GreatCircle => great_circle_distance(
                DVec2::new(a.x.to_radians(), a.y.to_radians()),
                DVec2::new(b.x.to_radians(), b.y.to_radians()),
            ),
            DistanceMetric::GreatCircleRadians => great_circle_distance(a, b),
        }
    }

    /// The great circle metric for coordinates in radians, or in degrees.
    /// `Planar` does not depend on the units and is returned as is.
    pub fn for_radians(self, radians: bool) -> Self {
        match self {
            DistanceMetric::Planar => DistanceMetric::Planar,
            DistanceMetric::GreatCircle | DistanceMetric::GreatCircleRadians if radians => {
                DistanceMetric::GreatCircleRadians
            }
            DistanceMetric::GreatCircle | DistanceMetric::GreatCircleRadians => {
                DistanceMetric::GreatCircle
            }
        }
    }

    pub fn is_spherical(self) -> bool {
        self != DistanceMetric::Planar
    }
}

/// Haversine formula on coordinates in radians. Stable for the very short arcs
/// found on fine grids.
fn great_circle_distance(a: DVec2, b: DVec2) -> f64 {
    let (lon0, lat0) = (a.x, a.y);
    let (lon1, lat1) = (b.x, b.y);
    let sdlat = ((lat1 - lat0) * 0.5).sin();
    let sdlon = ((lon1 - lon0) * 0.5).sin();
    let h = sdlat * sdlat + lat0.cos() * lat1.cos() * sdlon * sdlon;
    2.0 * h.sqrt().min(1.0).asin()
}

/// The extent of the node coordinates of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    /// Smallest box containing all the given (longitude, latitude) pairs. Returns
    /// `None` if the iterator is empty.
    pub fn from_coords(mut coords: impl Iterator<Item = (f64, f64)>) -> Option<Self> {
        let (lon, lat) = coords.next()?;
        Some(coords.fold(
            BoundingBox {
                lon_min: lon,
                lon_max: lon,
                lat_min: lat,
                lat_max: lat,
            },
            |b, (lon, lat)| BoundingBox {
                lon_min: b.lon_min.min(lon),
                lon_max: b.lon_max.max(lon),
                lat_min: b.lat_min.min(lat),
                lat_max: b.lat_max.max(lat),
            },
        ))
    }
}

/// `[lon_min, lon_max, lat_min, lat_max]`.
impl From<[f64; 4]> for BoundingBox {
    fn from([lon_min, lon_max, lat_min, lat_max]: [f64; 4]) -> Self {
        BoundingBox {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }
}

impl Grid {
    /// Compute the length of the edge with the metric of this grid. Unlike
    /// [`Grid::edge_length`], this reads the node coordinates instead of the
    /// cached lengths.
    pub fn calc_edge_length(&self, e: EH) -> f64 {
        let [v0, v1] = self.edge_nodes(e);
        self.metric().distance(self.node_point(v0), self.node_point(v1))
    }

    /// Same as [`Grid::calc_edge_length`], but returns an error instead of
    /// panicking if the edge does not belong to this grid.
    pub fn try_calc_edge_length(&self, e: EH) -> Result<f64, Error> {
        if !e.is_valid(self) {
            return Err(Error::InvalidEdge(e));
        }
        Ok(self.calc_edge_length(e))
    }

    /// Compute the lengths of all edges, indexed by edge.
    pub fn calc_edge_lengths(&self) -> Vec<f64> {
        self.edges().map(|e| self.calc_edge_length(e)).collect()
    }

    /// The bounding box of all node coordinates. This is what the boundary
    /// classification compares against, so it must be computed on the full
    /// grid before any faces are removed.
    pub fn bounds(&self) -> Result<BoundingBox, Error> {
        BoundingBox::from_coords(
            self.node_lons()
                .iter()
                .copied()
                .zip(self.node_lats().iter().copied()),
        )
        .ok_or(Error::EmptyGrid)
    }

    /// Sum of the lengths of all edges.
    pub fn calc_total_edge_length(&self) -> f64 {
        self.edge_node_distances().iter().sum()
    }
}
