use std::collections::HashMap;

use glam::DVec2;

use crate::{
    element::{EH, FH, Handle, VH},
    error::Error,
    math::DistanceMetric,
};

/// Unstructured triangular grid.
///
/// Nodes, edges and faces each live in their own contiguous, zero based index
/// space. Every face has exactly three nodes and three edges. The edge lengths
/// (node distances) are computed once when the grid is created, using the
/// [`DistanceMetric`] of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    node_lon: Vec<f64>,
    node_lat: Vec<f64>,
    edge_nodes: Vec<[VH; 2]>,
    face_nodes: Vec<[VH; 3]>,
    face_edges: Vec<[EH; 3]>,
    edge_lengths: Vec<f64>,
    metric: DistanceMetric,
}

impl Grid {
    /// Create a grid from its coordinates and connectivity.
    ///
    /// The topology is checked with [`Grid::check_topology`] before the grid
    /// is returned, so a grid that exists never references missing nodes or
    /// edges.
    pub fn new(
        node_lon: Vec<f64>,
        node_lat: Vec<f64>,
        edge_nodes: Vec<[VH; 2]>,
        face_nodes: Vec<[VH; 3]>,
        face_edges: Vec<[EH; 3]>,
        metric: DistanceMetric,
    ) -> Result<Self, Error> {
        if node_lon.len() != node_lat.len() {
            return Err(Error::MismatchedArrayLengths(
                node_lon.len(),
                node_lat.len(),
            ));
        }
        if face_nodes.len() != face_edges.len() {
            return Err(Error::MismatchedArrayLengths(
                face_nodes.len(),
                face_edges.len(),
            ));
        }
        let mut grid = Grid {
            node_lon,
            node_lat,
            edge_nodes,
            face_nodes,
            face_edges,
            edge_lengths: Vec::new(),
            metric,
        };
        grid.check_topology()?;
        grid.edge_lengths = grid.calc_edge_lengths();
        Ok(grid)
    }

    /// Create a grid from the face-node connectivity alone. The edges are
    /// created in the order they are first encountered while walking the faces,
    /// and the edges of each face follow the cyclic order of its nodes, i.e.
    /// edge `k` of a face joins node `k` and node `k + 1`.
    pub fn from_faces(
        node_lon: Vec<f64>,
        node_lat: Vec<f64>,
        face_nodes: Vec<[VH; 3]>,
        metric: DistanceMetric,
    ) -> Result<Self, Error> {
        let (edge_nodes, face_edges) = derive_edges(&face_nodes);
        Self::new(node_lon, node_lat, edge_nodes, face_nodes, face_edges, metric)
    }

    /// Assemble a grid from parts that are already known to be consistent,
    /// along with their edge lengths.
    pub(crate) fn from_parts(
        node_lon: Vec<f64>,
        node_lat: Vec<f64>,
        edge_nodes: Vec<[VH; 2]>,
        face_nodes: Vec<[VH; 3]>,
        face_edges: Vec<[EH; 3]>,
        edge_lengths: Vec<f64>,
        metric: DistanceMetric,
    ) -> Self {
        debug_assert_eq!(edge_nodes.len(), edge_lengths.len());
        Grid {
            node_lon,
            node_lat,
            edge_nodes,
            face_nodes,
            face_edges,
            edge_lengths,
            metric,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.node_lon.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edge_nodes.len()
    }

    pub fn num_faces(&self) -> usize {
        self.face_nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = VH> + use<> {
        (0..(self.num_nodes() as u32)).map(|i| i.into())
    }

    pub fn edges(&self) -> impl Iterator<Item = EH> + use<> {
        (0..(self.num_edges() as u32)).map(|i| i.into())
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<> {
        (0..(self.num_faces() as u32)).map(|i| i.into())
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn node_lon(&self, v: VH) -> f64 {
        self.node_lon[v.index() as usize]
    }

    pub fn node_lat(&self, v: VH) -> f64 {
        self.node_lat[v.index() as usize]
    }

    /// Position of the node as (longitude, latitude).
    pub fn node_point(&self, v: VH) -> DVec2 {
        DVec2::new(self.node_lon(v), self.node_lat(v))
    }

    pub fn node_lons(&self) -> &[f64] {
        &self.node_lon
    }

    pub fn node_lats(&self) -> &[f64] {
        &self.node_lat
    }

    pub fn edge_nodes(&self, e: EH) -> [VH; 2] {
        self.edge_nodes[e.index() as usize]
    }

    pub fn face_nodes(&self, f: FH) -> [VH; 3] {
        self.face_nodes[f.index() as usize]
    }

    pub fn face_edges(&self, f: FH) -> [EH; 3] {
        self.face_edges[f.index() as usize]
    }

    /// Face-node connectivity of the whole grid, indexed by face.
    pub fn face_node_connectivity(&self) -> &[[VH; 3]] {
        &self.face_nodes
    }

    /// Face-edge connectivity of the whole grid, indexed by face.
    pub fn face_edge_connectivity(&self) -> &[[EH; 3]] {
        &self.face_edges
    }

    /// Edge-node connectivity of the whole grid, indexed by edge.
    pub fn edge_node_connectivity(&self) -> &[[VH; 2]] {
        &self.edge_nodes
    }

    /// Cached length of the edge.
    pub fn edge_length(&self, e: EH) -> f64 {
        self.edge_lengths[e.index() as usize]
    }

    /// Cached lengths of all edges, indexed by edge.
    pub fn edge_node_distances(&self) -> &[f64] {
        &self.edge_lengths
    }

    /// Longitudes and latitudes of the three nodes of the face.
    pub fn face_coords(&self, f: FH) -> ([f64; 3], [f64; 3]) {
        let nodes = self.face_nodes(f);
        (
            nodes.map(|v| self.node_lon(v)),
            nodes.map(|v| self.node_lat(v)),
        )
    }

    /// Lengths of the three edges of the face.
    pub fn face_edge_lengths(&self, f: FH) -> [f64; 3] {
        self.face_edges(f).map(|e| self.edge_length(e))
    }
}

/// Build the edges of a triangle soup, sharing edges between faces that have
/// the same pair of nodes.
fn derive_edges(face_nodes: &[[VH; 3]]) -> (Vec<[VH; 2]>, Vec<[EH; 3]>) {
    let mut lookup: HashMap<(VH, VH), EH> = HashMap::with_capacity(face_nodes.len() * 3 / 2);
    let mut edge_nodes: Vec<[VH; 2]> = Vec::with_capacity(face_nodes.len() * 3 / 2);
    let face_edges = face_nodes
        .iter()
        .map(|nodes| {
            std::array::from_fn(|k| {
                let (a, b) = (nodes[k], nodes[(k + 1) % 3]);
                *lookup.entry((a.min(b), a.max(b))).or_insert_with(|| {
                    edge_nodes.push([a, b]);
                    ((edge_nodes.len() - 1) as u32).into()
                })
            })
        })
        .collect();
    (edge_nodes, face_edges)
}
