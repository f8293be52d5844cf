/*!
Reading and writing grids following the
[UGRID conventions](http://ugrid-conventions.github.io/ugrid-conventions/#2d-triangular-mesh-topology)
for 2D triangular meshes.
*/

use tracing::debug;

use crate::{
    dataset::{AttrValue, Dataset, Values, Variable},
    element::{EH, Handle, VH},
    error::Error,
    grid::Grid,
    math::DistanceMetric,
};

/// Value of the `cf_role` attribute that marks the topology variable.
pub const MESH_TOPOLOGY: &str = "mesh_topology";

/// The attributes of a UGRID mesh topology variable. The optional entries are
/// not written when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshTopology {
    /// Name of the (zero dimensional) topology variable.
    pub name: String,
    pub node_dimension: String,
    pub edge_dimension: Option<String>,
    pub face_dimension: String,
    /// Names of the longitude and latitude variables, separated by a space.
    pub node_coordinates: String,
    pub edge_coordinates: Option<String>,
    pub face_coordinates: Option<String>,
    pub face_node_connectivity: String,
    pub edge_node_connectivity: Option<String>,
    pub face_edge_connectivity: Option<String>,
    pub face_face_connectivity: Option<String>,
    pub edge_face_connectivity: Option<String>,
}

impl MeshTopology {
    /// The topology of an ICON grid file, in terms of the ICON variable and
    /// dimension names.
    pub fn icon() -> Self {
        MeshTopology {
            name: "mesh".to_string(),
            node_dimension: "vertex".to_string(),
            edge_dimension: Some("edge".to_string()),
            face_dimension: "cell".to_string(),
            node_coordinates: "vlon vlat".to_string(),
            edge_coordinates: Some("elon elat".to_string()),
            face_coordinates: Some("clon clat".to_string()),
            face_node_connectivity: "vertex_of_cell".to_string(),
            edge_node_connectivity: Some("edge_vertices".to_string()),
            face_edge_connectivity: Some("edge_of_cell".to_string()),
            face_face_connectivity: Some("neighbor_cell_index".to_string()),
            edge_face_connectivity: Some("adjacent_cell_of_edge".to_string()),
        }
    }

    /// The topology written by [`Grid::to_ugrid`].
    pub fn standard() -> Self {
        MeshTopology {
            name: "mesh".to_string(),
            node_dimension: "n_node".to_string(),
            edge_dimension: Some("n_edge".to_string()),
            face_dimension: "n_face".to_string(),
            node_coordinates: "node_lon node_lat".to_string(),
            edge_coordinates: None,
            face_coordinates: None,
            face_node_connectivity: "face_node_connectivity".to_string(),
            edge_node_connectivity: Some("edge_node_connectivity".to_string()),
            face_edge_connectivity: Some("face_edge_connectivity".to_string()),
            face_face_connectivity: None,
            edge_face_connectivity: None,
        }
    }

    /// The zero dimensional variable carrying the topology as attributes. Its
    /// value is a dummy `-1`.
    pub fn to_variable(&self) -> Result<Variable, Error> {
        let mut var = Variable::scalar(&self.name, Values::I32(vec![-1]))?
            .with_attr("cf_role", MESH_TOPOLOGY)
            .with_attr("topology_dimension", 2i32);
        let attrs = [
            ("node_dimension", Some(&self.node_dimension)),
            ("edge_dimension", self.edge_dimension.as_ref()),
            ("face_dimension", Some(&self.face_dimension)),
            ("node_coordinates", Some(&self.node_coordinates)),
            ("edge_coordinates", self.edge_coordinates.as_ref()),
            ("face_coordinates", self.face_coordinates.as_ref()),
            ("face_node_connectivity", Some(&self.face_node_connectivity)),
            ("edge_node_connectivity", self.edge_node_connectivity.as_ref()),
            ("face_edge_connectivity", self.face_edge_connectivity.as_ref()),
            ("face_face_connectivity", self.face_face_connectivity.as_ref()),
            ("edge_face_connectivity", self.edge_face_connectivity.as_ref()),
        ];
        for (name, value) in attrs {
            if let Some(value) = value {
                var.set_attr(name, value.as_str());
            }
        }
        Ok(var)
    }

    /// Read the topology from the attributes of `var`.
    pub fn from_variable(var: &Variable) -> Result<Self, Error> {
        let optional = |attr: &str| -> Option<String> {
            var.attr(attr)
                .and_then(AttrValue::as_str)
                .map(|s| s.to_string())
        };
        let required = |attr: &str| -> Result<String, Error> {
            optional(attr).ok_or_else(|| Error::MissingAttribute {
                var: var.name().to_string(),
                attr: attr.to_string(),
            })
        };
        Ok(MeshTopology {
            name: var.name().to_string(),
            node_dimension: required("node_dimension")?,
            edge_dimension: optional("edge_dimension"),
            face_dimension: required("face_dimension")?,
            node_coordinates: required("node_coordinates")?,
            edge_coordinates: optional("edge_coordinates"),
            face_coordinates: optional("face_coordinates"),
            face_node_connectivity: required("face_node_connectivity")?,
            edge_node_connectivity: optional("edge_node_connectivity"),
            face_edge_connectivity: optional("face_edge_connectivity"),
            face_face_connectivity: optional("face_face_connectivity"),
            edge_face_connectivity: optional("edge_face_connectivity"),
        })
    }

    /// Find the variable with `cf_role = mesh_topology` in the dataset.
    pub fn find(ds: &Dataset) -> Result<Self, Error> {
        let var = ds
            .variables()
            .find(|v| v.attr("cf_role").and_then(AttrValue::as_str) == Some(MESH_TOPOLOGY))
            .ok_or(Error::MissingTopology)?;
        Self::from_variable(var)
    }
}

/// Read a connectivity variable as rows of `N` zero based indices, honouring
/// the `start_index` and `_FillValue` attributes. Missing entries are `None`.
/// Both `(count, N)` and `(N, count)` layouts are accepted.
fn read_connectivity<const N: usize>(
    ds: &Dataset,
    name: &str,
    count_dim: &str,
) -> Result<Vec<[Option<u32>; N]>, Error> {
    let var = ds.try_variable(name)?;
    if var.ndim() != 2 {
        return Err(Error::UnexpectedShape(name.to_string()));
    }
    let count_first = match var.axis(count_dim) {
        Some(axis) => axis == 0,
        None => var.shape()[1] == N,
    };
    let var = if count_first {
        var.clone()
    } else {
        var.transpose()?
    };
    if var.shape()[1] != N {
        return Err(Error::UnexpectedShape(name.to_string()));
    }
    let start = var
        .attr("start_index")
        .and_then(AttrValue::as_int)
        .unwrap_or(0);
    let fill = var.attr("_FillValue").and_then(AttrValue::as_int);
    let values = var
        .values()
        .to_i64()
        .ok_or_else(|| Error::NotAnIndexVariable(name.to_string()))?;
    Ok(values
        .chunks_exact(N)
        .map(|row| {
            std::array::from_fn(|k| {
                let v = row[k];
                if Some(v) == fill || v < start {
                    None
                } else {
                    u32::try_from(v - start).ok()
                }
            })
        })
        .collect())
}

/// Options for reading a grid from a UGRID dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UgridReadOptions {
    /// How edge lengths are measured. A great circle metric follows the units
    /// of the coordinates.
    pub metric: DistanceMetric,
    /// Convert coordinates stored in radians to degrees. Off by default, so
    /// the grid keeps the units of the file and the classifier tolerance
    /// applies in those units.
    pub to_degrees: bool,
}

impl UgridReadOptions {
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_degrees(mut self, to_degrees: bool) -> Self {
        self.to_degrees = to_degrees;
        self
    }
}

/// Read a coordinate variable in the units it is stored in. Also returns
/// whether those units are radians.
fn read_coordinate(ds: &Dataset, name: &str) -> Result<(Vec<f64>, bool), Error> {
    let var = ds.try_variable(name)?;
    let radians = var
        .attr("units")
        .and_then(AttrValue::as_str)
        .is_some_and(|units| units.starts_with("rad"));
    Ok((var.values().to_f64(), radians))
}

impl Grid {
    /// Load a grid from a UGRID dataset, measuring edges along great circles.
    /// Coordinates keep the units they are stored in.
    pub fn from_ugrid(ds: &Dataset) -> Result<Self, Error> {
        Self::read_ugrid(ds, &UgridReadOptions::default())
    }

    /// Load a grid from a UGRID dataset, measuring edges with `metric`.
    pub fn from_ugrid_with(ds: &Dataset, metric: DistanceMetric) -> Result<Self, Error> {
        Self::read_ugrid(ds, &UgridReadOptions::default().with_metric(metric))
    }

    /// Load a grid from a UGRID dataset.
    ///
    /// The face-edge and edge-node connectivity are read when the topology
    /// names them, and derived from the face-node connectivity otherwise.
    pub fn read_ugrid(ds: &Dataset, options: &UgridReadOptions) -> Result<Self, Error> {
        let topo = MeshTopology::find(ds)?;
        let mut coords = topo.node_coordinates.split_whitespace();
        let (lon_name, lat_name) = match (coords.next(), coords.next()) {
            (Some(lon), Some(lat)) => (lon, lat),
            _ => {
                return Err(Error::MissingAttribute {
                    var: topo.name.clone(),
                    attr: "node_coordinates".to_string(),
                });
            }
        };
        let (mut node_lon, lon_radians) = read_coordinate(ds, lon_name)?;
        let (mut node_lat, lat_radians) = read_coordinate(ds, lat_name)?;
        if lon_radians != lat_radians {
            return Err(Error::MixedCoordinateUnits(
                lon_name.to_string(),
                lat_name.to_string(),
            ));
        }
        let radians = lon_radians && !options.to_degrees;
        if lon_radians && options.to_degrees {
            debug!("Converting `{lon_name}` and `{lat_name}` from radians to degrees");
            for x in node_lon.iter_mut().chain(node_lat.iter_mut()) {
                *x = x.to_degrees();
            }
        }
        let metric = options.metric.for_radians(radians);
        let face_nodes = read_connectivity::<3>(ds, &topo.face_node_connectivity, &topo.face_dimension)?
            .into_iter()
            .enumerate()
            .map(|(i, row)| -> Result<[VH; 3], Error> {
                match row {
                    [Some(a), Some(b), Some(c)] => Ok([a.into(), b.into(), c.into()]),
                    _ => Err(Error::MissingConnectivity((i as u32).into())),
                }
            })
            .collect::<Result<Vec<_>, Error>>()?;
        debug!(
            "Read {} nodes and {} faces from topology `{}`",
            node_lon.len(),
            face_nodes.len(),
            topo.name
        );
        let (Some(fe_name), Some(en_name), Some(edim)) = (
            topo.face_edge_connectivity.as_deref(),
            topo.edge_node_connectivity.as_deref(),
            topo.edge_dimension.as_deref(),
        ) else {
            return Grid::from_faces(node_lon, node_lat, face_nodes, metric);
        };
        if !ds.contains(fe_name) || !ds.contains(en_name) {
            return Grid::from_faces(node_lon, node_lat, face_nodes, metric);
        }
        let edge_nodes = read_connectivity::<2>(ds, en_name, edim)?
            .into_iter()
            .enumerate()
            .map(|(i, row)| -> Result<[VH; 2], Error> {
                match row {
                    [Some(a), Some(b)] => Ok([a.into(), b.into()]),
                    _ => Err(Error::InvalidEdge((i as u32).into())),
                }
            })
            .collect::<Result<Vec<_>, Error>>()?;
        let face_edges = read_connectivity::<3>(ds, fe_name, &topo.face_dimension)?
            .into_iter()
            .enumerate()
            .map(|(i, row)| -> Result<[EH; 3], Error> {
                match row {
                    [Some(a), Some(b), Some(c)] => Ok([a.into(), b.into(), c.into()]),
                    _ => Err(Error::MissingConnectivity((i as u32).into())),
                }
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Grid::new(node_lon, node_lat, edge_nodes, face_nodes, face_edges, metric)
    }

    /// Encode this grid as a UGRID dataset, with the names given by
    /// [`MeshTopology::standard`].
    pub fn to_ugrid(&self) -> Result<Dataset, Error> {
        let topo = MeshTopology::standard();
        let (nnode, nedge, nface) = (self.num_nodes(), self.num_edges(), self.num_faces());
        let mut node_lon = Variable::new(
            "node_lon",
            &["n_node"],
            &[nnode],
            Values::F64(self.node_lons().to_vec()),
        )?
        .with_attr("standard_name", "longitude");
        let mut node_lat = Variable::new(
            "node_lat",
            &["n_node"],
            &[nnode],
            Values::F64(self.node_lats().to_vec()),
        )?
        .with_attr("standard_name", "latitude");
        match self.metric() {
            DistanceMetric::GreatCircle => {
                node_lon.set_attr("units", "degrees_east");
                node_lat.set_attr("units", "degrees_north");
            }
            DistanceMetric::GreatCircleRadians => {
                node_lon.set_attr("units", "radian");
                node_lat.set_attr("units", "radian");
            }
            DistanceMetric::Planar => {}
        }
        let face_nodes = Variable::new(
            "face_node_connectivity",
            &["n_face", "n_max_face_nodes"],
            &[nface, 3],
            Values::I32(
                self.face_node_connectivity()
                    .iter()
                    .flat_map(|f| f.map(|v| v.index() as i32))
                    .collect(),
            ),
        )?;
        let face_edges = Variable::new(
            "face_edge_connectivity",
            &["n_face", "n_max_face_edges"],
            &[nface, 3],
            Values::I32(
                self.face_edge_connectivity()
                    .iter()
                    .flat_map(|f| f.map(|e| e.index() as i32))
                    .collect(),
            ),
        )?;
        let edge_nodes = Variable::new(
            "edge_node_connectivity",
            &["n_edge", "two"],
            &[nedge, 2],
            Values::I32(
                self.edge_node_connectivity()
                    .iter()
                    .flat_map(|e| e.map(|v| v.index() as i32))
                    .collect(),
            ),
        )?;
        let distances = Variable::new(
            "edge_node_distances",
            &["n_edge"],
            &[nedge],
            Values::F64(self.edge_node_distances().to_vec()),
        )?;
        let mut ds = Dataset::new();
        ds.add_dimension("n_node", nnode)?;
        ds.add_dimension("n_edge", nedge)?;
        ds.add_dimension("n_face", nface)?;
        ds.add_variable(topo.to_variable()?)?;
        ds.add_variable(node_lon)?;
        ds.add_variable(node_lat)?;
        for var in [face_nodes, face_edges, edge_nodes] {
            ds.add_variable(var.with_attr("start_index", 0i32).with_attr("_FillValue", -1i32))?;
        }
        ds.add_variable(distances)?;
        Ok(ds)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        classify::{BoundaryKind, BoundaryParams},
        dataset::{AttrValue, Dataset, Values, Variable},
        error::Error,
        grid::Grid,
        math::DistanceMetric,
    };

    use super::{MeshTopology, UgridReadOptions};

    #[test]
    fn t_topology_attributes() {
        let var = MeshTopology::icon()
            .to_variable()
            .expect("Cannot create variable");
        assert_eq!(var.name(), "mesh");
        assert_eq!(var.ndim(), 0);
        assert_eq!(var.attrs().count(), 13);
        assert_eq!(
            var.attr("cf_role").and_then(AttrValue::as_str),
            Some("mesh_topology")
        );
        assert_eq!(
            var.attr("topology_dimension").and_then(AttrValue::as_int),
            Some(2)
        );
        assert_eq!(
            MeshTopology::from_variable(&var).expect("Cannot read topology"),
            MeshTopology::icon()
        );
    }

    #[test]
    fn t_missing_topology() {
        assert!(matches!(
            Grid::from_ugrid(&Dataset::new()),
            Err(Error::MissingTopology)
        ));
        let var = Variable::scalar("mesh", Values::I32(vec![-1]))
            .expect("Cannot create variable")
            .with_attr("cf_role", "mesh_topology");
        assert!(matches!(
            MeshTopology::from_variable(&var),
            Err(Error::MissingAttribute { .. })
        ));
    }

    #[test]
    fn t_ugrid_roundtrip() {
        let grid = Grid::torus(4, 3, 1.0, 2.0).expect("Cannot create torus");
        let ds = grid.to_ugrid().expect("Cannot encode grid");
        assert_eq!(ds.dim_len("n_face"), Some(24));
        let loaded =
            Grid::from_ugrid_with(&ds, DistanceMetric::Planar).expect("Cannot decode grid");
        assert_eq!(loaded, grid);
    }

    #[test]
    fn t_derived_edges() {
        let grid = Grid::torus(3, 3, 1.0, 1.0).expect("Cannot create torus");
        let mut ds = grid.to_ugrid().expect("Cannot encode grid");
        ds.remove_variable("face_edge_connectivity");
        let loaded =
            Grid::from_ugrid_with(&ds, DistanceMetric::Planar).expect("Cannot decode grid");
        assert_eq!(loaded.num_edges(), grid.num_edges());
        assert_eq!(loaded.face_node_connectivity(), grid.face_node_connectivity());
    }

    #[test]
    fn t_transposed_one_based() {
        // A single triangle, one based, stored as (nv, cell).
        let mut ds = Dataset::new();
        ds.add_variable(
            MeshTopology::icon()
                .to_variable()
                .expect("Cannot create variable"),
        )
        .expect("Cannot add variable");
        for (name, values) in [("vlon", vec![0.0, 90.0, 0.0]), ("vlat", vec![0.0, 0.0, 90.0])] {
            ds.add_variable(
                Variable::new(name, &["vertex"], &[3], Values::F64(values))
                    .expect("Cannot create variable"),
            )
            .expect("Cannot add variable");
        }
        ds.add_variable(
            Variable::new("vertex_of_cell", &["nv", "cell"], &[3, 1], Values::I32(vec![1, 2, 3]))
                .expect("Cannot create variable")
                .with_attr("start_index", 1i32),
        )
        .expect("Cannot add variable");
        let grid = Grid::from_ugrid(&ds).expect("Cannot decode grid");
        assert_eq!(grid.num_faces(), 1);
        assert_eq!(grid.num_edges(), 3);
        // An octant of the unit sphere.
        for len in grid.edge_node_distances() {
            assert!((len - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        }
    }

    #[test]
    fn t_missing_face_node() {
        let grid = Grid::torus(3, 3, 1.0, 1.0).expect("Cannot create torus");
        let mut ds = grid.to_ugrid().expect("Cannot encode grid");
        let var = ds
            .try_variable("face_node_connectivity")
            .expect("Missing variable");
        let Values::I32(mut values) = var.values().clone() else {
            panic!("Expected 32 bit indices");
        };
        values[7] = -1;
        let mut var = var.clone();
        var.set_values(Values::I32(values))
            .expect("Cannot set values");
        ds.add_variable(var).expect("Cannot add variable");
        assert!(matches!(
            Grid::from_ugrid(&ds),
            Err(Error::MissingConnectivity(f)) if f == 2u32.into()
        ));
    }

    /// A grid in radians, as ICON stores it. Face 0 has a node just inside
    /// the tolerance of the right side and a node on the left side.
    fn radian_dataset() -> Dataset {
        let mut ds = Dataset::new();
        ds.add_variable(
            MeshTopology::icon()
                .to_variable()
                .expect("Cannot create variable"),
        )
        .expect("Cannot add variable");
        let lon = vec![0.0, 0.5e-3, 1e-3 - 5e-7, 1e-3, 0.5e-3];
        let lat = vec![0.0, 0.5e-3, 0.0, 1e-3, 1e-3];
        for (name, values) in [("vlon", lon), ("vlat", lat)] {
            ds.add_variable(
                Variable::new(name, &["vertex"], &[5], Values::F64(values))
                    .expect("Cannot create variable")
                    .with_attr("units", "radian"),
            )
            .expect("Cannot add variable");
        }
        ds.add_variable(
            Variable::new(
                "vertex_of_cell",
                &["cell", "nv"],
                &[2, 3],
                Values::I32(vec![0, 1, 2, 1, 3, 4]),
            )
            .expect("Cannot create variable")
            .with_attr("start_index", 0i32),
        )
        .expect("Cannot add variable");
        ds
    }

    #[test]
    fn t_radians() {
        let ds = radian_dataset();
        let grid = Grid::from_ugrid(&ds).expect("Cannot decode grid");
        assert_eq!(grid.metric(), DistanceMetric::GreatCircleRadians);
        assert_eq!(grid.node_lons()[2], 1e-3 - 5e-7);
        assert_eq!(grid.node_lats()[3], 1e-3);
        let bbox = grid.bounds().expect("Cannot compute bounds");
        assert_eq!(bbox.lon_max, 1e-3);
        // The tolerance applies in the stored units.
        assert_eq!(
            grid.classify_face(0u32.into(), &bbox, &BoundaryParams::default()),
            Some(BoundaryKind::OppositeSides)
        );
        // Arc lengths do not depend on the units.
        let degrees = Grid::read_ugrid(&ds, &UgridReadOptions::default().with_degrees(true))
            .expect("Cannot decode grid");
        assert_eq!(degrees.metric(), DistanceMetric::GreatCircle);
        assert_eq!(degrees.node_lons()[3], 1e-3f64.to_degrees());
        for (a, b) in grid
            .edge_node_distances()
            .iter()
            .zip(degrees.edge_node_distances())
        {
            assert!((a - b).abs() < 1e-15);
        }
        // Written back with the units it was read in.
        let out = grid.to_ugrid().expect("Cannot encode grid");
        assert_eq!(
            out.try_variable("node_lon")
                .expect("Missing variable")
                .attr("units")
                .and_then(AttrValue::as_str),
            Some("radian")
        );
        let reloaded = Grid::from_ugrid(&out).expect("Cannot decode grid");
        assert_eq!(reloaded, grid);
    }

    #[test]
    fn t_mixed_units() {
        let mut ds = radian_dataset();
        let lat = ds
            .try_variable("vlat")
            .expect("Missing variable")
            .clone()
            .with_attr("units", "degrees_north");
        ds.add_variable(lat).expect("Cannot add variable");
        assert!(matches!(
            Grid::from_ugrid(&ds),
            Err(Error::MixedCoordinateUnits(lon, lat)) if lon == "vlon" && lat == "vlat"
        ));
    }
}
