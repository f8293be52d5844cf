use thiserror::Error;

use crate::element::{EH, FH, VH};

#[derive(Debug, Error)]
pub enum Error {
    // Topology.
    #[error("{0} is not a node of the grid")]
    InvalidNode(VH),
    #[error("{0} is not an edge of the grid")]
    InvalidEdge(EH),
    #[error("{0} is not a face of the grid")]
    InvalidFace(FH),
    #[error("{0} has a missing (fill value) connectivity entry")]
    MissingConnectivity(FH),
    #[error("{0} references the same node more than once")]
    DegenerateFace(FH),
    #[error("the edges of {0} do not match its nodes")]
    InconsistentFaceEdges(FH),
    #[error("the grid has no nodes")]
    EmptyGrid,
    #[error("invalid grid resolution {0} x {1}")]
    InvalidResolution(usize, usize),
    // Datasets.
    #[error("the dataset has no grid attached")]
    MissingGrid,
    #[error("variable `{0}` not found")]
    VariableNotFound(String),
    #[error("dimension `{0}` not found")]
    DimensionNotFound(String),
    #[error("dimension `{name}` has length {expected}, found {found}")]
    DimensionMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("variable `{0}` has an unexpected shape")]
    UnexpectedShape(String),
    #[error("variable `{0}` does not hold integer indices")]
    NotAnIndexVariable(String),
    #[error("the dataset has no variable with cf_role = mesh_topology")]
    MissingTopology,
    #[error("variable `{var}` has no attribute `{attr}`")]
    MissingAttribute { var: String, attr: String },
    #[error("coordinates `{0}` and `{1}` are stored in different units")]
    MixedCoordinateUnits(String, String),
    // Storage.
    #[error("variable `{var}` has type {ty}, which has no in-memory representation")]
    UnsupportedType { var: String, ty: String },
    #[error("attribute `{0}` has a type with no in-memory representation")]
    UnsupportedAttribute(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[cfg(feature = "netcdf")]
    #[error(transparent)]
    NetCdf(#[from] netcdf::Error),
    // Other,
    #[error("mismatched array lengths: {0} and {1}")]
    MismatchedArrayLengths(usize, usize),
}
