use tracing::{debug, info};

use crate::{
    classify::BoundaryParams,
    dataset::Dataset,
    element::{FH, Handle},
    error::Error,
    grid::Grid,
};

/// Default name of the face dimension of the variables in a [`UxDataset`].
pub const FACE_DIM: &str = "n_face";

/// Variables defined on the faces of a grid.
///
/// Every variable of the dataset that has the face dimension has exactly as
/// many entries along it as the grid has faces, and entry `i` belongs to face
/// `i`. Variables without the face dimension are carried along untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct UxDataset {
    uxgrid: Option<Grid>,
    face_dim: String,
    data: Dataset,
}

fn check_face_dim(grid: &Grid, data: &Dataset, face_dim: &str) -> Result<(), Error> {
    match data.dim_len(face_dim) {
        Some(len) if len != grid.num_faces() => {
            Err(Error::MismatchedArrayLengths(grid.num_faces(), len))
        }
        _ => Ok(()),
    }
}

impl UxDataset {
    /// Attach `data` to `grid`, with [`FACE_DIM`] as the face dimension.
    pub fn new(grid: Option<Grid>, data: Dataset) -> Result<Self, Error> {
        Self::with_face_dim(grid, data, FACE_DIM)
    }

    pub fn with_face_dim(grid: Option<Grid>, data: Dataset, face_dim: &str) -> Result<Self, Error> {
        if let Some(grid) = &grid {
            check_face_dim(grid, &data, face_dim)?;
        }
        Ok(UxDataset {
            uxgrid: grid,
            face_dim: face_dim.to_string(),
            data,
        })
    }

    pub fn uxgrid(&self) -> Option<&Grid> {
        self.uxgrid.as_ref()
    }

    /// Same as [`UxDataset::uxgrid`], but a missing grid is an error.
    pub fn try_uxgrid(&self) -> Result<&Grid, Error> {
        self.uxgrid.as_ref().ok_or(Error::MissingGrid)
    }

    /// Replace the grid. The face dimension of the data must match the new
    /// grid.
    pub fn set_uxgrid(&mut self, grid: Grid) -> Result<(), Error> {
        check_face_dim(&grid, &self.data, &self.face_dim)?;
        self.uxgrid = Some(grid);
        Ok(())
    }

    pub fn face_dim(&self) -> &str {
        &self.face_dim
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    pub fn into_parts(self) -> (Option<Grid>, Dataset) {
        (self.uxgrid, self.data)
    }

    /// New dataset with only the given faces, in the given order. The grid
    /// and every variable with the face dimension are subset the same way.
    pub fn isel_faces(&self, faces: &[FH]) -> Result<UxDataset, Error> {
        let grid = self.try_uxgrid()?.select_faces(faces)?;
        let data = if self.data.dim_len(&self.face_dim).is_some() {
            let indices: Vec<usize> = faces.iter().map(|f| f.index() as usize).collect();
            self.data.isel(&self.face_dim, &indices)?
        } else {
            self.data.clone()
        };
        Ok(UxDataset {
            uxgrid: Some(grid),
            face_dim: self.face_dim.clone(),
            data,
        })
    }

    /// Same as [`Grid::remove_boundary_faces`], applied to the grid and the
    /// face variables.
    pub fn remove_boundary_faces(&self) -> Result<UxDataset, Error> {
        let keep = retained_faces(self.try_uxgrid()?, &BoundaryParams::default())?;
        self.isel_faces(&keep)
    }
}

/// Either a bare grid or a dataset defined on a grid.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshData {
    Grid(Grid),
    Dataset(UxDataset),
}

impl From<Grid> for MeshData {
    fn from(grid: Grid) -> Self {
        MeshData::Grid(grid)
    }
}

impl From<UxDataset> for MeshData {
    fn from(ds: UxDataset) -> Self {
        MeshData::Dataset(ds)
    }
}

impl MeshData {
    /// The grid, either bare or attached to the dataset.
    pub fn grid(&self) -> Result<&Grid, Error> {
        match self {
            MeshData::Grid(grid) => Ok(grid),
            MeshData::Dataset(ds) => ds.try_uxgrid(),
        }
    }
}

/// The faces that are not boundary faces, in increasing order.
fn retained_faces(grid: &Grid, params: &BoundaryParams) -> Result<Vec<FH>, Error> {
    let bbox = grid.bounds()?;
    debug!("Bounding box of the full grid: {bbox:?}");
    let keep: Vec<FH> = grid
        .faces()
        .filter(|f| !grid.is_boundary_face(*f, &bbox, params))
        .collect();
    info!(
        "Removing {} of {} faces",
        grid.num_faces() - keep.len(),
        grid.num_faces()
    );
    Ok(keep)
}

impl Grid {
    /// New grid without the faces created by the periodic wrap around, using
    /// the default [`BoundaryParams`]. The bounding box is computed once, from
    /// this grid.
    pub fn remove_boundary_faces(&self) -> Result<Grid, Error> {
        self.select_faces(&retained_faces(self, &BoundaryParams::default())?)
    }
}

/// Remove the boundary faces of a grid, or of a dataset and its grid, using
/// the default [`BoundaryParams`].
pub fn remove_boundary_faces(input: &MeshData) -> Result<MeshData, Error> {
    remove_boundary_faces_with(input, &BoundaryParams::default())
}

/// Same as [`remove_boundary_faces`] with explicit parameters. The input is
/// not modified. Fails with [`Error::MissingGrid`] before doing any work if a
/// dataset has no grid.
pub fn remove_boundary_faces_with(
    input: &MeshData,
    params: &BoundaryParams,
) -> Result<MeshData, Error> {
    let keep = retained_faces(input.grid()?, params)?;
    Ok(match input {
        MeshData::Grid(grid) => MeshData::Grid(grid.select_faces(&keep)?),
        MeshData::Dataset(ds) => MeshData::Dataset(ds.isel_faces(&keep)?),
    })
}
