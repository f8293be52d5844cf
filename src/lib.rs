/*!
This crate converts grids of the
[ICON](https://www.icon-model.org/) model to the
[UGRID](http://ugrid-conventions.github.io/ugrid-conventions/) conventions,
and removes the faces that a doubly periodic grid wraps around its domain with.

# Overview

+ A [`Grid`] is an unstructured triangular mesh with nodes, edges and faces,
  each identified by a typed handle ([`VH`], [`EH`], [`FH`]). Every face has
  exactly three nodes and three edges. The grid is checked when it is created,
  so missing (fill value) connectivity never makes it into a grid.

+ A [`Dataset`] is an in-memory model of a NetCDF file: named dimensions,
  variables and attributes. The [`UgridConverter`] rewrites the one based index
  variables of an ICON grid dataset to zero based indices, flags missing
  entries with `-1`, puts the element count first in two dimensional arrays,
  and attaches the `mesh` topology variable. [`Grid::from_ugrid`] and
  [`Grid::to_ugrid`] read and write grids in this form.

+ A periodic domain stored as a bounded rectangle contains faces that connect
  one side of the domain to the opposite side. [`Grid::classify_face`] detects
  them, either because they touch two opposite sides of the bounding box or
  because they are much longer in one direction than the other.
  [`remove_boundary_faces`] removes them from a bare grid, or from a
  [`UxDataset`] along with the variables defined on its faces.

+ With the `netcdf` feature, datasets can be read from and written to NetCDF
  files, and [`icon_grid_to_ugrid`] converts an ICON grid file to a UGRID file
  next to it.
*/

mod check;
mod classify;
mod dataset;
mod element;
mod error;
mod grid;
mod macros;
mod math;
mod normalize;
mod primitive;
mod prune;
mod select;
mod ugrid;

#[cfg(feature = "netcdf")]
mod netcdf_io;

pub use classify::{BoundaryKind, BoundaryParams, COORD_TOLERANCE, ELONGATION_RATIO, is_boundary};
pub use dataset::{AttrValue, Dataset, Values, Variable};
pub use element::{EH, FH, Handle, VH};
pub use error::Error;
pub use grid::Grid;
pub use math::{BoundingBox, DistanceMetric};
pub use normalize::{
    ICON_INDEX_FIELDS, ICON_ONE_BASED, IndexRule, UgridConverter, normalize_icon_grid,
};
pub use prune::{FACE_DIM, MeshData, UxDataset, remove_boundary_faces, remove_boundary_faces_with};
pub use ugrid::{MESH_TOPOLOGY, MeshTopology, UgridReadOptions};

#[cfg(feature = "netcdf")]
pub use netcdf_io::{
    icon_grid_to_ugrid, open_grid, open_ux_dataset, read_dataset, write_dataset, write_grid,
};
