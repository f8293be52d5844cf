use crate::{element::VH, error::Error, grid::Grid, math::DistanceMetric};

/// Planar structured triangulations, useful as fixtures.
impl Grid {
    /// Makes a doubly periodic triangulation of `nx` by `ny` cells, each split
    /// into two triangles along its diagonal.
    ///
    /// The nodes sit on a regular lattice with spacing `dx`, `dy`, starting at
    /// the origin. Node `(i, j)` has index `j * nx + i`. The periodic domain is
    /// represented as a bounded rectangle, so the cells in the last column and
    /// the last row wrap around and connect back to the first column and row.
    /// Those are the faces that [`Grid::remove_boundary_faces`] strips.
    ///
    /// ```text
    ///    d-------c
    ///    |     / |
    ///    | 2k+1  |     cell (i, j) with k = j * nx + i
    ///    |  / 2k |
    ///    a-------b
    /// ```
    pub fn torus(nx: usize, ny: usize, dx: f64, dy: f64) -> Result<Self, Error> {
        if nx < 3 || ny < 3 {
            return Err(Error::InvalidResolution(nx, ny));
        }
        let node = |i: usize, j: usize| -> VH { (((j % ny) * nx + (i % nx)) as u32).into() };
        let (node_lon, node_lat) = lattice(nx, ny, dx, dy);
        let mut faces = Vec::with_capacity(2 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let (a, b, c, d) = (
                    node(i, j),
                    node(i + 1, j),
                    node(i + 1, j + 1),
                    node(i, j + 1),
                );
                faces.push([a, b, c]);
                faces.push([a, c, d]);
            }
        }
        Self::from_faces(node_lon, node_lat, faces, DistanceMetric::Planar)
    }

    /// Makes a bounded triangulation of `nx` by `ny` cells, with the same cell
    /// layout as [`Grid::torus`] but without any wrap around. Node `(i, j)` has
    /// index `j * (nx + 1) + i`.
    pub fn rectangle(nx: usize, ny: usize, dx: f64, dy: f64) -> Result<Self, Error> {
        if nx == 0 || ny == 0 {
            return Err(Error::InvalidResolution(nx, ny));
        }
        let node = |i: usize, j: usize| -> VH { ((j * (nx + 1) + i) as u32).into() };
        let (node_lon, node_lat) = lattice(nx + 1, ny + 1, dx, dy);
        let mut faces = Vec::with_capacity(2 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let (a, b, c, d) = (
                    node(i, j),
                    node(i + 1, j),
                    node(i + 1, j + 1),
                    node(i, j + 1),
                );
                faces.push([a, b, c]);
                faces.push([a, c, d]);
            }
        }
        Self::from_faces(node_lon, node_lat, faces, DistanceMetric::Planar)
    }
}

/// Coordinates of a `nx` by `ny` lattice of points, row by row.
fn lattice(nx: usize, ny: usize, dx: f64, dy: f64) -> (Vec<f64>, Vec<f64>) {
    (0..ny)
        .flat_map(|j| (0..nx).map(move |i| (i as f64 * dx, j as f64 * dy)))
        .unzip()
}
