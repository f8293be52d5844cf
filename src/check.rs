use crate::{
    element::{EH, FH, VH},
    error::Error,
    grid::Grid,
};

fn check_edges(grid: &Grid) -> Result<(), Error> {
    for (e, nodes) in grid.edges().zip(grid.edge_node_connectivity()) {
        for v in nodes {
            if !v.is_valid(grid) {
                return Err(Error::InvalidNode(*v));
            }
        }
        if nodes[0] == nodes[1] {
            return Err(Error::InvalidEdge(e));
        }
    }
    Ok(())
}

fn check_faces(grid: &Grid) -> Result<(), Error> {
    for f in grid.faces() {
        let nodes = grid.face_nodes(f);
        if let Some(v) = nodes.iter().find(|v| !v.is_valid(grid)) {
            return Err(Error::InvalidNode(*v));
        }
        // Check if degenerate.
        if nodes[0] == nodes[1] || nodes[1] == nodes[2] || nodes[2] == nodes[0] {
            return Err(Error::DegenerateFace(f));
        }
        let edges = grid.face_edges(f);
        if let Some(e) = edges.iter().find(|e| !e.is_valid(grid)) {
            return Err(Error::InvalidEdge(*e));
        }
        // Every edge must join two nodes of the face, and no two edges of the
        // face can be the same.
        if !edges.iter().all(|e| edge_in_face(grid, *e, &nodes))
            || edges[0] == edges[1]
            || edges[1] == edges[2]
            || edges[2] == edges[0]
        {
            return Err(Error::InconsistentFaceEdges(f));
        }
    }
    Ok(())
}

fn edge_in_face(grid: &Grid, e: EH, nodes: &[VH; 3]) -> bool {
    grid.edge_nodes(e).iter().all(|v| nodes.contains(v))
}

impl Grid {
    /// Check the topology of the grid.
    ///
    /// This function will return an error if any node or edge index is out of
    /// range, if a face repeats a node, or if the edges of a face do not join
    /// the nodes of that face.
    pub fn check_topology(&self) -> Result<(), Error> {
        check_edges(self)?;
        check_faces(self)?;
        Ok(())
    }

    /// Returns an error if `f` is not a face of this grid.
    pub fn check_face(&self, f: FH) -> Result<FH, Error> {
        if f.is_valid(self) {
            Ok(f)
        } else {
            Err(Error::InvalidFace(f))
        }
    }
}
