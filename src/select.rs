use crate::{
    element::{EH, FH, Handle, VH},
    error::Error,
    grid::Grid,
};

/// Maps the indices of the elements that survive a selection to new,
/// contiguous indices. Surviving elements keep their relative order.
struct Renumbering {
    new_index: Vec<Option<u32>>,
    kept: Vec<u32>,
}

impl Renumbering {
    fn new(len: usize, used: impl Iterator<Item = u32>) -> Self {
        let mut flags = vec![false; len];
        for i in used {
            flags[i as usize] = true;
        }
        let mut kept = Vec::new();
        let new_index = flags
            .into_iter()
            .enumerate()
            .map(|(i, used)| {
                used.then(|| {
                    kept.push(i as u32);
                    (kept.len() - 1) as u32
                })
            })
            .collect();
        Renumbering { new_index, kept }
    }

    /// Only called with indices that were marked as used.
    fn get(&self, i: u32) -> u32 {
        self.new_index[i as usize].unwrap_or(u32::MAX)
    }
}

impl Grid {
    /// Create a new grid containing only the given faces, in the given order.
    ///
    /// Nodes and edges not referenced by any of the selected faces are dropped,
    /// and the remaining ones are renumbered without changing their relative
    /// order. Faces that shared a node or an edge before the selection still
    /// share it afterwards. Edge lengths are carried over, not recomputed.
    pub fn select_faces(&self, faces: &[FH]) -> Result<Grid, Error> {
        for f in faces {
            self.check_face(*f)?;
        }
        let node_map = Renumbering::new(
            self.num_nodes(),
            faces
                .iter()
                .flat_map(|f| self.face_nodes(*f))
                .map(|v| v.index()),
        );
        let edge_map = Renumbering::new(
            self.num_edges(),
            faces
                .iter()
                .flat_map(|f| self.face_edges(*f))
                .map(|e| e.index()),
        );
        let node_lon = node_map
            .kept
            .iter()
            .map(|i| self.node_lon((*i).into()))
            .collect();
        let node_lat = node_map
            .kept
            .iter()
            .map(|i| self.node_lat((*i).into()))
            .collect();
        let edge_nodes = edge_map
            .kept
            .iter()
            .map(|i| {
                self.edge_nodes((*i).into())
                    .map(|v| -> VH { node_map.get(v.index()).into() })
            })
            .collect();
        let edge_lengths = edge_map
            .kept
            .iter()
            .map(|i| self.edge_length((*i).into()))
            .collect();
        let face_nodes = faces
            .iter()
            .map(|f| {
                self.face_nodes(*f)
                    .map(|v| -> VH { node_map.get(v.index()).into() })
            })
            .collect();
        let face_edges = faces
            .iter()
            .map(|f| {
                self.face_edges(*f)
                    .map(|e| -> EH { edge_map.get(e.index()).into() })
            })
            .collect();
        Ok(Grid::from_parts(
            node_lon,
            node_lat,
            edge_nodes,
            face_nodes,
            face_edges,
            edge_lengths,
            self.metric(),
        ))
    }

    /// Same as [`Grid::select_faces`], keeping the faces for which `keep`
    /// returns true.
    pub fn select_faces_where(&self, keep: impl Fn(FH) -> bool) -> Result<Grid, Error> {
        let faces: Vec<FH> = self.faces().filter(|f| keep(*f)).collect();
        self.select_faces(&faces)
    }
}
