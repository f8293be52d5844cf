use std::fmt::{Debug, Display};

/**
 * All elements of the grid implement this trait. They are identified by their
 * index.
 */
pub trait Handle {
    /**
     * The index of the element.
     */
    fn index(&self) -> u32;
}

/**
 * Vertex (node) handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VH {
    idx: u32,
}

/**
 * Edge handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EH {
    idx: u32,
}

/**
 * Face handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FH {
    idx: u32,
}

impl Handle for VH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for VH {
    fn from(idx: u32) -> Self {
        VH { idx }
    }
}

impl From<&u32> for VH {
    fn from(idx: &u32) -> Self {
        VH { idx: *idx }
    }
}

impl Handle for EH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for EH {
    fn from(idx: u32) -> Self {
        EH { idx }
    }
}

impl From<&u32> for EH {
    fn from(idx: &u32) -> Self {
        EH { idx: *idx }
    }
}

impl Handle for FH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for FH {
    fn from(idx: u32) -> Self {
        FH { idx }
    }
}

impl From<&u32> for FH {
    fn from(idx: &u32) -> Self {
        FH { idx: *idx }
    }
}

impl Display for VH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VH({})", self.index())
    }
}

impl Display for EH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EH({})", self.index())
    }
}

impl Display for FH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FH({})", self.index())
    }
}

impl Debug for VH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VH({})", self.index())
    }
}

impl Debug for EH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EH({})", self.index())
    }
}

impl Debug for FH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FH({})", self.index())
    }
}

impl VH {
    /// Check if this node is valid for the `grid`.
    ///
    /// The index has to be less than the number of nodes in the grid.
    pub fn is_valid(self, grid: &crate::Grid) -> bool {
        (self.idx as usize) < grid.num_nodes()
    }
}

impl EH {
    /// Check if this edge is valid for the `grid`.
    pub fn is_valid(self, grid: &crate::Grid) -> bool {
        (self.idx as usize) < grid.num_edges()
    }

    /// The two nodes at the ends of this edge.
    pub fn nodes(self, grid: &crate::Grid) -> [VH; 2] {
        grid.edge_nodes(self)
    }
}

impl FH {
    /// Check if this face is valid for the `grid`.
    pub fn is_valid(self, grid: &crate::Grid) -> bool {
        (self.idx as usize) < grid.num_faces()
    }

    /// The three nodes of this face, in cyclic order.
    pub fn nodes(self, grid: &crate::Grid) -> [VH; 3] {
        grid.face_nodes(self)
    }

    /// The three edges of this face, in cyclic order.
    pub fn edges(self, grid: &crate::Grid) -> [EH; 3] {
        grid.face_edges(self)
    }
}
