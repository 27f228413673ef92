use std::collections::HashSet;

use super::error::GeometryError;

/// A planar polygonal element: an ordered sequence of at least three pairwise
/// distinct node indices, interpreted as a closed loop.
///
/// A `Polygon` only stores indices into a mesh's shared node array; it never
/// owns node positions itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    node_indices: Vec<usize>,
}

impl Polygon {
    pub fn new(node_indices: Vec<usize>) -> Result<Self, GeometryError> {
        if node_indices.len() < 3 {
            return Err(GeometryError::TooFewNodes { count: node_indices.len() });
        }
        let unique: HashSet<usize> = node_indices.iter().copied().collect();
        if unique.len() != node_indices.len() {
            return Err(GeometryError::DuplicateNodeIndex);
        }
        Ok(Self { node_indices })
    }

    #[must_use]
    pub fn node_indices(&self) -> &[usize] {
        &self.node_indices
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.node_indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[must_use]
    pub fn node_index(&self, node_number: usize) -> usize {
        self.node_indices[node_number]
    }

    /// The node index cyclically preceding `node_number`.
    #[must_use]
    pub fn predecessor_node_index(&self, node_number: usize) -> usize {
        let n = self.node_indices.len();
        self.node_indices[if node_number == 0 { n - 1 } else { node_number - 1 }]
    }

    /// The node index cyclically following `node_number`.
    #[must_use]
    pub fn successor_node_index(&self, node_number: usize) -> usize {
        let n = self.node_indices.len();
        self.node_indices[if node_number == n - 1 { 0 } else { node_number + 1 }]
    }
}
