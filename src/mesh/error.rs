/// Failure modes for constructing or mutating a [`crate::mesh::PolygonalMesh`].
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("polygon {polygon_index} references node index {node_index}, but the mesh has only {node_count} nodes")]
    NodeIndexOutOfRange { polygon_index: usize, node_index: usize, node_count: usize },
    #[error("{fixed_count} fixed node indices were given, but the mesh has only {node_count} nodes")]
    TooManyFixedNodes { fixed_count: usize, node_count: usize },
    #[error("set_nodes expects {expected} node positions, got {actual}")]
    NodeCountMismatch { expected: usize, actual: usize },
}
