/// Failure modes surfaced by the smoothing algorithms and their configuration.
#[derive(Debug, thiserror::Error)]
pub enum SmoothingError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error(
        "expected {expected} regularizing transformations (one per polygon size up to the mesh's largest polygon), got {actual}"
    )]
    InvalidTransformationSet { expected: usize, actual: usize },
    #[error("{0}")]
    InvalidMesh(String),
    #[error("{0}")]
    StateError(String),
    #[error(transparent)]
    Mesh(#[from] crate::mesh::MeshError),
    #[error(transparent)]
    Geometry(#[from] crate::geom::GeometryError),
    /// Reserved for the mesh file reader/writer, which this crate does not
    /// implement (spec §1/§6: that reader/writer is an external
    /// collaborator). No constructor in this crate ever produces this
    /// variant; it is named here so an embedding application's own
    /// file-handling code can report errors through the same enum.
    #[error("{0}")]
    IOError(String),
}
