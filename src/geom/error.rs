/// Failure modes for the planar geometry primitives in [`crate::geom`].
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("lambda must lie in (0,1), got {lambda}")]
    LambdaOutOfRange { lambda: f64 },
    #[error("theta must lie in (0, pi/2), got {theta}")]
    ThetaOutOfRange { theta: f64 },
    #[error("bounding box requires min <= max on both axes")]
    InvertedBounds,
    #[error("polygon requires at least 3 node indices, got {count}")]
    TooFewNodes { count: usize },
    #[error("polygon node indices must be pairwise distinct")]
    DuplicateNodeIndex,
}
