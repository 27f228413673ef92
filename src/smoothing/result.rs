use crate::geom::MeshQuality;
use crate::mesh::PolygonalMesh;

/// Outcome of running a single smoothing algorithm to termination.
#[derive(Debug, Clone)]
pub struct SmoothingResult {
    pub algorithm_name: &'static str,
    pub mesh: PolygonalMesh,
    pub mesh_quality: MeshQuality,
    pub wall_clock_seconds: f64,
    pub iterations: usize,
}

impl SmoothingResult {
    #[must_use]
    pub fn new(
        algorithm_name: &'static str,
        mesh: PolygonalMesh,
        wall_clock_seconds: f64,
        iterations: usize,
    ) -> Self {
        let mesh_quality = mesh.quality();
        Self { algorithm_name, mesh, mesh_quality, wall_clock_seconds, iterations }
    }
}

/// Outcome of running the combined GETMe algorithm (simultaneous phase
/// followed by sequential phase). A sibling of [`SmoothingResult`] rather
/// than a subtype of it: the two phases' iteration counts and timings are
/// tracked separately since they mean different things (one polygon versus
/// all polygons per iteration).
#[derive(Debug, Clone)]
pub struct GetmeResult {
    pub mesh: PolygonalMesh,
    pub mesh_quality: MeshQuality,
    pub simultaneous_iterations: usize,
    pub sequential_iterations: usize,
    pub total_wall_clock_seconds: f64,
}

impl GetmeResult {
    #[must_use]
    pub fn from_phase_results(simultaneous: SmoothingResult, sequential: SmoothingResult) -> Self {
        Self {
            mesh: sequential.mesh,
            mesh_quality: sequential.mesh_quality,
            simultaneous_iterations: simultaneous.iterations,
            sequential_iterations: sequential.iterations,
            total_wall_clock_seconds: simultaneous.wall_clock_seconds + sequential.wall_clock_seconds,
        }
    }
}
