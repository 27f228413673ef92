mod error;
mod polygonal_mesh;

pub use error::MeshError;
pub use polygonal_mesh::PolygonalMesh;
