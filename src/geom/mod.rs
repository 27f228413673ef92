mod error;
mod polygon;
mod quality;
mod transform;
mod vector;

pub use error::GeometryError;
pub use polygon::Polygon;
pub use quality::{MeshQuality, mean_ratio, mean_ratio_of_polygons};
pub use transform::GeneralizedPolygonTransformation;
pub use vector::{BoundingBox, Vec2, are_all_equal, are_equal, bounding_box_of};
