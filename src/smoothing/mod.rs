mod common;
mod config;
mod error;
mod getme;
mod getme_sequential;
mod heap;
mod laplace;
mod result;

pub use common::{
    apply_edge_length_scaling, check_transformations, check_transformations_for_mesh,
    iteratively_reset_nodes_resulting_in_invalid_elements, transform_and_scale_element,
    transform_scale_and_relax_element, update_max_squared_node_relocation_distance,
};
pub use config::{
    BasicGetmeSimultaneousConfig, BasicLaplaceConfig, GetmeConfig, GetmeSequentialConfig,
    GetmeSimultaneousConfig, PolygonTransformationSet, SmartLaplaceConfig,
    regularizing_polygon_transformations,
};
pub use error::SmoothingError;
pub use getme::{basic_getme_simultaneous, getme, getme_simultaneous};
pub use getme_sequential::getme_sequential;
pub use heap::PolygonQualityMinHeap;
pub use laplace::{basic_laplace, smart_laplace};
pub use result::{GetmeResult, SmoothingResult};
