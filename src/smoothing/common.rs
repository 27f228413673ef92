use std::collections::HashSet;

use crate::geom::{GeneralizedPolygonTransformation, MeshQuality, Polygon, Vec2, mean_ratio};
use crate::mesh::PolygonalMesh;

use super::error::SmoothingError;

/// Edge length scaling of Definition 5.5 of the GETMe book: rescale the
/// already-transformed polygon `transformed_element_nodes` about its
/// (shared) centroid so its perimeter matches the original polygon's
/// perimeter. Relies on the original and transformed polygons sharing a
/// centroid, which every [`GeneralizedPolygonTransformation`] guarantees.
pub fn apply_edge_length_scaling(
    polygon: &Polygon,
    original_mesh_nodes: &[Vec2],
    transformed_element_nodes: &mut [Vec2],
) {
    let node_indices = polygon.node_indices();
    let mut centroid = Vec2::ZERO;
    let mut original_length = 0.0;
    let mut transformed_length = 0.0;

    let mut previous_mesh_node_index = *node_indices.last().expect("polygon has at least 3 nodes");
    let mut previous_node_number = node_indices.len() - 1;
    for (node_number, &mesh_node_index) in node_indices.iter().enumerate() {
        centroid = centroid + original_mesh_nodes[mesh_node_index];
        original_length += (original_mesh_nodes[mesh_node_index]
            - original_mesh_nodes[previous_mesh_node_index])
            .length();
        previous_mesh_node_index = mesh_node_index;
        transformed_length += (transformed_element_nodes[node_number]
            - transformed_element_nodes[previous_node_number])
            .length();
        previous_node_number = node_number;
    }
    centroid = centroid.div_scalar(node_indices.len() as f64);

    let scaling_factor = original_length / transformed_length;
    let one_minus_scaling_factor = 1.0 - scaling_factor;
    for node in transformed_element_nodes.iter_mut() {
        *node = centroid.mul_scalar(one_minus_scaling_factor) + node.mul_scalar(scaling_factor);
    }
}

/// Updates `max_squared` in place if the squared relocation distance between
/// `old` and `new` exceeds it.
pub fn update_max_squared_node_relocation_distance(old: Vec2, new: Vec2, max_squared: &mut f64) {
    let squared_distance = (new - old).length_squared();
    if squared_distance > *max_squared {
        *max_squared = squared_distance;
    }
}

/// Applies a regularizing transformation to one polygon and rescales it to
/// the original edge length (Definition 5.5).
#[must_use]
pub fn transform_and_scale_element(
    transformation: &GeneralizedPolygonTransformation,
    polygon: &Polygon,
    mesh_nodes: &[Vec2],
) -> Vec<Vec2> {
    let mut transformed_element_nodes = transformation.transformed_nodes(polygon, mesh_nodes);
    apply_edge_length_scaling(polygon, mesh_nodes, &mut transformed_element_nodes);
    transformed_element_nodes
}

/// Applies a regularizing transformation, edge length scaling, and
/// rho-relaxation toward the original node positions (Definition 5.6).
#[must_use]
pub fn transform_scale_and_relax_element(
    transformation: &GeneralizedPolygonTransformation,
    relaxation_factor_rho: f64,
    polygon: &Polygon,
    mesh_nodes: &[Vec2],
) -> Vec<Vec2> {
    let mut new_element_nodes = transform_and_scale_element(transformation, polygon, mesh_nodes);
    if relaxation_factor_rho != 1.0 {
        let one_minus_rho = 1.0 - relaxation_factor_rho;
        for (node_number, new_node) in new_element_nodes.iter_mut().enumerate() {
            let original = mesh_nodes[polygon.node_index(node_number)];
            *new_node = original.mul_scalar(one_minus_rho) + new_node.mul_scalar(relaxation_factor_rho);
        }
    }
    new_element_nodes
}

fn indices_of_nodes_to_reset(polygon_mean_ratio_values: &[f64], mesh: &PolygonalMesh) -> HashSet<usize> {
    let mut indices_of_nodes_to_reset = HashSet::new();
    for (polygon_index, polygon) in mesh.polygons().iter().enumerate() {
        if polygon_mean_ratio_values[polygon_index] <= 0.0 {
            indices_of_nodes_to_reset.extend(polygon.node_indices().iter().copied());
        }
    }
    indices_of_nodes_to_reset
}

fn reset_nodes_and_get_affected_polygon_indices(
    indices_of_nodes_to_reset: &HashSet<usize>,
    mesh: &PolygonalMesh,
    new_node_positions: &mut [Vec2],
) -> HashSet<usize> {
    let mut indices_of_affected_polygons = HashSet::new();
    for &node_index in indices_of_nodes_to_reset {
        new_node_positions[node_index] = mesh.nodes()[node_index];
        indices_of_affected_polygons.extend(mesh.attached_polygon_indices(node_index).iter().copied());
    }
    indices_of_affected_polygons
}

/// Guarantees mesh validity after a simultaneous smoothing step by
/// iteratively resetting nodes that produced an invalid polygon back to
/// their previously committed positions, recomputing only the mean ratios
/// of polygons affected by a reset. Termination is guaranteed because the
/// mesh was valid before this step: the worst case resets every node.
///
/// Commits `new_node_positions` to `mesh` and returns the resulting
/// [`MeshQuality`] computed in fast/abort mode (mirroring the guarantee that
/// every mean ratio here is positive once the loop has converged).
pub fn iteratively_reset_nodes_resulting_in_invalid_elements(
    new_node_positions: &mut Vec<Vec2>,
    polygon_mean_ratio_values: &mut [f64],
    mesh: &mut PolygonalMesh,
) -> Result<MeshQuality, SmoothingError> {
    for (value, polygon) in polygon_mean_ratio_values.iter_mut().zip(mesh.polygons()) {
        *value = mean_ratio(polygon, new_node_positions);
    }
    loop {
        let nodes_to_reset = indices_of_nodes_to_reset(polygon_mean_ratio_values, mesh);
        if nodes_to_reset.is_empty() {
            break;
        }
        let affected_polygons =
            reset_nodes_and_get_affected_polygon_indices(&nodes_to_reset, mesh, new_node_positions);
        for polygon_index in affected_polygons {
            polygon_mean_ratio_values[polygon_index] =
                mean_ratio(&mesh.polygons()[polygon_index], new_node_positions);
        }
    }
    mesh.set_nodes(new_node_positions.clone())?;
    Ok(MeshQuality::from_mean_ratios_fast(polygon_mean_ratio_values))
}

/// Validates that `transformations` carries one regularizing transformation
/// per polygon size from 3 up to `max_polygon_size`, addressable by size
/// (`transformations[n]` is the transformation for `n`-gons).
pub fn check_transformations(
    max_polygon_size: usize,
    transformations: &[GeneralizedPolygonTransformation],
) -> Result<(), SmoothingError> {
    if max_polygon_size >= transformations.len() {
        return Err(SmoothingError::InvalidTransformationSet {
            expected: max_polygon_size + 1,
            actual: transformations.len(),
        });
    }
    for polygon_size in 3..=max_polygon_size {
        if !transformations[polygon_size].is_counterclockwise_regularizing(polygon_size) {
            return Err(SmoothingError::InvalidTransformationSet {
                expected: max_polygon_size + 1,
                actual: transformations.len(),
            });
        }
    }
    Ok(())
}

/// As [`check_transformations`], sized to `mesh`'s largest polygon.
pub fn check_transformations_for_mesh(
    mesh: &PolygonalMesh,
    transformations: &[GeneralizedPolygonTransformation],
) -> Result<(), SmoothingError> {
    check_transformations(mesh.max_polygon_size(), transformations)
}
