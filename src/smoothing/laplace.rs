use std::time::Instant;

use crate::geom::{MeshQuality, Vec2, mean_ratio};
use crate::mesh::PolygonalMesh;

use super::common::{iteratively_reset_nodes_resulting_in_invalid_elements, update_max_squared_node_relocation_distance};
use super::config::{BasicLaplaceConfig, SmartLaplaceConfig};
use super::error::SmoothingError;
use super::result::SmoothingResult;

fn arithmetic_mean_of_edge_connected_nodes(mesh: &PolygonalMesh, node_index: usize) -> Vec2 {
    let connected = mesh.edge_neighbors(node_index);
    let sum = connected.iter().fold(Vec2::ZERO, |acc, &i| acc + mesh.nodes()[i]);
    sum.div_scalar(connected.len() as f64)
}

/// Plain Laplacian smoothing: repeatedly moves every non-fixed node to the
/// arithmetic mean of its edge-connected neighbors, ignoring element
/// quality entirely. Does not guarantee the resulting mesh stays valid.
pub fn basic_laplace(mut mesh: PolygonalMesh, config: &BasicLaplaceConfig) -> Result<SmoothingResult, SmoothingError> {
    let started_at = Instant::now();
    let mut iteration = 0usize;

    loop {
        iteration += 1;
        let mut max_squared_node_relocation_distance = 0.0;
        let mut new_node_positions = mesh.nodes().to_vec();
        for &node_index in mesh.non_fixed_node_indices() {
            let new_node_position = arithmetic_mean_of_edge_connected_nodes(&mesh, node_index);
            new_node_positions[node_index] = new_node_position;
            update_max_squared_node_relocation_distance(
                mesh.nodes()[node_index],
                new_node_position,
                &mut max_squared_node_relocation_distance,
            );
        }
        mesh.set_nodes(new_node_positions)?;

        if iteration == config.max_iterations
            || max_squared_node_relocation_distance <= config.max_squared_node_relocation_distance_threshold
        {
            break;
        }
    }

    let elapsed = started_at.elapsed().as_secs_f64();
    log::debug!("basic_laplace terminated after {iteration} iterations");
    Ok(SmoothingResult::new("Basic Laplace", mesh, elapsed, iteration))
}

/// Tentatively moves `node_index_to_update` to the arithmetic mean of its
/// edge-connected neighbors and commits it to `final_new_node_positions`
/// only if doing so strictly increases the summed mean ratio of its
/// attached polygons without invalidating any of them.
fn update_node_position_if_quality_is_improved(
    mesh: &PolygonalMesh,
    polygon_mean_ratio_values: &[f64],
    node_index_to_update: usize,
    temporary_new_node_positions: &mut [Vec2],
    final_new_node_positions: &mut [Vec2],
) {
    let new_node_position = arithmetic_mean_of_edge_connected_nodes(mesh, node_index_to_update);
    temporary_new_node_positions[node_index_to_update] = new_node_position;

    let mut old_attached_polygons_mean_ratio_sum = 0.0;
    let mut new_attached_polygons_mean_ratio_sum = 0.0;
    for &attached_polygon_index in mesh.attached_polygon_indices(node_index_to_update) {
        old_attached_polygons_mean_ratio_sum += polygon_mean_ratio_values[attached_polygon_index];
        let new_polygon_mean_ratio_value =
            mean_ratio(&mesh.polygons()[attached_polygon_index], temporary_new_node_positions);
        if new_polygon_mean_ratio_value <= 0.0 {
            return;
        }
        new_attached_polygons_mean_ratio_sum += new_polygon_mean_ratio_value;
    }
    if new_attached_polygons_mean_ratio_sum > old_attached_polygons_mean_ratio_sum {
        final_new_node_positions[node_index_to_update] = new_node_position;
    }
}

/// Quality-guarded Laplacian smoothing: a node is only moved to its
/// edge-neighbor centroid if doing so improves the combined quality of its
/// attached polygons without invalidating any of them. Requires a valid
/// initial mesh, and always returns a valid mesh.
pub fn smart_laplace(mut mesh: PolygonalMesh, config: &SmartLaplaceConfig) -> Result<SmoothingResult, SmoothingError> {
    let mut polygon_mean_ratio_values = mesh.polygon_qualities();
    let mut old_mesh_quality = MeshQuality::from_mean_ratios_fast(&polygon_mean_ratio_values);
    if !old_mesh_quality.is_valid_mesh() {
        return Err(SmoothingError::InvalidMesh(
            "smart Laplace can only be applied to valid initial meshes".to_string(),
        ));
    }

    let mut new_node_positions = mesh.nodes().to_vec();
    let mut temporary_node_positions = mesh.nodes().to_vec();
    let mut best_q_mean_value = old_mesh_quality.q_mean();
    let mut best_q_mean_nodes = mesh.nodes().to_vec();

    let started_at = Instant::now();
    let mut iteration = 0usize;
    loop {
        iteration += 1;
        for &node_index in mesh.non_fixed_node_indices() {
            update_node_position_if_quality_is_improved(
                &mesh,
                &polygon_mean_ratio_values,
                node_index,
                &mut temporary_node_positions,
                &mut new_node_positions,
            );
            temporary_node_positions[node_index] = mesh.nodes()[node_index];
        }

        let new_mesh_quality = iteratively_reset_nodes_resulting_in_invalid_elements(
            &mut new_node_positions,
            &mut polygon_mean_ratio_values,
            &mut mesh,
        )?;

        if best_q_mean_value < new_mesh_quality.q_mean() {
            best_q_mean_value = new_mesh_quality.q_mean();
            best_q_mean_nodes = mesh.nodes().to_vec();
        }

        let q_mean_improvement = new_mesh_quality.q_mean() - old_mesh_quality.q_mean();
        old_mesh_quality = new_mesh_quality;
        if iteration == config.max_iterations || q_mean_improvement <= config.q_mean_improvement_threshold {
            break;
        }
        new_node_positions = mesh.nodes().to_vec();
        temporary_node_positions = mesh.nodes().to_vec();
    }

    mesh.set_nodes(best_q_mean_nodes)?;
    let elapsed = started_at.elapsed().as_secs_f64();
    log::debug!("smart_laplace terminated after {iteration} iterations, q_mean={best_q_mean_value}");
    Ok(SmoothingResult::new("Smart Laplace", mesh, elapsed, iteration))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::geom::Polygon;

    use super::*;

    fn unit_square_with_offset_center(offset: Vec2) -> PolygonalMesh {
        let nodes = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(1.0, 1.0) + offset,
        ];
        let polygons = vec![
            Polygon::new(vec![0, 1, 4]).unwrap(),
            Polygon::new(vec![1, 2, 4]).unwrap(),
            Polygon::new(vec![2, 3, 4]).unwrap(),
            Polygon::new(vec![3, 0, 4]).unwrap(),
        ];
        PolygonalMesh::new(nodes, polygons, HashSet::from([0, 1, 2, 3])).unwrap()
    }

    #[test]
    fn basic_laplace_moves_center_node_toward_centroid() {
        let mesh = unit_square_with_offset_center(Vec2::new(0.3, -0.2));
        let config = BasicLaplaceConfig::new(1e-12);
        let result = basic_laplace(mesh, &config).unwrap();
        let center = result.mesh.nodes()[4];
        assert!((center.x - 1.0).abs() < 1e-6);
        assert!((center.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn smart_laplace_rejects_invalid_initial_mesh() {
        let nodes = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ];
        let polygons = vec![Polygon::new(vec![0, 1, 2, 3]).unwrap()];
        let mesh = PolygonalMesh::new(nodes, polygons, HashSet::new()).unwrap();
        let err = smart_laplace(mesh, &SmartLaplaceConfig::default()).unwrap_err();
        assert!(matches!(err, SmoothingError::InvalidMesh(_)));
    }

    #[test]
    fn smart_laplace_never_decreases_best_q_mean() {
        let mesh = unit_square_with_offset_center(Vec2::new(0.3, -0.2));
        let before = mesh.quality().q_mean();
        let result = smart_laplace(mesh, &SmartLaplaceConfig::default()).unwrap();
        assert!(result.mesh_quality.q_mean() >= before - 1e-12);
    }
}
