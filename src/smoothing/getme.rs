use std::time::Instant;

use crate::geom::{MeshQuality, Vec2};
use crate::mesh::PolygonalMesh;

use super::common::{
    check_transformations_for_mesh, iteratively_reset_nodes_resulting_in_invalid_elements,
    transform_and_scale_element, transform_scale_and_relax_element, update_max_squared_node_relocation_distance,
};
use super::config::{BasicGetmeSimultaneousConfig, GetmeConfig, GetmeSimultaneousConfig};
use super::error::SmoothingError;
use super::getme_sequential::getme_sequential;
use super::result::{GetmeResult, SmoothingResult};

/// Simultaneous GETMe smoothing ignoring element quality: every polygon is
/// regularized and edge-length-scaled independently, and a node's new
/// position is the average of its contributions from every attached
/// polygon (Section 6.1.1 of the GETMe book). Does not guarantee validity.
pub fn basic_getme_simultaneous(
    mut mesh: PolygonalMesh,
    config: &BasicGetmeSimultaneousConfig,
) -> Result<SmoothingResult, SmoothingError> {
    check_transformations_for_mesh(&mesh, &config.polygon_transformations)?;
    let started_at = Instant::now();
    let mut iteration = 0usize;
    let mut new_node_position_sums = vec![Vec2::ZERO; mesh.node_count()];

    loop {
        for polygon in mesh.polygons() {
            let number_of_polygon_nodes = polygon.len();
            let transformed_nodes = transform_and_scale_element(
                &config.polygon_transformations[number_of_polygon_nodes],
                polygon,
                mesh.nodes(),
            );
            for (node_number, &transformed_node) in transformed_nodes.iter().enumerate() {
                new_node_position_sums[polygon.node_index(node_number)] += transformed_node;
            }
        }

        let mut max_squared_node_relocation_distance = 0.0;
        for &node_index in mesh.non_fixed_node_indices().to_vec().iter() {
            let new_node_position = new_node_position_sums[node_index]
                .div_scalar(mesh.attached_polygon_indices(node_index).len() as f64);
            update_max_squared_node_relocation_distance(
                mesh.nodes()[node_index],
                new_node_position,
                &mut max_squared_node_relocation_distance,
            );
            mesh.nodes_mut()[node_index] = new_node_position;
        }

        iteration += 1;
        if iteration == config.max_iterations
            || max_squared_node_relocation_distance <= config.max_squared_node_relocation_distance_threshold
        {
            break;
        }
        new_node_position_sums.fill(Vec2::ZERO);
    }

    let elapsed = started_at.elapsed().as_secs_f64();
    log::debug!("basic_getme_simultaneous terminated after {iteration} iterations");
    Ok(SmoothingResult::new("Basic GETMe simultaneous", mesh, elapsed, iteration))
}

/// Simultaneous GETMe smoothing weighted by element quality (Section 6.1.2
/// of the GETMe book). Requires a valid initial mesh, and always returns a
/// valid mesh.
pub fn getme_simultaneous(
    mut mesh: PolygonalMesh,
    config: &GetmeSimultaneousConfig,
) -> Result<SmoothingResult, SmoothingError> {
    check_transformations_for_mesh(&mesh, &config.polygon_transformations)?;
    let mut polygon_mean_ratio_values = mesh.polygon_qualities();
    let mut old_mesh_quality = MeshQuality::from_mean_ratios_fast(&polygon_mean_ratio_values);
    if !old_mesh_quality.is_valid_mesh() {
        return Err(SmoothingError::InvalidMesh(
            "GETMe simultaneous can only be applied to valid initial meshes".to_string(),
        ));
    }

    let mut transformed_node_sums = vec![Vec2::ZERO; mesh.node_count()];
    let mut node_weight_sums = vec![0.0; mesh.node_count()];
    let mut new_node_positions = mesh.nodes().to_vec();
    let mut best_q_mean_value = old_mesh_quality.q_mean();
    let mut best_q_mean_nodes = mesh.nodes().to_vec();

    let started_at = Instant::now();
    let mut iteration = 0usize;
    loop {
        for (polygon_index, polygon) in mesh.polygons().iter().enumerate() {
            let number_of_polygon_nodes = polygon.len();
            let transformed_nodes = transform_scale_and_relax_element(
                &config.polygon_transformations[number_of_polygon_nodes],
                config.relaxation_parameter_rho,
                polygon,
                mesh.nodes(),
            );
            let weight = if config.weight_exponent_eta == 0.0 {
                1.0
            } else {
                (1.0 - polygon_mean_ratio_values[polygon_index]).powf(config.weight_exponent_eta)
            };
            for (node_number, &transformed_node) in transformed_nodes.iter().enumerate() {
                let node_index = polygon.node_index(node_number);
                transformed_node_sums[node_index] += transformed_node.mul_scalar(weight);
                node_weight_sums[node_index] += weight;
            }
        }

        for &node_index in mesh.non_fixed_node_indices() {
            if node_weight_sums[node_index] > 0.0 {
                new_node_positions[node_index] =
                    transformed_node_sums[node_index].div_scalar(node_weight_sums[node_index]);
            }
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

        iteration += 1;
        let q_mean_improvement = new_mesh_quality.q_mean() - old_mesh_quality.q_mean();
        old_mesh_quality = new_mesh_quality;
        if iteration == config.max_iterations || q_mean_improvement <= config.q_mean_improvement_threshold {
            break;
        }
        transformed_node_sums.fill(Vec2::ZERO);
        node_weight_sums.fill(0.0);
        new_node_positions = mesh.nodes().to_vec();
    }

    mesh.set_nodes(best_q_mean_nodes)?;
    let elapsed = started_at.elapsed().as_secs_f64();
    log::debug!("getme_simultaneous terminated after {iteration} iterations, q_mean={best_q_mean_value}");
    Ok(SmoothingResult::new("GETMe simultaneous", mesh, elapsed, iteration))
}

/// Combined GETMe smoothing: the simultaneous phase quickly improves mesh
/// quality broadly, then the sequential phase refines the remaining worst
/// elements one at a time (Section 6.2.1 of the GETMe book).
pub fn getme(mesh: PolygonalMesh, config: &GetmeConfig) -> Result<GetmeResult, SmoothingError> {
    let simultaneous_result = getme_simultaneous(mesh, &config.simultaneous)?;
    let simultaneous_mesh = simultaneous_result.mesh.clone();
    let sequential_result = getme_sequential(&simultaneous_mesh, &config.sequential)?;
    Ok(GetmeResult::from_phase_results(simultaneous_result, sequential_result))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::geom::Polygon;
    use crate::smoothing::config::PolygonTransformationSet;

    use super::*;

    fn fan_mesh() -> PolygonalMesh {
        let nodes = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(1.0, 1.0) + Vec2::new(0.3, -0.2),
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
    fn basic_getme_simultaneous_terminates_and_preserves_node_count() {
        let mesh = fan_mesh();
        let node_count = mesh.node_count();
        let config = BasicGetmeSimultaneousConfig::new(1e-14, 3, PolygonTransformationSet::GETMeBookExamples)
            .unwrap();
        let result = basic_getme_simultaneous(mesh, &config).unwrap();
        assert_eq!(result.mesh.node_count(), node_count);
        assert!(result.iterations <= config.max_iterations);
    }

    #[test]
    fn getme_simultaneous_never_decreases_best_q_mean() {
        let mesh = fan_mesh();
        let before = mesh.quality().q_mean();
        let config = GetmeSimultaneousConfig::new(3, PolygonTransformationSet::GETMeBookExamples).unwrap();
        let result = getme_simultaneous(mesh, &config).unwrap();
        assert!(result.mesh_quality.q_mean() >= before - 1e-12);
    }

    #[test]
    fn getme_simultaneous_rejects_invalid_initial_mesh() {
        let nodes = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ];
        let polygons = vec![Polygon::new(vec![0, 1, 2, 3]).unwrap()];
        let mesh = PolygonalMesh::new(nodes, polygons, HashSet::new()).unwrap();
        let config = GetmeSimultaneousConfig::new(4, PolygonTransformationSet::GETMeBookExamples).unwrap();
        let err = getme_simultaneous(mesh, &config).unwrap_err();
        assert!(matches!(err, SmoothingError::InvalidMesh(_)));
    }
}
