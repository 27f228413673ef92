use std::time::Instant;

use crate::geom::{Vec2, mean_ratio};
use crate::mesh::PolygonalMesh;

use super::common::{check_transformations_for_mesh, transform_scale_and_relax_element};
use super::config::GetmeSequentialConfig;
use super::error::SmoothingError;
use super::heap::PolygonQualityMinHeap;
use super::result::SmoothingResult;

/// Local quality assessment of one tentative transformation: the
/// transformed polygon's own mean ratio, and the mean ratios of every
/// neighbor polygon, collected only if every one of them stays valid. Mirrors
/// the early-exit-on-first-invalid-neighbor behavior of the original
/// algorithm (a later neighbor is never even evaluated once one has failed).
struct LocalQualityAssessment {
    all_elements_valid: bool,
    transformed_polygon_mean_ratio: f64,
    neighbor_mean_ratios: Vec<(usize, f64)>,
}

fn transform_polygon_into_temporary_nodes(
    mesh: &PolygonalMesh,
    config: &GetmeSequentialConfig,
    polygon_index: usize,
    temporary_nodes: &mut [Vec2],
) {
    let polygon = &mesh.polygons()[polygon_index];
    let transformed_nodes = transform_scale_and_relax_element(
        &config.polygon_transformations[polygon.len()],
        config.relaxation_parameter_rho,
        polygon,
        mesh.nodes(),
    );
    for (node_number, &node_index) in polygon.node_indices().iter().enumerate() {
        if !mesh.is_node_fixed(node_index) {
            temporary_nodes[node_index] = transformed_nodes[node_number];
        }
    }
}

fn assess_local_quality(
    mesh: &PolygonalMesh,
    transformed_polygon_index: usize,
    temporary_nodes: &[Vec2],
) -> LocalQualityAssessment {
    let transformed_polygon_mean_ratio =
        mean_ratio(&mesh.polygons()[transformed_polygon_index], temporary_nodes);
    let mut result = LocalQualityAssessment {
        all_elements_valid: false,
        transformed_polygon_mean_ratio,
        neighbor_mean_ratios: Vec::new(),
    };
    if transformed_polygon_mean_ratio <= 0.0 {
        return result;
    }
    for &neighbor_polygon_index in mesh.neighbor_polygon_indices(transformed_polygon_index) {
        let neighbor_mean_ratio = mean_ratio(&mesh.polygons()[neighbor_polygon_index], temporary_nodes);
        if neighbor_mean_ratio <= 0.0 {
            return result;
        }
        result.neighbor_mean_ratios.push((neighbor_polygon_index, neighbor_mean_ratio));
    }
    result.all_elements_valid = true;
    result
}

fn copy_polygon_nodes(node_indices: &[usize], source: &[Vec2], target: &mut [Vec2]) {
    for &node_index in node_indices {
        target[node_index] = source[node_index];
    }
}

/// GETMe sequential smoothing (Section 6.1.3 of the GETMe book): repeatedly
/// picks the single worst polygon by penalty-corrected quality, tentatively
/// transforms just that element, and accepts the result only if neither it
/// nor any polygon sharing one of its nodes becomes invalid. Requires a
/// valid initial mesh, and always returns a valid mesh.
///
/// Unlike the other smoothers this one borrows its input mesh rather than
/// consuming it by value, since it is also invoked as the second phase of
/// [`super::getme`] against a mesh the caller still needs afterward for
/// comparison.
pub fn getme_sequential(
    mesh: &PolygonalMesh,
    config: &GetmeSequentialConfig,
) -> Result<SmoothingResult, SmoothingError> {
    check_transformations_for_mesh(mesh, &config.polygon_transformations)?;
    let mut heap = PolygonQualityMinHeap::new(mesh);
    if heap.contains_invalid_polygon() {
        return Err(SmoothingError::InvalidMesh(
            "GETMe sequential can only be applied to valid initial meshes".to_string(),
        ));
    }
    if config.quality_evaluation_cycle_length >= config.max_iterations {
        return Err(SmoothingError::InvalidArgument(
            "quality_evaluation_cycle_length must be smaller than max_iterations".to_string(),
        ));
    }

    let mut mesh = mesh.clone();
    let mut temporary_nodes = mesh.nodes().to_vec();
    let mut last_transformed_polygon_index: Option<usize> = None;

    let mut best_q_min_star_value = heap.q_min_star()?;
    let mut best_q_min_star_nodes = mesh.nodes().to_vec();
    let mut consecutive_no_improve_cycles = 0usize;

    let started_at = Instant::now();
    let mut iteration = 0usize;
    loop {
        iteration += 1;
        let transformed_polygon_index = heap.lowest_quality_polygon_index();

        if last_transformed_polygon_index == Some(transformed_polygon_index) {
            heap.add_to_penalty_sum(transformed_polygon_index, config.penalty_repeated);
        }

        transform_polygon_into_temporary_nodes(
            &mesh,
            config,
            transformed_polygon_index,
            &mut temporary_nodes,
        );
        let local_quality = assess_local_quality(&mesh, transformed_polygon_index, &temporary_nodes);
        let touched_node_indices: Vec<usize> =
            mesh.polygons()[transformed_polygon_index].node_indices().to_vec();
        if local_quality.all_elements_valid {
            let mut committed_nodes = mesh.nodes().to_vec();
            copy_polygon_nodes(&touched_node_indices, &temporary_nodes, &mut committed_nodes);
            mesh.set_nodes(committed_nodes)?;
            heap.update_mean_ratio_and_add_to_penalty_sum(
                transformed_polygon_index,
                local_quality.transformed_polygon_mean_ratio,
                -config.penalty_success,
            )?;
            for (neighbor_polygon_index, neighbor_mean_ratio) in local_quality.neighbor_mean_ratios {
                heap.update_mean_ratio_if_not_fixed(neighbor_polygon_index, neighbor_mean_ratio);
            }
            log::trace!(
                "getme_sequential iteration {iteration}: accepted polygon {transformed_polygon_index}"
            );
        } else {
            copy_polygon_nodes(&touched_node_indices, mesh.nodes(), &mut temporary_nodes);
            heap.add_to_penalty_sum(transformed_polygon_index, config.penalty_invalid);
            log::trace!(
                "getme_sequential iteration {iteration}: rejected polygon {transformed_polygon_index}"
            );
        }
        last_transformed_polygon_index = Some(transformed_polygon_index);

        if iteration % config.quality_evaluation_cycle_length == 0 {
            let q_min_star = heap.q_min_star()?;
            if q_min_star > best_q_min_star_value {
                best_q_min_star_value = q_min_star;
                best_q_min_star_nodes = mesh.nodes().to_vec();
                consecutive_no_improve_cycles = 0;
            } else {
                consecutive_no_improve_cycles += 1;
            }
            log::debug!(
                "getme_sequential cycle at iteration {iteration}: q_min*={q_min_star}, best={best_q_min_star_value}"
            );
        }

        if iteration == config.max_iterations
            || consecutive_no_improve_cycles == config.max_no_improvement_cycles
        {
            break;
        }
    }

    mesh.set_nodes(best_q_min_star_nodes)?;
    let elapsed = started_at.elapsed().as_secs_f64();
    log::debug!("getme_sequential terminated after {iteration} iterations, q_min*={best_q_min_star_value}");
    Ok(SmoothingResult::new("GETMe sequential", mesh, elapsed, iteration))
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
    fn getme_sequential_never_decreases_best_q_min_star() {
        let mesh = fan_mesh();
        let before = mesh.quality().q_min_star().unwrap();
        let mut config =
            GetmeSequentialConfig::new(3, PolygonTransformationSet::GETMeBookExamples).unwrap();
        config.max_iterations = 500;
        config.quality_evaluation_cycle_length = 10;
        let result = getme_sequential(&mesh, &config).unwrap();
        assert!(result.mesh_quality.q_min_star().unwrap() >= before - 1e-12);
        assert!(result.iterations <= config.max_iterations);
    }

    #[test]
    fn getme_sequential_preserves_fixed_nodes() {
        let mesh = fan_mesh();
        let fixed_positions: Vec<_> =
            mesh.fixed_node_indices().iter().map(|&i| (i, mesh.nodes()[i])).collect();
        let mut config =
            GetmeSequentialConfig::new(3, PolygonTransformationSet::GETMeBookExamples).unwrap();
        config.max_iterations = 200;
        config.quality_evaluation_cycle_length = 10;
        let result = getme_sequential(&mesh, &config).unwrap();
        for (index, position) in fixed_positions {
            assert_eq!(result.mesh.nodes()[index], position);
        }
    }

    #[test]
    fn getme_sequential_rejects_invalid_initial_mesh() {
        let nodes = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 1.0),
        ];
        let polygons = vec![Polygon::new(vec![0, 1, 2, 3]).unwrap()];
        let mesh = PolygonalMesh::new(nodes, polygons, HashSet::new()).unwrap();
        let config = GetmeSequentialConfig::new(4, PolygonTransformationSet::GETMeBookExamples).unwrap();
        let err = getme_sequential(&mesh, &config).unwrap_err();
        assert!(matches!(err, SmoothingError::InvalidMesh(_)));
    }

    #[test]
    fn getme_sequential_rejects_cycle_length_not_smaller_than_max_iterations() {
        let mesh = fan_mesh();
        let mut config =
            GetmeSequentialConfig::new(3, PolygonTransformationSet::GETMeBookExamples).unwrap();
        config.max_iterations = 5;
        config.quality_evaluation_cycle_length = 5;
        let err = getme_sequential(&mesh, &config).unwrap_err();
        assert!(matches!(err, SmoothingError::InvalidArgument(_)));
    }
}
