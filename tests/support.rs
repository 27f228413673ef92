//! Shared fixtures for the crate-level integration tests.

use std::collections::HashSet;

use getme_mesh::{Polygon, PolygonalMesh, Vec2};

/// Makes `log::debug!`/`log::trace!` output from the smoothing algorithms
/// visible when tests are run with `--nocapture`. Safe to call from every
/// test; `env_logger` only installs a logger once per process.
pub fn init_logging() {
    let _ = env_logger::try_init();
}

/// Scenario E1 of the test suite: a mixed mesh of triangles, a
/// quadrilateral, and a pentagon, with the first nine nodes fixed.
#[allow(dead_code)]
pub fn mixed_sample_mesh() -> PolygonalMesh {
    let nodes = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(5.0, -1.0),
        Vec2::new(7.0, -2.0),
        Vec2::new(9.0, 0.0),
        Vec2::new(9.0, 2.0),
        Vec2::new(9.0, 5.0),
        Vec2::new(6.0, 5.0),
        Vec2::new(3.0, 5.0),
        Vec2::new(0.0, 3.0),
        Vec2::new(6.0, 2.0),
        Vec2::new(3.0, 1.0),
    ];
    let polygons = vec![
        Polygon::new(vec![0, 1, 10]).unwrap(),
        Polygon::new(vec![1, 9, 10]).unwrap(),
        Polygon::new(vec![1, 2, 3, 4, 9]).unwrap(),
        Polygon::new(vec![4, 5, 6, 9]).unwrap(),
        Polygon::new(vec![9, 6, 10]).unwrap(),
        Polygon::new(vec![6, 7, 8, 10]).unwrap(),
        Polygon::new(vec![0, 10, 8]).unwrap(),
    ];
    let fixed: HashSet<usize> = (0..=8).collect();
    PolygonalMesh::new(nodes, polygons, fixed).unwrap()
}
