use std::collections::HashSet;

use crate::geom::{MeshQuality, Polygon, Vec2, mean_ratio_of_polygons};

use super::error::MeshError;

/// A planar polygonal mesh: nodes, polygons referencing them, a fixed-node
/// set, and derived topology built once at construction. Only node
/// *positions* ever change after construction (via [`Self::set_nodes`] or
/// [`Self::nodes_mut`]) — the polygon list, fixed-node set, and every
/// derived topology table are immutable for the mesh's lifetime.
#[derive(Debug, Clone)]
pub struct PolygonalMesh {
    nodes: Vec<Vec2>,
    polygons: Vec<Polygon>,
    fixed_node_indices: HashSet<usize>,

    non_fixed_node_indices: Vec<usize>,
    all_fixed_polygon: Vec<bool>,

    edge_neighbors: Vec<HashSet<usize>>,
    attached_polygon_indices: Vec<HashSet<usize>>,
    neighbor_polygon_indices: Vec<HashSet<usize>>,

    max_polygon_size: usize,
}

impl PolygonalMesh {
    pub fn new(
        nodes: Vec<Vec2>,
        polygons: Vec<Polygon>,
        fixed_node_indices: HashSet<usize>,
    ) -> Result<Self, MeshError> {
        if fixed_node_indices.len() > nodes.len() {
            return Err(MeshError::TooManyFixedNodes {
                fixed_count: fixed_node_indices.len(),
                node_count: nodes.len(),
            });
        }

        let non_fixed_node_indices: Vec<usize> =
            (0..nodes.len()).filter(|i| !fixed_node_indices.contains(i)).collect();

        let mut all_fixed_polygon = vec![false; polygons.len()];
        let mut edge_neighbors = vec![HashSet::new(); nodes.len()];
        let mut attached_polygon_indices = vec![HashSet::new(); nodes.len()];
        let mut max_polygon_size = 0usize;

        for (polygon_index, polygon) in polygons.iter().enumerate() {
            all_fixed_polygon[polygon_index] =
                polygon.node_indices().iter().all(|i| fixed_node_indices.contains(i));
            max_polygon_size = max_polygon_size.max(polygon.len());

            for node_number in 0..polygon.len() {
                let predecessor = polygon.predecessor_node_index(node_number);
                let current = polygon.node_index(node_number);
                let successor = polygon.successor_node_index(node_number);

                if current >= nodes.len() {
                    return Err(MeshError::NodeIndexOutOfRange {
                        polygon_index,
                        node_index: current,
                        node_count: nodes.len(),
                    });
                }

                edge_neighbors[current].insert(predecessor);
                edge_neighbors[current].insert(successor);
                attached_polygon_indices[current].insert(polygon_index);
            }
        }

        let mut neighbor_polygon_indices = vec![HashSet::new(); polygons.len()];
        for (polygon_index, polygon) in polygons.iter().enumerate() {
            for &node_index in polygon.node_indices() {
                neighbor_polygon_indices[polygon_index]
                    .extend(attached_polygon_indices[node_index].iter().copied());
            }
            neighbor_polygon_indices[polygon_index].remove(&polygon_index);
        }

        Ok(Self {
            nodes,
            polygons,
            fixed_node_indices,
            non_fixed_node_indices,
            all_fixed_polygon,
            edge_neighbors,
            attached_polygon_indices,
            neighbor_polygon_indices,
            max_polygon_size,
        })
    }

    #[must_use]
    pub fn nodes(&self) -> &[Vec2] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Vec2] {
        &mut self.nodes
    }

    pub fn set_nodes(&mut self, new_nodes: Vec<Vec2>) -> Result<(), MeshError> {
        if new_nodes.len() != self.nodes.len() {
            return Err(MeshError::NodeCountMismatch {
                expected: self.nodes.len(),
                actual: new_nodes.len(),
            });
        }
        self.nodes = new_nodes;
        Ok(())
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    #[must_use]
    pub fn fixed_node_indices(&self) -> &HashSet<usize> {
        &self.fixed_node_indices
    }

    #[must_use]
    pub fn non_fixed_node_indices(&self) -> &[usize] {
        &self.non_fixed_node_indices
    }

    #[must_use]
    pub fn is_node_fixed(&self, node_index: usize) -> bool {
        self.fixed_node_indices.contains(&node_index)
    }

    #[must_use]
    pub fn is_fixed_polygon(&self, polygon_index: usize) -> bool {
        self.all_fixed_polygon[polygon_index]
    }

    #[must_use]
    pub fn edge_neighbors(&self, node_index: usize) -> &HashSet<usize> {
        &self.edge_neighbors[node_index]
    }

    #[must_use]
    pub fn attached_polygon_indices(&self, node_index: usize) -> &HashSet<usize> {
        &self.attached_polygon_indices[node_index]
    }

    #[must_use]
    pub fn neighbor_polygon_indices(&self, polygon_index: usize) -> &HashSet<usize> {
        &self.neighbor_polygon_indices[polygon_index]
    }

    #[must_use]
    pub fn max_polygon_size(&self) -> usize {
        self.max_polygon_size
    }

    /// `true` iff every node of every polygon is fixed (the heap and
    /// `q_min*` have no improvable polygon to report in that case).
    #[must_use]
    pub fn is_all_fixed_mesh(&self) -> bool {
        self.all_fixed_polygon.iter().all(|&fixed| fixed)
    }

    /// Mean-ratio qualities of every polygon, in polygon order.
    #[must_use]
    pub fn polygon_qualities(&self) -> Vec<f64> {
        mean_ratio_of_polygons(&self.polygons, &self.nodes)
    }

    /// Mesh-level quality aggregates computed from the current node
    /// positions (full mode: always determines `n_invalid`, and `q_min*`
    /// whenever the mesh is valid and has a non-fixed polygon).
    #[must_use]
    pub fn quality(&self) -> MeshQuality {
        let qualities = self.polygon_qualities();
        MeshQuality::from_polygon_qualities(&qualities, &self.all_fixed_polygon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_mesh() -> PolygonalMesh {
        let nodes = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let polygons = vec![Polygon::new(vec![0, 1, 2, 3]).unwrap()];
        PolygonalMesh::new(nodes, polygons, HashSet::from([0, 1])).unwrap()
    }

    #[test]
    fn derives_edge_and_attachment_topology() {
        let mesh = square_mesh();
        assert_eq!(mesh.edge_neighbors(0), &HashSet::from([1, 3]));
        assert_eq!(mesh.attached_polygon_indices(2), &HashSet::from([0]));
        assert_eq!(mesh.max_polygon_size(), 4);
    }

    #[test]
    fn non_fixed_nodes_exclude_fixed_set() {
        let mesh = square_mesh();
        assert_eq!(mesh.non_fixed_node_indices(), &[2, 3]);
        assert!(!mesh.is_fixed_polygon(0));
        assert!(!mesh.is_all_fixed_mesh());
    }

    #[test]
    fn rejects_out_of_range_node_index() {
        let nodes = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        let polygons = vec![Polygon::new(vec![0, 1, 5]).unwrap()];
        let err = PolygonalMesh::new(nodes, polygons, HashSet::new()).unwrap_err();
        assert!(matches!(err, MeshError::NodeIndexOutOfRange { node_index: 5, .. }));
    }

    #[test]
    fn set_nodes_rejects_length_mismatch() {
        let mut mesh = square_mesh();
        let err = mesh.set_nodes(vec![Vec2::ZERO]).unwrap_err();
        assert!(matches!(err, MeshError::NodeCountMismatch { expected: 4, actual: 1 }));
    }

    #[test]
    fn neighbor_polygons_share_a_node_without_self() {
        let nodes = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(2.0, 0.0),
        ];
        let polygons =
            vec![Polygon::new(vec![0, 1, 2, 3]).unwrap(), Polygon::new(vec![1, 4, 2]).unwrap()];
        let mesh = PolygonalMesh::new(nodes, polygons, HashSet::new()).unwrap();
        assert_eq!(mesh.neighbor_polygon_indices(0), &HashSet::from([1]));
        assert_eq!(mesh.neighbor_polygon_indices(1), &HashSet::from([0]));
    }
}
