use std::cmp::Ordering;

use crate::mesh::PolygonalMesh;

use super::error::SmoothingError;

/// One polygon's entry in a [`PolygonQualityMinHeap`].
///
/// Field declaration order is load-bearing: [`Ord`] compares fields in
/// declaration order, so a mesh's fixed polygons (`is_fixed_polygon == true`)
/// always sort after every non-fixed polygon regardless of quality, and
/// among non-fixed polygons the lowest penalty-corrected mean ratio always
/// sorts first.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MinHeapEntry {
    is_fixed_polygon: bool,
    penalty_corrected_mean_ratio: f64,
    mean_ratio: f64,
    quality_penalty_sum: f64,
    polygon_index: usize,
}

impl Eq for MinHeapEntry {}

impl PartialOrd for MinHeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MinHeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.is_fixed_polygon
            .cmp(&other.is_fixed_polygon)
            .then_with(|| self.penalty_corrected_mean_ratio.total_cmp(&other.penalty_corrected_mean_ratio))
            .then_with(|| self.mean_ratio.total_cmp(&other.mean_ratio))
            .then_with(|| self.quality_penalty_sum.total_cmp(&other.quality_penalty_sum))
            .then_with(|| self.polygon_index.cmp(&other.polygon_index))
    }
}

impl MinHeapEntry {
    fn new(polygon_index: usize, initial_mean_ratio: f64, is_fixed_polygon: bool) -> Self {
        Self {
            is_fixed_polygon,
            penalty_corrected_mean_ratio: initial_mean_ratio,
            mean_ratio: initial_mean_ratio,
            quality_penalty_sum: 0.0,
            polygon_index,
        }
    }

    fn update_mean_ratio(&mut self, new_mean_ratio: f64) -> Result<(), SmoothingError> {
        if self.is_fixed_polygon {
            return Err(SmoothingError::StateError(
                "an all-fixed-nodes polygon cannot change quality".to_string(),
            ));
        }
        self.mean_ratio = new_mean_ratio;
        self.penalty_corrected_mean_ratio = new_mean_ratio + self.quality_penalty_sum;
        Ok(())
    }

    fn update_mean_ratio_and_add_to_penalty_sum(
        &mut self,
        new_mean_ratio: f64,
        penalty_change: f64,
    ) -> Result<(), SmoothingError> {
        if self.is_fixed_polygon {
            return Err(SmoothingError::StateError(
                "an all-fixed-nodes polygon cannot change quality".to_string(),
            ));
        }
        self.mean_ratio = new_mean_ratio;
        self.quality_penalty_sum = (self.quality_penalty_sum + penalty_change).max(0.0);
        self.penalty_corrected_mean_ratio = self.mean_ratio + self.quality_penalty_sum;
        Ok(())
    }

    fn add_to_penalty_sum(&mut self, penalty_change: f64) {
        self.quality_penalty_sum = (self.quality_penalty_sum + penalty_change).max(0.0);
        self.penalty_corrected_mean_ratio = self.mean_ratio + self.quality_penalty_sum;
    }
}

/// Min heap over penalty-corrected polygon qualities, used by
/// [`super::getme_sequential`] to pick which polygon to transform next.
///
/// Stored as a binary tree flattened into a vector (the usual array
/// representation of a binary heap), with a reverse lookup table mapping
/// each polygon index to its current position in that vector so arbitrary
/// entries can be updated in `O(log n)` instead of only the root.
#[derive(Debug, Clone)]
pub struct PolygonQualityMinHeap {
    binary_tree: Vec<MinHeapEntry>,
    polygon_index_to_entry_index: Vec<usize>,
}

impl PolygonQualityMinHeap {
    /// Builds a heap from `mesh`'s current polygon qualities. Entries are
    /// appended in polygon-index order and each is sifted into place
    /// immediately (`O(n log n)`), not bottom-up heapified.
    #[must_use]
    pub fn new(mesh: &PolygonalMesh) -> Self {
        let mean_ratios = mesh.polygon_qualities();
        let mut heap = Self {
            binary_tree: Vec::with_capacity(mesh.polygon_count()),
            polygon_index_to_entry_index: (0..mesh.polygon_count()).collect(),
        };
        for polygon_index in 0..mesh.polygon_count() {
            heap.binary_tree.push(MinHeapEntry::new(
                polygon_index,
                mean_ratios[polygon_index],
                mesh.is_fixed_polygon(polygon_index),
            ));
            heap.min_heapify_entry_of_polygon(polygon_index);
        }
        heap
    }

    #[must_use]
    pub fn lowest_quality_polygon_index(&self) -> usize {
        self.binary_tree[0].polygon_index
    }

    /// No-op if `polygon_index`'s polygon is an all-fixed-nodes polygon.
    pub fn update_mean_ratio_if_not_fixed(&mut self, polygon_index: usize, new_mean_ratio: f64) {
        let entry_index = self.polygon_index_to_entry_index[polygon_index];
        if self.binary_tree[entry_index].is_fixed_polygon {
            return;
        }
        self.binary_tree[entry_index].update_mean_ratio(new_mean_ratio).expect("checked non-fixed above");
        self.min_heapify_entry_of_polygon(polygon_index);
    }

    pub fn update_mean_ratio_and_add_to_penalty_sum(
        &mut self,
        polygon_index: usize,
        new_mean_ratio: f64,
        penalty_change: f64,
    ) -> Result<(), SmoothingError> {
        let entry_index = self.polygon_index_to_entry_index[polygon_index];
        self.binary_tree[entry_index]
            .update_mean_ratio_and_add_to_penalty_sum(new_mean_ratio, penalty_change)?;
        self.min_heapify_entry_of_polygon(polygon_index);
        Ok(())
    }

    pub fn add_to_penalty_sum(&mut self, polygon_index: usize, penalty_change: f64) {
        let entry_index = self.polygon_index_to_entry_index[polygon_index];
        self.binary_tree[entry_index].add_to_penalty_sum(penalty_change);
        self.min_heapify_entry_of_polygon(polygon_index);
    }

    /// `true` iff every polygon in the heap is an all-fixed-nodes polygon.
    /// Fixed polygons always sort to the end of the heap, so inspecting the
    /// root suffices.
    #[must_use]
    pub fn is_all_fixed_mesh(&self) -> bool {
        self.binary_tree[0].is_fixed_polygon
    }

    /// The lowest mean ratio among non-fixed polygons.
    pub fn q_min_star(&self) -> Result<f64, SmoothingError> {
        if self.is_all_fixed_mesh() {
            return Err(SmoothingError::StateError(
                "q_min_star is not defined for an all-fixed-polygon mesh".to_string(),
            ));
        }
        let mut q_min_star = f64::INFINITY;
        for entry in &self.binary_tree {
            if !entry.is_fixed_polygon && entry.mean_ratio < q_min_star {
                q_min_star = entry.mean_ratio;
            }
        }
        Ok(q_min_star)
    }

    #[must_use]
    pub fn contains_invalid_polygon(&self) -> bool {
        self.binary_tree.iter().any(|entry| entry.mean_ratio < 0.0)
    }

    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.binary_tree.len() == self.polygon_index_to_entry_index.len()
            && self.is_polygon_index_to_entry_index_consistent()
            && self.is_binary_tree_consistent()
    }

    fn is_first_quality_lower(&self, first_entry_index: usize, second_entry_index: usize) -> bool {
        self.binary_tree[first_entry_index] < self.binary_tree[second_entry_index]
    }

    fn swap_entries_and_adjust_mapping(&mut self, first_entry_index: usize, second_entry_index: usize) {
        self.binary_tree.swap(first_entry_index, second_entry_index);
        self.polygon_index_to_entry_index[self.binary_tree[first_entry_index].polygon_index] =
            first_entry_index;
        self.polygon_index_to_entry_index[self.binary_tree[second_entry_index].polygon_index] =
            second_entry_index;
    }

    /// Restores heap order around `polygon_index`'s entry after it changed:
    /// sift up until no parent outranks it, then unconditionally continue
    /// sifting down (an entry that moved up past its old parent may still
    /// be out of order relative to a new set of children at its new depth).
    fn min_heapify_entry_of_polygon(&mut self, polygon_index: usize) {
        let mut entry_index = self.polygon_index_to_entry_index[polygon_index];

        while entry_index > 0 {
            let parent_entry_index = (entry_index - 1) / 2;
            if self.is_first_quality_lower(parent_entry_index, entry_index) {
                break;
            }
            self.swap_entries_and_adjust_mapping(parent_entry_index, entry_index);
            entry_index = parent_entry_index;
        }

        let max_entry_index = self.binary_tree.len();
        loop {
            let left_child_index = 2 * entry_index + 1;
            let right_child_index = left_child_index + 1;
            let mut compare_with_left = left_child_index < max_entry_index;
            let mut compare_with_right = right_child_index < max_entry_index;

            let (mut left_child_index, mut right_child_index) = (left_child_index, right_child_index);
            if compare_with_left
                && compare_with_right
                && self.is_first_quality_lower(right_child_index, left_child_index)
            {
                std::mem::swap(&mut left_child_index, &mut right_child_index);
                std::mem::swap(&mut compare_with_left, &mut compare_with_right);
            }

            if compare_with_left && self.is_first_quality_lower(left_child_index, entry_index) {
                self.swap_entries_and_adjust_mapping(left_child_index, entry_index);
                entry_index = left_child_index;
            } else if compare_with_right && self.is_first_quality_lower(right_child_index, entry_index) {
                self.swap_entries_and_adjust_mapping(right_child_index, entry_index);
                entry_index = right_child_index;
            } else {
                break;
            }
        }
    }

    fn is_polygon_index_to_entry_index_consistent(&self) -> bool {
        for (polygon_index, &entry_index) in self.polygon_index_to_entry_index.iter().enumerate() {
            if polygon_index != self.binary_tree[entry_index].polygon_index {
                return false;
            }
        }
        let mut sorted_entry_indices = self.polygon_index_to_entry_index.clone();
        sorted_entry_indices.sort_unstable();
        sorted_entry_indices.iter().enumerate().all(|(index, &entry_index)| index == entry_index)
    }

    fn is_binary_tree_consistent(&self) -> bool {
        let number_of_entries = self.binary_tree.len();
        for entry_index in 0..number_of_entries {
            let left_child_index = 2 * entry_index + 1;
            if left_child_index < number_of_entries
                && self.is_first_quality_lower(left_child_index, entry_index)
            {
                return false;
            }
            let right_child_index = left_child_index + 1;
            if right_child_index < number_of_entries
                && self.is_first_quality_lower(right_child_index, entry_index)
            {
                return false;
            }
        }
        true
    }
}
