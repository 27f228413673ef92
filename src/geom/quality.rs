use std::f64::consts::PI;

use super::polygon::Polygon;
use super::vector::Vec2;

/// Equation 2.6 of the GETMe book: one corner's contribution to the mean
/// ratio quality sum, `det(S_k) / trace(S_k^T S_k)` with `S_k = D(T_k) W^-1`,
/// expressed via closed-form constants to avoid inverting `W` explicitly.
fn mean_ratio_summand(polygon: &Polygon, node_number: usize, nodes: &[Vec2], n: usize) -> f64 {
    let predecessor = nodes[polygon.predecessor_node_index(node_number)];
    let center = nodes[polygon.node_index(node_number)];
    let successor = nodes[polygon.successor_node_index(node_number)];

    // Reference regular n-gon with centroid (0,0) and radius 1:
    // W = [successor-center, predecessor-center] = [a,a; b,-b].
    let regular_polygon_angle = 2.0 * PI / n as f64;
    let a = regular_polygon_angle.cos() - 1.0;
    let b = regular_polygon_angle.sin();

    let diff_successor_center = successor - center;
    let diff_predecessor_center = predecessor - center;

    let d11 = diff_successor_center.x;
    let d12 = diff_predecessor_center.x;
    let d21 = diff_successor_center.y;
    let d22 = diff_predecessor_center.y;

    // det(S_k) = det(D(T_k)) / det(W).
    let det_s = (d12 * d21 - d11 * d22) / (2.0 * a * b);
    if det_s < 0.0 {
        return -1.0;
    }
    let trace = ((d11 - d12).powi(2) + (d21 - d22).powi(2)) / (4.0 * b * b)
        + ((d11 + d12).powi(2) + (d21 + d22).powi(2)) / (4.0 * a * a);
    det_s / trace
}

/// Mean-ratio quality of one polygon: a scalar in `[0,1]`, or `-1.0` for an
/// invalid (self-intersecting or negatively oriented) polygon. The `1.0`
/// upper bound is an exact clamp absorbing floating-point overshoot.
#[must_use]
pub fn mean_ratio(polygon: &Polygon, nodes: &[Vec2]) -> f64 {
    let n = polygon.len();
    if n == 3 {
        // All corner simplices coincide for a triangle: one summand suffices,
        // and there is no division by the node count.
        let summand = mean_ratio_summand(polygon, 0, nodes, n);
        if summand < 0.0 { -1.0 } else { (2.0 * summand).min(1.0) }
    } else {
        let mut sum = 0.0;
        for node_number in 0..n {
            let summand = mean_ratio_summand(polygon, node_number, nodes, n);
            if summand < 0.0 {
                return -1.0;
            }
            sum += summand;
        }
        (2.0 * sum / n as f64).min(1.0)
    }
}

/// Mean-ratio quality of every polygon, in polygon order. This is the
/// designated data-parallel hot loop: each polygon reads the shared
/// immutable node array and writes its own output slot independently of the
/// others, so the computation may be parallelized (see the `parallel`
/// feature) without changing any result.
#[must_use]
pub fn mean_ratio_of_polygons(polygons: &[Polygon], nodes: &[Vec2]) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        polygons.par_iter().map(|polygon| mean_ratio(polygon, nodes)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        polygons.iter().map(|polygon| mean_ratio(polygon, nodes)).collect()
    }
}

/// Mesh-level quality aggregates (Equation 2.7 of the GETMe book).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshQuality {
    q_min: f64,
    q_min_star: Option<f64>,
    q_mean: f64,
    n_invalid: Option<usize>,
}

impl MeshQuality {
    /// Full mode: compute quality from per-polygon mean ratios and a
    /// per-polygon "all nodes fixed" flag, never aborting early. Always
    /// determines `n_invalid`; determines `q_min_star` whenever at least one
    /// polygon is non-fixed and the mesh is valid.
    #[must_use]
    pub fn from_polygon_qualities(mean_ratios: &[f64], all_fixed_polygon: &[bool]) -> Self {
        let mut q_min = f64::INFINITY;
        let mut q_min_star = f64::INFINITY;
        let mut sum = 0.0;
        let mut n_invalid = 0usize;
        for (&q, &is_fixed) in mean_ratios.iter().zip(all_fixed_polygon) {
            if q <= 0.0 {
                n_invalid += 1;
            }
            sum += q;
            if q < q_min {
                q_min = q;
            }
            if !is_fixed && q < q_min_star {
                q_min_star = q;
            }
        }
        let count = mean_ratios.len() as f64;
        if n_invalid > 0 {
            return Self { q_min: -1.0, q_min_star: None, q_mean: -1.0, n_invalid: Some(n_invalid) };
        }
        let q_min_star = if q_min_star <= 1.0 { Some(q_min_star) } else { None };
        Self { q_min, q_min_star, q_mean: sum / count, n_invalid: Some(0) }
    }

    /// Fast mode: abort on the first invalid mean ratio, producing
    /// `q_min == q_mean == -1.0` and no invalid count. `q_min_star` is never
    /// computed in this mode since no per-polygon fixed information is given.
    #[must_use]
    pub fn from_mean_ratios_fast(mean_ratios: &[f64]) -> Self {
        let mut q_min = f64::INFINITY;
        let mut sum = 0.0;
        for &q in mean_ratios {
            if q <= 0.0 {
                return Self { q_min: -1.0, q_min_star: None, q_mean: -1.0, n_invalid: None };
            }
            if q < q_min {
                q_min = q;
            }
            sum += q;
        }
        Self { q_min, q_min_star: None, q_mean: sum / mean_ratios.len() as f64, n_invalid: None }
    }

    /// Full mode over mean ratios alone (no fixed-polygon information, hence
    /// `q_min_star` is always `None`), still determining `n_invalid`.
    #[must_use]
    pub fn from_mean_ratios_full(mean_ratios: &[f64]) -> Self {
        let all_non_fixed = vec![false; mean_ratios.len()];
        Self::from_polygon_qualities(mean_ratios, &all_non_fixed)
    }

    #[must_use]
    pub const fn q_min(&self) -> f64 {
        self.q_min
    }

    #[must_use]
    pub const fn q_min_star(&self) -> Option<f64> {
        self.q_min_star
    }

    #[must_use]
    pub const fn q_mean(&self) -> f64 {
        self.q_mean
    }

    #[must_use]
    pub const fn n_invalid(&self) -> Option<usize> {
        self.n_invalid
    }

    #[must_use]
    pub fn is_valid_mesh(&self) -> bool {
        self.q_min > 0.0
    }
}
