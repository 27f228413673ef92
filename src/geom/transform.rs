use std::f64::consts::PI;

use num_complex::Complex64;

use super::error::GeometryError;
use super::polygon::Polygon;
use super::vector::Vec2;

/// A regularizing affine transformation on one polygon, parameterized by
/// `(lambda, theta)` per Definition 5.4 of the GETMe book.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneralizedPolygonTransformation {
    lambda: f64,
    theta: f64,
    // Derived parameters, cf. Lemma 5.12 of the GETMe book.
    c1: f64,
    c2: f64,
    c3: f64,
}

impl GeneralizedPolygonTransformation {
    pub fn new(lambda: f64, theta: f64) -> Result<Self, GeometryError> {
        if !(lambda > 0.0 && lambda < 1.0) {
            return Err(GeometryError::LambdaOutOfRange { lambda });
        }
        if !(theta > 0.0 && theta < PI / 2.0) {
            return Err(GeometryError::ThetaOutOfRange { theta });
        }
        let c1 = (1.0 - lambda) * theta.tan();
        let c2 = lambda * (1.0 - lambda) - c1 * c1;
        let c3 = 1.0 - 2.0 * c2;
        Ok(Self { lambda, theta, c1, c2, c3 })
    }

    /// The midpoint-of-the-regularizing-interval transformation for polygons
    /// with `number_of_polygon_nodes` nodes: `lambda = 0.5`,
    /// `theta = pi / n` (Lemma 5.7 of the GETMe book). For `n < 3` (never
    /// exercised by any smoothing algorithm, which all require `n >= 3`) a
    /// neutral `theta = pi/4` is substituted rather than failing.
    #[must_use]
    pub fn for_polygon_size(number_of_polygon_nodes: usize) -> Self {
        let theta = if number_of_polygon_nodes < 3 {
            PI / 4.0
        } else {
            PI / number_of_polygon_nodes as f64
        };
        Self::new(0.5, theta).expect("lambda=0.5, theta in (0,pi/2) by construction")
    }

    #[must_use]
    pub const fn lambda(&self) -> f64 {
        self.lambda
    }

    #[must_use]
    pub const fn theta(&self) -> f64 {
        self.theta
    }

    /// Apply the transformation to one polygon, returning the new corner
    /// positions in polygon-local order. The result is not written back to
    /// any mesh array.
    #[must_use]
    pub fn transformed_nodes(&self, polygon: &Polygon, nodes: &[Vec2]) -> Vec<Vec2> {
        let n = polygon.len();
        let mut transformed = Vec::with_capacity(n);
        for node_number in 0..n {
            let predecessor = nodes[polygon.predecessor_node_index(node_number)];
            let node = nodes[polygon.node_index(node_number)];
            let successor = nodes[polygon.successor_node_index(node_number)];
            // Equation 5.26 of the GETMe book.
            let rotated = Vec2::new(successor.y - predecessor.y, predecessor.x - successor.x);
            transformed.push(
                rotated.mul_scalar(self.c1)
                    + (predecessor + successor).mul_scalar(self.c2)
                    + node.mul_scalar(self.c3),
            );
        }
        transformed
    }

    /// Eigenvalues of the circulant transformation operator for polygons
    /// with `number_of_polygon_nodes` nodes (Equation 5.11 of the GETMe
    /// book). Always `eigenvalues[0] == 1.0` exactly.
    #[must_use]
    pub fn eigenvalues(&self, number_of_polygon_nodes: usize) -> Vec<f64> {
        let n = number_of_polygon_nodes;
        let w = Complex64::new(self.lambda, (1.0 - self.lambda) * self.theta.tan());
        let w_conj = w.conj();
        let r = Complex64::from_polar(1.0, 2.0 * PI / n as f64);
        (0..n)
            .map(|k| {
                let magnitude = (Complex64::new(1.0, 0.0) - w_conj + r.powi(k as i32) * w_conj).norm();
                magnitude * magnitude
            })
            .collect()
    }

    /// True iff iterating this transformation on polygons with
    /// `number_of_polygon_nodes` nodes converges to counterclockwise
    /// regular polygons (Theorem 5.1 of the GETMe book): every eigenvalue
    /// magnitude is dominated by `eigenvalues[1]`.
    #[must_use]
    pub fn is_counterclockwise_regularizing(&self, number_of_polygon_nodes: usize) -> bool {
        let eigenvalues = self.eigenvalues(number_of_polygon_nodes);
        let dominant = eigenvalues[1];
        eigenvalues.iter().all(|&mu| mu <= dominant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_lambda_out_of_range() {
        for lambda in [-1.0, 0.0, 1.0, 3.0] {
            assert!(GeneralizedPolygonTransformation::new(lambda, PI / 5.0).is_err());
        }
    }

    #[test]
    fn rejects_theta_out_of_range() {
        for theta in [-0.1, 0.0, PI / 2.0, 1.7] {
            assert!(GeneralizedPolygonTransformation::new(0.6, theta).is_err());
        }
    }

    #[test]
    fn for_polygon_size_uses_midpoint_theta() {
        for n in 3..=10usize {
            let t = GeneralizedPolygonTransformation::for_polygon_size(n);
            assert_eq!(t.lambda(), 0.5);
            assert_eq!(t.theta(), PI / n as f64);
        }
    }

    #[test]
    fn for_polygon_size_below_three_falls_back_to_pi_over_four() {
        let t = GeneralizedPolygonTransformation::for_polygon_size(0);
        assert_eq!(t.lambda(), 0.5);
        assert_eq!(t.theta(), PI / 4.0);
    }

    #[test]
    fn eigenvalue_zero_is_always_one() {
        let t = GeneralizedPolygonTransformation::new(0.3, 0.723 * PI / 2.0).unwrap();
        let eig = t.eigenvalues(3);
        assert!((eig[0] - 1.0).abs() < 1e-14);
    }

    #[test]
    fn eigenvalues_triangle_match_reference() {
        let t = GeneralizedPolygonTransformation::new(0.3, 0.723 * PI / 2.0).unwrap();
        let eig = t.eigenvalues(3);
        let expected = [1.000000000000000, 9.782099241153723, 4.565315750906144];
        for (got, want) in eig.iter().zip(expected) {
            assert!((got - want).abs() < 1.0e-14, "got {got}, want {want}");
        }
    }

    #[test]
    fn lambda_half_regularizing_interval_matches_lemma_5_7() {
        let lambda = 0.5;
        for n in 3..=10usize {
            let theta0 = PI / (2.0 * n as f64);
            let theta1 = 3.0 * PI / (2.0 * n as f64);
            let mut theta = 0.05;
            while theta < PI / 2.0 {
                let expected = theta >= theta0 && theta <= theta1;
                let t = GeneralizedPolygonTransformation::new(lambda, theta).unwrap();
                assert_eq!(t.is_counterclockwise_regularizing(n), expected, "n={n} theta={theta}");
                theta += 0.05;
            }
        }
    }
}
