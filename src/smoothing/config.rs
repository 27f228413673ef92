use std::f64::consts::PI;

use crate::geom::GeneralizedPolygonTransformation;

use super::error::SmoothingError;

/// Maximal number of smoothing iterations for algorithms that improve every
/// element within one smoothing step.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Termination threshold on the per-iteration improvement of mean mesh
/// quality for algorithms that improve every element within one smoothing
/// step.
pub const DEFAULT_Q_MEAN_IMPROVEMENT_THRESHOLD: f64 = 1.0e-4;

/// Which regularizing transformation to use for each polygon size when
/// building a default transformation set via
/// [`regularizing_polygon_transformations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonTransformationSet {
    /// `lambda = 1/2`, `theta = pi/n` for every polygon size `n`.
    #[default]
    Generic,
    /// Like [`Self::Generic`], but `theta = pi/4` for triangles and
    /// `theta = pi/6` for quadrilaterals, matching the examples in the
    /// GETMe book.
    GETMeBookExamples,
}

/// Builds one regularizing transformation per polygon size from 0 up to and
/// including `max_number_of_polygon_nodes`, addressable as
/// `result[n]` for an `n`-gon. Entries at index 0, 1, and 2 are placeholders
/// that smoothing algorithms never apply (no polygon has fewer than 3
/// nodes).
pub fn regularizing_polygon_transformations(
    max_number_of_polygon_nodes: usize,
    transformation_set: PolygonTransformationSet,
) -> Result<Vec<GeneralizedPolygonTransformation>, SmoothingError> {
    if max_number_of_polygon_nodes < 3 {
        return Err(SmoothingError::InvalidArgument(
            "minimal valid number of polygon nodes is three".to_string(),
        ));
    }
    let mut transformations: Vec<_> = (0..=max_number_of_polygon_nodes)
        .map(GeneralizedPolygonTransformation::for_polygon_size)
        .collect();
    if transformation_set == PolygonTransformationSet::GETMeBookExamples {
        let lambda = 0.5;
        transformations[3] = GeneralizedPolygonTransformation::new(lambda, PI / 4.0)?;
        if max_number_of_polygon_nodes >= 4 {
            transformations[4] = GeneralizedPolygonTransformation::new(lambda, PI / 6.0)?;
        }
    }
    Ok(transformations)
}

/// Configuration for basic Laplacian smoothing (no element quality involved).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicLaplaceConfig {
    /// Terminate once the maximal node relocation distance in an iteration
    /// drops below this value, squared to avoid a square root per node.
    pub max_squared_node_relocation_distance_threshold: f64,
    pub max_iterations: usize,
}

impl BasicLaplaceConfig {
    #[must_use]
    pub fn new(max_node_relocation_distance_threshold: f64) -> Self {
        Self {
            max_squared_node_relocation_distance_threshold: max_node_relocation_distance_threshold
                * max_node_relocation_distance_threshold,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Configuration for smart Laplacian smoothing (quality-guarded).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmartLaplaceConfig {
    pub q_mean_improvement_threshold: f64,
    pub max_iterations: usize,
}

impl Default for SmartLaplaceConfig {
    fn default() -> Self {
        Self {
            q_mean_improvement_threshold: DEFAULT_Q_MEAN_IMPROVEMENT_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Configuration for basic GETMe simultaneous smoothing (no element quality
/// involved; Section 6.1.1 of the GETMe book).
#[derive(Debug, Clone, PartialEq)]
pub struct BasicGetmeSimultaneousConfig {
    pub max_squared_node_relocation_distance_threshold: f64,
    pub max_iterations: usize,
    pub polygon_transformations: Vec<GeneralizedPolygonTransformation>,
}

impl BasicGetmeSimultaneousConfig {
    pub fn new(
        max_node_relocation_distance_threshold: f64,
        max_number_of_polygon_nodes: usize,
        transformation_set: PolygonTransformationSet,
    ) -> Result<Self, SmoothingError> {
        Ok(Self {
            max_squared_node_relocation_distance_threshold: max_node_relocation_distance_threshold
                * max_node_relocation_distance_threshold,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            polygon_transformations: regularizing_polygon_transformations(
                max_number_of_polygon_nodes,
                transformation_set,
            )?,
        })
    }
}

/// Configuration for GETMe simultaneous smoothing (quality-weighted; Section
/// 6.1.2 of the GETMe book).
#[derive(Debug, Clone, PartialEq)]
pub struct GetmeSimultaneousConfig {
    /// Weight exponent `eta`. `0.0` disables quality weighting (every
    /// polygon contributes equally), yielding a simpler but usually slightly
    /// lower final mesh quality.
    pub weight_exponent_eta: f64,
    pub relaxation_parameter_rho: f64,
    pub q_mean_improvement_threshold: f64,
    pub max_iterations: usize,
    pub polygon_transformations: Vec<GeneralizedPolygonTransformation>,
}

impl GetmeSimultaneousConfig {
    pub fn new(
        max_number_of_polygon_nodes: usize,
        transformation_set: PolygonTransformationSet,
    ) -> Result<Self, SmoothingError> {
        Ok(Self {
            weight_exponent_eta: 0.0,
            relaxation_parameter_rho: 1.0,
            q_mean_improvement_threshold: DEFAULT_Q_MEAN_IMPROVEMENT_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            polygon_transformations: regularizing_polygon_transformations(
                max_number_of_polygon_nodes,
                transformation_set,
            )?,
        })
    }
}

/// Configuration for the GETMe sequential algorithm (Section 6.1.3 of the
/// GETMe book).
#[derive(Debug, Clone, PartialEq)]
pub struct GetmeSequentialConfig {
    /// Conservative by default: only the lowest quality polygon is
    /// addressed at a time, so a large relaxation risks invalidating its
    /// neighbors.
    pub relaxation_parameter_rho: f64,
    pub max_iterations: usize,
    /// Number of smoothing iterations per quality-evaluation cycle.
    pub quality_evaluation_cycle_length: usize,
    pub max_no_improvement_cycles: usize,
    pub penalty_invalid: f64,
    pub penalty_repeated: f64,
    pub penalty_success: f64,
    pub polygon_transformations: Vec<GeneralizedPolygonTransformation>,
}

impl GetmeSequentialConfig {
    pub fn new(
        max_number_of_polygon_nodes: usize,
        transformation_set: PolygonTransformationSet,
    ) -> Result<Self, SmoothingError> {
        let config = Self {
            relaxation_parameter_rho: 0.01,
            max_iterations: 1_000_000,
            quality_evaluation_cycle_length: 100,
            max_no_improvement_cycles: 20,
            penalty_invalid: 1.0e-4,
            penalty_repeated: 1.0e-5,
            penalty_success: 1.0e-3,
            polygon_transformations: regularizing_polygon_transformations(
                max_number_of_polygon_nodes,
                transformation_set,
            )?,
        };
        config.check_cycle_length()?;
        Ok(config)
    }

    fn check_cycle_length(&self) -> Result<(), SmoothingError> {
        if self.quality_evaluation_cycle_length >= self.max_iterations {
            return Err(SmoothingError::InvalidArgument(
                "quality_evaluation_cycle_length must be smaller than max_iterations".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the combined GETMe algorithm (simultaneous followed by
/// sequential; Section 6.2.1 of the GETMe book).
#[derive(Debug, Clone, PartialEq)]
pub struct GetmeConfig {
    pub simultaneous: GetmeSimultaneousConfig,
    pub sequential: GetmeSequentialConfig,
}

impl GetmeConfig {
    pub fn new(
        max_number_of_polygon_nodes: usize,
        transformation_set: PolygonTransformationSet,
    ) -> Result<Self, SmoothingError> {
        Ok(Self {
            simultaneous: GetmeSimultaneousConfig::new(max_number_of_polygon_nodes, transformation_set)?,
            sequential: GetmeSequentialConfig::new(max_number_of_polygon_nodes, transformation_set)?,
        })
    }

    #[must_use]
    pub fn from_configs(simultaneous: GetmeSimultaneousConfig, sequential: GetmeSequentialConfig) -> Self {
        Self { simultaneous, sequential }
    }
}
