#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Geometric quality improvement (smoothing) for planar polygonal meshes.
//!
//! This crate repositions the non-fixed nodes of a 2-D mesh of triangles,
//! quadrilaterals, pentagons, or general (possibly mixed) n-gons to improve
//! element regularity, without ever changing the mesh's topology. It is a
//! from-scratch Rust implementation of the GETMe family of smoothing
//! algorithms (Vartziotis & Wipper, *GETMe — Smoothing and Untangling
//! Polygonal Meshes*): plain and quality-guarded Laplacian smoothing, and
//! three GETMe variants (basic simultaneous, quality-weighted simultaneous,
//! worst-element-first sequential, and their combination).
//!
//! # Layout
//!
//! - [`geom`] — 2-D vector arithmetic, polygons, the regularizing polygon
//!   transformation, and mean-ratio element quality.
//! - [`mesh`] — [`mesh::PolygonalMesh`], the node/polygon/fixed-node
//!   container with its derived adjacency topology.
//! - [`smoothing`] — the six smoothing entry points and their configuration.
//!
//! # Scope
//!
//! Reading and writing mesh files, example driver programs, mesh
//! distortion, console reporting, and a dedicated stopwatch type are
//! deliberately out of scope for this crate; it is a smoothing *engine*
//! meant to be embedded by an application that owns those concerns.

pub mod geom;
pub mod mesh;
pub mod smoothing;

pub use geom::{GeometryError, MeshQuality, Polygon, Vec2};
pub use mesh::{MeshError, PolygonalMesh};
pub use smoothing::{
    BasicGetmeSimultaneousConfig, BasicLaplaceConfig, GetmeConfig, GetmeResult,
    GetmeSequentialConfig, GetmeSimultaneousConfig, PolygonTransformationSet, SmartLaplaceConfig,
    SmoothingError, SmoothingResult, basic_getme_simultaneous, basic_laplace, getme,
    getme_sequential, getme_simultaneous, smart_laplace,
};
