//! Planar Voronoi diagrams with Fortune's sweep-line algorithm.
//!
//! Given a set of distinct sites, produces the graph of Voronoi vertices and
//! edges: bisector segments, rays and lines between neighboring cells. The
//! computation is single-threaded per diagram; with the `parallel` feature,
//! independent diagrams can be computed on a Rayon pool.

mod beachline;
mod event;
mod geometry;
mod graph;
mod point;
mod site;
mod sweep;
mod voronoi;

pub use geometry::{breakpoint_x, circumcenter, orientation, round_to_tolerance, EPSILON};
pub use graph::{filter_by_min_site_distance, Edge, VoronoiGraph};
pub use point::Point;
pub use site::{jittered_grid, random_sites};
pub use voronoi::{compute_voronoi_graph, Fortune};

/// Error type for Voronoi operations
#[derive(Debug, thiserror::Error)]
pub enum VoronoiError {
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Site is not finite: ({x}, {y})")]
    NonFiniteSite { x: f64, y: f64 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Internal invariant violated: {0}")]
    InternalInvariant(&'static str),

    #[error("Computation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, VoronoiError>;
