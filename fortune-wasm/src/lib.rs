//! WASM bindings for fortune-core.
//!
//! Computes a diagram from flat `[x0,y0, x1,y1, ...]` site positions and
//! returns it as flat typed arrays for efficient JS interop.

use fortune_core::{filter_by_min_site_distance, Fortune, Point, VoronoiGraph};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn to_js_error(e: fortune_core::VoronoiError) -> JsValue {
    js_sys::Error::new(&e.to_string()).into()
}

fn flat(points: impl IntoIterator<Item = Point>) -> Vec<f64> {
    points.into_iter().flat_map(|p| [p.x, p.y]).collect()
}

/// A computed Voronoi diagram.
/// Unbounded edge endpoints are reported as `Infinity`.
#[wasm_bindgen]
pub struct VoronoiDiagram {
    graph: VoronoiGraph,
}

#[wasm_bindgen]
impl VoronoiDiagram {
    /// Flat [x0,y0, x1,y1, ...] vertices sorted by y, then x
    pub fn vertices(&self) -> Vec<f64> {
        flat(self.graph.sorted_vertices())
    }

    /// Flat [lx,ly, rx,ry, ...] site pair per edge (length = edge_count * 4)
    pub fn edge_sites(&self) -> Vec<f64> {
        flat(
            self.graph
                .edges()
                .iter()
                .flat_map(|e| [e.left_site(), e.right_site()]),
        )
    }

    /// Flat [ax,ay, bx,by, ...] endpoints per edge (length = edge_count * 4)
    pub fn edge_vertices(&self) -> Vec<f64> {
        flat(
            self.graph
                .edges()
                .iter()
                .flat_map(|e| [e.vertex_a(), e.vertex_b()]),
        )
    }

    /// Flat [x0,y0, dx0,dy0, ...] anchor and unit direction per edge
    pub fn edge_rays(&self) -> Vec<f64> {
        flat(
            self.graph
                .edges()
                .iter()
                .flat_map(|e| [e.anchor_point(), e.direction()]),
        )
    }

    #[wasm_bindgen(getter)]
    pub fn edge_count(&self) -> usize {
        self.graph.edges().len()
    }

    #[wasm_bindgen(getter)]
    pub fn vertex_count(&self) -> usize {
        self.graph.vertices().len()
    }

    /// New diagram keeping only edges between sites at least `min_distance` apart.
    pub fn filtered(&self, min_distance: f64) -> VoronoiDiagram {
        Self {
            graph: filter_by_min_site_distance(&self.graph, min_distance),
        }
    }
}

/// Compute the diagram of flat [x0,y0, x1,y1, ...] positions.
/// Throws on duplicate or non-finite sites.
#[wasm_bindgen]
pub fn compute(positions: &[f64]) -> Result<VoronoiDiagram, JsValue> {
    let sites: Vec<Point> = positions
        .chunks_exact(2)
        .map(|xy| Point::new(xy[0], xy[1]))
        .collect();
    let graph = Fortune::new().compute(&sites).map_err(to_js_error)?;
    Ok(VoronoiDiagram { graph })
}

/// Deterministic random sites as flat [x0,y0, x1,y1, ...].
/// Throws if the area is empty or not finite.
#[wasm_bindgen]
pub fn random_sites(count: usize, width: f64, height: f64, seed: u32) -> Result<Vec<f64>, JsValue> {
    let sites = fortune_core::random_sites(count, width, height, seed as u64).map_err(to_js_error)?;
    Ok(flat(sites))
}
