//! Result types: Voronoi edges and the graph that owns them.

use std::collections::HashSet;

use crate::{Point, Result, VoronoiError};

slotmap::new_key_type! {
    /// Key of an edge in the sweep's edge storage.
    pub struct EdgeId;
}

/// Part of the perpendicular bisector between two sites.
///
/// Endpoints are filled in order, `vertex_a` first. An endpoint equal to
/// [`Point::UNBOUNDED`] means the edge runs off to infinity on that side.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    left_site: Point,
    right_site: Point,
    vertex_a: Option<Point>,
    vertex_b: Option<Point>,
    done: bool,
}

impl Edge {
    pub(crate) fn new(left_site: Point, right_site: Point) -> Self {
        Self {
            left_site,
            right_site,
            vertex_a: None,
            vertex_b: None,
            done: false,
        }
    }

    pub fn left_site(&self) -> Point {
        self.left_site
    }

    pub fn right_site(&self) -> Point {
        self.right_site
    }

    /// First endpoint. [`Point::UNBOUNDED`] if the edge is open on this side
    /// or the endpoint has not been assigned.
    pub fn vertex_a(&self) -> Point {
        self.vertex_a.unwrap_or(Point::UNBOUNDED)
    }

    /// Second endpoint, see [`Edge::vertex_a`].
    pub fn vertex_b(&self) -> Point {
        self.vertex_b.unwrap_or(Point::UNBOUNDED)
    }

    /// Finite endpoints of the edge.
    pub fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        [self.vertex_a, self.vertex_b]
            .into_iter()
            .flatten()
            .filter(|v| !v.is_unbounded())
    }

    /// Set once the sweep has closed the edge; the edge no longer changes.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub(crate) fn has_vertex_b(&self) -> bool {
        self.vertex_b.is_some()
    }

    pub(crate) fn add_vertex(&mut self, vertex: Point) -> Result<()> {
        if self.done {
            return Err(VoronoiError::InternalInvariant("vertex added to a finished edge"));
        }
        if self.vertex_a.is_none() {
            self.vertex_a = Some(vertex);
        } else if self.vertex_b.is_none() {
            self.vertex_b = Some(vertex);
        } else {
            return Err(VoronoiError::InternalInvariant("third vertex added to an edge"));
        }
        Ok(())
    }

    pub(crate) fn swap_sites(&mut self) {
        std::mem::swap(&mut self.left_site, &mut self.right_site);
    }

    pub(crate) fn mark_done(&mut self) {
        self.done = true;
    }

    /// Point any endpoint equal to `from` at `to` instead.
    pub(crate) fn repoint(&mut self, from: Point, to: Point) {
        for slot in [&mut self.vertex_a, &mut self.vertex_b] {
            if *slot == Some(from) {
                *slot = Some(to);
            }
        }
    }

    /// Both endpoints are at infinity: the edge is a full bisector line.
    pub fn is_fully_unbounded(&self) -> bool {
        self.vertex_a().is_unbounded() && self.vertex_b().is_unbounded()
    }

    /// Exactly one endpoint is at infinity: the edge is a ray.
    pub fn is_partly_unbounded(&self) -> bool {
        self.vertex_a().is_unbounded() != self.vertex_b().is_unbounded()
    }

    fn is_unbounded(&self) -> bool {
        self.vertex_a().is_unbounded() || self.vertex_b().is_unbounded()
    }

    /// A finite point on the edge. Rays start here; a full line passes
    /// through the midpoint of its two sites.
    pub fn anchor_point(&self) -> Point {
        if self.is_fully_unbounded() {
            return self.left_site.midpoint(&self.right_site);
        }
        if !self.vertex_a().is_unbounded() {
            return self.vertex_a();
        }
        self.vertex_b()
    }

    /// Unit direction of the edge.
    ///
    /// Bounded edges run from `vertex_a` to `vertex_b`. Unbounded edges
    /// follow the bisector of the two sites, oriented by their left/right
    /// order so rays point away from the diagram.
    pub fn direction(&self) -> Point {
        if !self.is_unbounded() {
            return (self.vertex_b() - self.vertex_a()).normalize();
        }

        let (l, r) = (self.left_site, self.right_site);
        if l.x == r.x {
            return if l.y < r.y {
                Point::new(-1.0, 0.0)
            } else {
                Point::new(1.0, 0.0)
            };
        }

        let dir = Point::new(-(r.y - l.y) / (r.x - l.x), 1.0);
        let dir = if r.x < l.x { -dir } else { dir };
        dir.normalize()
    }

    /// Euclidean length, infinite for rays and lines.
    pub fn length(&self) -> f64 {
        if self.is_unbounded() {
            return f64::INFINITY;
        }
        self.vertex_a().dist(&self.vertex_b())
    }

    /// Distance between the two sites this edge separates.
    pub fn site_distance(&self) -> f64 {
        self.left_site.dist(&self.right_site)
    }
}

/// Vertices and edges of a Voronoi diagram.
#[derive(Debug, Clone, Default)]
pub struct VoronoiGraph {
    vertices: HashSet<Point>,
    edges: Vec<Edge>,
}

impl VoronoiGraph {
    pub(crate) fn new(vertices: HashSet<Point>, edges: Vec<Edge>) -> Self {
        Self { vertices, edges }
    }

    /// Finite vertices, without duplicates.
    pub fn vertices(&self) -> &HashSet<Point> {
        &self.vertices
    }

    /// Edges in no particular order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    /// Vertices sorted by y, then x.
    pub fn sorted_vertices(&self) -> Vec<Point> {
        let mut vertices: Vec<Point> = self.vertices.iter().copied().collect();
        vertices.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
        vertices
    }

}

/// Keep only the edges whose two sites are at least `min_distance` apart,
/// together with the finite vertices those edges reference.
pub fn filter_by_min_site_distance(graph: &VoronoiGraph, min_distance: f64) -> VoronoiGraph {
    let edges: Vec<Edge> = graph
        .edges
        .iter()
        .filter(|e| e.site_distance() >= min_distance)
        .cloned()
        .collect();
    let vertices = edges.iter().flat_map(|e| e.vertices()).collect();
    VoronoiGraph::new(vertices, edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn edge(left: Point, right: Point, vertices: &[Point]) -> Edge {
        let mut e = Edge::new(left, right);
        for &v in vertices {
            e.add_vertex(v).unwrap();
        }
        e.mark_done();
        e
    }

    #[test]
    fn test_vertices_fill_in_order() {
        let mut e = Edge::new(p(0.0, 0.0), p(1.0, 0.0));
        assert!(!e.has_vertex_b());
        e.add_vertex(p(0.5, 1.0)).unwrap();
        e.add_vertex(p(0.5, -1.0)).unwrap();
        assert_eq!(e.vertex_a(), p(0.5, 1.0));
        assert_eq!(e.vertex_b(), p(0.5, -1.0));
        assert!(matches!(
            e.add_vertex(p(0.0, 0.0)),
            Err(VoronoiError::InternalInvariant(_))
        ));
    }

    #[test]
    fn test_done_edge_rejects_vertices() {
        let mut e = Edge::new(p(0.0, 0.0), p(1.0, 0.0));
        e.mark_done();
        assert!(e.add_vertex(p(0.5, 0.0)).is_err());
        assert!(e.is_done());
    }

    #[test]
    fn test_fully_unbounded_edge() {
        let e = edge(p(0.0, 0.0), p(10.0, 0.0), &[Point::UNBOUNDED, Point::UNBOUNDED]);
        assert!(e.is_fully_unbounded());
        assert!(!e.is_partly_unbounded());
        assert_eq!(e.anchor_point(), p(5.0, 0.0));
        assert_eq!(e.direction(), p(0.0, 1.0));
        assert_eq!(e.length(), f64::INFINITY);
        assert_eq!(e.vertices().count(), 0);
    }

    #[test]
    fn test_ray_anchor_and_direction() {
        // Bottom-left and bottom-right sites, ray from the origin downwards
        let e = edge(p(10.0, -10.0), p(-10.0, -10.0), &[p(0.0, 0.0), Point::UNBOUNDED]);
        assert!(e.is_partly_unbounded());
        assert_eq!(e.anchor_point(), p(0.0, 0.0));
        assert_eq!(e.direction(), p(0.0, -1.0));

        let e = edge(p(-10.0, -10.0), p(-10.0, 10.0), &[Point::UNBOUNDED, p(0.0, 0.0)]);
        assert_eq!(e.anchor_point(), p(0.0, 0.0));
        assert_eq!(e.direction(), p(-1.0, 0.0));

        let e = edge(p(10.0, 10.0), p(10.0, -10.0), &[p(0.0, 0.0), Point::UNBOUNDED]);
        assert_eq!(e.direction(), p(1.0, 0.0));
    }

    #[test]
    fn test_sloped_ray_direction() {
        let e = edge(p(0.0, 0.0), p(5.0, 10.0), &[p(5.0, 3.75), Point::UNBOUNDED]);
        let d = e.direction();
        assert!((d.length() - 1.0).abs() < 1e-12);
        assert!((d.x + 2.0 / 5f64.sqrt()).abs() < 1e-12);
        assert!((d.y - 1.0 / 5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_bounded_edge() {
        let e = edge(p(0.0, 0.0), p(2.0, 0.0), &[p(1.0, -3.0), p(1.0, 1.0)]);
        assert!(!e.is_partly_unbounded());
        assert!(!e.is_fully_unbounded());
        assert_eq!(e.length(), 4.0);
        assert_eq!(e.direction(), p(0.0, 1.0));
        assert_eq!(e.anchor_point(), p(1.0, -3.0));
        assert_eq!(e.vertices().count(), 2);
    }

    #[test]
    fn test_repoint() {
        let mut e = edge(p(0.0, 0.0), p(2.0, 0.0), &[p(1.0, -3.0), p(1.0, 1.0)]);
        e.repoint(p(1.0, 1.0), p(1.0, 1.0 + 1e-12));
        assert_eq!(e.vertex_b(), p(1.0, 1.0 + 1e-12));
        assert_eq!(e.vertex_a(), p(1.0, -3.0));
    }

    #[test]
    fn test_filter_by_min_site_distance() {
        let near = edge(p(0.0, 0.0), p(1.0, 0.0), &[p(0.5, 2.0), p(0.5, -2.0)]);
        let far = edge(p(0.0, 0.0), p(0.0, 8.0), &[p(0.5, 4.0), Point::UNBOUNDED]);
        let vertices = [p(0.5, 2.0), p(0.5, -2.0), p(0.5, 4.0)].into_iter().collect();
        let graph = VoronoiGraph::new(vertices, vec![near, far.clone()]);

        let filtered = filter_by_min_site_distance(&graph, 2.0);
        assert_eq!(filtered.edges(), &[far]);
        assert_eq!(filtered.vertices().len(), 1);
        assert!(filtered.vertices().contains(&p(0.5, 4.0)));

        // Threshold is inclusive
        let all = filter_by_min_site_distance(&graph, 1.0);
        assert_eq!(all.edges().len(), 2);
        assert_eq!(all.vertices().len(), 3);
        assert!(filter_by_min_site_distance(&graph, 100.0).is_empty());
    }
}
