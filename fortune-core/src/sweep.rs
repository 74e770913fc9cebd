//! Fortune's sweep: drives events through the beachline and collects edges.
//!
//! The directrix advances in increasing y. Site events split the arc above
//! the new site; circle events collapse an arc into a Voronoi vertex. Circle
//! events are never removed from the queue: an event that becomes stale is
//! marked invalid and skipped when it surfaces.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use slotmap::SlotMap;

use crate::beachline::{Beachline, NodeId};
use crate::event::{CircleEvent, CircleId, Event, EventQueue};
use crate::geometry::{circumcenter, orientation, EPSILON};
use crate::graph::{Edge, EdgeId, VoronoiGraph};
use crate::{Point, Result, VoronoiError};

/// Working state of one diagram computation.
pub(crate) struct Sweep<'a> {
    queue: EventQueue,
    beachline: Beachline,
    edges: SlotMap<EdgeId, Edge>,
    vertices: HashSet<Point>,
    /// Pending circle event of each arc.
    circles: HashMap<NodeId, CircleId>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> Sweep<'a> {
    pub fn new(sites: &[Point], cancel: Option<&'a AtomicBool>) -> Result<Self> {
        validate_sites(sites)?;

        let mut queue = EventQueue::with_capacity(sites.len());
        for &site in sites {
            queue.push_site(site);
        }

        Ok(Self {
            queue,
            beachline: Beachline::with_capacity(sites.len()),
            edges: SlotMap::with_capacity_and_key(sites.len() * 3),
            vertices: HashSet::with_capacity(sites.len() * 2),
            circles: HashMap::new(),
            cancel,
        })
    }

    /// Run the sweep to completion and assemble the graph.
    pub fn run(mut self) -> Result<VoronoiGraph> {
        let sites = self.queue.len();
        let mut stale = 0usize;
        tracing::debug!(sites, "starting sweep");

        while let Some((directrix, event)) = self.queue.pop() {
            if self.cancel.is_some_and(|flag| flag.load(AtomicOrdering::Relaxed)) {
                return Err(VoronoiError::Cancelled);
            }

            let recheck = match event {
                Event::Site(site) => self.handle_site(site, directrix)?,
                Event::Circle(id) => {
                    if !self.retire_circle(id) {
                        stale += 1;
                        continue;
                    }
                    self.handle_circle(id)?
                }
            };

            for arc in recheck {
                self.schedule_circle(arc, directrix)?;
            }

            if let Event::Site(site) = event {
                self.invalidate_circles_around(site);
            }
        }

        self.close_beachline()?;
        self.close_remaining_edges()?;
        self.remove_zero_length_edges();

        let Sweep {
            queue,
            edges,
            vertices,
            ..
        } = self;

        tracing::debug!(
            circles = queue.circles_scheduled(),
            stale,
            vertices = vertices.len(),
            edges = edges.len(),
            "sweep finished"
        );
        let edges = edges.into_iter().map(|(_, edge)| edge).collect();
        Ok(VoronoiGraph::new(vertices, edges))
    }

    fn edge_mut(&mut self, id: EdgeId) -> Result<&mut Edge> {
        self.edges
            .get_mut(id)
            .ok_or(VoronoiError::InternalInvariant("breakpoint refers to a missing edge"))
    }

    /// Stop tracking a popped circle event. Returns whether it is still valid.
    ///
    /// The arc's entry is only dropped if it still points at this event: a
    /// newer event for the same arc must stay reachable for invalidation.
    fn retire_circle(&mut self, id: CircleId) -> bool {
        let circle = self.queue.circle(id);
        let (arc, valid) = (circle.arc, circle.valid);
        if self.circles.get(&arc) == Some(&id) {
            self.circles.remove(&arc);
        }
        valid
    }

    /// Split the arc above `site`. Returns the new arcs to probe for circle
    /// events.
    fn handle_site(&mut self, site: Point, directrix: f64) -> Result<Vec<NodeId>> {
        if self.beachline.root().is_none() {
            let arc = self.beachline.add_arc(site);
            self.beachline.set_root(arc);
            return Ok(vec![arc]);
        }

        let above = self.beachline.locate_arc(&self.edges, directrix, site.x)?;
        let above_site = self.beachline.arc_site(above)?;

        // The split arc is gone; its pending event can never fire.
        if let Some(id) = self.circles.remove(&above) {
            self.queue.invalidate(id);
        }

        let edge = self.edges.insert(Edge::new(above_site, site));

        let (subtree, arcs) = if (above_site.y - site.y).abs() < EPSILON {
            // Both sites on the directrix: one vertical boundary, no middle arc
            let old = self.beachline.add_arc(above_site);
            let new = self.beachline.add_arc(site);
            let subtree = if above_site.x < site.x {
                self.beachline.add_breakpoint(edge, false, old, new)
            } else {
                self.beachline.add_breakpoint(edge, true, new, old)
            };
            let arcs = if above_site.x < site.x {
                vec![old, new]
            } else {
                vec![new, old]
            };
            (subtree, arcs)
        } else {
            let left = self.beachline.add_arc(above_site);
            let middle = self.beachline.add_arc(site);
            let right = self.beachline.add_arc(above_site);
            let inner = self.beachline.add_breakpoint(edge, true, middle, right);
            let subtree = self.beachline.add_breakpoint(edge, false, left, inner);
            (subtree, vec![left, middle, right])
        };

        self.beachline.substitute(above, subtree)?;
        Ok(arcs)
    }

    /// Collapse the arc of a circle event into a vertex. Returns the former
    /// neighbors to probe again, or nothing if the event no longer matches
    /// the beachline.
    fn handle_circle(&mut self, id: CircleId) -> Result<Vec<NodeId>> {
        let event = self.queue.circle(id).clone();
        let arc = event.arc;

        let left = self.beachline.left_neighbor(arc);
        let right = self.beachline.right_neighbor(arc);
        let parent = self.beachline.parent(arc);
        let (Some(left), Some(right), Some(parent)) = (left, right, parent) else {
            tracing::trace!(?event.center, "circle event without neighbors dropped");
            return Ok(Vec::new());
        };
        let left_site = self.beachline.arc_site(left)?;
        let right_site = self.beachline.arc_site(right)?;
        if left_site != event.left_site || right_site != event.right_site {
            tracing::trace!(?event.center, "circle event with changed neighbors dropped");
            return Ok(Vec::new());
        }

        let vertex = event.center;
        self.vertices.insert(vertex);

        // One breakpoint around the arc is its parent. The other is the
        // ancestor separating it from the neighbor outside the parent's subtree.
        let collapsing = parent;
        let grandparent = self.beachline.parent(collapsing).ok_or(
            VoronoiError::InternalInvariant("collapsing breakpoint has no parent"),
        )?;
        let (other, sibling) = if self.beachline.left(collapsing) == Some(arc) {
            let other = self.beachline.edge_above_right_neighbor(left)?;
            let sibling = self.beachline.right(collapsing);
            (other, sibling)
        } else {
            let other = self.beachline.edge_above_right_neighbor(arc)?;
            let sibling = self.beachline.left(collapsing);
            (other, sibling)
        };
        let sibling = sibling.ok_or(VoronoiError::InternalInvariant("breakpoint missing a child"))?;
        self.beachline.replace_child(grandparent, collapsing, sibling)?;

        let collapsing_edge = self.beachline.edge(collapsing)?;
        self.edge_mut(collapsing_edge)?.add_vertex(vertex)?;
        let other_edge = self.beachline.edge(other)?;
        self.edge_mut(other_edge)?.add_vertex(vertex)?;

        let mut edge = Edge::new(left_site, right_site);
        edge.add_vertex(vertex)?;
        let edge = self.edges.insert(edge);

        // Read the children only now: the removal above may have rewired them
        let (Some(other_left), Some(other_right)) =
            (self.beachline.left(other), self.beachline.right(other))
        else {
            return Err(VoronoiError::InternalInvariant("breakpoint missing a child"));
        };
        let replacement = self.beachline.add_breakpoint(edge, false, other_left, other_right);
        self.beachline.substitute(other, replacement)?;

        Ok(vec![left, right])
    }

    /// Drop any pending event of `arc` and schedule a new one if the arc and
    /// its current neighbors converge at or after the sweep position.
    fn schedule_circle(&mut self, arc: NodeId, directrix: f64) -> Result<()> {
        if let Some(id) = self.circles.remove(&arc) {
            tracing::trace!(?arc, "pending circle event invalidated");
            self.queue.invalidate(id);
        }

        if let Some(event) = self.circle_for(arc, directrix)? {
            let id = self.queue.push_circle(event);
            self.circles.insert(arc, id);
        }
        Ok(())
    }

    fn circle_for(&self, arc: NodeId, directrix: f64) -> Result<Option<CircleEvent>> {
        let (Some(left), Some(right)) = (
            self.beachline.left_neighbor(arc),
            self.beachline.right_neighbor(arc),
        ) else {
            return Ok(None);
        };

        let site = self.beachline.arc_site(arc)?;
        let left_site = self.beachline.arc_site(left)?;
        let right_site = self.beachline.arc_site(right)?;
        if left_site == right_site || left_site == site || site == right_site {
            return Ok(None);
        }
        if orientation(left_site, site, right_site) != Ordering::Greater {
            return Ok(None);
        }

        let center = circumcenter(left_site, site, right_site)?;
        let event = CircleEvent::new(arc, site, left_site, right_site, center);
        if event.y > directrix || (event.y - directrix).abs() < EPSILON {
            Ok(Some(event))
        } else {
            Ok(None)
        }
    }

    /// A new site strictly inside a pending circle means that circle cannot
    /// be empty, so its vertex must not be produced.
    fn invalidate_circles_around(&mut self, site: Point) {
        let inside: Vec<CircleId> = self
            .circles
            .values()
            .copied()
            .filter(|&id| {
                let circle = self.queue.circle(id);
                let distance = site.dist(&circle.center);
                let radius = circle.radius();
                distance < radius && (distance - radius).abs() > EPSILON
            })
            .collect();

        for id in inside {
            tracing::trace!(?site, "circle event invalidated by site inside it");
            self.queue.invalidate(id);
        }
    }

    /// Close every edge still traced by a breakpoint with an unbounded
    /// endpoint, and restore the true left/right sites of flipped ones.
    fn close_beachline(&mut self) -> Result<()> {
        tracing::trace!(arcs = ?self.beachline.arc_sites(), "closing beachline");
        for node in self.beachline.breakpoints() {
            let Some((edge_id, flipped)) = self.beachline.breakpoint(node) else {
                continue;
            };
            let edge = self.edge_mut(edge_id)?;
            while !edge.has_vertex_b() {
                edge.add_vertex(Point::UNBOUNDED)?;
            }
            if flipped {
                edge.swap_sites();
            }
            edge.mark_done();
        }
        Ok(())
    }

    /// Edges that left the beachline with a single vertex become rays.
    fn close_remaining_edges(&mut self) -> Result<()> {
        for edge in self.edges.values_mut().filter(|e| !e.is_done()) {
            if !edge.has_vertex_b() {
                edge.add_vertex(Point::UNBOUNDED)?;
                let (l, r) = (edge.left_site(), edge.right_site());
                if (l.y - r.y).abs() < EPSILON && l.x < r.x {
                    edge.swap_sites();
                }
            }
            edge.mark_done();
        }
        Ok(())
    }

    /// Remove edges whose endpoints coincide up to rounding, merging the two
    /// endpoint values into one so no gap opens between neighboring edges.
    fn remove_zero_length_edges(&mut self) {
        let ids: Vec<EdgeId> = self.edges.keys().collect();
        let mut removed = 0usize;
        for id in ids {
            let Some(edge) = self.edges.get(id) else {
                continue;
            };
            let (a, b) = (edge.vertex_a(), edge.vertex_b());
            if !a.is_finite() || !b.is_finite() || !coincident(a, b) {
                continue;
            }
            self.edges.remove(id);
            removed += 1;
            if a != b {
                for edge in self.edges.values_mut() {
                    edge.repoint(b, a);
                }
                self.vertices.remove(&b);
                self.vertices.insert(a);
            }
        }

        if removed > 0 {
            tracing::debug!(removed, "zero-length edges removed");
        }
    }
}

fn coincident(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() <= EPSILON && (a.y - b.y).abs() <= EPSILON
}

/// Reject input the sweep cannot handle before any event runs.
fn validate_sites(sites: &[Point]) -> Result<()> {
    let mut seen = HashSet::with_capacity(sites.len());
    for site in sites {
        if !site.is_finite() {
            return Err(VoronoiError::NonFiniteSite {
                x: site.x,
                y: site.y,
            });
        }
        if !seen.insert(*site) {
            return Err(VoronoiError::DegenerateInput(format!(
                "duplicate site ({}, {})",
                site.x, site.y
            )));
        }
    }
    Ok(())
}
