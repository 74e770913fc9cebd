//! The beachline: a binary tree whose leaves are parabolic arcs and whose
//! internal nodes are the breakpoints between neighboring arcs.
//!
//! Nodes live in a [`SlotMap`] and refer to each other by [`NodeId`]. Nodes
//! are never removed, so a key also serves as the identity of an arc for the
//! lifetime of a sweep, even after the arc has been cut out of the tree.
//!
//! Invariant: an in-order walk over the arcs yields their sites in
//! left-to-right order along the current directrix.

use slotmap::{new_key_type, SlotMap};

use crate::geometry::{breakpoint_x, round_to_tolerance};
use crate::graph::{Edge, EdgeId};
use crate::{Point, Result, VoronoiError};

new_key_type! {
    /// Key of an arc or breakpoint in the beachline.
    pub struct NodeId;
}

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Arc { site: Point },
    /// `flipped` is set when the edge's right site is the arc on the left.
    Breakpoint { edge: EdgeId, flipped: bool },
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Default)]
pub struct Beachline {
    nodes: SlotMap<NodeId, Node>,
    root: Option<NodeId>,
}

impl Beachline {
    pub fn with_capacity(sites: usize) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(sites * 4),
            root: None,
        }
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.node_mut(id).parent = None;
        self.root = Some(id);
    }

    /// Allocate a detached arc.
    pub fn add_arc(&mut self, site: Point) -> NodeId {
        self.nodes.insert(Node {
            parent: None,
            left: None,
            right: None,
            kind: NodeKind::Arc { site },
        })
    }

    /// Allocate a breakpoint over two existing subtrees.
    pub fn add_breakpoint(&mut self, edge: EdgeId, flipped: bool, left: NodeId, right: NodeId) -> NodeId {
        let id = self.nodes.insert(Node {
            parent: None,
            left: Some(left),
            right: Some(right),
            kind: NodeKind::Breakpoint { edge, flipped },
        });
        self.node_mut(left).parent = Some(id);
        self.node_mut(right).parent = Some(id);
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).left
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).right
    }

    /// Site of an arc, `None` for a breakpoint.
    pub fn site(&self, id: NodeId) -> Option<Point> {
        match self.node(id).kind {
            NodeKind::Arc { site } => Some(site),
            NodeKind::Breakpoint { .. } => None,
        }
    }

    pub fn arc_site(&self, id: NodeId) -> Result<Point> {
        self.site(id)
            .ok_or(VoronoiError::InternalInvariant("expected an arc, found a breakpoint"))
    }

    /// Edge and orientation of a breakpoint, `None` for an arc.
    pub fn breakpoint(&self, id: NodeId) -> Option<(EdgeId, bool)> {
        match self.node(id).kind {
            NodeKind::Breakpoint { edge, flipped } => Some((edge, flipped)),
            NodeKind::Arc { .. } => None,
        }
    }

    /// Edge traced by a breakpoint.
    pub fn edge(&self, id: NodeId) -> Result<EdgeId> {
        self.breakpoint(id)
            .map(|(edge, _)| edge)
            .ok_or(VoronoiError::InternalInvariant("expected a breakpoint, found an arc"))
    }

    /// Signed offset of `x` from the breakpoint at the given directrix,
    /// rounded to the sweep tolerance. Negative means `x` lies to its left.
    fn cut(&self, id: NodeId, edges: &SlotMap<EdgeId, Edge>, directrix: f64, x: f64) -> Result<f64> {
        let (edge, flipped) = self
            .breakpoint(id)
            .ok_or(VoronoiError::InternalInvariant("cut evaluated on an arc"))?;
        let edge = edges
            .get(edge)
            .ok_or(VoronoiError::InternalInvariant("breakpoint refers to a missing edge"))?;
        let at = if flipped {
            breakpoint_x(edge.right_site(), edge.left_site(), directrix)?
        } else {
            breakpoint_x(edge.left_site(), edge.right_site(), directrix)?
        };
        Ok(round_to_tolerance(x - at))
    }

    /// Descend from the root to the arc above `x` at the given directrix.
    pub fn locate_arc(&self, edges: &SlotMap<EdgeId, Edge>, directrix: f64, x: f64) -> Result<NodeId> {
        let mut current = self
            .root
            .ok_or(VoronoiError::InternalInvariant("locate_arc on an empty beachline"))?;
        loop {
            if self.site(current).is_some() {
                return Ok(current);
            }
            let next = if self.cut(current, edges, directrix, x)? < 0.0 {
                self.left(current)
            } else {
                self.right(current)
            };
            current = next.ok_or(VoronoiError::InternalInvariant("breakpoint missing a child"))?;
        }
    }

    /// Arc immediately to the left of `arc`, `None` if it is the leftmost.
    pub fn left_neighbor(&self, arc: NodeId) -> Option<NodeId> {
        let mut current = arc;
        // Up until we arrive from a right subtree
        let ancestor = loop {
            let parent = self.parent(current)?;
            if self.left(parent) == Some(current) {
                current = parent;
            } else {
                break parent;
            }
        };
        // One step left, then down the right spine
        let mut current = self.left(ancestor)?;
        while let Some(right) = self.right(current) {
            current = right;
        }
        Some(current)
    }

    /// Arc immediately to the right of `arc`, `None` if it is the rightmost.
    pub fn right_neighbor(&self, arc: NodeId) -> Option<NodeId> {
        let mut current = arc;
        let ancestor = loop {
            let parent = self.parent(current)?;
            if self.right(parent) == Some(current) {
                current = parent;
            } else {
                break parent;
            }
        };
        let mut current = self.right(ancestor)?;
        while let Some(left) = self.left(current) {
            current = left;
        }
        Some(current)
    }

    /// The breakpoint separating `arc` from its right neighbor: the first
    /// ancestor that holds `arc` in its left subtree.
    pub fn edge_above_right_neighbor(&self, arc: NodeId) -> Result<NodeId> {
        let mut current = arc;
        loop {
            let parent = self.parent(current).ok_or(VoronoiError::InternalInvariant(
                "no breakpoint to the right of the arc",
            ))?;
            if self.right(parent) == Some(current) {
                current = parent;
            } else {
                return Ok(parent);
            }
        }
    }

    /// Swap `old_child` for `new_child` under `node`. The old child is
    /// detached.
    pub fn replace_child(&mut self, node: NodeId, old_child: NodeId, new_child: NodeId) -> Result<()> {
        if self.left(node) == Some(old_child) {
            self.node_mut(node).left = Some(new_child);
        } else if self.right(node) == Some(old_child) {
            self.node_mut(node).right = Some(new_child);
        } else {
            return Err(VoronoiError::InternalInvariant("replaced node is not a child of its parent"));
        }
        self.node_mut(new_child).parent = Some(node);
        self.node_mut(old_child).parent = None;
        Ok(())
    }

    /// Put `new` where `old` sits, at its parent or at the root.
    pub fn substitute(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        match self.parent(old) {
            Some(parent) => self.replace_child(parent, old, new),
            None => {
                if self.root != Some(old) {
                    return Err(VoronoiError::InternalInvariant("detached node substituted"));
                }
                self.set_root(new);
                Ok(())
            }
        }
    }

    /// Breakpoints reachable from the root, preorder.
    pub fn breakpoints(&self) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            if self.breakpoint(id).is_none() {
                continue;
            }
            found.push(id);
            if let Some(right) = self.right(id) {
                stack.push(right);
            }
            if let Some(left) = self.left(id) {
                stack.push(left);
            }
        }
        found
    }

    /// Sites of all arcs, left to right.
    pub fn arc_sites(&self) -> Vec<Point> {
        let mut sites = Vec::new();
        let mut stack = Vec::new();
        let mut current = self.root;
        while current.is_some() || !stack.is_empty() {
            while let Some(id) = current {
                stack.push(id);
                current = self.left(id);
            }
            if let Some(id) = stack.pop() {
                if let Some(site) = self.site(id) {
                    sites.push(site);
                }
                current = self.right(id);
            }
        }
        sites
    }
}
