//! Sweep events and the queue that orders them.
//!
//! Circle events live in a [`SlotMap`] owned by the queue and are addressed
//! by [`CircleId`]; the heap only stores keys. Invalidating an event flips its
//! `valid` flag in the map, and the stale heap entry is skipped when popped.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use slotmap::{new_key_type, SlotMap};

use crate::beachline::NodeId;
use crate::geometry::round_to_tolerance;
use crate::Point;

new_key_type! {
    /// Key of a circle event in the queue.
    pub struct CircleId;
}

/// Three consecutive arcs converging on a candidate vertex.
#[derive(Debug, Clone)]
pub struct CircleEvent {
    /// The arc that disappears when the event fires.
    pub arc: NodeId,
    /// Site of the left neighbor when the event was created.
    pub left_site: Point,
    /// Site of the right neighbor when the event was created.
    pub right_site: Point,
    pub center: Point,
    /// Sweep position at which the event fires: bottom of the circle.
    pub y: f64,
    pub valid: bool,
}

impl CircleEvent {
    pub fn new(arc: NodeId, arc_site: Point, left_site: Point, right_site: Point, center: Point) -> Self {
        let y = round_to_tolerance(center.y + arc_site.dist(&center));
        Self {
            arc,
            left_site,
            right_site,
            center,
            y,
            valid: true,
        }
    }

    /// Radius of the event circle as seen from its sweep position.
    pub fn radius(&self) -> f64 {
        self.y - self.center.y
    }
}

/// What the sweep does next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Site(Point),
    Circle(CircleId),
}

/// Queue entry ordered by sweep y, then x, then insertion order.
#[derive(Debug, Clone, Copy)]
struct Entry {
    y: f64,
    x: f64,
    seq: u64,
    event: Event,
}

impl Entry {
    fn key_cmp(&self, other: &Self) -> Ordering {
        self.y
            .total_cmp(&other.y)
            .then_with(|| self.x.total_cmp(&other.x))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key_cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap and the sweep wants the minimum.
    fn cmp(&self, other: &Self) -> Ordering {
        other.key_cmp(self)
    }
}

/// Min-priority queue of sweep events.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Entry>,
    circles: SlotMap<CircleId, CircleEvent>,
    next_seq: u64,
}

impl EventQueue {
    pub fn with_capacity(sites: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(sites * 2),
            circles: SlotMap::with_capacity_and_key(sites),
            next_seq: 0,
        }
    }

    pub fn push_site(&mut self, site: Point) {
        self.push(site.y, site.x, Event::Site(site));
    }

    pub fn push_circle(&mut self, circle: CircleEvent) -> CircleId {
        let (y, x) = (circle.y, circle.center.x);
        let id = self.circles.insert(circle);
        self.push(y, x, Event::Circle(id));
        id
    }

    fn push(&mut self, y: f64, x: f64, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { y, x, seq, event });
    }

    /// Remove the lowest event, returning it with its sweep y.
    pub fn pop(&mut self) -> Option<(f64, Event)> {
        self.heap.pop().map(|e| (e.y, e.event))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn circle(&self, id: CircleId) -> &CircleEvent {
        &self.circles[id]
    }

    pub fn invalidate(&mut self, id: CircleId) {
        if let Some(circle) = self.circles.get_mut(id) {
            circle.valid = false;
        }
    }

    /// Total number of circle events ever scheduled.
    pub fn circles_scheduled(&self) -> usize {
        self.circles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beachline::Beachline;

    #[test]
    fn test_sites_pop_by_y_then_x() {
        let mut queue = EventQueue::default();
        for (x, y) in [(5.0, 1.0), (-3.0, 2.0), (2.0, 1.0), (0.0, -4.0)] {
            queue.push_site(Point::new(x, y));
        }
        let order: Vec<Point> = std::iter::from_fn(|| queue.pop())
            .map(|(_, e)| match e {
                Event::Site(p) => p,
                Event::Circle(_) => panic!("unexpected circle event"),
            })
            .collect();
        assert_eq!(
            order,
            vec![
                Point::new(0.0, -4.0),
                Point::new(2.0, 1.0),
                Point::new(5.0, 1.0),
                Point::new(-3.0, 2.0),
            ]
        );
    }

    #[test]
    fn test_equal_keys_pop_in_insertion_order() {
        let mut tree = Beachline::default();
        let arc_a = tree.add_arc(Point::new(0.0, 0.0));
        let arc_b = tree.add_arc(Point::new(1.0, 0.0));
        let center = Point::new(0.0, 0.0);
        let site = Point::new(0.0, -1.0);

        let mut queue = EventQueue::default();
        let first = queue.push_circle(CircleEvent::new(arc_a, site, site, site, center));
        let second = queue.push_circle(CircleEvent::new(arc_b, site, site, site, center));

        assert_eq!(queue.pop(), Some((1.0, Event::Circle(first))));
        assert_eq!(queue.pop(), Some((1.0, Event::Circle(second))));
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_circle_key_is_circle_bottom() {
        let mut tree = Beachline::default();
        let arc = tree.add_arc(Point::new(0.0, 0.0));
        let event = CircleEvent::new(
            arc,
            Point::new(-10.0, -10.0),
            Point::new(-10.0, 10.0),
            Point::new(10.0, -10.0),
            Point::new(0.0, 0.0),
        );
        assert_eq!(event.y, 14.142_135_623_7);
        assert!(event.valid);
        assert!((event.radius() - 200f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_invalidation_is_visible_through_id() {
        let mut tree = Beachline::default();
        let arc = tree.add_arc(Point::new(0.0, 0.0));
        let p = Point::new(0.0, 0.0);
        let mut queue = EventQueue::default();
        queue.push_site(Point::new(0.0, 100.0));
        let id = queue.push_circle(CircleEvent::new(arc, Point::new(0.0, -1.0), p, p, p));
        queue.invalidate(id);

        let (_, event) = queue.pop().unwrap();
        assert_eq!(event, Event::Circle(id));
        assert!(!queue.circle(id).valid);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.circles_scheduled(), 1);
    }
}
