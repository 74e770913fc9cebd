//! 2D point type shared by sites, vertices and edge directions.

use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};

/// 2D position
///
/// Equality and hashing are exact (bitwise on the coordinates, with `-0.0`
/// folded onto `0.0`) so that vertex sets deduplicate deterministically.
#[derive(Debug, Clone, Copy)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Endpoint marker for an edge that extends to infinity.
    pub const UNBOUNDED: Point = Point {
        x: f64::INFINITY,
        y: f64::INFINITY,
    };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared distance to another point
    pub fn dist_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Distance to another point
    pub fn dist(&self, other: &Point) -> f64 {
        self.dist_sq(other).sqrt()
    }

    /// Length of the point read as a vector from the origin
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction. The zero vector is returned as is.
    pub fn normalize(&self) -> Point {
        let len = self.length();
        if len == 0.0 {
            return *self;
        }
        Point::new(self.x / len, self.y / len)
    }

    /// Component-wise minimum
    pub fn min(&self, other: &Point) -> Point {
        Point::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn dot(&self, other: &Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn is_unbounded(&self) -> bool {
        *self == Point::UNBOUNDED
    }

    fn key(&self) -> (u64, u64) {
        // 0.0 == -0.0 must hash the same way
        let fold = |v: f64| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() };
        (fold(self.x), fold(self.y))
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}
