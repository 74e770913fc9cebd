//! Geometric primitives of the sweep: parabola intersection, circumcenter and
//! turn direction.
//!
//! Comparisons against zero use the fixed absolute tolerance [`EPSILON`]. It
//! is not scaled to the input; outputs depend on it, so it must stay `1e-10`.

use std::cmp::Ordering;

use crate::{Point, Result, VoronoiError};

/// Absolute tolerance for all zero tests in the sweep.
pub const EPSILON: f64 = 1e-10;

/// Number of decimals kept by [`round_to_tolerance`].
const DECIMALS: i32 = 10;

/// Round to 10 decimal places, ties to even.
///
/// Values whose scaled magnitude no longer has a fractional part are
/// returned unchanged.
pub fn round_to_tolerance(value: f64) -> f64 {
    let scale = 10f64.powi(DECIMALS);
    let scaled = value * scale;
    if !scaled.is_finite() || scaled.abs() >= 4_503_599_627_370_496.0 {
        return value;
    }
    scaled.round_ties_even() / scale
}

/// X coordinate where the parabolas with foci `site1` and `site2` and common
/// directrix `y = directrix` intersect.
///
/// Of the two intersections, the one consistent with the order of the foci is
/// returned: the larger root when `site1.y >= site2.y`, the smaller otherwise.
pub fn breakpoint_x(site1: Point, site2: Point, directrix: f64) -> Result<f64> {
    let (x1, y1) = (site1.x, site1.y);
    let (x2, y2) = (site2.x, site2.y);

    if (x1 - x2).abs() < EPSILON && (y1 - y2).abs() < EPSILON {
        return Err(VoronoiError::DegenerateInput(format!(
            "breakpoint of identical sites ({}, {})",
            x1, y1
        )));
    }

    let on1 = (y1 - directrix).abs() < EPSILON;
    let on2 = (y2 - directrix).abs() < EPSILON;
    match (on1, on2) {
        (true, true) => return Ok((x1 + x2) / 2.0),
        (true, false) => return Ok(x1),
        (false, true) => return Ok(x2),
        (false, false) => {}
    }

    // Curvature of each parabola: y = a (x - xi)^2 + (yi + directrix) / 2
    let a1 = 1.0 / (2.0 * (y1 - directrix));
    let a2 = 1.0 / (2.0 * (y2 - directrix));
    if (a1 - a2).abs() < EPSILON {
        return Ok((x1 + x2) / 2.0);
    }

    let dx = x1 - x2;
    let disc = (4.0 * a1 * a2 * dx * dx + 2.0 * (a2 - a1) * (y1 - y2)).max(0.0);
    let root = disc.sqrt();
    let base = 2.0 * a1 * x1 - 2.0 * a2 * x2;
    let denom = 2.0 * (a1 - a2);

    let r1 = round_to_tolerance((base + root) / denom);
    let r2 = round_to_tolerance((base - root) / denom);
    let (lo, hi) = if r1 > r2 { (r2, r1) } else { (r1, r2) };

    Ok(if y1 >= y2 { hi } else { lo })
}

/// Center of the circle through `a`, `b` and `c`.
///
/// Intersects the perpendicular bisectors of `ac` and `bc`; a bisector of a
/// vertical chord is handled with an explicit horizontal direction. Collinear
/// input yields a non-finite center; callers filter those with
/// [`orientation`] first.
pub fn circumcenter(a: Point, b: Point, c: Point) -> Result<Point> {
    if a == b || b == c || a == c {
        return Err(VoronoiError::DegenerateInput(format!(
            "circumcenter needs three distinct points, got {:?}, {:?}, {:?}",
            a, b, c
        )));
    }

    let t = a.midpoint(&c);
    let v = b.midpoint(&c);

    let u = if a.x == c.x {
        Point::new(1.0, 0.0)
    } else {
        Point::new((c.y - a.y) / (a.x - c.x), 1.0)
    };
    let w = if b.x == c.x {
        Point::new(-1.0, 0.0)
    } else {
        Point::new((b.y - c.y) / (b.x - c.x), -1.0)
    };

    let alpha = (w.y * (v.x - t.x) - w.x * (v.y - t.y)) / (u.x * w.y - w.x * u.y);
    Ok(t + u * alpha)
}

/// Turn direction of `p0 -> p1 -> p2`.
///
/// `Greater` = counterclockwise (positive cross product), `Less` = clockwise,
/// `Equal` = collinear with `p2` beyond or at `p1`. Collinear triples that
/// double back count as `Less`.
pub fn orientation(p0: Point, p1: Point, p2: Point) -> Ordering {
    let d1 = p1 - p0;
    let d2 = p2 - p0;
    let lhs = d1.x * d2.y;
    let rhs = d1.y * d2.x;

    if lhs > rhs {
        return Ordering::Greater;
    }
    if lhs < rhs {
        return Ordering::Less;
    }
    if d1.x * d2.x < 0.0 || d1.y * d2.y < 0.0 {
        return Ordering::Less;
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_round_to_tolerance() {
        assert_eq!(round_to_tolerance(1.000_000_000_04), 1.0);
        assert_eq!(round_to_tolerance(-2.5e-11), -0.0);
        assert_eq!(round_to_tolerance(1e20), 1e20);
        assert!(round_to_tolerance(f64::INFINITY).is_infinite());
    }

    #[test]
    fn test_breakpoint_identical_sites() {
        let err = breakpoint_x(p(1.0, 1.0), p(1.0, 1.0), 5.0).unwrap_err();
        assert!(matches!(err, VoronoiError::DegenerateInput(_)));
    }

    #[test]
    fn test_breakpoint_both_on_directrix() {
        assert_eq!(breakpoint_x(p(0.0, 3.0), p(4.0, 3.0), 3.0).unwrap(), 2.0);
    }

    #[test]
    fn test_breakpoint_one_on_directrix() {
        assert_eq!(breakpoint_x(p(7.0, 3.0), p(0.0, 0.0), 3.0).unwrap(), 7.0);
        assert_eq!(breakpoint_x(p(0.0, 0.0), p(-2.0, 3.0), 3.0).unwrap(), -2.0);
    }

    #[test]
    fn test_breakpoint_equal_curvature() {
        // Same height: the breakpoint is the vertical bisector
        assert_eq!(breakpoint_x(p(-10.0, -10.0), p(10.0, -10.0), 10.0).unwrap(), 0.0);
    }

    #[test]
    fn test_breakpoint_picks_root_by_height() {
        // Vertical pair (0,0)/(0,1) at directrix 2: roots are +-sqrt(2)
        let left = breakpoint_x(p(0.0, 0.0), p(0.0, 1.0), 2.0).unwrap();
        let right = breakpoint_x(p(0.0, 1.0), p(0.0, 0.0), 2.0).unwrap();
        assert!((left + 2f64.sqrt()).abs() < 1e-9, "left = {}", left);
        assert!((right - 2f64.sqrt()).abs() < 1e-9, "right = {}", right);
    }

    #[test]
    fn test_breakpoint_is_equidistant() {
        let s1 = p(1.0, 2.0);
        let s2 = p(6.0, 4.0);
        let d = 9.0;
        for (a, b) in [(s1, s2), (s2, s1)] {
            let x = breakpoint_x(a, b, d).unwrap();
            // The breakpoint lies on parabola a: y = (x-ax)^2 / (2(ay-d)) + (ay+d)/2
            let y = (x - a.x).powi(2) / (2.0 * (a.y - d)) + (a.y + d) / 2.0;
            let q = p(x, y);
            assert!((q.dist(&a) - q.dist(&b)).abs() < 1e-8);
            assert!((q.dist(&a) - (d - y)).abs() < 1e-8);
        }
    }

    #[test]
    fn test_circumcenter_right_triangle() {
        let c = circumcenter(p(-10.0, 10.0), p(-10.0, -10.0), p(10.0, -10.0)).unwrap();
        assert_eq!(c, p(0.0, 0.0));
    }

    #[test]
    fn test_circumcenter_vertical_chords() {
        // a.x == c.x
        let c = circumcenter(p(0.0, 0.0), p(4.0, 2.0), p(0.0, 4.0)).unwrap();
        assert!((c.dist(&p(0.0, 0.0)) - c.dist(&p(4.0, 2.0))).abs() < 1e-12);
        assert!((c.y - 2.0).abs() < 1e-12);
        // b.x == c.x
        let c = circumcenter(p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0)).unwrap();
        assert_eq!(c, p(2.0, 2.0));
    }

    #[test]
    fn test_circumcenter_equidistant() {
        let (a, b, c) = (p(0.0, 0.0), p(10.0, 0.0), p(5.0, 10.0));
        let center = circumcenter(a, b, c).unwrap();
        assert_eq!(center, p(5.0, 3.75));
        assert!((center.dist(&a) - center.dist(&c)).abs() < 1e-12);
    }

    #[test]
    fn test_circumcenter_rejects_repeated_points() {
        let err = circumcenter(p(1.0, 1.0), p(2.0, 2.0), p(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, VoronoiError::DegenerateInput(_)));
    }

    #[test]
    fn test_orientation() {
        let o = p(0.0, 0.0);
        assert_eq!(orientation(o, p(1.0, 0.0), p(1.0, 1.0)), Ordering::Greater);
        assert_eq!(orientation(o, p(1.0, 1.0), p(1.0, 0.0)), Ordering::Less);
        assert_eq!(orientation(o, p(1.0, 0.0), p(2.0, 0.0)), Ordering::Equal);
        assert_eq!(orientation(o, p(1.0, 0.0), p(-2.0, 0.0)), Ordering::Less);
    }
}
