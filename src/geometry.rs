//! Planar geometry predicates.
//!
//! Positions live in a bounded 2-D coordinate space; distances are Euclidean.
//! Polygons are given as ordered vertices and are implicitly closed.

use serde::{Deserialize, Serialize};

const EPSILON: f64 = 1e-12;

/// A point in the planning plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Point at `(x, y)`.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(self, other: Point) -> f64 {
        distance(self, other)
    }

    /// This point shifted by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Axis-aligned bounds of the coordinate space (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Bounds spanning `min` to `max`, both corners included.
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// True if `point` lies inside or on the edge.
    pub fn contains(&self, point: Point) -> bool {
        self.min.x <= point.x && point.x <= self.max.x && self.min.y <= point.y && point.y <= self.max.y
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0))
    }
}

/// Euclidean distance.
pub fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Ray-casting parity test. Vertex order (clockwise or not) does not matter.
pub fn point_in_polygon(point: Point, boundary: &[Point]) -> bool {
    let n = boundary.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (boundary[i], boundary[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// True if segments `p1-p2` and `q1-q2` share at least one point.
pub fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if d1 * d2 < 0 && d3 * d4 < 0 {
        return true;
    }

    (d1 == 0 && on_segment(q1, q2, p1))
        || (d2 == 0 && on_segment(q1, q2, p2))
        || (d3 == 0 && on_segment(p1, p2, q1))
        || (d4 == 0 && on_segment(p1, p2, q2))
}

/// True if the segment touches any polygon edge. Containment is not checked.
pub fn segment_crosses_polygon(p0: Point, p1: Point, boundary: &[Point]) -> bool {
    polygon_edges(boundary).any(|(a, b)| segments_intersect(p0, p1, a, b))
}

/// True if the segment crosses an edge of the polygon or either endpoint lies
/// inside it. This is the traversal check for forbidden regions.
pub fn segment_intersects_polygon(p0: Point, p1: Point, boundary: &[Point]) -> bool {
    segment_crosses_polygon(p0, p1, boundary) || point_in_polygon(p0, boundary) || point_in_polygon(p1, boundary)
}

/// Edges of the implicitly closed polygon, last vertex back to the first.
fn polygon_edges(boundary: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = boundary.len();
    (0..n).map(move |i| (boundary[i], boundary[(i + 1) % n]))
}

fn orientation(a: Point, b: Point, c: Point) -> i8 {
    let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    if cross > EPSILON {
        1
    } else if cross < -EPSILON {
        -1
    } else {
        0
    }
}

/// Assumes `p` is collinear with `a-b`.
fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) - EPSILON
        && p.x <= a.x.max(b.x) + EPSILON
        && p.y >= a.y.min(b.y) - EPSILON
        && p.y <= a.y.max(b.y) + EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square(min: f64, max: f64) -> Vec<Point> {
        vec![
            Point::new(min, min),
            Point::new(max, min),
            Point::new(max, max),
            Point::new(min, max),
        ]
    }

    #[test]
    fn test_distance_3_4_5() {
        assert!((distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_in_square() {
        let poly = square(0.0, 10.0);
        assert!(point_in_polygon(Point::new(5.0, 5.0), &poly));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &poly));
        assert!(!point_in_polygon(Point::new(-1.0, -1.0), &poly));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // U shape opening upwards
        let poly = vec![
            Point::new(0.0, 0.0),
            Point::new(6.0, 0.0),
            Point::new(6.0, 6.0),
            Point::new(4.0, 6.0),
            Point::new(4.0, 2.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 6.0),
            Point::new(0.0, 6.0),
        ];
        assert!(point_in_polygon(Point::new(1.0, 4.0), &poly));
        assert!(!point_in_polygon(Point::new(3.0, 4.0), &poly));
        assert!(point_in_polygon(Point::new(3.0, 1.0), &poly));
    }

    #[test]
    fn test_degenerate_polygon_contains_nothing() {
        let line = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert!(!point_in_polygon(Point::new(0.5, 0.5), &line));
    }

    #[test]
    fn test_segment_crossing_square() {
        let poly = square(10.0, 20.0);
        assert!(segment_intersects_polygon(Point::new(0.0, 15.0), Point::new(30.0, 15.0), &poly));
        assert!(!segment_intersects_polygon(Point::new(0.0, 0.0), Point::new(30.0, 5.0), &poly));
    }

    #[test]
    fn test_segment_with_endpoint_inside() {
        let poly = square(10.0, 20.0);
        let inside = Point::new(15.0, 15.0);
        let also_inside = Point::new(16.0, 16.0);
        assert!(!segment_crosses_polygon(inside, also_inside, &poly));
        assert!(segment_intersects_polygon(inside, also_inside, &poly));
    }

    #[test]
    fn test_touching_edge_counts_as_intersection() {
        let poly = square(10.0, 20.0);
        assert!(segment_crosses_polygon(Point::new(0.0, 10.0), Point::new(10.0, 10.0), &poly));
    }

    #[test]
    fn test_collinear_disjoint_segments() {
        assert!(!segments_intersect(
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 0.0),
        ));
    }

    #[test]
    fn test_bounds() {
        let bounds = Bounds::default();
        assert!(bounds.contains(Point::new(0.0, 100.0)));
        assert!(!bounds.contains(Point::new(-0.1, 50.0)));
    }

    proptest! {
        #[test]
        fn prop_orientation_does_not_matter(x in -5.0f64..25.0, y in -5.0f64..25.0) {
            let poly = vec![
                Point::new(0.0, 0.0),
                Point::new(17.0, 3.0),
                Point::new(12.0, 19.0),
                Point::new(2.0, 11.0),
            ];
            let mut reversed = poly.clone();
            reversed.reverse();
            let p = Point::new(x, y);
            prop_assert_eq!(point_in_polygon(p, &poly), point_in_polygon(p, &reversed));
        }
    }
}
