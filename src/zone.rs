//! Time-activated forbidden regions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::geometry::{self, Point};
use crate::time::{TimeOfDay, TimeWindow};
use crate::traits::Airspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// A polygonal no-fly zone that blocks traversal during its active window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForbiddenRegion {
    pub id: RegionId,
    boundary: Vec<Point>,
    pub active_window: TimeWindow,
}

impl ForbiddenRegion {
    /// Builds a region; the boundary needs at least three vertices.
    pub fn new(id: RegionId, boundary: Vec<Point>, active_window: TimeWindow) -> Result<Self, PlannerError> {
        if boundary.len() < 3 {
            return Err(PlannerError::InvalidRegion {
                id,
                reason: format!("boundary needs at least 3 vertices, got {}", boundary.len()),
            });
        }
        Ok(Self {
            id,
            boundary,
            active_window,
        })
    }

    /// Polygon corners, in order.
    pub fn boundary(&self) -> &[Point] {
        &self.boundary
    }

    /// Whether the region is in force at `at`.
    pub fn is_active(&self, at: TimeOfDay) -> bool {
        self.active_window.contains(at)
    }

    /// True if `point` lies inside the polygon.
    pub fn contains(&self, point: Point) -> bool {
        geometry::point_in_polygon(point, &self.boundary)
    }

    /// True if the segment touches any edge of the polygon.
    pub fn crosses(&self, from: Point, to: Point) -> bool {
        geometry::segment_crosses_polygon(from, to, &self.boundary)
    }

    /// True if the segment touches an edge or either endpoint lies inside.
    pub fn intersects_path(&self, from: Point, to: Point) -> bool {
        geometry::segment_intersects_polygon(from, to, &self.boundary)
    }
}

impl Airspace for [ForbiddenRegion] {
    fn crosses(&self, from: Point, to: Point, at: TimeOfDay) -> bool {
        self.iter().any(|region| region.is_active(at) && region.crosses(from, to))
    }

    fn covers(&self, point: Point, at: TimeOfDay) -> bool {
        self.iter().any(|region| region.is_active(at) && region.contains(point))
    }

    fn crossings(&self, from: Point, to: Point) -> usize {
        self.iter().filter(|region| region.intersects_path(from, to)).count()
    }
}

impl Airspace for Vec<ForbiddenRegion> {
    fn crosses(&self, from: Point, to: Point, at: TimeOfDay) -> bool {
        self.as_slice().crosses(from, to, at)
    }

    fn covers(&self, point: Point, at: TimeOfDay) -> bool {
        self.as_slice().covers(point, at)
    }

    fn crossings(&self, from: Point, to: Point) -> usize {
        self.as_slice().crossings(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_zone(window: TimeWindow) -> ForbiddenRegion {
        ForbiddenRegion::new(
            RegionId(1),
            vec![
                Point::new(40.0, 30.0),
                Point::new(60.0, 30.0),
                Point::new(60.0, 50.0),
                Point::new(40.0, 50.0),
            ],
            window,
        )
        .unwrap()
    }

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn test_rejects_degenerate_boundary() {
        let err = ForbiddenRegion::new(
            RegionId(7),
            vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            TimeWindow::all_day(),
        )
        .unwrap_err();
        assert!(matches!(err, PlannerError::InvalidRegion { id: RegionId(7), .. }));
    }

    #[test]
    fn test_activity_follows_window() {
        let zone = square_zone(TimeWindow::parse("09:30", "10:30").unwrap());
        assert!(!zone.is_active(t("09:29")));
        assert!(zone.is_active(t("09:30")));
        assert!(zone.is_active(t("10:30")));
        assert!(!zone.is_active(t("10:31")));
    }

    #[test]
    fn test_inactive_region_does_not_block() {
        let zones = vec![square_zone(TimeWindow::parse("09:30", "10:30").unwrap())];
        let (from, to) = (Point::new(30.0, 40.0), Point::new(70.0, 40.0));
        assert!(!zones.blocks(from, to, t("09:00")));
        assert!(zones.blocks(from, to, t("10:00")));
        assert_eq!(zones.crossings(from, to), 1);
    }

    #[test]
    fn test_endpoint_inside_blocks_without_crossing() {
        let zones = vec![square_zone(TimeWindow::all_day())];
        let (inside, outside) = (Point::new(50.0, 40.0), Point::new(10.0, 10.0));
        assert!(zones.covers(inside, t("12:00")));
        assert!(!zones.crosses(inside, Point::new(51.0, 41.0), t("12:00")));
        assert!(zones.blocks(inside, Point::new(51.0, 41.0), t("12:00")));
        assert!(!zones.blocks(outside, Point::new(20.0, 5.0), t("12:00")));
    }
}
