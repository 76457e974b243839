//! Polyline representation for flight paths.
//!
//! The pathfinder returns its waypoints as a [`Polyline`]. Rendering or
//! encoding for a front-end happens outside the planner core.

use serde::{Deserialize, Serialize};

use crate::geometry::{self, Point};

/// An ordered sequence of waypoints, start first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    /// Wraps `points` as given.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Waypoints, start first.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Consumes the polyline, returning its waypoints.
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Number of waypoints.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if there are no waypoints.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Starting waypoint.
    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    /// Final waypoint.
    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Sum of segment lengths.
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| geometry::distance(pair[0], pair[1]))
            .sum()
    }

    /// Consecutive point pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }
}
