//! Seams between the planning layers.
//!
//! The pathfinder, the assignment solver and the fleet optimizer all ask the
//! same two questions: "is this straight leg blocked right now?" and "what
//! happens if this agent flies there?". These traits keep those questions
//! independent of the concrete region list or of whether the agent being moved
//! is the canonical record or a throwaway simulation copy.

use crate::agent::{AgentState, Leg};
use crate::geometry::Point;
use crate::time::TimeOfDay;

/// Answers traversal questions about the forbidden airspace at a given time.
pub trait Airspace {
    /// True if the segment touches an edge of a region active at `at`.
    fn crosses(&self, from: Point, to: Point, at: TimeOfDay) -> bool;

    /// True if the point lies inside a region active at `at`.
    fn covers(&self, point: Point, at: TimeOfDay) -> bool;

    /// Number of regions the segment intersects, active or not.
    fn crossings(&self, from: Point, to: Point) -> usize;

    /// Full traversal check: an edge crossing or either endpoint inside an
    /// active region.
    fn blocks(&self, from: Point, to: Point, at: TimeOfDay) -> bool {
        self.crosses(from, to, at) || self.covers(from, at) || self.covers(to, at)
    }
}

/// Something that can be moved leg by leg along a route.
///
/// Implemented by the canonical [`Agent`](crate::agent::Agent), where a move
/// is committed, and by simulation snapshots, where it only touches a copy.
pub trait Mover {
    fn state(&self) -> AgentState;

    fn capacity(&self) -> f64;

    /// Attempts the move. On `None` nothing has changed.
    fn try_move(&mut self, destination: Point, payload: f64) -> Option<Leg>;
}
