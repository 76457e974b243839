//! Constrained best-first (A*) search between two points.
//!
//! The search runs over a lattice anchored at the start point: every node is
//! `start + (i, j) × step`, and each expansion looks at the eight neighbouring
//! lattice points. A neighbour is accepted only if it lies within the
//! configured bounds and the segment to it neither crosses an active region
//! edge nor ends inside an active region. The query endpoints themselves are
//! not pre-validated; a start inside a region is simply the first node.
//!
//! Edge cost blends distance, an energy proxy and a flat penalty for every
//! region (inactive at query time) the segment passes through. The heuristic
//! is the direct distance priced at the same per-unit rate, plus a flat
//! penalty whenever the straight line to the goal is currently blocked. That
//! penalty makes the heuristic inadmissible: paths around regions can come
//! out longer than optimal in exchange for expanding far fewer nodes.

use std::cmp::Reverse;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap, HashSet};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::geometry::{self, Bounds, Point};
use crate::polyline::Polyline;
use crate::time::TimeOfDay;
use crate::traits::Airspace;

/// Lattice offsets, in expansion order.
const NEIGHBOURHOOD: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathfinderConfig {
    /// Coordinate bounds every waypoint must stay within.
    pub bounds: Bounds,
    /// Lattice spacing.
    pub step: f64,
    /// Search succeeds once a node is this close to the goal.
    pub goal_tolerance: f64,
    /// Cost per unit of distance.
    pub distance_weight: f64,
    /// Energy proxy cost per unit of distance.
    pub energy_weight: f64,
    /// Added per region a segment passes through while that region is inactive.
    pub crossing_penalty: f64,
    /// Added to the heuristic when the direct line to the goal is blocked.
    pub heuristic_penalty: f64,
    /// Upper bound on node expansions before giving up.
    pub max_expansions: usize,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            step: 0.5,
            goal_tolerance: 0.5,
            distance_weight: 1.5,
            energy_weight: 10.0,
            crossing_penalty: 500.0,
            heuristic_penalty: 200.0,
            max_expansions: 1_000_000,
        }
    }
}

impl PathfinderConfig {
    fn cost_per_unit(&self) -> f64 {
        self.distance_weight + self.energy_weight
    }
}

type Cell = (i64, i64);

#[derive(Debug, Clone, Copy)]
struct Node {
    cell: Cell,
    point: Point,
    g: f64,
    parent: Option<usize>,
}

/// Finds paths through an [`Airspace`].
#[derive(Debug)]
pub struct Pathfinder<'a, A: ?Sized> {
    airspace: &'a A,
    config: PathfinderConfig,
}

impl<'a, A> Pathfinder<'a, A>
where
    A: Airspace + ?Sized,
{
    /// A pathfinder with the default lattice and bounds.
    pub fn new(airspace: &'a A) -> Self {
        Self::with_config(airspace, PathfinderConfig::default())
    }

    /// A pathfinder with explicit search settings.
    pub fn with_config(airspace: &'a A, config: PathfinderConfig) -> Self {
        Self { airspace, config }
    }

    /// Search settings in use.
    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    /// Searches for a path from `start` to `goal` with regions evaluated at
    /// `at`. Returns `None` when the reachable lattice is exhausted.
    ///
    /// The returned polyline starts at `start`. Its last lattice node is within
    /// the goal tolerance; the exact goal is appended when the final segment to
    /// it is clear.
    pub fn find_path(&self, start: Point, goal: Point, at: TimeOfDay) -> Option<Polyline> {
        let step = self.config.step;
        if !(step > 0.0 && step.is_finite()) {
            return None;
        }

        let mut nodes = vec![Node {
            cell: (0, 0),
            point: start,
            g: 0.0,
            parent: None,
        }];
        let mut best_g: HashMap<Cell, f64> = HashMap::from([((0, 0), 0.0)]);
        let mut closed: HashSet<Cell> = HashSet::new();
        let mut open = BinaryHeap::new();
        let mut sequence: u64 = 0;
        open.push(Reverse((OrderedFloat(self.heuristic(start, goal, at)), sequence, 0usize)));

        let mut expansions = 0usize;
        while let Some(Reverse((_, _, index))) = open.pop() {
            let node = nodes[index];
            if closed.contains(&node.cell) {
                continue;
            }

            if geometry::distance(node.point, goal) <= self.config.goal_tolerance {
                debug!(
                    event = "path_found",
                    expansions,
                    cost = node.g,
                    "reached goal tolerance"
                );
                return Some(self.finish(&nodes, index, goal, at));
            }

            closed.insert(node.cell);
            expansions += 1;
            if expansions > self.config.max_expansions {
                debug!(event = "path_abandoned", expansions, "expansion limit reached");
                return None;
            }

            for (dx, dy) in NEIGHBOURHOOD {
                let cell = (node.cell.0 + dx, node.cell.1 + dy);
                if closed.contains(&cell) {
                    continue;
                }

                let point = start.offset(cell.0 as f64 * step, cell.1 as f64 * step);
                if !self.config.bounds.contains(point) {
                    continue;
                }
                if self.airspace.crosses(node.point, point, at) || self.airspace.covers(point, at) {
                    trace!(from = ?node.point, to = ?point, "neighbour blocked");
                    continue;
                }

                let g = node.g + self.edge_weight(node.point, point);
                match best_g.entry(cell) {
                    Entry::Occupied(mut entry) => {
                        if *entry.get() <= g {
                            continue;
                        }
                        entry.insert(g);
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(g);
                    }
                }

                nodes.push(Node {
                    cell,
                    point,
                    g,
                    parent: Some(index),
                });
                sequence += 1;
                let f = g + self.heuristic(point, goal, at);
                open.push(Reverse((OrderedFloat(f), sequence, nodes.len() - 1)));
            }
        }

        debug!(event = "path_not_found", expansions, "open set exhausted");
        None
    }

    /// Blended cost of one lattice edge.
    fn edge_weight(&self, from: Point, to: Point) -> f64 {
        let distance = geometry::distance(from, to);
        let crossings = self.airspace.crossings(from, to) as f64;
        distance * self.config.cost_per_unit() + crossings * self.config.crossing_penalty
    }

    fn heuristic(&self, from: Point, goal: Point, at: TimeOfDay) -> f64 {
        let base = geometry::distance(from, goal) * self.config.cost_per_unit();
        if self.airspace.blocks(from, goal, at) {
            base + self.config.heuristic_penalty
        } else {
            base
        }
    }

    fn finish(&self, nodes: &[Node], last: usize, goal: Point, at: TimeOfDay) -> Polyline {
        let mut points = Vec::new();
        let mut cursor = Some(last);
        while let Some(index) = cursor {
            points.push(nodes[index].point);
            cursor = nodes[index].parent;
        }
        points.reverse();

        let end = nodes[last].point;
        if geometry::distance(end, goal) > f64::EPSILON && !self.airspace.crosses(end, goal, at) {
            points.push(goal);
        }
        Polyline::new(points)
    }
}

/// Convenience wrapper with the default configuration.
pub fn find_path<A>(airspace: &A, start: Point, goal: Point, at: TimeOfDay) -> Option<Polyline>
where
    A: Airspace + ?Sized,
{
    Pathfinder::new(airspace).find_path(start, goal, at)
}
