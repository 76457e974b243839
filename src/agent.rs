//! Drone movement model.
//!
//! An agent couples position, battery and clock into one [`AgentState`]
//! value. The only transition is a move: [`Agent::project`] computes the
//! next state without touching anything, [`Agent::commit_move`] applies it.
//! Feasibility checks elsewhere in the crate are read-only on top of these.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::delivery::DeliveryId;
use crate::error::PlannerError;
use crate::geometry::{self, Point};
use crate::time::TimeOfDay;
use crate::traits::{Airspace, Mover};

/// Clock value every agent starts a planning run with unless overridden.
pub const DEFAULT_START_TIME: TimeOfDay = TimeOfDay::from_seconds(9 * 3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// Energy and service-time parameters shared by every move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementModel {
    /// Energy per unit distance with no payload.
    pub base_consumption: f64,
    /// Extra energy per unit distance per unit of payload weight.
    pub weight_factor: f64,
    /// Time spent at each destination, in seconds.
    pub service_overhead_secs: f64,
}

impl Default for MovementModel {
    fn default() -> Self {
        Self {
            base_consumption: 10.0,
            weight_factor: 5.0,
            service_overhead_secs: 120.0,
        }
    }
}

impl MovementModel {
    /// `distance × (base + weight_factor × payload)`; strictly increasing in
    /// both arguments for positive parameters.
    pub fn energy_cost(&self, distance: f64, payload: f64) -> f64 {
        distance * (self.base_consumption + self.weight_factor * payload)
    }
}

/// Position, battery and clock at one instant. Cheap to copy, so simulations
/// work on their own snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub position: Point,
    pub battery: f64,
    pub clock: TimeOfDay,
}

/// One flown leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub from: Point,
    pub to: Point,
    pub distance: f64,
    pub energy: f64,
    pub departure: TimeOfDay,
    pub arrival: TimeOfDay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    /// Maximum carryable weight.
    pub capacity: f64,
    /// Distance units per second.
    pub speed: f64,
    pub start: Point,
    pub start_time: TimeOfDay,
    pub initial_battery: f64,
    pub movement: MovementModel,
    state: AgentState,
    route: Vec<DeliveryId>,
    energy_consumed: f64,
    total_distance: f64,
    deliveries_completed: usize,
}

impl Agent {
    /// Creates an agent at `start` with a full battery and the default clock.
    pub fn new(id: AgentId, capacity: f64, battery: f64, speed: f64, start: Point) -> Result<Self, PlannerError> {
        let invalid = |reason: String| PlannerError::InvalidAgent { id, reason };
        if !(capacity > 0.0 && capacity.is_finite()) {
            return Err(invalid(format!("capacity must be positive, got {capacity}")));
        }
        if !(battery > 0.0 && battery.is_finite()) {
            return Err(invalid(format!("battery must be positive, got {battery}")));
        }
        if !(speed > 0.0 && speed.is_finite()) {
            return Err(invalid(format!("speed must be positive, got {speed}")));
        }

        Ok(Self {
            id,
            capacity,
            speed,
            start,
            start_time: DEFAULT_START_TIME,
            initial_battery: battery,
            movement: MovementModel::default(),
            state: AgentState {
                position: start,
                battery,
                clock: DEFAULT_START_TIME,
            },
            route: Vec::new(),
            energy_consumed: 0.0,
            total_distance: 0.0,
            deliveries_completed: 0,
        })
    }

    /// Sets the clock value used at creation and on every [`reset`](Self::reset).
    pub fn with_start_time(mut self, start_time: TimeOfDay) -> Self {
        self.start_time = start_time;
        self.state.clock = start_time;
        self
    }

    /// Replaces the default energy and service-time model.
    pub fn with_movement(mut self, movement: MovementModel) -> Self {
        self.movement = movement;
        self
    }

    /// Position, battery and clock as of the last committed move.
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Current position.
    pub fn position(&self) -> Point {
        self.state.position
    }

    /// Remaining battery energy.
    pub fn battery(&self) -> f64 {
        self.state.battery
    }

    /// Time of day after the last committed move.
    pub fn clock(&self) -> TimeOfDay {
        self.state.clock
    }

    /// Deliveries completed so far, in service order.
    pub fn route(&self) -> &[DeliveryId] {
        &self.route
    }

    /// Energy spent since the last reset.
    pub fn energy_consumed(&self) -> f64 {
        self.energy_consumed
    }

    /// Distance flown since the last reset.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Number of deliveries completed since the last reset.
    pub fn deliveries_completed(&self) -> usize {
        self.deliveries_completed
    }

    /// Whether `weight` fits within the payload capacity.
    pub fn can_carry(&self, weight: f64) -> bool {
        weight <= self.capacity
    }

    /// Energy for a leg of `distance` carrying `payload` under this agent's movement model.
    pub fn energy_cost(&self, distance: f64, payload: f64) -> f64 {
        self.movement.energy_cost(distance, payload)
    }

    /// Read-only reachability: the straight leg from the current position
    /// must not be blocked at the current clock and must fit in the battery.
    pub fn can_reach<A>(&self, destination: Point, payload: f64, airspace: &A) -> bool
    where
        A: Airspace + ?Sized,
    {
        if airspace.blocks(self.state.position, destination, self.state.clock) {
            return false;
        }
        let distance = geometry::distance(self.state.position, destination);
        self.energy_cost(distance, payload) <= self.state.battery
    }

    /// Computes the state after flying from `from` to `destination`, or
    /// `None` if the battery cannot cover it.
    pub fn project(&self, from: &AgentState, destination: Point, payload: f64) -> Option<(AgentState, Leg)> {
        let distance = geometry::distance(from.position, destination);
        let energy = self.energy_cost(distance, payload);
        if !(energy <= from.battery) {
            return None;
        }

        let travel_secs = distance / self.speed;
        let arrival = from.clock.advance(travel_secs + self.movement.service_overhead_secs);
        let next = AgentState {
            position: destination,
            battery: (from.battery - energy).max(0.0),
            clock: arrival,
        };
        let leg = Leg {
            from: from.position,
            to: destination,
            distance,
            energy,
            departure: from.clock,
            arrival,
        };
        Some((next, leg))
    }

    /// The single mutating transition. On `None` the agent is untouched.
    pub fn commit_move(&mut self, destination: Point, payload: f64) -> Option<Leg> {
        let (next, leg) = self.project(&self.state, destination, payload)?;
        self.state = next;
        self.energy_consumed += leg.energy;
        self.total_distance += leg.distance;
        Some(leg)
    }

    /// Appends a serviced delivery to the route.
    pub fn complete_delivery(&mut self, delivery: DeliveryId) {
        self.route.push(delivery);
        self.deliveries_completed += 1;
    }

    /// Restores the creation state for a fresh planning run.
    pub fn reset(&mut self) {
        self.state = AgentState {
            position: self.start,
            battery: self.initial_battery,
            clock: self.start_time,
        };
        self.route.clear();
        self.energy_consumed = 0.0;
        self.total_distance = 0.0;
        self.deliveries_completed = 0;
    }

    /// A disposable copy of the current state for simulation.
    pub fn simulate(&self) -> SimulatedAgent<'_> {
        SimulatedAgent {
            agent: self,
            state: self.state,
        }
    }
}

impl Mover for Agent {
    fn state(&self) -> AgentState {
        self.state
    }

    fn capacity(&self) -> f64 {
        self.capacity
    }

    fn try_move(&mut self, destination: Point, payload: f64) -> Option<Leg> {
        self.commit_move(destination, payload)
    }
}

/// Borrowed agent parameters plus an owned state snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedAgent<'a> {
    agent: &'a Agent,
    state: AgentState,
}

impl Mover for SimulatedAgent<'_> {
    fn state(&self) -> AgentState {
        self.state
    }

    fn capacity(&self) -> f64 {
        self.agent.capacity
    }

    fn try_move(&mut self, destination: Point, payload: f64) -> Option<Leg> {
        let (next, leg) = self.agent.project(&self.state, destination, payload)?;
        self.state = next;
        Some(leg)
    }
}
