//! Constraint-filtered greedy assignment of deliveries to agents.
//!
//! Deliveries are taken in descending priority (ties by id). Every agent is
//! screened for capacity, time window (at the agent's current clock),
//! airspace blocking and battery; the cheapest survivor commits the move.
//! There is no backtracking: a commitment is never revisited, so the result
//! is fast and feasible but not globally optimal.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agent::{Agent, AgentId};
use crate::delivery::{Delivery, DeliveryId};
use crate::error::PlannerError;
use crate::geometry;
use crate::traits::Airspace;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignOptions {
    /// Weight added to the distance cost per unit of delivery weight.
    pub weight_penalty_factor: f64,
}

impl Default for AssignOptions {
    fn default() -> Self {
        Self {
            weight_penalty_factor: 1.0,
        }
    }
}

/// Ordered deliveries for one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRoute {
    pub agent_id: AgentId,
    pub delivery_ids: Vec<DeliveryId>,
}

/// A route for every agent of the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Plan {
    pub routes: Vec<AgentRoute>,
}

impl Plan {
    /// Deliveries planned for `agent_id`, if the plan has a route for it.
    pub fn route_for(&self, agent_id: AgentId) -> Option<&[DeliveryId]> {
        self.routes
            .iter()
            .find(|route| route.agent_id == agent_id)
            .map(|route| route.delivery_ids.as_slice())
    }

    /// Number of delivery slots across all routes.
    pub fn assigned_count(&self) -> usize {
        self.routes.iter().map(|route| route.delivery_ids.len()).sum()
    }

    /// Every planned delivery id, route by route.
    pub fn delivery_ids(&self) -> impl Iterator<Item = DeliveryId> + '_ {
        self.routes
            .iter()
            .flat_map(|route| route.delivery_ids.iter().copied())
    }

    /// Routes keyed by agent id.
    pub fn to_map(&self) -> BTreeMap<AgentId, Vec<DeliveryId>> {
        self.routes
            .iter()
            .map(|route| (route.agent_id, route.delivery_ids.clone()))
            .collect()
    }
}

/// Why no agent took a delivery. Reports the furthest screening stage any
/// agent got to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnassignedReason {
    /// Heavier than every agent can carry.
    ExceedsCapacity,
    /// No capable agent's clock falls inside the delivery window.
    OutsideTimeWindow,
    /// The straight leg crosses an active forbidden region for every remaining agent.
    NoFlyZoneBlocked,
    /// Remaining agents lack the battery for the leg.
    InsufficientBattery,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnassignedDelivery {
    pub delivery_id: DeliveryId,
    pub reason: UnassignedReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub plan: Plan,
    pub unassigned: Vec<UnassignedDelivery>,
}

/// Screens one agent for one delivery. `Ok` carries the matching cost.
fn screen<A>(agent: &Agent, delivery: &Delivery, airspace: &A, options: &AssignOptions) -> Result<f64, UnassignedReason>
where
    A: Airspace + ?Sized,
{
    if !agent.can_carry(delivery.weight) {
        return Err(UnassignedReason::ExceedsCapacity);
    }
    if !delivery.is_in_time_window(agent.clock()) {
        return Err(UnassignedReason::OutsideTimeWindow);
    }
    if airspace.blocks(agent.position(), delivery.position, agent.clock()) {
        return Err(UnassignedReason::NoFlyZoneBlocked);
    }
    if !agent.can_reach(delivery.position, delivery.weight, airspace) {
        return Err(UnassignedReason::InsufficientBattery);
    }

    let distance = geometry::distance(agent.position(), delivery.position);
    Ok(distance + options.weight_penalty_factor * delivery.weight)
}

/// Greedily assigns every not-yet-delivered delivery.
///
/// Agents and deliveries are mutated through the committed moves; callers
/// wanting a fresh run should [`Agent::reset`] and [`Delivery::reset`] first.
pub fn assign_deliveries<A>(
    agents: &mut [Agent],
    deliveries: &mut [Delivery],
    airspace: &A,
    options: &AssignOptions,
) -> Result<AssignmentResult, PlannerError>
where
    A: Airspace + ?Sized,
{
    if agents.is_empty() {
        return Err(PlannerError::NoAgents);
    }
    if deliveries.is_empty() {
        return Err(PlannerError::NoDeliveries);
    }

    info!(
        event = "assignment_start",
        agents = agents.len(),
        deliveries = deliveries.len(),
    );

    let mut order: Vec<usize> = (0..deliveries.len()).collect();
    order.sort_by_key(|&i| (Reverse(deliveries[i].priority), deliveries[i].id));

    let mut routes: Vec<Vec<DeliveryId>> = vec![Vec::new(); agents.len()];
    let mut unassigned = Vec::new();

    for delivery_index in order {
        let delivery = &deliveries[delivery_index];
        if delivery.is_delivered() {
            continue;
        }

        let mut best: Option<(usize, f64)> = None;
        let mut furthest_failure: Option<UnassignedReason> = None;
        for (agent_index, agent) in agents.iter().enumerate() {
            match screen(agent, delivery, airspace, options) {
                Ok(cost) => {
                    if best.is_none_or(|(_, best_cost)| cost < best_cost) {
                        best = Some((agent_index, cost));
                    }
                }
                Err(reason) => {
                    furthest_failure = furthest_failure.max(Some(reason));
                }
            }
        }

        let delivery_id = delivery.id;
        let Some((agent_index, cost)) = best else {
            let reason = furthest_failure.unwrap_or(UnassignedReason::ExceedsCapacity);
            debug!(event = "delivery_unassigned", delivery = %delivery_id, ?reason);
            unassigned.push(UnassignedDelivery { delivery_id, reason });
            continue;
        };

        let (position, weight) = (delivery.position, delivery.weight);
        let agent = &mut agents[agent_index];
        if agent.commit_move(position, weight).is_none() {
            unassigned.push(UnassignedDelivery {
                delivery_id,
                reason: UnassignedReason::InsufficientBattery,
            });
            continue;
        }

        deliveries[delivery_index].mark_delivered(agent.id, agent.clock());
        agent.complete_delivery(delivery_id);
        routes[agent_index].push(delivery_id);
        debug!(
            event = "delivery_assigned",
            delivery = %delivery_id,
            agent = %agent.id,
            cost,
            service_time = %agent.clock(),
        );
    }

    let plan = Plan {
        routes: agents
            .iter()
            .zip(routes)
            .map(|(agent, delivery_ids)| AgentRoute {
                agent_id: agent.id,
                delivery_ids,
            })
            .collect(),
    };

    info!(
        event = "assignment_end",
        assigned = plan.assigned_count(),
        unassigned = unassigned.len(),
    );

    Ok(AssignmentResult { plan, unassigned })
}
