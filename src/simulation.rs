//! Route simulation and the fleet fitness function.
//!
//! A route is walked leg by leg. A leg is accepted when the cumulative payload
//! stays within capacity and the battery covers it; otherwise it counts as a
//! violation and the agent stays put. Accepted legs whose straight line enters
//! a region active at departure time count as no-fly violations.
//!
//! The same walk drives both [`evaluate_plan`], which moves disposable
//! [`SimulatedAgent`](crate::agent::SimulatedAgent) snapshots, and
//! [`apply_plan`], which commits the moves on the canonical agents. Both
//! therefore produce identical counts for the same starting state.
//!
//! A delivery already serviced before the walk starts, or listed twice in the
//! plan, is never flown again: it counts as a violation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agent::{Agent, AgentId, Leg};
use crate::delivery::{Delivery, DeliveryId};
use crate::error::PlannerError;
use crate::solver::Plan;
use crate::traits::{Airspace, Mover};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    pub delivery_reward: f64,
    /// Priced on the agents' movement model, so a 1 kg, 10-unit leg costs
    /// 150 energy units before weighting.
    pub energy_weight: f64,
    pub violation_penalty: f64,
    pub no_fly_penalty: f64,
    pub distance_weight: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            delivery_reward: 100.0,
            energy_weight: 0.05,
            violation_penalty: 200.0,
            no_fly_penalty: 300.0,
            distance_weight: 0.1,
        }
    }
}

/// Tallies of one simulated plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub completed: usize,
    pub violations: usize,
    pub no_fly_violations: usize,
    pub energy: f64,
    pub distance: f64,
}

impl SimulationOutcome {
    /// `completed × reward − energy × w_e − violations × p_v − no_fly × p_nf − distance × w_d`,
    /// floored at zero.
    pub fn fitness(&self, weights: &FitnessWeights) -> f64 {
        let score = self.completed as f64 * weights.delivery_reward
            - self.energy * weights.energy_weight
            - self.violations as f64 * weights.violation_penalty
            - self.no_fly_violations as f64 * weights.no_fly_penalty
            - self.distance * weights.distance_weight;
        score.max(0.0)
    }

    fn absorb(&mut self, other: SimulationOutcome) {
        self.completed += other.completed;
        self.violations += other.violations;
        self.no_fly_violations += other.no_fly_violations;
        self.energy += other.energy;
        self.distance += other.distance;
    }
}

/// Walks `route` (delivery indices) on `mover`. `served` spans the whole plan
/// so a delivery repeated anywhere counts as a violation.
pub(crate) fn walk_route<M, A>(
    mover: &mut M,
    route: &[usize],
    deliveries: &[Delivery],
    airspace: &A,
    served: &mut [bool],
    mut on_accept: impl FnMut(usize, &Leg),
) -> SimulationOutcome
where
    M: Mover + ?Sized,
    A: Airspace + ?Sized,
{
    let mut outcome = SimulationOutcome::default();
    let mut payload = 0.0;

    for &index in route {
        let Some(delivery) = deliveries.get(index) else {
            outcome.violations += 1;
            continue;
        };
        if served[index] {
            outcome.violations += 1;
            continue;
        }

        let projected_payload = payload + delivery.weight;
        if projected_payload > mover.capacity() {
            outcome.violations += 1;
            continue;
        }

        let departure = mover.state();
        let enters_no_fly = airspace.blocks(departure.position, delivery.position, departure.clock);
        match mover.try_move(delivery.position, projected_payload) {
            Some(leg) => {
                outcome.completed += 1;
                outcome.energy += leg.energy;
                outcome.distance += leg.distance;
                if enters_no_fly {
                    outcome.no_fly_violations += 1;
                }
                payload = projected_payload;
                served[index] = true;
                on_accept(index, &leg);
            }
            None => outcome.violations += 1,
        }
    }

    outcome
}

fn already_served(deliveries: &[Delivery]) -> Vec<bool> {
    deliveries.iter().map(Delivery::is_delivered).collect()
}

/// Scores index-encoded routes (one per agent, in agent order) on snapshots.
pub(crate) fn simulate_routes<A>(
    agents: &[Agent],
    routes: &[Vec<usize>],
    deliveries: &[Delivery],
    airspace: &A,
) -> SimulationOutcome
where
    A: Airspace + ?Sized,
{
    let mut served = already_served(deliveries);
    let mut total = SimulationOutcome::default();
    for (agent, route) in agents.iter().zip(routes) {
        let mut snapshot = agent.simulate();
        total.absorb(walk_route(&mut snapshot, route, deliveries, airspace, &mut served, |_, _| {}));
    }
    total
}

/// Translates a plan into per-agent index routes, in agent order.
pub(crate) fn index_routes(agents: &[Agent], deliveries: &[Delivery], plan: &Plan) -> Result<Vec<Vec<usize>>, PlannerError> {
    let agent_index: HashMap<AgentId, usize> = agents.iter().enumerate().map(|(i, a)| (a.id, i)).collect();
    let delivery_index: HashMap<DeliveryId, usize> = deliveries.iter().enumerate().map(|(i, d)| (d.id, i)).collect();

    let mut routes = vec![Vec::new(); agents.len()];
    for route in &plan.routes {
        let &slot = agent_index
            .get(&route.agent_id)
            .ok_or(PlannerError::UnknownAgent(route.agent_id))?;
        for id in &route.delivery_ids {
            let &index = delivery_index.get(id).ok_or(PlannerError::UnknownDelivery(*id))?;
            routes[slot].push(index);
        }
    }
    Ok(routes)
}

/// Simulates `plan` from the agents' current state without mutating anything.
pub fn evaluate_plan<A>(agents: &[Agent], deliveries: &[Delivery], airspace: &A, plan: &Plan) -> Result<SimulationOutcome, PlannerError>
where
    A: Airspace + ?Sized,
{
    let routes = index_routes(agents, deliveries, plan)?;
    Ok(simulate_routes(agents, &routes, deliveries, airspace))
}

/// Replays `plan` on the canonical agents through committed moves, marking
/// each accepted delivery as serviced at the leg's arrival time.
pub fn apply_plan<A>(
    agents: &mut [Agent],
    deliveries: &mut [Delivery],
    airspace: &A,
    plan: &Plan,
) -> Result<SimulationOutcome, PlannerError>
where
    A: Airspace + ?Sized,
{
    let routes = index_routes(agents, deliveries, plan)?;
    let mut served = already_served(deliveries);
    let mut total = SimulationOutcome::default();

    for (agent, route) in agents.iter_mut().zip(&routes) {
        let mut accepted: Vec<(usize, Leg)> = Vec::new();
        let outcome = walk_route(&mut *agent, route, deliveries, airspace, &mut served, |index, leg| {
            accepted.push((index, *leg));
        });

        for (index, leg) in accepted {
            let delivery = &mut deliveries[index];
            delivery.mark_delivered(agent.id, leg.arrival);
            agent.complete_delivery(delivery.id);
        }
        debug!(
            event = "route_applied",
            agent = %agent.id,
            completed = outcome.completed,
            violations = outcome.violations,
        );
        total.absorb(outcome);
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::solver::AgentRoute;
    use crate::time::TimeWindow;
    use crate::zone::{ForbiddenRegion, RegionId};

    fn agent(capacity: f64, battery: f64) -> Agent {
        Agent::new(AgentId(0), capacity, battery, 10.0, Point::new(0.0, 0.0)).unwrap()
    }

    fn delivery(id: u32, x: f64, y: f64, weight: f64) -> Delivery {
        Delivery::new(DeliveryId(id), Point::new(x, y), weight, 3, TimeWindow::all_day()).unwrap()
    }

    fn plan(ids: &[u32]) -> Plan {
        Plan {
            routes: vec![AgentRoute {
                agent_id: AgentId(0),
                delivery_ids: ids.iter().map(|&i| DeliveryId(i)).collect(),
            }],
        }
    }

    #[test]
    fn test_fitness_formula_and_floor() {
        let weights = FitnessWeights::default();
        let outcome = SimulationOutcome {
            completed: 3,
            violations: 0,
            no_fly_violations: 0,
            energy: 100.0,
            distance: 50.0,
        };
        assert!((outcome.fitness(&weights) - (300.0 - 5.0 - 5.0)).abs() < 1e-9);

        let bad = SimulationOutcome {
            violations: 4,
            ..SimulationOutcome::default()
        };
        assert_eq!(bad.fitness(&weights), 0.0);
    }

    #[test]
    fn test_cumulative_payload_respects_capacity() {
        let agents = vec![agent(3.0, 1e6)];
        let deliveries = vec![delivery(1, 1.0, 0.0, 2.0), delivery(2, 2.0, 0.0, 2.0), delivery(3, 3.0, 0.0, 1.0)];
        let regions: Vec<ForbiddenRegion> = Vec::new();

        let outcome = evaluate_plan(&agents, &deliveries, &regions, &plan(&[1, 2, 3])).unwrap();
        assert_eq!(outcome.completed, 2);
        assert_eq!(outcome.violations, 1);
    }

    #[test]
    fn test_duplicate_delivery_is_a_violation() {
        let agents = vec![agent(10.0, 1e6)];
        let deliveries = vec![delivery(1, 1.0, 0.0, 1.0)];
        let regions: Vec<ForbiddenRegion> = Vec::new();

        let outcome = evaluate_plan(&agents, &deliveries, &regions, &plan(&[1, 1])).unwrap();
        assert_eq!(outcome.completed, 1);
        assert_eq!(outcome.violations, 1);
    }

    #[test]
    fn test_no_fly_leg_is_flown_but_counted() {
        let agents = vec![agent(10.0, 1e6)];
        let deliveries = vec![delivery(1, 10.0, 0.0, 1.0)];
        let regions = vec![
            ForbiddenRegion::new(
                RegionId(1),
                vec![
                    Point::new(4.0, -2.0),
                    Point::new(6.0, -2.0),
                    Point::new(6.0, 2.0),
                    Point::new(4.0, 2.0),
                ],
                TimeWindow::all_day(),
            )
            .unwrap(),
        ];

        let outcome = evaluate_plan(&agents, &deliveries, &regions, &plan(&[1])).unwrap();
        assert_eq!(outcome.completed, 1);
        assert_eq!(outcome.no_fly_violations, 1);
    }

    #[test]
    fn test_unknown_ids_are_rejected() {
        let agents = vec![agent(10.0, 1e6)];
        let deliveries = vec![delivery(1, 1.0, 0.0, 1.0)];
        let regions: Vec<ForbiddenRegion> = Vec::new();

        let err = evaluate_plan(&agents, &deliveries, &regions, &plan(&[9])).unwrap_err();
        assert_eq!(err, PlannerError::UnknownDelivery(DeliveryId(9)));
    }

    #[test]
    fn test_evaluate_leaves_state_and_apply_commits() {
        let mut agents = vec![agent(10.0, 1e6)];
        let mut deliveries = vec![delivery(1, 3.0, 4.0, 1.0), delivery(2, 6.0, 8.0, 1.0)];
        let regions: Vec<ForbiddenRegion> = Vec::new();
        let p = plan(&[1, 2]);

        let simulated = evaluate_plan(&agents, &deliveries, &regions, &p).unwrap();
        assert_eq!(agents[0].position(), Point::new(0.0, 0.0));
        assert!(!deliveries[0].is_delivered());

        let applied = apply_plan(&mut agents, &mut deliveries, &regions, &p).unwrap();
        assert_eq!(simulated, applied);
        assert_eq!(agents[0].position(), Point::new(6.0, 8.0));
        assert_eq!(agents[0].route(), &[DeliveryId(1), DeliveryId(2)]);
        assert!(deliveries.iter().all(|d| d.outcome().assigned_agent == Some(AgentId(0))));
    }

    #[test]
    fn test_delivered_delivery_is_not_flown_again() {
        let mut agents = vec![
            agent(10.0, 1e6),
            Agent::new(AgentId(1), 10.0, 1e6, 10.0, Point::new(0.0, 0.0)).unwrap(),
        ];
        let mut deliveries = vec![delivery(1, 3.0, 4.0, 1.0)];
        let regions: Vec<ForbiddenRegion> = Vec::new();

        let first = apply_plan(&mut agents, &mut deliveries, &regions, &plan(&[1])).unwrap();
        assert_eq!(first.completed, 1);

        let second = Plan {
            routes: vec![AgentRoute {
                agent_id: AgentId(1),
                delivery_ids: vec![DeliveryId(1)],
            }],
        };
        let simulated = evaluate_plan(&agents, &deliveries, &regions, &second).unwrap();
        assert_eq!(simulated.completed, 0);
        assert_eq!(simulated.violations, 1);

        let applied = apply_plan(&mut agents, &mut deliveries, &regions, &second).unwrap();
        assert_eq!(simulated, applied);
        assert!(agents[1].route().is_empty());
        assert_eq!(agents[1].battery(), 1e6);
        assert_eq!(agents[1].deliveries_completed(), 0);
        assert_eq!(agents[0].route(), &[DeliveryId(1)]);
        assert_eq!(deliveries[0].outcome().assigned_agent, Some(AgentId(0)));
    }
}
