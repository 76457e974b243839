//! Fleet-level performance summary of a committed planning run.

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::delivery::Delivery;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetMetrics {
    pub total_deliveries: usize,
    pub completed_deliveries: usize,
    /// Percentage of deliveries marked delivered, 0-100.
    pub completion_rate: f64,
    pub total_energy: f64,
    pub total_distance: f64,
    pub average_energy_per_agent: f64,
    pub energy_per_delivery: f64,
    pub distance_per_delivery: f64,
    /// Completed deliveries per unit of energy.
    pub energy_efficiency: f64,
}

impl FleetMetrics {
    /// Reads the agents' counters and the deliveries' outcomes. Per-delivery
    /// ratios divide by at least one so an idle fleet reports zeros.
    pub fn from_run(agents: &[Agent], deliveries: &[Delivery]) -> Self {
        let total_deliveries = deliveries.len();
        let delivered = deliveries.iter().filter(|d| d.is_delivered()).count();
        let completion_rate = if total_deliveries == 0 {
            0.0
        } else {
            delivered as f64 / total_deliveries as f64 * 100.0
        };

        let total_energy: f64 = agents.iter().map(Agent::energy_consumed).sum();
        let total_distance: f64 = agents.iter().map(Agent::total_distance).sum();
        let completed: usize = agents.iter().map(Agent::deliveries_completed).sum();
        let average_energy_per_agent = if agents.is_empty() {
            0.0
        } else {
            total_energy / agents.len() as f64
        };
        let per_delivery = completed.max(1) as f64;

        Self {
            total_deliveries,
            completed_deliveries: delivered,
            completion_rate,
            total_energy,
            total_distance,
            average_energy_per_agent,
            energy_per_delivery: total_energy / per_delivery,
            distance_per_delivery: total_distance / per_delivery,
            energy_efficiency: completed as f64 / total_energy.max(1.0),
        }
    }
}
