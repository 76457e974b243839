//! Pre-flight checks for a planning scenario.
//!
//! Constructors already reject most malformed values, but scenarios loaded
//! through serde or edited through public fields bypass them. Hard problems
//! are reported as [`PlannerError`]s; suspicious but plannable setups become
//! warnings.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::agent::Agent;
use crate::delivery::{Delivery, DeliveryId};
use crate::error::PlannerError;
use crate::geometry::Bounds;
use crate::zone::ForbiddenRegion;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ValidationWarning {
    /// Combined parcel weight exceeds combined fleet capacity.
    FleetOverloaded { total_weight: f64, total_capacity: f64 },
    /// More urgent deliveries than agents to serve them first.
    UrgentBacklog { urgent: usize, agents: usize },
    /// No agent can ever carry this delivery.
    TooHeavy { id: DeliveryId, weight: f64 },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FleetOverloaded {
                total_weight,
                total_capacity,
            } => write!(f, "total weight {total_weight} exceeds fleet capacity {total_capacity}"),
            Self::UrgentBacklog { urgent, agents } => {
                write!(f, "{urgent} urgent deliveries for {agents} agents")
            }
            Self::TooHeavy { id, weight } => write!(f, "delivery {id} weighs {weight}, more than any agent carries"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<PlannerError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// True when no errors were found. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first error, if any, for callers that only need pass/fail.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, PlannerError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.warnings),
        }
    }
}

fn positive(value: f64) -> bool {
    value > 0.0 && value.is_finite()
}

/// Collects every structural error and warning in a scenario without stopping at the first.
pub fn validate_scenario(
    agents: &[Agent],
    deliveries: &[Delivery],
    regions: &[ForbiddenRegion],
    bounds: &Bounds,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    if agents.is_empty() {
        report.errors.push(PlannerError::NoAgents);
    }
    if deliveries.is_empty() {
        report.errors.push(PlannerError::NoDeliveries);
    }

    let mut agent_ids = HashSet::new();
    for agent in agents {
        let mut invalid = |reason: String| {
            report.errors.push(PlannerError::InvalidAgent { id: agent.id, reason });
        };
        if !agent_ids.insert(agent.id) {
            invalid("duplicate id".to_string());
        }
        if !positive(agent.capacity) {
            invalid(format!("capacity must be positive, got {}", agent.capacity));
        }
        if !positive(agent.initial_battery) {
            invalid(format!("battery must be positive, got {}", agent.initial_battery));
        }
        if !positive(agent.speed) {
            invalid(format!("speed must be positive, got {}", agent.speed));
        }
        if !bounds.contains(agent.start) {
            invalid(format!("start {:?} outside bounds", agent.start));
        }
    }

    let mut delivery_ids = HashSet::new();
    for delivery in deliveries {
        let mut invalid = |reason: String| {
            report.errors.push(PlannerError::InvalidDelivery { id: delivery.id, reason });
        };
        if !delivery_ids.insert(delivery.id) {
            invalid("duplicate id".to_string());
        }
        if !positive(delivery.weight) {
            invalid(format!("weight must be positive, got {}", delivery.weight));
        }
        if !bounds.contains(delivery.position) {
            invalid(format!("position {:?} outside bounds", delivery.position));
        }
    }

    for region in regions {
        if region.boundary().len() < 3 {
            report.errors.push(PlannerError::InvalidRegion {
                id: region.id,
                reason: format!("boundary needs at least 3 vertices, got {}", region.boundary().len()),
            });
        }
    }

    let total_weight: f64 = deliveries.iter().map(|d| d.weight).sum();
    let total_capacity: f64 = agents.iter().map(|a| a.capacity).sum();
    if !agents.is_empty() && total_weight > total_capacity {
        report.warnings.push(ValidationWarning::FleetOverloaded {
            total_weight,
            total_capacity,
        });
    }

    let urgent = deliveries.iter().filter(|d| d.priority.is_urgent()).count();
    if urgent > agents.len() {
        report.warnings.push(ValidationWarning::UrgentBacklog {
            urgent,
            agents: agents.len(),
        });
    }

    let max_capacity = agents.iter().map(|a| a.capacity).fold(f64::NEG_INFINITY, f64::max);
    if !agents.is_empty() {
        for delivery in deliveries.iter().filter(|d| d.weight > max_capacity) {
            report.warnings.push(ValidationWarning::TooHeavy {
                id: delivery.id,
                weight: delivery.weight,
            });
        }
    }

    for warning in &report.warnings {
        warn!(event = "scenario_warning", %warning);
    }
    report
}
