//! Delivery requests and their per-run outcome.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::error::PlannerError;
use crate::geometry::Point;
use crate::time::{TimeOfDay, TimeWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeliveryId(pub u32);

impl fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// Urgency ordinal, 1 (low) through 5 (urgent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const LOWEST: Priority = Priority(1);
    pub const HIGHEST: Priority = Priority(5);

    /// `None` outside 1..=5.
    pub fn new(level: u8) -> Option<Self> {
        (Self::LOWEST.0..=Self::HIGHEST.0)
            .contains(&level)
            .then_some(Self(level))
    }

    /// Level from 1 (lowest) to 5 (highest).
    pub fn level(self) -> u8 {
        self.0
    }

    /// Priority 4 and above.
    pub fn is_urgent(self) -> bool {
        self.0 >= 4
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("priority {value} outside 1..=5"))
    }
}

impl From<Priority> for u8 {
    fn from(value: Priority) -> Self {
        value.0
    }
}

/// Outcome fields, written once per planning run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub delivered: bool,
    pub assigned_agent: Option<AgentId>,
    pub service_time: Option<TimeOfDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub position: Point,
    pub weight: f64,
    pub priority: Priority,
    pub time_window: TimeWindow,
    #[serde(default)]
    outcome: DeliveryOutcome,
}

impl Delivery {
    /// Validates weight and priority. The outcome starts unserviced.
    pub fn new(
        id: DeliveryId,
        position: Point,
        weight: f64,
        priority: u8,
        time_window: TimeWindow,
    ) -> Result<Self, PlannerError> {
        if !(weight > 0.0 && weight.is_finite()) {
            return Err(PlannerError::InvalidDelivery {
                id,
                reason: format!("weight must be positive, got {weight}"),
            });
        }
        let priority = Priority::new(priority).ok_or_else(|| PlannerError::InvalidDelivery {
            id,
            reason: format!("priority {priority} outside 1..=5"),
        })?;

        Ok(Self {
            id,
            position,
            weight,
            priority,
            time_window,
            outcome: DeliveryOutcome::default(),
        })
    }

    /// Whether `at` falls inside the service window, at minute precision.
    pub fn is_in_time_window(&self, at: TimeOfDay) -> bool {
        self.time_window.contains(at)
    }

    /// Service outcome for the current run.
    pub fn outcome(&self) -> &DeliveryOutcome {
        &self.outcome
    }

    /// Whether the delivery has been serviced in the current run.
    pub fn is_delivered(&self) -> bool {
        self.outcome.delivered
    }

    /// Records a completed service. Returns `false` (and changes nothing) if
    /// this delivery was already serviced in the current run.
    pub fn mark_delivered(&mut self, agent: AgentId, at: TimeOfDay) -> bool {
        if self.outcome.delivered {
            return false;
        }
        self.outcome = DeliveryOutcome {
            delivered: true,
            assigned_agent: Some(agent),
            service_time: Some(at),
        };
        true
    }

    /// Clears the outcome for a new run.
    pub fn reset(&mut self) {
        self.outcome = DeliveryOutcome::default();
    }
}
