//! Error types for the planner.
//!
//! Only structurally invalid input surfaces here. Search failures (no path,
//! unreachable deliveries, simulated constraint violations) are ordinary
//! outcomes and are modelled as `Option`s or counters instead.

use thiserror::Error;

use crate::agent::AgentId;
use crate::delivery::DeliveryId;
use crate::time::TimeOfDay;
use crate::zone::RegionId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    #[error("at least one agent is required")]
    NoAgents,

    #[error("at least one delivery is required")]
    NoDeliveries,

    #[error("invalid time of day {0:?}, expected HH:MM")]
    InvalidTime(String),

    #[error("time window starts at {start} but ends at {end}")]
    InvalidTimeWindow { start: TimeOfDay, end: TimeOfDay },

    #[error("delivery {id}: {reason}")]
    InvalidDelivery { id: DeliveryId, reason: String },

    #[error("agent {id}: {reason}")]
    InvalidAgent { id: AgentId, reason: String },

    #[error("forbidden region {id}: {reason}")]
    InvalidRegion { id: RegionId, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("plan references unknown agent {0}")]
    UnknownAgent(AgentId),

    #[error("plan references unknown delivery {0}")]
    UnknownDelivery(DeliveryId),
}

/// Errors raised while loading a [`PlannerConfig`](crate::config::PlannerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] PlannerError),
}
