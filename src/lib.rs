//! drone-planner core
//!
//! Plans parcel deliveries for a fleet of battery-limited drones on a 2-D
//! plane with time-activated no-fly zones: a constrained A* pathfinder, a
//! greedy assignment solver and a genetic fleet optimizer.

pub mod agent;
pub mod config;
pub mod delivery;
pub mod error;
pub mod geometry;
pub mod metrics;
pub mod optimizer;
pub mod pathfinder;
pub mod polyline;
pub mod simulation;
pub mod solver;
pub mod time;
pub mod traits;
pub mod validate;
pub mod zone;

pub use agent::{Agent, AgentId};
pub use config::PlannerConfig;
pub use delivery::{Delivery, DeliveryId};
pub use error::{ConfigError, PlannerError};
pub use geometry::{Bounds, Point};
pub use time::{TimeOfDay, TimeWindow};
pub use zone::{ForbiddenRegion, RegionId};
