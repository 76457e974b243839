//! The reference fleet: 5 drones, 20 deliveries and 3 no-fly zones on the
//! 100 x 100 grid. Windows are given in minutes after 09:00.

use drone_planner::agent::{Agent, AgentId};
use drone_planner::delivery::{Delivery, DeliveryId};
use drone_planner::geometry::Point;
use drone_planner::time::{TimeOfDay, TimeWindow};
use drone_planner::zone::{ForbiddenRegion, RegionId};

/// Minutes after the 09:00 start are converted to a wall-clock window.
pub const BASE_HOUR: u32 = 9;

#[derive(Debug, Clone, Copy)]
pub struct DroneSpec {
    pub id: u32,
    pub capacity: f64,
    pub battery: f64,
    pub speed: f64,
    pub start: (f64, f64),
}

#[derive(Debug, Clone, Copy)]
pub struct DeliverySpec {
    pub id: u32,
    pub position: (f64, f64),
    pub weight: f64,
    pub priority: u8,
    pub window: (u32, u32),
}

#[derive(Debug, Clone, Copy)]
pub struct ZoneSpec {
    pub id: u32,
    pub corners: [(f64, f64); 4],
    pub active: (u32, u32),
}

// ============================================================================
// Fleet
// ============================================================================

pub const DRONES: &[DroneSpec] = &[
    DroneSpec { id: 1, capacity: 4.0, battery: 12_000.0, speed: 8.0, start: (10.0, 10.0) },
    DroneSpec { id: 2, capacity: 3.5, battery: 10_000.0, speed: 10.0, start: (20.0, 30.0) },
    DroneSpec { id: 3, capacity: 5.0, battery: 15_000.0, speed: 7.0, start: (50.0, 50.0) },
    DroneSpec { id: 4, capacity: 2.0, battery: 8_000.0, speed: 12.0, start: (80.0, 20.0) },
    DroneSpec { id: 5, capacity: 6.0, battery: 20_000.0, speed: 5.0, start: (40.0, 70.0) },
];

// ============================================================================
// Deliveries
// ============================================================================

pub const DELIVERIES: &[DeliverySpec] = &[
    DeliverySpec { id: 1, position: (15.0, 25.0), weight: 1.5, priority: 3, window: (0, 60) },
    DeliverySpec { id: 2, position: (30.0, 40.0), weight: 2.0, priority: 5, window: (0, 30) },
    DeliverySpec { id: 3, position: (70.0, 80.0), weight: 3.0, priority: 2, window: (20, 80) },
    DeliverySpec { id: 4, position: (90.0, 10.0), weight: 1.0, priority: 4, window: (10, 40) },
    DeliverySpec { id: 5, position: (45.0, 60.0), weight: 4.0, priority: 1, window: (30, 90) },
    DeliverySpec { id: 6, position: (25.0, 15.0), weight: 2.5, priority: 3, window: (0, 50) },
    DeliverySpec { id: 7, position: (60.0, 30.0), weight: 1.0, priority: 5, window: (5, 25) },
    DeliverySpec { id: 8, position: (85.0, 90.0), weight: 3.5, priority: 2, window: (40, 100) },
    DeliverySpec { id: 9, position: (10.0, 80.0), weight: 2.0, priority: 4, window: (15, 45) },
    DeliverySpec { id: 10, position: (95.0, 50.0), weight: 1.5, priority: 3, window: (0, 60) },
    DeliverySpec { id: 11, position: (55.0, 20.0), weight: 0.5, priority: 5, window: (0, 20) },
    DeliverySpec { id: 12, position: (35.0, 75.0), weight: 2.0, priority: 1, window: (50, 120) },
    DeliverySpec { id: 13, position: (75.0, 40.0), weight: 3.0, priority: 3, window: (10, 50) },
    DeliverySpec { id: 14, position: (20.0, 90.0), weight: 1.5, priority: 4, window: (30, 70) },
    DeliverySpec { id: 15, position: (65.0, 65.0), weight: 4.5, priority: 2, window: (25, 75) },
    DeliverySpec { id: 16, position: (40.0, 10.0), weight: 2.0, priority: 5, window: (0, 30) },
    DeliverySpec { id: 17, position: (5.0, 50.0), weight: 1.0, priority: 3, window: (15, 55) },
    DeliverySpec { id: 18, position: (50.0, 85.0), weight: 3.0, priority: 1, window: (60, 100) },
    DeliverySpec { id: 19, position: (80.0, 70.0), weight: 2.5, priority: 4, window: (20, 60) },
    DeliverySpec { id: 20, position: (30.0, 55.0), weight: 1.5, priority: 2, window: (40, 80) },
];

// ============================================================================
// No-fly zones
// ============================================================================

pub const ZONES: &[ZoneSpec] = &[
    ZoneSpec { id: 1, corners: [(40.0, 30.0), (60.0, 30.0), (60.0, 50.0), (40.0, 50.0)], active: (0, 120) },
    ZoneSpec { id: 2, corners: [(70.0, 10.0), (90.0, 10.0), (90.0, 30.0), (70.0, 30.0)], active: (30, 90) },
    ZoneSpec { id: 3, corners: [(10.0, 60.0), (30.0, 60.0), (30.0, 80.0), (10.0, 80.0)], active: (0, 60) },
];

/// Minutes after [`BASE_HOUR`] as a time of day, capped at 23:59.
pub fn after_base(minutes: u32) -> TimeOfDay {
    let total = (BASE_HOUR * 60 + minutes).min(23 * 60 + 59);
    TimeOfDay::from_hm(total / 60, total % 60).unwrap()
}

pub fn window(minutes: (u32, u32)) -> TimeWindow {
    TimeWindow::new(after_base(minutes.0), after_base(minutes.1)).unwrap()
}

pub fn agents() -> Vec<Agent> {
    DRONES
        .iter()
        .map(|d| Agent::new(AgentId(d.id), d.capacity, d.battery, d.speed, d.start.into()).unwrap())
        .collect()
}

pub fn deliveries() -> Vec<Delivery> {
    DELIVERIES
        .iter()
        .map(|d| Delivery::new(DeliveryId(d.id), d.position.into(), d.weight, d.priority, window(d.window)).unwrap())
        .collect()
}

pub fn zones() -> Vec<ForbiddenRegion> {
    ZONES
        .iter()
        .map(|z| {
            let boundary: Vec<Point> = z.corners.iter().copied().map(Point::from).collect();
            ForbiddenRegion::new(RegionId(z.id), boundary, window(z.active)).unwrap()
        })
        .collect()
}
