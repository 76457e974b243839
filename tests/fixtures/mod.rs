//! Test fixtures for drone-planner.
//!
//! Provides:
//! - The reference 5-drone / 20-delivery / 3-zone scenario
//! - Builders for agents, deliveries and rectangular zones
//! - A tracing subscriber wired to the test writer

#![allow(dead_code)]

pub mod scenario;

use std::sync::Once;

use drone_planner::agent::{Agent, AgentId};
use drone_planner::delivery::{Delivery, DeliveryId};
use drone_planner::geometry::Point;
use drone_planner::time::TimeWindow;
use drone_planner::zone::{ForbiddenRegion, RegionId};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Routes planner events to the captured test output. Honors `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Builder for test agents with sensible defaults.
#[derive(Clone, Debug)]
pub struct TestAgent {
    id: u32,
    capacity: f64,
    battery: f64,
    speed: f64,
    start: Point,
}

impl TestAgent {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            capacity: 5.0,
            battery: 10_000.0,
            speed: 10.0,
            start: Point::new(0.0, 0.0),
        }
    }

    pub fn capacity(mut self, capacity: f64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn battery(mut self, battery: f64) -> Self {
        self.battery = battery;
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.start = Point::new(x, y);
        self
    }

    pub fn build(self) -> Agent {
        Agent::new(AgentId(self.id), self.capacity, self.battery, self.speed, self.start).unwrap()
    }
}

/// Builder for test deliveries with sensible defaults.
#[derive(Clone, Debug)]
pub struct TestDelivery {
    id: u32,
    position: Point,
    weight: f64,
    priority: u8,
    window: TimeWindow,
}

impl TestDelivery {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            position: Point::new(10.0, 10.0),
            weight: 1.0,
            priority: 3,
            window: TimeWindow::all_day(),
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Point::new(x, y);
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn window(mut self, start: &str, end: &str) -> Self {
        self.window = TimeWindow::parse(start, end).unwrap();
        self
    }

    pub fn build(self) -> Delivery {
        Delivery::new(DeliveryId(self.id), self.position, self.weight, self.priority, self.window).unwrap()
    }
}

/// Axis-aligned rectangular zone.
pub fn rect_zone(id: u32, min: (f64, f64), max: (f64, f64), window: TimeWindow) -> ForbiddenRegion {
    ForbiddenRegion::new(
        RegionId(id),
        vec![
            Point::new(min.0, min.1),
            Point::new(max.0, min.1),
            Point::new(max.0, max.1),
            Point::new(min.0, max.1),
        ],
        window,
    )
    .unwrap()
}
