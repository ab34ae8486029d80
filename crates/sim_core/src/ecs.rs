use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleState {
    Patrolling,
    Dispatched,
    Transferring,
    Available,
}

/// Response vehicle with its counters and odometer.
///
/// `total_distance` only accumulates dispatch and transfer legs; patrol movement
/// changes the [Position] but never the odometer.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct Vehicle {
    pub name: String,
    /// Distance units per time unit.
    pub speed: f64,
    pub state: VehicleState,
    pub assigned_count: u32,
    pub served_count: u32,
    pub failed_count: u32,
    pub total_distance: f64,
}

impl Vehicle {
    pub fn new(name: impl Into<String>, speed: f64) -> Self {
        Self {
            name: name.into(),
            speed,
            state: VehicleState::Patrolling,
            assigned_count: 0,
            served_count: 0,
            failed_count: 0,
            total_distance: 0.0,
        }
    }

    pub fn is_patrolling(&self) -> bool {
        self.state == VehicleState::Patrolling
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Position(pub Point);

impl Position {
    /// Jump to `target` and return the straight-line distance covered.
    pub fn travel_to(&mut self, target: Point) -> f64 {
        let distance = self.0.distance_to(target);
        self.0 = target;
        distance
    }
}

/// Creation order of a vehicle. Fixes iteration order for draws and tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Component)]
pub struct VehicleIndex(pub usize);

/// Route-following patrol state. Vehicles without it roam freely.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct PatrolRoute {
    pub waypoints: Vec<Point>,
    pub current_waypoint_index: usize,
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Point>) -> Self {
        Self {
            waypoints,
            current_waypoint_index: 0,
        }
    }

    pub fn from_route(route: &Route) -> Self {
        Self::new(route.waypoints.clone())
    }

    pub fn target(&self) -> Option<Point> {
        self.waypoints.get(self.current_waypoint_index).copied()
    }

    /// Move on to the next waypoint, wrapping to the first after the last.
    pub fn advance(&mut self) {
        if !self.waypoints.is_empty() {
            self.current_waypoint_index = (self.current_waypoint_index + 1) % self.waypoints.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn travel_returns_leg_length() {
        let mut position = Position(Point::new(1.0, 1.0));
        assert_eq!(position.travel_to(Point::new(4.0, 5.0)), 5.0);
        assert_eq!(position.0, Point::new(4.0, 5.0));
        assert_eq!(position.travel_to(Point::new(4.0, 5.0)), 0.0);
    }

    #[test]
    fn route_wraps_after_last_waypoint() {
        let mut route = PatrolRoute::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        route.advance();
        assert_eq!(route.current_waypoint_index, 1);
        route.advance();
        assert_eq!(route.current_waypoint_index, 0);
    }
}
