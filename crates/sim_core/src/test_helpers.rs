//! Test helpers for common test setup and utilities.
//!
//! Shared by unit tests, integration tests and benchmarks.

use bevy_ecs::prelude::{Entity, World};

use crate::ecs::{PatrolRoute, Position, Vehicle, VehicleIndex};
use crate::error::Result;
use crate::geometry::Point;
use crate::random::{GeneratorParams, RandomStream};
use crate::scenario::{build_scenario, ScenarioParams};
use crate::telemetry::EventLog;

/// Stream whose first draw is `first / 1000`, for forcing contact outcomes.
///
/// Uses `x' = (501 x + first) mod 1000` from `x0 = 0`.
pub fn stream_starting_at(first: u64) -> RandomStream {
    RandomStream::new(GeneratorParams::new(501, first % 1000, 1000, 0))
        .expect("modulus 1000 is a valid generator")
}

/// Build a world for `params` with an [EventLog] installed.
pub fn create_logged_world(params: ScenarioParams) -> Result<World> {
    let mut world = World::new();
    world.insert_resource(EventLog::default());
    build_scenario(&mut world, params)?;
    Ok(world)
}

/// A quiet world: no generated incidents, no vehicles, an event log, and the
/// reference streams. Tests add vehicles with [spawn_vehicle].
pub fn create_test_world(duration: f64) -> World {
    let params = ScenarioParams::default()
        .with_duration(duration)
        .with_incident_rate(0.0)
        .with_vehicles(Vec::new());
    create_logged_world(params).expect("quiet test scenario is valid")
}

/// Spawn a route-less vehicle with the next free creation index.
pub fn spawn_vehicle(world: &mut World, name: &str, at: Point, speed: f64) -> Entity {
    let index = world.query::<&VehicleIndex>().iter(world).count();
    world
        .spawn((
            Vehicle::new(name, speed),
            Position(at),
            VehicleIndex(index),
        ))
        .id()
}

/// Spawn a vehicle following `waypoints`.
pub fn spawn_route_vehicle(
    world: &mut World,
    name: &str,
    at: Point,
    speed: f64,
    waypoints: Vec<Point>,
) -> Entity {
    let entity = spawn_vehicle(world, name, at, speed);
    world.entity_mut(entity).insert(PatrolRoute::new(waypoints));
    entity
}
