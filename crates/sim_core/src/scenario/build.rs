use bevy_ecs::prelude::World;
use tracing::info;

use crate::clock::SimulationClock;
use crate::dispatch::DispatchPolicyResource;
use crate::ecs::{PatrolRoute, Position, Vehicle, VehicleIndex};
use crate::error::Result;
use crate::geometry::Point;
use crate::incident::PendingIncidents;
use crate::random::{IncidentStream, RandomStream, VehicleStream};
use crate::scenario::params::{IncidentRate, PatrolMode, ScenarioParams};
use crate::telemetry::SimMetrics;

/// Populate `world` with the resources and vehicles for one run.
///
/// Both random streams are created fresh from the params, so separate worlds never
/// share generator state. An existing [DispatchPolicyResource] is kept; otherwise the
/// nearest-ETA policy is installed.
pub fn build_scenario(world: &mut World, params: ScenarioParams) -> Result<()> {
    params.validate()?;

    let incident_stream = RandomStream::new(params.incident_generator)?;
    let vehicle_stream = RandomStream::new(params.vehicle_generator)?;

    world.insert_resource(SimulationClock::new(params.duration, params.interval)?);
    world.insert_resource(IncidentRate(params.incident_rate));
    world.insert_resource(IncidentStream(incident_stream));
    world.insert_resource(VehicleStream(vehicle_stream));
    world.insert_resource(SimMetrics::default());
    world.insert_resource(PendingIncidents::default());
    if !world.contains_resource::<DispatchPolicyResource>() {
        world.insert_resource(DispatchPolicyResource::default());
    }

    for (index, spec) in params.vehicles.iter().enumerate() {
        let mut vehicle = world.spawn((
            Vehicle::new(spec.name.clone(), spec.speed),
            Position(Point::new(spec.x, spec.y)),
            VehicleIndex(index),
        ));
        if params.patrol_mode == PatrolMode::Routes {
            if let Some(route) = params.region.route_for(index) {
                vehicle.insert(PatrolRoute::from_route(route));
            }
        }
    }

    info!(
        duration = params.duration,
        interval = params.interval,
        incident_rate = params.incident_rate,
        vehicles = params.vehicles.len(),
        patrol_mode = ?params.patrol_mode,
        "scenario built"
    );

    world.insert_resource(params.region);
    Ok(())
}
