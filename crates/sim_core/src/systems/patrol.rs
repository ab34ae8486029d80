use bevy_ecs::prelude::{Entity, Query, Res, ResMut};
use tracing::debug;

use crate::clock::SimulationClock;
use crate::ecs::{PatrolRoute, Position, Vehicle, VehicleIndex};
use crate::geometry::Region;
use crate::patrol::{free_roam_step, route_step};
use crate::random::VehicleStream;
use crate::telemetry::{EventLog, PatrolKind, SimEvent};

/// Move every patrolling vehicle one step, in creation order.
pub fn patrol_system(
    clock: Res<SimulationClock>,
    region: Res<Region>,
    mut stream: ResMut<VehicleStream>,
    mut events: Option<ResMut<EventLog>>,
    mut vehicles: Query<(
        Entity,
        &VehicleIndex,
        &Vehicle,
        &mut Position,
        Option<&mut PatrolRoute>,
    )>,
) {
    let mut order: Vec<(VehicleIndex, Entity)> = vehicles
        .iter()
        .filter(|(_, _, vehicle, _, _)| vehicle.is_patrolling())
        .map(|(entity, index, _, _, _)| (*index, entity))
        .collect();
    order.sort_by_key(|(index, _)| *index);

    for (_, entity) in order {
        let Ok((_, _, vehicle, mut position, route)) = vehicles.get_mut(entity) else {
            continue;
        };

        let (kind, step) = match route {
            Some(mut route) if !route.waypoints.is_empty() => (
                PatrolKind::Route,
                route_step(position.0, &mut route, &region.bounds, &mut stream.0),
            ),
            _ => (
                PatrolKind::FreeRoam,
                free_roam_step(position.0, &region.bounds, &mut stream.0),
            ),
        };
        position.0 = step.position;

        debug!(
            vehicle = %vehicle.name,
            ?kind,
            x = step.position.x,
            y = step.position.y,
            speed = step.speed,
            "patrol step"
        );
        if let Some(log) = events.as_deref_mut() {
            if let Some((waypoint_index, waypoint)) = step.reached {
                log.record(
                    clock.ticks(),
                    clock.now(),
                    SimEvent::WaypointReached {
                        vehicle: vehicle.name.clone(),
                        waypoint_index,
                        waypoint,
                    },
                );
            }
            log.record(
                clock.ticks(),
                clock.now(),
                SimEvent::PatrolTick {
                    vehicle: vehicle.name.clone(),
                    kind,
                    x: step.position.x,
                    y: step.position.y,
                    speed: step.speed,
                },
            );
        }
    }
}
