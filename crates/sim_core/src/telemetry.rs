//! Telemetry: run-level counters and the structured per-event log.
//!
//! [SimMetrics] is always present. [EventLog] is optional; insert it to capture a
//! [TimedEvent] for every incident, dispatch, contact, transfer and patrol step.
//! Events carry raw values only; formatting belongs to whoever reads them.

use bevy_ecs::prelude::{Entity, Resource, World};
use serde::{Deserialize, Serialize};

use crate::ecs::{Vehicle, VehicleIndex};
use crate::geometry::Point;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Resource)]
pub struct SimMetrics {
    pub incidents_total: u64,
    pub incidents_successful: u64,
    pub incidents_failed: u64,
    /// Failed incidents for which no vehicle was patrolling.
    pub incidents_unassigned: u64,
    /// Incidents dropped before dispatch because their location could not be generated.
    pub incidents_rejected: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatrolKind {
    FreeRoam,
    Route,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    IncidentGenerated {
        zone: String,
        x: f64,
        y: f64,
    },
    IncidentRejected {
        reason: String,
    },
    VehicleDispatched {
        vehicle: String,
        eta: f64,
        assigned_count: u32,
    },
    NoVehicleAvailable {
        zone: String,
    },
    VehicleArrived {
        vehicle: String,
        zone: String,
        distance: f64,
    },
    ContactResolved {
        vehicle: String,
        success: bool,
        draw: f64,
    },
    TransferCompleted {
        vehicle: String,
        station: String,
        distance: f64,
    },
    PatrolTick {
        vehicle: String,
        kind: PatrolKind,
        x: f64,
        y: f64,
        speed: f64,
    },
    WaypointReached {
        vehicle: String,
        waypoint_index: usize,
        waypoint: Point,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub tick: u64,
    pub time: f64,
    pub event: SimEvent,
}

#[derive(Debug, Default, Resource)]
pub struct EventLog {
    pub events: Vec<TimedEvent>,
}

impl EventLog {
    pub fn record(&mut self, tick: u64, time: f64, event: SimEvent) {
        self.events.push(TimedEvent { tick, time, event });
    }

    /// Events recorded during `tick`.
    pub fn for_tick(&self, tick: u64) -> impl Iterator<Item = &TimedEvent> {
        self.events.iter().filter(move |e| e.tick == tick)
    }
}

/// Final per-vehicle figures, in vehicle creation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleReport {
    pub name: String,
    pub served_count: u32,
    pub failed_count: u32,
    pub assigned_count: u32,
    pub total_distance: f64,
}

pub fn vehicle_reports(world: &mut World) -> Vec<VehicleReport> {
    let mut vehicles: Vec<(VehicleIndex, VehicleReport)> = world
        .query::<(&VehicleIndex, &Vehicle)>()
        .iter(world)
        .map(|(index, vehicle)| {
            (
                *index,
                VehicleReport {
                    name: vehicle.name.clone(),
                    served_count: vehicle.served_count,
                    failed_count: vehicle.failed_count,
                    assigned_count: vehicle.assigned_count,
                    total_distance: vehicle.total_distance,
                },
            )
        })
        .collect();
    vehicles.sort_by_key(|(index, _)| *index);
    vehicles.into_iter().map(|(_, report)| report).collect()
}

/// Vehicle entities ordered by creation index.
pub fn vehicles_in_order(world: &mut World) -> Vec<Entity> {
    let mut entities: Vec<(VehicleIndex, Entity)> = world
        .query::<(Entity, &VehicleIndex)>()
        .iter(world)
        .map(|(entity, index)| (*index, entity))
        .collect();
    entities.sort_by_key(|(index, _)| *index);
    entities.into_iter().map(|(_, entity)| entity).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_log_filters_by_tick() {
        let mut log = EventLog::default();
        log.record(0, 0.0, SimEvent::NoVehicleAvailable { zone: "A1".into() });
        log.record(1, 1.0, SimEvent::IncidentRejected { reason: "x".into() });
        log.record(1, 1.0, SimEvent::NoVehicleAvailable { zone: "A2".into() });
        assert_eq!(log.for_tick(1).count(), 2);
        assert_eq!(log.for_tick(2).count(), 0);
    }

    #[test]
    fn reports_follow_creation_order() {
        let mut world = World::new();
        world.spawn((VehicleIndex(1), Vehicle::new("second", 1.0)));
        world.spawn((VehicleIndex(0), Vehicle::new("first", 1.0)));
        let names: Vec<String> = vehicle_reports(&mut world)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
