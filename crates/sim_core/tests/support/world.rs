#![allow(dead_code)]

use bevy_ecs::prelude::{Entity, World};
use sim_core::ecs::{Vehicle, VehicleIndex};
use sim_core::incident::{Incident, PendingIncidents};
use sim_core::random::GeneratorParams;
use sim_core::scenario::{build_scenario, PatrolMode, ScenarioParams, VehicleSpec};
use sim_core::telemetry::EventLog;

/// Helper that builds a reproducible world through the public scenario builder.
#[derive(Debug, Clone)]
pub struct TestWorldBuilder {
    params: ScenarioParams,
    event_log: bool,
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self {
            params: ScenarioParams::default(),
            event_log: true,
        }
    }
}

impl TestWorldBuilder {
    /// Reference scenario with an event log.
    pub fn new() -> Self {
        Self::default()
    }

    /// No generated incidents; only injected ones reach dispatch.
    pub fn quiet() -> Self {
        Self::new().with_rate(0.0)
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.params.duration = duration;
        self
    }

    pub fn with_interval(mut self, interval: f64) -> Self {
        self.params.interval = interval;
        self
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.params.incident_rate = rate;
        self
    }

    /// Replace the vehicle fleet; each entry is `(name, x, y, speed)`.
    pub fn with_vehicles(mut self, vehicles: &[(&str, f64, f64, f64)]) -> Self {
        self.params.vehicles = vehicles
            .iter()
            .map(|(name, x, y, speed)| VehicleSpec::new(*name, *x, *y, *speed))
            .collect();
        self
    }

    pub fn with_vehicle_generator(mut self, params: GeneratorParams) -> Self {
        self.params.vehicle_generator = params;
        self
    }

    pub fn with_incident_generator(mut self, params: GeneratorParams) -> Self {
        self.params.incident_generator = params;
        self
    }

    pub fn free_roam(mut self) -> Self {
        self.params.patrol_mode = PatrolMode::FreeRoam;
        self
    }

    pub fn without_event_log(mut self) -> Self {
        self.event_log = false;
        self
    }

    pub fn params(&self) -> &ScenarioParams {
        &self.params
    }

    pub fn build(self) -> World {
        let mut world = World::new();
        if self.event_log {
            world.insert_resource(EventLog::default());
        }
        build_scenario(&mut world, self.params).expect("test scenario");
        world
    }
}

pub fn inject(world: &mut World, incident: Incident) {
    world.resource_mut::<PendingIncidents>().push(incident);
}

pub fn vehicle_entity(world: &mut World, name: &str) -> Entity {
    world
        .query::<(Entity, &Vehicle)>()
        .iter(world)
        .find(|(_, vehicle)| vehicle.name == name)
        .map(|(entity, _)| entity)
        .expect("vehicle by name")
}

pub fn vehicle(world: &mut World, name: &str) -> Vehicle {
    let entity = vehicle_entity(world, name);
    world.get::<Vehicle>(entity).expect("vehicle component").clone()
}

pub fn vehicles_by_index(world: &mut World) -> Vec<Vehicle> {
    let mut vehicles: Vec<(VehicleIndex, Vehicle)> = world
        .query::<(&VehicleIndex, &Vehicle)>()
        .iter(world)
        .map(|(index, vehicle)| (*index, vehicle.clone()))
        .collect();
    vehicles.sort_by_key(|(index, _)| *index);
    vehicles.into_iter().map(|(_, vehicle)| vehicle).collect()
}
