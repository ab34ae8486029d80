use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::clock::SimulationClock;
use crate::error::{Result, SimError};
use crate::geometry::Region;
use crate::random::GeneratorParams;

/// Default simulated duration (time units).
const DEFAULT_DURATION: f64 = 100.0;
/// Default tick length (time units).
const DEFAULT_INTERVAL: f64 = 1.0;
/// Default mean incident count per time unit.
const DEFAULT_INCIDENT_RATE: f64 = 0.5;
const DEFAULT_VEHICLE_SPEED: f64 = 2.5;

/// Mean incidents per time unit. Each tick draws `Poisson(rate * interval)`.
#[derive(Debug, Clone, Copy, PartialEq, Resource)]
pub struct IncidentRate(pub f64);

/// How patrolling vehicles move between incidents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatrolMode {
    /// Vehicle `i` follows route `i` of the region when it exists, otherwise roams.
    #[default]
    Routes,
    /// Every vehicle roams freely.
    FreeRoam,
}

/// Initial placement and speed of one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub speed: f64,
}

impl VehicleSpec {
    pub fn new(name: impl Into<String>, x: f64, y: f64, speed: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            speed,
        }
    }
}

/// Everything needed to build one run. Plain values only; loading from files is the
/// caller's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    pub duration: f64,
    pub interval: f64,
    pub incident_rate: f64,
    pub vehicles: Vec<VehicleSpec>,
    pub patrol_mode: PatrolMode,
    /// Constants for the stream driving patrol movement and contact draws.
    pub vehicle_generator: GeneratorParams,
    /// Constants for the stream driving incident counts, zone choice and locations.
    pub incident_generator: GeneratorParams,
    pub region: Region,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            interval: DEFAULT_INTERVAL,
            incident_rate: DEFAULT_INCIDENT_RATE,
            vehicles: vec![
                VehicleSpec::new("Vehiculo 1", 5.0, 10.0, DEFAULT_VEHICLE_SPEED),
                VehicleSpec::new("Vehiculo 2", 5.0, 10.0, DEFAULT_VEHICLE_SPEED),
                VehicleSpec::new("Vehiculo 3", 32.5, 30.0, DEFAULT_VEHICLE_SPEED),
            ],
            patrol_mode: PatrolMode::default(),
            vehicle_generator: GeneratorParams::VEHICLES,
            incident_generator: GeneratorParams::INCIDENTS,
            region: Region::default(),
        }
    }
}

impl ScenarioParams {
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_interval(mut self, interval: f64) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_incident_rate(mut self, rate: f64) -> Self {
        self.incident_rate = rate;
        self
    }

    pub fn with_vehicles(mut self, vehicles: Vec<VehicleSpec>) -> Self {
        self.vehicles = vehicles;
        self
    }

    /// Give every configured vehicle the same speed.
    pub fn with_vehicle_speed(mut self, speed: f64) -> Self {
        for vehicle in &mut self.vehicles {
            vehicle.speed = speed;
        }
        self
    }

    pub fn with_patrol_mode(mut self, mode: PatrolMode) -> Self {
        self.patrol_mode = mode;
        self
    }

    pub fn with_vehicle_generator(mut self, params: GeneratorParams) -> Self {
        self.vehicle_generator = params;
        self
    }

    pub fn with_incident_generator(mut self, params: GeneratorParams) -> Self {
        self.incident_generator = params;
        self
    }

    /// Reseed the incident stream, keeping its other constants.
    pub fn with_incident_seed(mut self, x0: u64) -> Self {
        self.incident_generator = self.incident_generator.with_seed(x0);
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    /// Ticks a run of these params executes before its clock finishes.
    pub fn tick_count(&self) -> u64 {
        SimulationClock::ticks_to_finish(self.duration, self.interval)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.interval.is_finite() || self.interval <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "tick interval must be positive, got {}",
                self.interval
            )));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "duration must be non-negative, got {}",
                self.duration
            )));
        }
        if !self.incident_rate.is_finite() {
            return Err(SimError::InvalidConfig(format!(
                "incident rate must be finite, got {}",
                self.incident_rate
            )));
        }
        if let Some(vehicle) = self.vehicles.iter().find(|v| !v.speed.is_finite()) {
            return Err(SimError::InvalidConfig(format!(
                "vehicle {} has non-finite speed {}",
                vehicle.name, vehicle.speed
            )));
        }
        Ok(())
    }
}
