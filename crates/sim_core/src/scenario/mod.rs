//! Scenario setup: turn [ScenarioParams] into world resources and vehicle entities.

mod build;
mod params;

pub use build::build_scenario;
pub use params::{IncidentRate, PatrolMode, ScenarioParams, VehicleSpec};
