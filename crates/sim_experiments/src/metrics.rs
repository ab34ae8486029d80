//! Metrics extraction from completed simulations.

use bevy_ecs::prelude::World;
use serde::{Deserialize, Serialize};
use sim_core::clock::SimulationClock;
use sim_core::telemetry::{vehicle_reports, SimMetrics, VehicleReport};

/// `numerator / denominator`, or 0.0 when the denominator is zero.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// [ratio] scaled to a percentage.
pub fn percentage(part: u64, total: u64) -> f64 {
    ratio(part as f64, total as f64) * 100.0
}

/// Aggregated metrics from a single simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Simulated time covered by the run.
    pub simulated_time: f64,
    pub ticks: u64,
    pub incidents_total: u64,
    pub incidents_successful: u64,
    pub incidents_failed: u64,
    /// Failed because nobody was patrolling.
    pub incidents_unassigned: u64,
    /// Failed because the person was not found on scene.
    pub contact_failures: u64,
    pub incidents_rejected: u64,
    pub success_rate: f64,
    pub failure_rate: f64,
    /// Sum of all vehicle odometers (dispatch and transfer legs only).
    pub total_distance: f64,
    pub average_distance_per_vehicle: f64,
    /// `None` when no incident succeeded.
    pub distance_per_success: Option<f64>,
    pub vehicles: Vec<VehicleReport>,
}

/// Extract metrics from a completed simulation world.
///
/// Missing resources read as zero, so a world that never ran still yields a
/// well-formed result.
pub fn extract_metrics(world: &mut World) -> SimulationResult {
    let metrics = world
        .get_resource::<SimMetrics>()
        .copied()
        .unwrap_or_default();
    let (simulated_time, ticks) = world
        .get_resource::<SimulationClock>()
        .map_or((0.0, 0), |clock| (clock.now(), clock.ticks()));
    let vehicles = vehicle_reports(world);

    let contact_failures: u64 = vehicles.iter().map(|v| u64::from(v.failed_count)).sum();
    let total_distance: f64 = vehicles.iter().map(|v| v.total_distance).sum();
    let distance_per_success = (metrics.incidents_successful > 0)
        .then(|| total_distance / metrics.incidents_successful as f64);

    SimulationResult {
        simulated_time,
        ticks,
        incidents_total: metrics.incidents_total,
        incidents_successful: metrics.incidents_successful,
        incidents_failed: metrics.incidents_failed,
        incidents_unassigned: metrics.incidents_unassigned,
        contact_failures,
        incidents_rejected: metrics.incidents_rejected,
        success_rate: ratio(
            metrics.incidents_successful as f64,
            metrics.incidents_total as f64,
        ),
        failure_rate: ratio(metrics.incidents_failed as f64, metrics.incidents_total as f64),
        total_distance,
        average_distance_per_vehicle: ratio(total_distance, vehicles.len() as f64),
        distance_per_success,
        vehicles,
    }
}
