//! Run the reference scenario and print the final counters.
//!
//! Run with: cargo run -p sim_core --example scenario_run

use sim_core::runner::run_scenario;
use sim_core::scenario::ScenarioParams;
use sim_core::telemetry::{vehicle_reports, SimMetrics};

fn main() -> Result<(), sim_core::SimError> {
    let params = ScenarioParams::default();
    println!(
        "--- Reference scenario ({} time units, interval {}, rate {}) ---",
        params.duration, params.interval, params.incident_rate
    );

    let mut world = run_scenario(params)?;
    let metrics = *world.resource::<SimMetrics>();
    println!("Incidents: {}", metrics.incidents_total);
    println!("Successful: {}", metrics.incidents_successful);
    println!(
        "Failed: {} ({} with no vehicle)",
        metrics.incidents_failed, metrics.incidents_unassigned
    );

    println!("{:<12} {:>8} {:>8} {:>8} {:>10}", "vehicle", "assigned", "served", "failed", "distance");
    for report in vehicle_reports(&mut world) {
        println!(
            "{:<12} {:>8} {:>8} {:>8} {:>10.2}",
            report.name,
            report.assigned_count,
            report.served_count,
            report.failed_count,
            report.total_distance
        );
    }
    Ok(())
}
