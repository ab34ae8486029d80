//! Console summary of a finished run.

use std::fmt;

use crate::metrics::{percentage, ratio, SimulationResult};

const RULE_WIDTH: usize = 60;

/// End-of-run report. Every share and average reads 0.00 when its denominator is zero.
pub struct RunReport<'a> {
    pub incident_rate: f64,
    pub result: &'a SimulationResult,
}

impl fmt::Display for RunReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.result;
        let total = result.incidents_total;
        let rule = "-".repeat(RULE_WIDTH);

        writeln!(f, "SIMULATION RESULTS")?;
        writeln!(f)?;
        writeln!(f, "General summary")?;
        writeln!(f, "   Time simulated: {} units", result.simulated_time)?;
        writeln!(f, "   Configured rate (lambda): {}", self.incident_rate)?;
        writeln!(f, "   Incidents generated: {total}")?;
        writeln!(
            f,
            "   Successful incidents: {} ({:.2}%)",
            result.incidents_successful,
            percentage(result.incidents_successful, total)
        )?;
        writeln!(
            f,
            "   Failed incidents: {} ({:.2}%)",
            result.incidents_failed,
            percentage(result.incidents_failed, total)
        )?;
        if result.incidents_rejected > 0 {
            writeln!(f, "   Rejected incidents: {}", result.incidents_rejected)?;
        }

        writeln!(f)?;
        writeln!(f, "Incidents served per vehicle")?;
        writeln!(
            f,
            "   {:<15} {:<12} {:<12} {:<10}",
            "Vehicle", "Served", "% of total", "Assigned"
        )?;
        writeln!(f, "   {rule}")?;
        for vehicle in &result.vehicles {
            writeln!(
                f,
                "   {:<15} {:<12} {:>9.2}%   {:<10}",
                vehicle.name,
                vehicle.served_count,
                percentage(u64::from(vehicle.served_count), total),
                vehicle.assigned_count
            )?;
        }

        writeln!(f)?;
        writeln!(f, "People not transferred to a station")?;
        writeln!(f, "   Total not transferred: {}", result.incidents_failed)?;
        writeln!(f, "   Share: {:.2}%", percentage(result.incidents_failed, total))?;
        writeln!(f, "   - Person not found on scene: {}", result.contact_failures)?;
        writeln!(f, "   - No vehicle available: {}", result.incidents_unassigned)?;

        writeln!(f)?;
        writeln!(f, "Distance travelled per vehicle")?;
        writeln!(
            f,
            "   {:<15} {:<25} {:<10}",
            "Vehicle", "Total distance (km)", "Served"
        )?;
        writeln!(f, "   {rule}")?;
        for vehicle in &result.vehicles {
            writeln!(
                f,
                "   {:<15} {:>10.2} km{:14}{:<10}",
                vehicle.name, vehicle.total_distance, "", vehicle.served_count
            )?;
        }
        writeln!(f, "   {rule}")?;
        writeln!(
            f,
            "   {:<15} {:>10.2} km",
            "AVERAGE",
            ratio(result.total_distance, result.vehicles.len() as f64)
        )?;

        if let Some(per_success) = result.distance_per_success {
            writeln!(f)?;
            writeln!(
                f,
                "   Average distance per successful incident: {per_success:.2} km"
            )?;
        }
        Ok(())
    }
}

pub fn format_report(incident_rate: f64, result: &SimulationResult) -> String {
    RunReport {
        incident_rate,
        result,
    }
    .to_string()
}
