use crate::metrics::SimulationResult;
use crate::parameters::ParameterSet;

pub(crate) fn export_to_csv_impl(
    results: &[SimulationResult],
    parameter_sets: &[ParameterSet],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    if results.len() != parameter_sets.len() {
        return Err(format!(
            "Results length ({}) doesn't match parameter_sets length ({})",
            results.len(),
            parameter_sets.len()
        )
        .into());
    }

    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "experiment_id",
        "run_id",
        "incident_seed",
        "incident_rate",
        "interval",
        "duration",
        "vehicle_count",
        "mean_vehicle_speed",
        "patrol_mode",
        "ticks",
        "incidents_total",
        "incidents_successful",
        "incidents_failed",
        "incidents_unassigned",
        "contact_failures",
        "incidents_rejected",
        "success_rate",
        "failure_rate",
        "total_distance",
        "average_distance_per_vehicle",
        "distance_per_success",
    ])?;

    for (result, param_set) in results.iter().zip(parameter_sets.iter()) {
        let params = &param_set.params;
        let vehicle_count = params.vehicles.len();
        let mean_speed = if vehicle_count == 0 {
            0.0
        } else {
            params.vehicles.iter().map(|v| v.speed).sum::<f64>() / vehicle_count as f64
        };

        wtr.write_record([
            param_set.experiment_id.clone(),
            param_set.run_id.to_string(),
            param_set.seed.to_string(),
            params.incident_rate.to_string(),
            params.interval.to_string(),
            params.duration.to_string(),
            vehicle_count.to_string(),
            mean_speed.to_string(),
            format!("{:?}", params.patrol_mode),
            result.ticks.to_string(),
            result.incidents_total.to_string(),
            result.incidents_successful.to_string(),
            result.incidents_failed.to_string(),
            result.incidents_unassigned.to_string(),
            result.contact_failures.to_string(),
            result.incidents_rejected.to_string(),
            result.success_rate.to_string(),
            result.failure_rate.to_string(),
            result.total_distance.to_string(),
            result.average_distance_per_vehicle.to_string(),
            result
                .distance_per_success
                .map(|d| d.to_string())
                .unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
