use chrono::{DateTime, Utc};

use crate::validation::GeneratorValidation;

const HEADER: [&str; 12] = [
    "timestamp",
    "generator",
    "a",
    "c",
    "m",
    "x0",
    "chi_square",
    "observed_frequencies",
    "mean_distance",
    "expected_distance",
    "difference",
    "status",
];

fn round4(value: f64) -> String {
    format!("{value:.4}")
}

pub(crate) fn append_validation_impl(
    validations: &[GeneratorValidation],
    file: std::fs::File,
    now: DateTime<Utc>,
) -> Result<(), Box<dyn std::error::Error>> {
    let is_empty = file.metadata()?.len() == 0;
    let mut wtr = csv::Writer::from_writer(file);
    if is_empty {
        wtr.write_record(HEADER)?;
    }

    let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();
    for validation in validations {
        let p = validation.params;
        let observed = validation
            .frequency
            .observed
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        wtr.write_record([
            timestamp.clone(),
            validation.name.clone(),
            p.a.to_string(),
            p.c.to_string(),
            p.m.to_string(),
            p.x0.to_string(),
            round4(validation.frequency.chi_square),
            observed,
            round4(validation.distance.mean),
            round4(validation.distance.expected),
            round4(validation.distance.difference),
            validation.distance.status().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
