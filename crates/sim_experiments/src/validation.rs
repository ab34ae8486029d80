//! Goodness-of-fit checks for the linear congruential streams.

use serde::Serialize;
use sim_core::random::{GeneratorParams, RandomStream};
use sim_core::SimError;

/// Intervals used by the frequency test.
pub const DEFAULT_FREQUENCY_BINS: usize = 10;
/// Maximum gap between the observed and reference mean distance for a pass.
pub const DISTANCE_TOLERANCE: f64 = 0.02;
/// Draw limit for generators whose half-period is larger than this.
pub const MAX_VALIDATION_SAMPLES: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyTest {
    pub chi_square: f64,
    pub observed: Vec<u64>,
}

/// Running counts per interval; feeds [FrequencyTest] without holding the values.
#[derive(Debug, Clone)]
struct FrequencyCounter {
    observed: Vec<u64>,
    total: u64,
}

impl FrequencyCounter {
    fn new(bins: usize) -> Self {
        Self {
            observed: vec![0; bins],
            total: 0,
        }
    }

    fn push(&mut self, value: f64) {
        let bins = self.observed.len();
        if bins == 0 {
            return;
        }
        let index = ((value * bins as f64) as usize).min(bins - 1);
        self.observed[index] += 1;
        self.total += 1;
    }

    fn finish(self) -> FrequencyTest {
        if self.total == 0 {
            return FrequencyTest {
                chi_square: 0.0,
                observed: self.observed,
            };
        }
        let expected = self.total as f64 / self.observed.len() as f64;
        let chi_square = self
            .observed
            .iter()
            .map(|&count| (count as f64 - expected).powi(2) / expected)
            .sum();
        FrequencyTest {
            chi_square,
            observed: self.observed,
        }
    }
}

/// Chi-square of the counts in `bins` equal-width intervals of [0, 1).
///
/// Values at or above 1.0 fall into the last interval.
pub fn frequency_test(values: &[f64], bins: usize) -> FrequencyTest {
    let mut counter = FrequencyCounter::new(bins);
    values.iter().for_each(|&value| counter.push(value));
    counter.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceTest {
    pub mean: f64,
    pub expected: f64,
    pub difference: f64,
}

impl DistanceTest {
    pub fn passed(&self) -> bool {
        self.difference < DISTANCE_TOLERANCE
    }

    pub fn status(&self) -> &'static str {
        if self.passed() {
            "passed"
        } else {
            "possible deviation"
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct GapMean {
    previous: Option<f64>,
    sum: f64,
    gaps: u64,
}

impl GapMean {
    fn push(&mut self, value: f64) {
        if let Some(previous) = self.previous {
            self.sum += (value - previous).abs();
            self.gaps += 1;
        }
        self.previous = Some(value);
    }

    fn finish(self) -> DistanceTest {
        let expected = 1.0 / 12f64.sqrt();
        let mean = if self.gaps == 0 {
            0.0
        } else {
            self.sum / self.gaps as f64
        };
        DistanceTest {
            mean,
            expected,
            difference: (mean - expected).abs(),
        }
    }
}

/// Mean absolute gap between consecutive values against `1 / sqrt(12)`.
pub fn distance_test(values: &[f64]) -> DistanceTest {
    let mut gaps = GapMean::default();
    values.iter().for_each(|&value| gaps.push(value));
    gaps.finish()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorValidation {
    pub name: String,
    pub params: GeneratorParams,
    pub samples: usize,
    pub frequency: FrequencyTest,
    pub distance: DistanceTest,
}

/// Draw `m / 2` values (at most [MAX_VALIDATION_SAMPLES]) from a fresh stream and
/// run both tests over them as they are drawn.
pub fn validate_generator(
    name: &str,
    params: GeneratorParams,
) -> Result<GeneratorValidation, SimError> {
    let mut stream = RandomStream::new(params)?;
    let samples = (params.m / 2).min(MAX_VALIDATION_SAMPLES);
    let mut frequency = FrequencyCounter::new(DEFAULT_FREQUENCY_BINS);
    let mut distance = GapMean::default();
    for _ in 0..samples {
        let value = stream.uniform();
        frequency.push(value);
        distance.push(value);
    }
    Ok(GeneratorValidation {
        name: name.to_string(),
        params,
        samples: samples as usize,
        frequency: frequency.finish(),
        distance: distance.finish(),
    })
}

/// Validate the two streams every simulation uses.
pub fn validate_reference_generators() -> Result<Vec<GeneratorValidation>, SimError> {
    Ok(vec![
        validate_generator("vehicles", GeneratorParams::VEHICLES)?,
        validate_generator("incidents", GeneratorParams::INCIDENTS)?,
    ])
}

/// Human-readable summary of one validation.
pub fn format_validation(validation: &GeneratorValidation) -> String {
    let p = validation.params;
    format!(
        "{name}\n\
         Parameters: a={a}, c={c}, m={m}, x0={x0}\n\
         Chi-square (frequency): {chi:.3}\n\
         Frequencies per interval: {observed:?}\n\
         Mean distance: {mean:.4}\n\
         Expected value: {expected:.4}\n\
         Difference: {difference:.4}\n\
         Status: {status}\n",
        name = validation.name,
        a = p.a,
        c = p.c,
        m = p.m,
        x0 = p.x0,
        chi = validation.frequency.chi_square,
        observed = validation.frequency.observed,
        mean = validation.distance.mean,
        expected = validation.distance.expected,
        difference = validation.distance.difference,
        status = validation.distance.status(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vehicle_stream_is_balanced() {
        let validation = validate_generator("vehicles", GeneratorParams::VEHICLES).expect("valid");
        assert_eq!(validation.samples, 500);
        assert_eq!(
            validation.frequency.observed,
            vec![50, 51, 49, 50, 51, 50, 49, 51, 50, 49]
        );
        assert!((validation.frequency.chi_square - 0.12).abs() < 1e-9);
        assert!((validation.distance.mean - 0.293_481).abs() < 1e-6);
        assert!(validation.distance.passed());
    }

    #[test]
    fn incident_stream_is_balanced() {
        let validation =
            validate_generator("incidents", GeneratorParams::INCIDENTS).expect("valid");
        assert_eq!(validation.samples, 5000);
        assert_eq!(validation.frequency.observed.iter().sum::<u64>(), 5000);
        assert!((validation.frequency.chi_square - 0.052).abs() < 1e-9);
        assert_eq!(validation.distance.status(), "passed");
    }

    #[test]
    fn constant_sequence_fails_distance_test() {
        let values = vec![0.5; 100];
        let distance = distance_test(&values);
        assert_eq!(distance.mean, 0.0);
        assert!(!distance.passed());
        assert_eq!(distance.status(), "possible deviation");

        let frequency = frequency_test(&values, 10);
        assert_eq!(frequency.observed[5], 100);
        assert!((frequency.chi_square - 900.0).abs() < 1e-9);
    }

    #[test]
    fn empty_inputs_yield_zeroed_results() {
        assert_eq!(frequency_test(&[], 10).chi_square, 0.0);
        assert_eq!(frequency_test(&[], 10).observed, vec![0; 10]);
        assert_eq!(distance_test(&[]).mean, 0.0);
        assert_eq!(distance_test(&[0.3]).mean, 0.0);
    }

    #[test]
    fn invalid_constants_are_reported() {
        assert!(validate_generator("broken", GeneratorParams::new(0, 1, 10, 0)).is_err());
    }

    #[test]
    fn summary_names_the_status() {
        let validation = validate_generator("vehicles", GeneratorParams::VEHICLES).expect("valid");
        let text = format_validation(&validation);
        assert!(text.starts_with("vehicles\n"));
        assert!(text.contains("a=501, c=547, m=1000, x0=827"));
        assert!(text.contains("Status: passed"));
    }

    #[test]
    fn long_period_generators_are_capped() {
        // 2^31 modulus: a half-period would be about a billion draws.
        let params = GeneratorParams::new(1_103_515_245, 12_345, 1 << 31, 42);
        let validation = validate_generator("long", params).expect("valid");
        assert_eq!(validation.samples as u64, MAX_VALIDATION_SAMPLES);
        assert_eq!(
            validation.frequency.observed.iter().sum::<u64>(),
            MAX_VALIDATION_SAMPLES
        );
        assert!(validation.frequency.observed.iter().all(|&count| count > 0));
    }

    #[test]
    fn streamed_statistics_match_the_slice_versions() {
        let mut stream = RandomStream::new(GeneratorParams::VEHICLES).expect("stream");
        let values: Vec<f64> = (0..500).map(|_| stream.uniform()).collect();
        let validation = validate_generator("vehicles", GeneratorParams::VEHICLES).expect("valid");
        assert_eq!(validation.frequency, frequency_test(&values, DEFAULT_FREQUENCY_BINS));
        assert_eq!(validation.distance, distance_test(&values));
    }
}
