//! Parameter variation framework for scenario sweeps.
//!
//! A [ParameterSpace] lists candidate values per dimension on top of a base
//! [ScenarioParams]. [ParameterSpace::generate] yields the full Cartesian product;
//! [ParameterSpace::sample_random] draws a reproducible subset.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use sim_core::scenario::ScenarioParams;

/// One scenario to run, with bookkeeping for exports.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSet {
    pub params: ScenarioParams,
    pub experiment_id: String,
    /// Run number within the experiment (for repeated runs of the same params).
    pub run_id: usize,
    /// Starting state of the incident stream.
    pub seed: u64,
}

impl ParameterSet {
    pub fn new(params: ScenarioParams, experiment_id: String, run_id: usize, seed: u64) -> Self {
        Self {
            params,
            experiment_id,
            run_id,
            seed,
        }
    }

    /// Scenario params with the incident stream reseeded to [ParameterSet::seed].
    pub fn scenario_params(&self) -> ScenarioParams {
        self.params.clone().with_incident_seed(self.seed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Combination {
    incident_rate: f64,
    interval: f64,
    duration: f64,
    vehicle_speed: Option<f64>,
    incident_seed: u64,
}

/// Defines a parameter space for exploration.
///
/// Empty dimensions fall back to the base scenario's value.
#[derive(Debug, Clone, Default)]
pub struct ParameterSpace {
    base: ScenarioParams,
    incident_rates: Vec<f64>,
    intervals: Vec<f64>,
    durations: Vec<f64>,
    vehicle_speeds: Vec<f64>,
    incident_seeds: Vec<u64>,
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a grid search over the reference scenario.
    pub fn grid() -> Self {
        Self::new()
    }

    pub fn with_base(mut self, base: ScenarioParams) -> Self {
        self.base = base;
        self
    }

    pub fn incident_rate(mut self, rates: Vec<f64>) -> Self {
        self.incident_rates = rates;
        self
    }

    pub fn interval(mut self, intervals: Vec<f64>) -> Self {
        self.intervals = intervals;
        self
    }

    pub fn duration(mut self, durations: Vec<f64>) -> Self {
        self.durations = durations;
        self
    }

    /// Speeds applied to every vehicle of the base fleet.
    pub fn vehicle_speed(mut self, speeds: Vec<f64>) -> Self {
        self.vehicle_speeds = speeds;
        self
    }

    /// Starting states for the incident stream. Each must be below its modulus.
    pub fn incident_seed(mut self, seeds: Vec<u64>) -> Self {
        self.incident_seeds = seeds;
        self
    }

    fn dimensions(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<Option<f64>>, Vec<u64>) {
        fn or_base<T: Clone>(values: &[T], base: T) -> Vec<T> {
            if values.is_empty() {
                vec![base]
            } else {
                values.to_vec()
            }
        }
        let speeds = if self.vehicle_speeds.is_empty() {
            vec![None]
        } else {
            self.vehicle_speeds.iter().copied().map(Some).collect()
        };
        (
            or_base(&self.incident_rates, self.base.incident_rate),
            or_base(&self.intervals, self.base.interval),
            or_base(&self.durations, self.base.duration),
            speeds,
            or_base(&self.incident_seeds, self.base.incident_generator.x0),
        )
    }

    fn combinations(&self) -> Vec<Combination> {
        let (rates, intervals, durations, speeds, seeds) = self.dimensions();
        let mut combos = Vec::with_capacity(
            rates.len() * intervals.len() * durations.len() * speeds.len() * seeds.len(),
        );
        for &incident_rate in &rates {
            for &interval in &intervals {
                for &duration in &durations {
                    for &vehicle_speed in &speeds {
                        for &incident_seed in &seeds {
                            combos.push(Combination {
                                incident_rate,
                                interval,
                                duration,
                                vehicle_speed,
                                incident_seed,
                            });
                        }
                    }
                }
            }
        }
        combos
    }

    fn params_for(&self, combo: &Combination) -> ScenarioParams {
        let mut params = self
            .base
            .clone()
            .with_incident_rate(combo.incident_rate)
            .with_interval(combo.interval)
            .with_duration(combo.duration);
        if let Some(speed) = combo.vehicle_speed {
            params = params.with_vehicle_speed(speed);
        }
        params
    }

    /// Generate every combination (grid search).
    pub fn generate(&self) -> Vec<ParameterSet> {
        self.combinations()
            .iter()
            .enumerate()
            .map(|(experiment_id, combo)| {
                ParameterSet::new(
                    self.params_for(combo),
                    format!("exp_{experiment_id}"),
                    0,
                    combo.incident_seed,
                )
            })
            .collect()
    }

    /// Draw up to `count` distinct combinations (Monte Carlo sampling).
    pub fn sample_random(&self, count: usize, seed: u64) -> Vec<ParameterSet> {
        const MAX_ATTEMPTS: usize = 10_000;

        let combos = self.combinations();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut seen = HashSet::new();
        let mut parameter_sets = Vec::new();
        let mut attempts = 0;

        while parameter_sets.len() < count && seen.len() < combos.len() && attempts < MAX_ATTEMPTS {
            attempts += 1;
            let pick = rng.gen_range(0..combos.len());
            if !seen.insert(pick) {
                continue;
            }
            let combo = &combos[pick];
            parameter_sets.push(ParameterSet::new(
                self.params_for(combo),
                format!("random_{}", parameter_sets.len()),
                0,
                combo.incident_seed,
            ));
        }
        parameter_sets
    }

    /// Expand each set into `runs` repetitions with consecutive incident seeds.
    pub fn with_repetitions(sets: Vec<ParameterSet>, runs: usize) -> Vec<ParameterSet> {
        sets.into_iter()
            .flat_map(|set| {
                let modulus = set.params.incident_generator.m.max(1);
                (0..runs).map(move |run_id| {
                    let seed = (set.seed + run_id as u64) % modulus;
                    ParameterSet::new(set.params.clone(), set.experiment_id.clone(), run_id, seed)
                })
            })
            .collect()
    }
}

/// The sweep the `sweep` subcommand runs by default.
pub fn default_sweep_space() -> ParameterSpace {
    ParameterSpace::grid()
        .incident_rate(vec![0.25, 0.5, 1.0, 2.0])
        .vehicle_speed(vec![2.5, 5.0])
        .incident_seed(vec![4049, 1234, 7777])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_space_yields_the_base_scenario() {
        let sets = ParameterSpace::grid().generate();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].scenario_params(), ScenarioParams::default());
        assert_eq!(sets[0].experiment_id, "exp_0");
    }

    #[test]
    fn grid_is_the_cartesian_product() {
        let sets = ParameterSpace::grid()
            .incident_rate(vec![0.5, 1.0, 2.0])
            .vehicle_speed(vec![2.5, 5.0])
            .incident_seed(vec![1, 2])
            .generate();
        assert_eq!(sets.len(), 12);

        let fast_busy = sets
            .iter()
            .filter(|s| s.params.incident_rate == 2.0)
            .filter(|s| s.params.vehicles.iter().all(|v| v.speed == 5.0))
            .count();
        assert_eq!(fast_busy, 2);
    }

    #[test]
    fn seed_dimension_reseeds_only_the_incident_stream() {
        let sets = ParameterSpace::grid().incident_seed(vec![17]).generate();
        let params = sets[0].scenario_params();
        assert_eq!(params.incident_generator.x0, 17);
        assert_eq!(params.incident_generator.a, 5001);
        assert_eq!(params.vehicle_generator, ScenarioParams::default().vehicle_generator);
    }

    #[test]
    fn random_sampling_is_distinct_and_reproducible() {
        let space = ParameterSpace::grid()
            .incident_rate(vec![0.25, 0.5, 1.0, 2.0])
            .duration(vec![50.0, 100.0, 200.0]);
        let first = space.sample_random(5, 42);
        let second = space.sample_random(5, 42);
        assert_eq!(first.len(), 5);

        let key = |s: &ParameterSet| (s.params.incident_rate.to_bits(), s.params.duration.to_bits());
        let distinct: HashSet<_> = first.iter().map(key).collect();
        assert_eq!(distinct.len(), 5);
        assert_eq!(
            first.iter().map(key).collect::<Vec<_>>(),
            second.iter().map(key).collect::<Vec<_>>()
        );
    }

    #[test]
    fn sampling_more_than_exists_returns_everything() {
        let space = ParameterSpace::grid().incident_rate(vec![0.5, 1.0]);
        assert_eq!(space.sample_random(10, 1).len(), 2);
    }

    #[test]
    fn repetitions_use_consecutive_seeds() {
        let sets = ParameterSpace::with_repetitions(ParameterSpace::grid().generate(), 3);
        let seeds: Vec<(usize, u64)> = sets.iter().map(|s| (s.run_id, s.seed)).collect();
        assert_eq!(seeds, vec![(0, 4049), (1, 4050), (2, 4051)]);
    }
}
