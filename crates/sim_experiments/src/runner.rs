//! Parallel simulation execution using rayon.
//!
//! Every run builds its own `World` and its own random streams, so runs share no
//! state and results do not depend on thread count or scheduling.

use bevy_ecs::prelude::World;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use sim_core::runner::{run_until_finished, simulation_schedule};
use sim_core::scenario::build_scenario;
use sim_core::SimError;
use tracing::{debug, info};

use crate::metrics::{extract_metrics, SimulationResult};
use crate::parameters::ParameterSet;

/// Run one parameter set to completion and extract its metrics.
pub fn run_single_simulation(param_set: &ParameterSet) -> Result<SimulationResult, SimError> {
    let params = param_set.scenario_params();
    let max_ticks = params.tick_count();

    let mut world = World::new();
    build_scenario(&mut world, params)?;
    let mut schedule = simulation_schedule();
    let ticks = run_until_finished(&mut world, &mut schedule, max_ticks);
    debug!(
        experiment = %param_set.experiment_id,
        run = param_set.run_id,
        ticks,
        "run finished"
    );

    Ok(extract_metrics(&mut world))
}

/// Run multiple simulations in parallel with a progress bar.
///
/// Results come back in the same order as `parameter_sets`.
pub fn run_parallel_experiments(
    parameter_sets: Vec<ParameterSet>,
    num_threads: Option<usize>,
) -> Result<Vec<SimulationResult>, Box<dyn std::error::Error>> {
    run_parallel_experiments_with_progress(parameter_sets, num_threads, true)
}

/// Run multiple simulations in parallel with an optional progress bar.
///
/// `num_threads` of `None` uses rayon's default. The first failing run aborts the
/// sweep with its error.
pub fn run_parallel_experiments_with_progress(
    parameter_sets: Vec<ParameterSet>,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<SimulationResult>, Box<dyn std::error::Error>> {
    let total = parameter_sets.len();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        ) {
            bar.set_style(style.progress_chars("#>-"));
        }
        Some(bar)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build()?;
    info!(runs = total, threads = pool.current_num_threads(), "starting sweep");

    let results: Result<Vec<SimulationResult>, SimError> = pool.install(|| {
        parameter_sets
            .par_iter()
            .map(|param_set| {
                let result = run_single_simulation(param_set);
                if let Some(progress_bar) = &pb {
                    progress_bar.inc(1);
                }
                result
            })
            .collect()
    });

    if let Some(progress_bar) = &pb {
        progress_bar.finish_with_message("Completed");
    }

    Ok(results?)
}
