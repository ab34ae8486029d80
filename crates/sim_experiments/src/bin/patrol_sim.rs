//! Command-line entry point: single runs, parameter sweeps and generator validation.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use bevy_ecs::prelude::World;
use clap::{Parser, Subcommand};
use sim_core::runner::{run_until_finished, simulation_schedule};
use sim_core::scenario::{build_scenario, PatrolMode, ScenarioParams};
use sim_core::telemetry::EventLog;
use sim_experiments::parameters::default_sweep_space;
use sim_experiments::validation::{format_validation, validate_reference_generators};
use sim_experiments::{
    append_validation_csv, export_to_csv, export_to_json, extract_metrics, format_report,
    run_parallel_experiments,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Parser)]
#[command(
    name = "patrol-sim",
    about = "Emergency patrol vehicle simulation",
    long_about = "Runs the patrol and dispatch simulation, parameter sweeps over it,\n\
                  and statistical checks of the random streams that drive it."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scenario and print the report
    Run {
        /// TOML file with scenario parameters; missing fields keep their defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// Simulated duration in time units
        #[arg(long)]
        duration: Option<f64>,
        /// Tick length in time units
        #[arg(long)]
        interval: Option<f64>,
        /// Mean incidents per time unit
        #[arg(long)]
        rate: Option<f64>,
        /// Let every vehicle roam instead of following its route
        #[arg(long)]
        free_roam: bool,
        /// Print the structured event log as JSON after the report
        #[arg(long)]
        events: bool,
    },
    /// Run the default parameter sweep in parallel
    Sweep {
        /// CSV output path
        #[arg(long, default_value = "sweep_results.csv")]
        output: PathBuf,
        /// Also write the raw results as JSON
        #[arg(long)]
        json: Option<PathBuf>,
        /// Worker threads (defaults to one per core)
        #[arg(long, env = "PATROL_SIM_THREADS")]
        threads: Option<usize>,
    },
    /// Check both reference generators for uniformity
    Validate {
        /// CSV log to append results to
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .init();

    match Cli::parse().command {
        Commands::Run {
            config,
            duration,
            interval,
            rate,
            free_roam,
            events,
        } => {
            let mut params = match config {
                Some(path) => toml::from_str::<ScenarioParams>(&fs::read_to_string(&path)?)?,
                None => ScenarioParams::default(),
            };
            if let Some(duration) = duration {
                params = params.with_duration(duration);
            }
            if let Some(interval) = interval {
                params = params.with_interval(interval);
            }
            if let Some(rate) = rate {
                params = params.with_incident_rate(rate);
            }
            if free_roam {
                params = params.with_patrol_mode(PatrolMode::FreeRoam);
            }
            run(params, events)
        }
        Commands::Sweep {
            output,
            json,
            threads,
        } => sweep(output, json, threads),
        Commands::Validate { output } => validate(output),
    }
}

/// `RUST_LOG` directives when set and parseable, `info` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn run(params: ScenarioParams, print_events: bool) -> Result<(), Box<dyn Error>> {
    let incident_rate = params.incident_rate;
    let max_ticks = params.tick_count();

    let mut world = World::new();
    if print_events {
        world.insert_resource(EventLog::default());
    }
    build_scenario(&mut world, params)?;
    let mut schedule = simulation_schedule();
    let ticks = run_until_finished(&mut world, &mut schedule, max_ticks);
    info!(ticks, "run complete");

    let result = extract_metrics(&mut world);
    print!("{}", format_report(incident_rate, &result));

    if print_events {
        if let Some(log) = world.get_resource::<EventLog>() {
            println!("{}", serde_json::to_string_pretty(&log.events)?);
        }
    }
    Ok(())
}

fn sweep(
    output: PathBuf,
    json: Option<PathBuf>,
    threads: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let parameter_sets = default_sweep_space().generate();
    info!(runs = parameter_sets.len(), "sweep configured");

    let results = run_parallel_experiments(parameter_sets.clone(), threads)?;
    export_to_csv(&results, &parameter_sets, &output)?;
    info!(path = %output.display(), "sweep results written");

    if let Some(path) = json {
        export_to_json(&results, &path)?;
        info!(path = %path.display(), "sweep results written");
    }
    Ok(())
}

fn validate(output: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let validations = validate_reference_generators()?;
    for validation in &validations {
        println!("{}", format_validation(validation));
    }
    if let Some(path) = output {
        append_validation_csv(&validations, &path)?;
        info!(path = %path.display(), "validation appended");
    }
    Ok(())
}
