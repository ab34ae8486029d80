//! Experiment tooling around the patrol simulation core.
//!
//! Runs many scenarios in parallel with varying parameters, extracts run metrics,
//! formats the end-of-run report, validates the reference random generators and
//! exports everything to CSV/JSON.
//!
//! # Quick Start
//!
//! ```no_run
//! use sim_experiments::{export_to_csv, run_parallel_experiments, ParameterSpace};
//!
//! // Define parameter space (grid search)
//! let space = ParameterSpace::grid()
//!     .incident_rate(vec![0.25, 0.5, 1.0])
//!     .vehicle_speed(vec![2.5, 5.0]);
//!
//! let parameter_sets = space.generate();
//! let results = run_parallel_experiments(parameter_sets.clone(), None)?;
//! export_to_csv(&results, &parameter_sets, "sweep.csv")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! - [`parameters`]: parameter variation (grid search, random sampling, repetitions)
//! - [`runner`]: parallel execution using rayon
//! - [`metrics`]: metrics extraction from a finished world
//! - [`report`]: the human-readable end-of-run report
//! - [`validation`]: frequency and distance tests for the LCG streams
//! - [`export`]: CSV/JSON output

pub mod export;
pub mod metrics;
pub mod parameters;
pub mod report;
pub mod runner;
pub mod validation;

pub use export::{append_validation_csv, export_to_csv, export_to_json};
pub use metrics::{extract_metrics, SimulationResult};
pub use parameters::{ParameterSet, ParameterSpace};
pub use report::format_report;
pub use runner::run_parallel_experiments;
pub use validation::validate_generator;
