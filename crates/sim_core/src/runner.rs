//! Simulation runner: one schedule run per tick.
//!
//! Each tick handles incidents, then moves patrolling vehicles, then advances the
//! clock. The systems are chained on the single-threaded executor so every draw from
//! the two random streams happens in a fixed order.

use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::{ExecutorKind, IntoSystemConfigs};
use tracing::info;

use crate::clock::SimulationClock;
use crate::error::Result;
use crate::scenario::{build_scenario, ScenarioParams};
use crate::systems::{
    clock::advance_clock_system, incidents::incident_system, patrol::patrol_system,
};
use crate::telemetry::{EventLog, SimMetrics, TimedEvent};

/// Runs one tick. Returns `false` without touching the world once the clock has
/// reached its duration.
pub fn run_tick(world: &mut World, schedule: &mut Schedule) -> bool {
    if world.resource::<SimulationClock>().is_finished() {
        return false;
    }
    schedule.run(world);
    true
}

/// Runs one tick and passes the events recorded during it to `hook`.
///
/// The slice is empty when no [EventLog] is installed.
pub fn run_tick_with_hook<F>(world: &mut World, schedule: &mut Schedule, mut hook: F) -> bool
where
    F: FnMut(&World, &[TimedEvent]),
{
    let start = world
        .get_resource::<EventLog>()
        .map_or(0, |log| log.events.len());
    if !run_tick(world, schedule) {
        return false;
    }
    let events = world
        .get_resource::<EventLog>()
        .map_or(&[][..], |log| &log.events[start..]);
    hook(world, events);
    true
}

/// Runs ticks until the clock finishes or `max_ticks` is reached.
/// Returns the number of ticks executed.
pub fn run_until_finished(world: &mut World, schedule: &mut Schedule, max_ticks: u64) -> u64 {
    let mut ticks = 0;
    while ticks < max_ticks && run_tick(world, schedule) {
        ticks += 1;
    }
    ticks
}

/// Runs ticks until the clock finishes, invoking `hook` after each one.
pub fn run_until_finished_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    max_ticks: u64,
    mut hook: F,
) -> u64
where
    F: FnMut(&World, &[TimedEvent]),
{
    let mut ticks = 0;
    while ticks < max_ticks && run_tick_with_hook(world, schedule, &mut hook) {
        ticks += 1;
    }
    ticks
}

/// Builds the per-tick schedule: incidents, then patrol, then the clock.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems((incident_system, patrol_system, advance_clock_system).chain());
    schedule
}

/// Builds a fresh world from `params` and runs it to completion.
pub fn run_scenario(params: ScenarioParams) -> Result<World> {
    let max_ticks = params.tick_count();
    let mut world = World::new();
    build_scenario(&mut world, params)?;
    let mut schedule = simulation_schedule();
    let ticks = run_until_finished(&mut world, &mut schedule, max_ticks);

    let metrics = *world.resource::<SimMetrics>();
    info!(
        ticks,
        incidents = metrics.incidents_total,
        successful = metrics.incidents_successful,
        failed = metrics.incidents_failed,
        "simulation finished"
    );
    Ok(world)
}
