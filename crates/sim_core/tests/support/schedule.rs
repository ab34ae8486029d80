#![allow(dead_code)]

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use sim_core::runner::{run_tick, run_tick_with_hook, run_until_finished, simulation_schedule};
use sim_core::telemetry::TimedEvent;

/// Helper that owns a reusable `Schedule` so tests can step or drain a run.
pub struct ScheduleRunner {
    schedule: Schedule,
}

impl Default for ScheduleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRunner {
    pub fn new() -> Self {
        Self {
            schedule: simulation_schedule(),
        }
    }

    /// Run a single tick (returns `true` if one was run).
    pub fn run_one(&mut self, world: &mut World) -> bool {
        run_tick(world, &mut self.schedule)
    }

    /// Run a single tick and return the events it recorded.
    pub fn run_one_collecting(&mut self, world: &mut World) -> Vec<TimedEvent> {
        let mut collected = Vec::new();
        run_tick_with_hook(world, &mut self.schedule, |_, events| {
            collected.extend_from_slice(events)
        });
        collected
    }

    /// Drive the simulation until the clock reaches its duration.
    pub fn run_full(&mut self, world: &mut World) -> u64 {
        run_until_finished(world, &mut self.schedule, u64::MAX)
    }
}
