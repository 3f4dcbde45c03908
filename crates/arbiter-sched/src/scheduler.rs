//! Two-Lane Scheduler
//!
//! Owns exactly two command streams: "think" with a small budget for
//! decision cycles, and "update" with a larger one for continuing actions.
//! `tick` processes think then update once; cadence is entirely
//! caller-controlled, there is no internal timer.

use std::rc::Rc;

use serde::Serialize;

use crate::clock::{Clock, MonotonicClock};
use crate::config::SchedulerConfig;
use crate::stream::{CommandStream, StreamReport};

/// Per-tick outcome for both lanes.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TickReport {
    pub think: StreamReport,
    pub update: StreamReport,
}

pub struct Scheduler {
    think: CommandStream,
    update: CommandStream,
}

impl Scheduler {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self::with_clock(config, Rc::new(MonotonicClock::new()))
    }

    /// Both lanes share the given clock; the update lane derives its own
    /// jitter stream from the configured seed.
    pub fn with_clock(config: &SchedulerConfig, clock: Rc<dyn Clock>) -> Self {
        Self {
            think: CommandStream::with_clock(
                "think",
                config.think_budget_ms,
                config.seed,
                Rc::clone(&clock),
            ),
            update: CommandStream::with_clock(
                "update",
                config.update_budget_ms,
                config.seed.wrapping_add(1),
                clock,
            ),
        }
    }

    /// Processes the think lane, then the update lane, once.
    pub fn tick(&mut self) -> TickReport {
        TickReport {
            think: self.think.process(),
            update: self.update.process(),
        }
    }

    pub fn think(&self) -> &CommandStream {
        &self.think
    }

    pub fn think_mut(&mut self) -> &mut CommandStream {
        &mut self.think
    }

    pub fn update(&self) -> &CommandStream {
        &self.update
    }

    pub fn update_mut(&mut self) -> &mut CommandStream {
        &mut self.update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::command::DeferredCommand;
    use std::cell::Cell;
    use std::rc::Rc;

    fn scheduler_with_clock() -> (Scheduler, ManualClock) {
        let clock = ManualClock::new();
        let scheduler =
            Scheduler::with_clock(&SchedulerConfig::default(), Rc::new(clock.clone()));
        (scheduler, clock)
    }

    #[test]
    fn test_tick_processes_both_lanes() {
        let (mut scheduler, clock) = scheduler_with_clock();
        let thinks = Rc::new(Cell::new(0u32));
        let updates = Rc::new(Cell::new(0u32));

        let t = Rc::clone(&thinks);
        scheduler
            .think_mut()
            .add(DeferredCommand::new(move || t.set(t.get() + 1)));
        let u = Rc::clone(&updates);
        scheduler
            .update_mut()
            .add(DeferredCommand::new(move || u.set(u.get() + 1)));

        clock.advance(0.01);
        let report = scheduler.tick();
        assert_eq!(report.think.processed, 1);
        assert_eq!(report.update.processed, 1);
        assert_eq!(thinks.get(), 1);
        assert_eq!(updates.get(), 1);
    }

    #[test]
    fn test_lanes_carry_configured_budgets() {
        let config = SchedulerConfig {
            think_budget_ms: 0.3,
            update_budget_ms: 2.0,
            seed: 1,
        };
        let scheduler = Scheduler::new(&config);
        assert_eq!(scheduler.think().max_processing_time_ms(), 0.3);
        assert_eq!(scheduler.update().max_processing_time_ms(), 2.0);
        assert_eq!(scheduler.think().name(), "think");
        assert_eq!(scheduler.update().name(), "update");
    }

    #[test]
    fn test_tick_with_empty_lanes_is_noop() {
        let (mut scheduler, _clock) = scheduler_with_clock();
        let report = scheduler.tick();
        assert_eq!(report.think.processed, 0);
        assert_eq!(report.update.processed, 0);
    }
}
