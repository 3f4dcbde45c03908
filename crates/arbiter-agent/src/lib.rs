//! Glue between the decision engine and the scheduler.
//!
//! An [`AiAgent`] pairs an instantiated behaviour with the caller's
//! context value; one think cycle selects an action and executes it
//! against that context. [`spawn_agent`] turns the cycle into a repeating
//! deferred command on the scheduler's think lane, so many agents share
//! the lane's per-tick budget. Actions that need follow-up work enqueue it
//! on the update lane themselves.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use arbiter_eval::Behaviour;
use arbiter_sched::{CommandId, DeferredCommand, DelayRange, Scheduler, SchedulerError};

/// Delay tuning for a spawned agent's think cycle, in seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentScheduleConfig {
    /// First-think jitter window.
    pub init_delay_min: f64,
    pub init_delay_max: f64,
    /// Between-thinks jitter window.
    pub think_delay_min: f64,
    pub think_delay_max: f64,
}

impl Default for AgentScheduleConfig {
    fn default() -> Self {
        // First think within a quarter second, then roughly 10 Hz with
        // jitter so cohorts of agents drift apart.
        Self {
            init_delay_min: 0.0,
            init_delay_max: 0.25,
            think_delay_min: 0.05,
            think_delay_max: 0.15,
        }
    }
}

impl AgentScheduleConfig {
    pub fn init_delay(&self) -> DelayRange {
        DelayRange::new(self.init_delay_min, self.init_delay_max)
    }

    pub fn think_delay(&self) -> DelayRange {
        DelayRange::new(self.think_delay_min, self.think_delay_max)
    }
}

/// A behaviour instance bound to its agent's context.
pub struct AiAgent<C> {
    behaviour: Behaviour<C>,
    context: C,
}

impl<C> AiAgent<C> {
    pub fn new(behaviour: Behaviour<C>, context: C) -> Self {
        Self { behaviour, context }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn behaviour(&self) -> &Behaviour<C> {
        &self.behaviour
    }

    /// Runs one think cycle: select an action against the current context
    /// and execute it. Returns true when an action ran.
    pub fn think(&mut self) -> bool {
        match self.behaviour.select(&self.context) {
            Some(action) => {
                action.execute(&mut self.context);
                true
            }
            None => false,
        }
    }
}

/// Registers a repeating think cycle for `agent` on the scheduler's think
/// lane. The command owns the agent; share state with it through the
/// context. The returned id drives pause/resume and deactivation.
pub fn spawn_agent<C: 'static>(
    scheduler: &mut Scheduler,
    mut agent: AiAgent<C>,
    config: &AgentScheduleConfig,
) -> Result<CommandId, SchedulerError> {
    let command = DeferredCommand::builder()
        .payload(move || {
            agent.think();
        })
        .init_delay(config.init_delay())
        .delay(config.think_delay())
        .build()?;
    let id = scheduler.think_mut().add(command);
    tracing::debug!("spawned agent think cycle {:?}", id);
    Ok(id)
}

/// Like [`spawn_agent`] but keeps the agent externally reachable behind an
/// `Rc<RefCell<...>>`, for callers that inspect or mutate agents between
/// ticks.
pub fn spawn_shared_agent<C: 'static>(
    scheduler: &mut Scheduler,
    agent: Rc<RefCell<AiAgent<C>>>,
    config: &AgentScheduleConfig,
) -> Result<CommandId, SchedulerError> {
    let command = DeferredCommand::builder()
        .payload(move || {
            agent.borrow_mut().think();
        })
        .init_delay(config.init_delay())
        .delay(config.think_delay())
        .build()?;
    Ok(scheduler.think_mut().add(command))
}
