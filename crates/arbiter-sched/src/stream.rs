//! Command Streams
//!
//! A [`CommandStream`] owns an indexed priority queue of deferred commands
//! keyed by next-execution time and drains due commands under a wall-clock
//! budget per call. Bounding time instead of item count gives a
//! predictable per-tick cost regardless of queue size; overload shows up
//! as a growing extra-time counter and deferred execution, never as a
//! dropped command or an error.

use std::fmt;
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::clock::{Clock, MonotonicClock};
use crate::command::DeferredCommand;
use crate::queue::{IndexedPriorityQueue, QueueHandle};

/// Smallest allowed per-call budget in milliseconds.
const MIN_BUDGET_MS: f64 = 0.1;

/// Seconds added to every reschedule so zero-delay repeaters cannot starve
/// a single process call.
const MIN_REPEAT_DELAY: f64 = 1e-3;

/// Stable, generation-checked handle to a command owned by a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId {
    index: u32,
    generation: u32,
}

struct QueuedCommand {
    command: DeferredCommand,
    /// Time of the previous execution; while paused this instead stashes
    /// the time that was remaining at the pause.
    last_execution: f64,
    next_execution: f64,
    /// The delay that was sampled when `next_execution` was set.
    scheduled_delay: f64,
    active: bool,
    queue_handle: Option<QueueHandle>,
}

struct CommandSlot {
    generation: u32,
    entry: Option<QueuedCommand>,
}

/// Counters accumulated across all process calls.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StreamMetrics {
    pub processed_count: u64,
    pub total_milliseconds: f64,
    /// How far behind schedule executed commands were, in milliseconds.
    /// Diagnostic only; growth under load is the backpressure signal.
    pub extra_time_needed_ms: f64,
}

/// Outcome of a single process call.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StreamReport {
    pub processed: u32,
    pub elapsed_ms: f64,
    pub extra_time_needed_ms: f64,
}

/// Time-budgeted processor of deferred commands.
pub struct CommandStream {
    name: String,
    queue: IndexedPriorityQueue<CommandId>,
    commands: Vec<CommandSlot>,
    free: Vec<u32>,
    clock: Rc<dyn Clock>,
    rng: SmallRng,
    max_processing_time_ms: f64,
    metrics: StreamMetrics,
}

impl CommandStream {
    pub fn new(name: impl Into<String>, budget_ms: f64, seed: u64) -> Self {
        Self::with_clock(name, budget_ms, seed, Rc::new(MonotonicClock::new()))
    }

    pub fn with_clock(
        name: impl Into<String>,
        budget_ms: f64,
        seed: u64,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            name: name.into(),
            queue: IndexedPriorityQueue::new(),
            commands: Vec::new(),
            free: Vec::new(),
            clock,
            rng: SmallRng::seed_from_u64(seed),
            max_processing_time_ms: budget_ms.max(MIN_BUDGET_MS),
            metrics: StreamMetrics::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_processing_time_ms(&self) -> f64 {
        self.max_processing_time_ms
    }

    pub fn set_max_processing_time_ms(&mut self, budget_ms: f64) {
        self.max_processing_time_ms = budget_ms.max(MIN_BUDGET_MS);
    }

    /// Number of commands currently queued for execution.
    pub fn commands_count(&self) -> usize {
        self.queue.len()
    }

    pub fn metrics(&self) -> StreamMetrics {
        self.metrics
    }

    /// Schedules a command. Its first run lands at now plus a freshly
    /// sampled initial delay.
    pub fn add(&mut self, command: DeferredCommand) -> CommandId {
        let now = self.clock.now();
        let delay = command.init_delay().sample(&mut self.rng);
        let index = match self.free.pop() {
            Some(i) => i,
            None => {
                self.commands.push(CommandSlot {
                    generation: 0,
                    entry: None,
                });
                (self.commands.len() - 1) as u32
            }
        };
        let id = CommandId {
            index,
            generation: self.commands[index as usize].generation,
        };
        let next = now + delay;
        let handle = self.queue.push(id, next);
        self.commands[index as usize].entry = Some(QueuedCommand {
            command,
            last_execution: now,
            next_execution: next,
            scheduled_delay: delay,
            active: true,
            queue_handle: Some(handle),
        });
        tracing::debug!("stream '{}': scheduled command in {:.4}s", self.name, delay);
        id
    }

    /// Permanently removes a command, returning it. Stale ids yield `None`.
    pub fn remove(&mut self, id: CommandId) -> Option<DeferredCommand> {
        let i = self.entry_index(id)?;
        let slot = &mut self.commands[i];
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        if let Some(handle) = entry.queue_handle {
            self.queue.remove(handle);
        }
        Some(entry.command)
    }

    pub fn is_active(&self, id: CommandId) -> bool {
        self.entry_index(id)
            .and_then(|i| self.commands[i].entry.as_ref())
            .map_or(false, |e| e.active)
    }

    /// Deactivation pulls the command off the heap; reactivation re-enqueues
    /// it at now plus a freshly sampled repeat delay. Returns `false` on a
    /// stale id.
    pub fn set_active(&mut self, id: CommandId, active: bool) -> bool {
        let Some(i) = self.entry_index(id) else {
            tracing::warn!("stream '{}': set_active on stale command id", self.name);
            return false;
        };
        let entry = match self.commands[i].entry.as_mut() {
            Some(e) => e,
            None => return false,
        };
        if entry.active == active {
            return true;
        }
        if active {
            let now = self.clock.now();
            let delay = entry.command.delay().sample(&mut self.rng);
            entry.last_execution = now;
            entry.scheduled_delay = delay;
            entry.next_execution = now + delay;
            entry.active = true;
            let next = entry.next_execution;
            entry.queue_handle = Some(self.queue.push(id, next));
        } else {
            entry.active = false;
            if let Some(handle) = entry.queue_handle.take() {
                self.queue.remove(handle);
            }
        }
        true
    }

    /// Parks the command at +infinity, stashing the time remaining in the
    /// last-execution field. Returns `false` if the command is not
    /// currently queued.
    pub fn pause(&mut self, id: CommandId) -> bool {
        let Some(i) = self.entry_index(id) else {
            return false;
        };
        let now = self.clock.now();
        let entry = match self.commands[i].entry.as_mut() {
            Some(e) if e.active && e.queue_handle.is_some() => e,
            _ => return false,
        };
        entry.last_execution = entry.next_execution - now;
        entry.next_execution = f64::INFINITY;
        let handle = entry.queue_handle.expect("checked above");
        self.queue.update_priority(handle, f64::INFINITY)
    }

    /// Reschedules a paused command from now plus a freshly sampled repeat
    /// delay. The remainder stashed at pause time is discarded; resume
    /// restarts the wait from scratch.
    pub fn resume(&mut self, id: CommandId) -> bool {
        let Some(i) = self.entry_index(id) else {
            return false;
        };
        let now = self.clock.now();
        let delay = {
            let entry = match self.commands[i].entry.as_ref() {
                Some(e) if e.active && e.queue_handle.is_some() => e,
                _ => return false,
            };
            entry.command.delay()
        }
        .sample(&mut self.rng);
        let entry = self.commands[i]
            .entry
            .as_mut()
            .expect("entry checked above");
        entry.last_execution = now;
        entry.scheduled_delay = delay;
        entry.next_execution = now + delay;
        let handle = entry.queue_handle.expect("checked above");
        let next = entry.next_execution;
        self.queue.update_priority(handle, next)
    }

    /// Drains due commands until none remain due or the wall-clock budget
    /// is spent. The budget is checked between executions only, so a call
    /// can overrun by at most the cost of one command.
    pub fn process(&mut self) -> StreamReport {
        let frame_begin = self.clock.now();
        let mut report = StreamReport::default();

        loop {
            let due = match self.queue.peek() {
                Some((&id, next)) if next <= frame_begin => id,
                _ => break,
            };
            self.queue.pop();

            let i = due.index as usize;
            let Some(entry) = self.commands[i].entry.as_mut() else {
                continue;
            };
            entry.queue_handle = None;

            let overdue_ms =
                ((frame_begin - entry.last_execution) - entry.scheduled_delay) * 1000.0;
            report.extra_time_needed_ms += overdue_ms;

            entry.command.execute();
            report.processed += 1;

            if entry.command.is_repeating() {
                let delay = entry.command.delay().sample(&mut self.rng);
                entry.last_execution = frame_begin;
                entry.scheduled_delay = delay;
                entry.next_execution = frame_begin + delay + MIN_REPEAT_DELAY;
                let next = entry.next_execution;
                entry.queue_handle = Some(self.queue.push(due, next));
            } else {
                entry.active = false;
            }

            let elapsed_ms = (self.clock.now() - frame_begin) * 1000.0;
            if elapsed_ms >= self.max_processing_time_ms {
                tracing::trace!(
                    "stream '{}': budget spent after {} commands",
                    self.name,
                    report.processed
                );
                break;
            }
        }

        report.elapsed_ms = (self.clock.now() - frame_begin) * 1000.0;
        self.metrics.processed_count += u64::from(report.processed);
        self.metrics.total_milliseconds += report.elapsed_ms;
        self.metrics.extra_time_needed_ms += report.extra_time_needed_ms;
        report
    }

    fn entry_index(&self, id: CommandId) -> Option<usize> {
        let i = id.index as usize;
        match self.commands.get(i) {
            Some(slot) if slot.generation == id.generation && slot.entry.is_some() => Some(i),
            _ => None,
        }
    }
}

impl fmt::Debug for CommandStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandStream")
            .field("name", &self.name)
            .field("commands", &self.queue.len())
            .field("budget_ms", &self.max_processing_time_ms)
            .finish()
    }
}
