//! Cooperative, time-budgeted scheduling for many agents.
//!
//! Deferred commands with jittered delays sit in an indexed priority queue
//! keyed by next-execution time; a command stream drains due commands
//! under a wall-clock budget per call, and the scheduler runs two such
//! lanes ("think" and "update") per tick. Everything is synchronous and
//! single-threaded: overload defers work to later calls instead of
//! dropping it or blocking.

pub mod clock;
pub mod command;
pub mod config;
pub mod queue;
pub mod scheduler;
pub mod stream;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use command::{
    CommandFn, DeferredCommand, DeferredCommandBuilder, DelayRange, SchedulerError,
};
pub use config::{ConfigError, SchedulerConfig};
pub use queue::{IndexedPriorityQueue, QueueHandle, SharedIndexedPriorityQueue};
pub use scheduler::{Scheduler, TickReport};
pub use stream::{CommandId, CommandStream, StreamMetrics, StreamReport};
