//! Deferred Commands
//!
//! A [`DeferredCommand`] is the unit of scheduled work: a payload closure
//! plus jittered initial and repeat delay windows. Jitter spreads many
//! agents' cycles across frames instead of letting them all fire on the
//! same tick. Delay sampling always goes through an explicitly provided
//! RNG so scheduling stays reproducible.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scheduling construction failures.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A command was built with nothing to run.
    #[error("deferred command built without a payload")]
    MissingPayload,
}

/// Uniform delay window in seconds. `min` is clamped to >= 0 and `max` to
/// >= `min` at every construction point, including deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "DelayRangeDef")]
pub struct DelayRange {
    min: f64,
    max: f64,
}

impl DelayRange {
    pub fn new(min: f64, max: f64) -> Self {
        let min = min.max(0.0);
        Self {
            min,
            max: max.max(min),
        }
    }

    /// A window of zero width.
    pub fn fixed(seconds: f64) -> Self {
        Self::new(seconds, seconds)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Draws a delay uniformly from the window.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.max - self.min <= f64::EPSILON {
            self.min
        } else {
            rng.gen_range(self.min..self.max)
        }
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self { min: 0.0, max: 0.0 }
    }
}

#[derive(Deserialize)]
struct DelayRangeDef {
    #[serde(default)]
    min: f64,
    #[serde(default)]
    max: f64,
}

impl From<DelayRangeDef> for DelayRange {
    fn from(def: DelayRangeDef) -> Self {
        DelayRange::new(def.min, def.max)
    }
}

/// Payload run when a command comes due.
pub type CommandFn = Box<dyn FnMut()>;

/// Executable unit with randomized initial and repeat delay windows.
pub struct DeferredCommand {
    run: CommandFn,
    repeating: bool,
    init_delay: DelayRange,
    delay: DelayRange,
    executions: u64,
}

impl DeferredCommand {
    /// Repeating command with zero delays; use [`DeferredCommand::builder`]
    /// for anything fancier.
    pub fn new(run: impl FnMut() + 'static) -> Self {
        Self {
            run: Box::new(run),
            repeating: true,
            init_delay: DelayRange::default(),
            delay: DelayRange::default(),
            executions: 0,
        }
    }

    pub fn builder() -> DeferredCommandBuilder {
        DeferredCommandBuilder::new()
    }

    /// Invokes the payload and advances the execution counter.
    pub fn execute(&mut self) {
        (self.run)();
        self.executions += 1;
    }

    pub fn executions(&self) -> u64 {
        self.executions
    }

    pub fn is_repeating(&self) -> bool {
        self.repeating
    }

    pub fn set_repeating(&mut self, repeating: bool) {
        self.repeating = repeating;
    }

    /// First-run jitter window.
    pub fn init_delay(&self) -> DelayRange {
        self.init_delay
    }

    /// Repeat jitter window.
    pub fn delay(&self) -> DelayRange {
        self.delay
    }
}

impl fmt::Debug for DeferredCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredCommand")
            .field("repeating", &self.repeating)
            .field("init_delay", &self.init_delay)
            .field("delay", &self.delay)
            .field("executions", &self.executions)
            .finish()
    }
}

/// Builder for [`DeferredCommand`]; `build` fails without a payload.
pub struct DeferredCommandBuilder {
    run: Option<CommandFn>,
    repeating: bool,
    init_delay: DelayRange,
    delay: DelayRange,
}

impl Default for DeferredCommandBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DeferredCommandBuilder {
    pub fn new() -> Self {
        Self {
            run: None,
            repeating: true,
            init_delay: DelayRange::default(),
            delay: DelayRange::default(),
        }
    }

    pub fn payload(mut self, run: impl FnMut() + 'static) -> Self {
        self.run = Some(Box::new(run));
        self
    }

    pub fn repeating(mut self, repeating: bool) -> Self {
        self.repeating = repeating;
        self
    }

    pub fn one_shot(self) -> Self {
        self.repeating(false)
    }

    pub fn init_delay(mut self, range: DelayRange) -> Self {
        self.init_delay = range;
        self
    }

    pub fn delay(mut self, range: DelayRange) -> Self {
        self.delay = range;
        self
    }

    pub fn build(self) -> Result<DeferredCommand, SchedulerError> {
        let run = self.run.ok_or(SchedulerError::MissingPayload)?;
        Ok(DeferredCommand {
            run,
            repeating: self.repeating,
            init_delay: self.init_delay,
            delay: self.delay,
            executions: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_delay_range_clamps_negative_min() {
        let range = DelayRange::new(-1.0, 2.0);
        assert_eq!(range.min(), 0.0);
        assert_eq!(range.max(), 2.0);
    }

    #[test]
    fn test_delay_range_clamps_max_below_min() {
        let range = DelayRange::new(3.0, 1.0);
        assert_eq!(range.min(), 3.0);
        assert_eq!(range.max(), 3.0);
    }

    #[test]
    fn test_sample_within_window() {
        let mut rng = SmallRng::seed_from_u64(42);
        let range = DelayRange::new(0.5, 1.5);
        for _ in 0..100 {
            let d = range.sample(&mut rng);
            assert!((0.5..1.5).contains(&d));
        }
    }

    #[test]
    fn test_fixed_window_samples_exactly() {
        let mut rng = SmallRng::seed_from_u64(42);
        let range = DelayRange::fixed(0.25);
        assert_eq!(range.sample(&mut rng), 0.25);
    }

    #[test]
    fn test_deserialization_clamps() {
        let range: DelayRange = serde_json::from_str(r#"{"min": 5.0, "max": 1.0}"#).unwrap();
        assert_eq!(range.min(), 5.0);
        assert_eq!(range.max(), 5.0);
    }

    #[test]
    fn test_execute_increments_counter() {
        let hits = Rc::new(Cell::new(0));
        let hits_in = Rc::clone(&hits);
        let mut command = DeferredCommand::new(move || hits_in.set(hits_in.get() + 1));
        assert_eq!(command.executions(), 0);
        command.execute();
        command.execute();
        assert_eq!(command.executions(), 2);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_builder_requires_payload() {
        let err = DeferredCommand::builder().one_shot().build().unwrap_err();
        assert!(matches!(err, SchedulerError::MissingPayload));
    }

    #[test]
    fn test_builder_defaults_to_repeating() {
        let command = DeferredCommand::builder().payload(|| {}).build().unwrap();
        assert!(command.is_repeating());
    }
}
