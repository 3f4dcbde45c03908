//! Behaviours
//!
//! A [`Behaviour`] owns an ordered list of [`ActionOption`]s and one
//! [`Selector`]. Selecting recomputes every option's utility into a
//! parallel cache, feeds that vector to the selector, and resolves to the
//! chosen option's action. The behaviour is itself a composite scorer: its
//! own utility is the measure over the option cache, which lets behaviours
//! nest under a higher-level chooser.

use std::fmt;

use crate::measure::Measure;
use crate::option::{Action, ActionOption};
use crate::selector::Selector;
use crate::utility::Utility;

pub struct Behaviour<C> {
    name: String,
    weight: f32,
    measure: Measure,
    selector: Selector,
    options: Vec<ActionOption<C>>,
    /// Per-option utilities recomputed on every selection.
    utilities: Vec<Utility>,
    utility: Utility,
}

impl<C> Behaviour<C> {
    pub fn new(name: impl Into<String>, weight: f32, measure: Measure, selector: Selector) -> Self {
        Self {
            name: name.into(),
            weight: weight.clamp(0.0, 1.0),
            measure,
            selector,
            options: Vec::new(),
            utilities: Vec::new(),
            utility: Utility::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn utility(&self) -> Utility {
        self.utility
    }

    pub fn options(&self) -> &[ActionOption<C>] {
        &self.options
    }

    pub fn options_count(&self) -> usize {
        self.options.len()
    }

    /// Adds an option. Returns `false` when a non-anonymous option of the
    /// same name is already present.
    pub fn add_option(&mut self, option: ActionOption<C>) -> bool {
        if !option.name().is_empty() && self.options.iter().any(|o| o.name() == option.name()) {
            tracing::warn!("rejected duplicate option '{}' on behaviour '{}'", option.name(), self.name);
            return false;
        }
        self.options.push(option);
        true
    }

    /// Recomputes every option's utility and the behaviour's own score.
    pub fn consider(&mut self, ctx: &C) {
        self.utilities.clear();
        for option in self.options.iter_mut() {
            option.consider(ctx);
            self.utilities.push(option.utility());
        }
        let value = self.measure.calculate(&self.utilities);
        self.utility = Utility::new(value, self.weight);
    }

    /// Recomputes all options and returns the index the selector chose.
    pub fn select_index(&mut self, ctx: &C) -> Option<usize> {
        self.consider(ctx);
        self.selector.select(&self.utilities)
    }

    /// Recomputes all options and returns the chosen option's action.
    /// `None` when there are no options, the selector declines, or the
    /// winning option has no bound action.
    pub fn select<'a>(&'a mut self, ctx: &C) -> Option<&'a mut Box<dyn Action<C>>> {
        let idx = self.select_index(ctx)?;
        self.options.get_mut(idx).and_then(ActionOption::action_mut)
    }
}

impl<C> Clone for Behaviour<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            weight: self.weight,
            measure: self.measure,
            selector: self.selector.clone(),
            options: self.options.clone(),
            utilities: self.utilities.clone(),
            utility: self.utility,
        }
    }
}

impl<C> fmt::Debug for Behaviour<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behaviour")
            .field("name", &self.name)
            .field("options", &self.options.len())
            .field("utility", &self.utility)
            .finish()
    }
}
