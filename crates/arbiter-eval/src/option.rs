//! Action Options
//!
//! An [`ActionOption`] binds a composite consideration to one executable
//! [`Action`]. While the bound action is cooling down the option's utility
//! is forced to zero, so an option whose action cannot run never wins
//! selection regardless of how its considerations score.

use std::fmt;

use crate::consideration::Consideration;
use crate::measure::Measure;
use crate::registry::{DecisionRegistry, RegistryError};
use crate::utility::Utility;

/// Executable unit chosen by a behaviour.
pub trait Action<C> {
    /// True while the action is unable to run.
    fn in_cooldown(&self) -> bool {
        false
    }

    /// Runs the action against the agent context.
    fn execute(&mut self, ctx: &mut C);

    fn clone_boxed(&self) -> Box<dyn Action<C>>;
}

impl<C> Clone for Box<dyn Action<C>> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// A composite consideration bound to at most one action.
pub struct ActionOption<C> {
    consideration: Consideration<C>,
    action: Option<Box<dyn Action<C>>>,
}

impl<C> ActionOption<C> {
    pub fn new(name: impl Into<String>, weight: f32, measure: Measure) -> Self {
        Self {
            consideration: Consideration::composite(name, weight, measure),
            action: None,
        }
    }

    pub fn name(&self) -> &str {
        self.consideration.name()
    }

    pub fn weight(&self) -> f32 {
        self.consideration.weight()
    }

    pub fn set_default_utility(&mut self, utility: Utility) {
        self.consideration.set_default_utility(utility);
    }

    /// Adds a child consideration; same rules as
    /// [`Consideration::add_child`].
    pub fn add_consideration(&mut self, child: Consideration<C>) -> bool {
        self.consideration.add_child(child)
    }

    /// Binds an action directly.
    pub fn set_action(&mut self, action: Box<dyn Action<C>>) {
        self.action = Some(action);
    }

    /// Binds an action by name through the registry.
    pub fn set_action_named(
        &mut self,
        registry: &DecisionRegistry<C>,
        name: &str,
    ) -> Result<(), RegistryError> {
        self.action = Some(registry.create_action(name)?);
        Ok(())
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub fn action_mut(&mut self) -> Option<&mut Box<dyn Action<C>>> {
        self.action.as_mut()
    }

    pub fn utility(&self) -> Utility {
        self.consideration.utility()
    }

    /// Recomputes the option's utility. Children always refresh their
    /// caches; a cooling-down action then forces the option's own score to
    /// (0, weight) so it cannot win selection.
    pub fn consider(&mut self, ctx: &C) {
        self.consideration.consider(ctx);
        if self.action.as_ref().map_or(false, |a| a.in_cooldown()) {
            self.consideration
                .set_utility(Utility::new(0.0, self.consideration.weight()));
        }
    }
}

impl<C> Clone for ActionOption<C> {
    fn clone(&self) -> Self {
        Self {
            consideration: self.consideration.clone(),
            action: self.action.clone(),
        }
    }
}

impl<C> fmt::Debug for ActionOption<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionOption")
            .field("name", &self.name())
            .field("utility", &self.utility())
            .field("has_action", &self.has_action())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    struct Ctx;

    #[derive(Clone)]
    struct TestAction {
        cooling: Rc<Cell<bool>>,
        runs: Rc<Cell<u32>>,
    }

    impl TestAction {
        fn new() -> Self {
            Self {
                cooling: Rc::new(Cell::new(false)),
                runs: Rc::new(Cell::new(0)),
            }
        }
    }

    impl Action<Ctx> for TestAction {
        fn in_cooldown(&self) -> bool {
            self.cooling.get()
        }

        fn execute(&mut self, _ctx: &mut Ctx) {
            self.runs.set(self.runs.get() + 1);
        }

        fn clone_boxed(&self) -> Box<dyn Action<Ctx>> {
            Box::new(self.clone())
        }
    }

    fn scored_option(score: f32) -> ActionOption<Ctx> {
        let mut option = ActionOption::new("opt", 1.0, Measure::Chebyshev);
        option.add_consideration(Consideration::leaf(
            "fixed",
            1.0,
            Arc::new(move |_: &Ctx| score),
        ));
        option
    }

    #[test]
    fn test_consider_scores_from_children() {
        let mut option = scored_option(0.6);
        option.consider(&Ctx);
        assert!((option.utility().value() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_cooldown_forces_zero_utility() {
        let mut option = scored_option(0.9);
        let action = TestAction::new();
        action.cooling.set(true);
        option.set_action(Box::new(action));

        option.consider(&Ctx);
        assert_eq!(option.utility().value(), 0.0);
        assert_eq!(option.utility().weight(), 1.0);
    }

    #[test]
    fn test_cooldown_clears_when_action_ready() {
        let mut option = scored_option(0.9);
        let action = TestAction::new();
        let cooling = Rc::clone(&action.cooling);
        option.set_action(Box::new(action));

        cooling.set(true);
        option.consider(&Ctx);
        assert_eq!(option.utility().value(), 0.0);

        cooling.set(false);
        option.consider(&Ctx);
        assert!((option.utility().value() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_action_nullable_until_set() {
        let mut option = scored_option(0.5);
        assert!(!option.has_action());
        assert!(option.action_mut().is_none());
        option.set_action(Box::new(TestAction::new()));
        assert!(option.has_action());
    }
}
