//! Decision Registry
//!
//! Name-keyed tables of appraisals, action prototypes, and node configs.
//! Registration fails fast on duplicate or empty names; instantiation
//! builds fresh runtime nodes from configs, so every created tree owns
//! independent mutable state. The scoring tree itself never sees registry
//! internals, only the instantiated nodes.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::behaviour::Behaviour;
use crate::config::{
    BehaviourConfig, ConsiderationConfig, ConsiderationKind, ConsiderationRef, OptionConfig,
    OptionRef,
};
use crate::consideration::{Appraisal, Consideration};
use crate::option::{Action, ActionOption};
use crate::selector::Selector;

/// Errors raised at registration or instantiation time.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("'{0}' is already registered")]
    Duplicate(String),
    #[error("registered entries need a non-empty name")]
    AnonymousName,
    #[error("no appraisal registered under '{0}'")]
    UnknownAppraisal(String),
    #[error("no action registered under '{0}'")]
    UnknownAction(String),
    #[error("no consideration registered under '{0}'")]
    UnknownConsideration(String),
    #[error("no option registered under '{0}'")]
    UnknownOption(String),
    #[error("no behaviour registered under '{0}'")]
    UnknownBehaviour(String),
    #[error("duplicate child '{0}' while instantiating")]
    DuplicateChild(String),
}

/// All named templates available to agents over context type `C`.
pub struct DecisionRegistry<C> {
    appraisals: HashMap<String, Appraisal<C>>,
    actions: HashMap<String, Box<dyn Action<C>>>,
    considerations: HashMap<String, ConsiderationConfig>,
    options: HashMap<String, OptionConfig>,
    behaviours: HashMap<String, BehaviourConfig>,
}

impl<C> Default for DecisionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> DecisionRegistry<C> {
    pub fn new() -> Self {
        Self {
            appraisals: HashMap::new(),
            actions: HashMap::new(),
            considerations: HashMap::new(),
            options: HashMap::new(),
            behaviours: HashMap::new(),
        }
    }

    fn check_name(name: &str) -> Result<(), RegistryError> {
        if name.is_empty() {
            Err(RegistryError::AnonymousName)
        } else {
            Ok(())
        }
    }

    pub fn register_appraisal(
        &mut self,
        name: impl Into<String>,
        appraisal: impl Fn(&C) -> f32 + 'static,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        Self::check_name(&name)?;
        if self.appraisals.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.appraisals.insert(name, Arc::new(appraisal));
        Ok(())
    }

    pub fn register_action(
        &mut self,
        name: impl Into<String>,
        action: Box<dyn Action<C>>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        Self::check_name(&name)?;
        if self.actions.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.actions.insert(name, action);
        Ok(())
    }

    pub fn register_consideration(
        &mut self,
        config: ConsiderationConfig,
    ) -> Result<(), RegistryError> {
        Self::check_name(&config.name)?;
        if self.considerations.contains_key(&config.name) {
            return Err(RegistryError::Duplicate(config.name));
        }
        self.considerations.insert(config.name.clone(), config);
        Ok(())
    }

    pub fn register_option(&mut self, config: OptionConfig) -> Result<(), RegistryError> {
        Self::check_name(&config.name)?;
        if self.options.contains_key(&config.name) {
            return Err(RegistryError::Duplicate(config.name));
        }
        self.options.insert(config.name.clone(), config);
        Ok(())
    }

    pub fn register_behaviour(&mut self, config: BehaviourConfig) -> Result<(), RegistryError> {
        Self::check_name(&config.name)?;
        if self.behaviours.contains_key(&config.name) {
            return Err(RegistryError::Duplicate(config.name));
        }
        self.behaviours.insert(config.name.clone(), config);
        Ok(())
    }

    pub fn contains_appraisal(&self, name: &str) -> bool {
        self.appraisals.contains_key(name)
    }

    pub fn contains_action(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn contains_consideration(&self, name: &str) -> bool {
        self.considerations.contains_key(name)
    }

    pub fn contains_option(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn contains_behaviour(&self, name: &str) -> bool {
        self.behaviours.contains_key(name)
    }

    /// Fresh clone of a registered action prototype.
    pub fn create_action(&self, name: &str) -> Result<Box<dyn Action<C>>, RegistryError> {
        self.actions
            .get(name)
            .map(|a| a.clone_boxed())
            .ok_or_else(|| RegistryError::UnknownAction(name.to_string()))
    }

    /// Instantiates the named consideration template.
    pub fn create_consideration(&self, name: &str) -> Result<Consideration<C>, RegistryError> {
        let config = self
            .considerations
            .get(name)
            .ok_or_else(|| RegistryError::UnknownConsideration(name.to_string()))?;
        self.instantiate_consideration(config)
    }

    /// Instantiates the named option template.
    pub fn create_option(&self, name: &str) -> Result<ActionOption<C>, RegistryError> {
        let config = self
            .options
            .get(name)
            .ok_or_else(|| RegistryError::UnknownOption(name.to_string()))?;
        self.instantiate_option(config)
    }

    /// Instantiates the named behaviour template.
    pub fn create_behaviour(&self, name: &str) -> Result<Behaviour<C>, RegistryError> {
        let config = self
            .behaviours
            .get(name)
            .ok_or_else(|| RegistryError::UnknownBehaviour(name.to_string()))?;
        self.instantiate_behaviour(config)
    }

    /// Builds a fresh runtime node from a config, resolving named
    /// references through this registry.
    pub fn instantiate_consideration(
        &self,
        config: &ConsiderationConfig,
    ) -> Result<Consideration<C>, RegistryError> {
        let mut node = match &config.kind {
            ConsiderationKind::Leaf { appraisal } => {
                let f = self
                    .appraisals
                    .get(appraisal)
                    .ok_or_else(|| RegistryError::UnknownAppraisal(appraisal.clone()))?;
                Consideration::leaf(&config.name, config.weight, Arc::clone(f))
            }
            ConsiderationKind::Composite { measure, children } => {
                let mut node = Consideration::composite(&config.name, config.weight, *measure);
                for child_ref in children {
                    let child = self.resolve_consideration(child_ref)?;
                    let child_name = child.name().to_string();
                    if !node.add_child(child) {
                        return Err(RegistryError::DuplicateChild(child_name));
                    }
                }
                node
            }
        };
        node.set_default_utility(config.default_utility);
        Ok(node)
    }

    pub fn instantiate_option(
        &self,
        config: &OptionConfig,
    ) -> Result<ActionOption<C>, RegistryError> {
        let mut option = ActionOption::new(&config.name, config.weight, config.measure);
        option.set_default_utility(config.default_utility);
        for child_ref in &config.considerations {
            let child = self.resolve_consideration(child_ref)?;
            let child_name = child.name().to_string();
            if !option.add_consideration(child) {
                return Err(RegistryError::DuplicateChild(child_name));
            }
        }
        if let Some(action_name) = &config.action {
            option.set_action_named(self, action_name)?;
        }
        Ok(option)
    }

    pub fn instantiate_behaviour(
        &self,
        config: &BehaviourConfig,
    ) -> Result<Behaviour<C>, RegistryError> {
        let selector = Selector::from_config(&config.selector);
        let mut behaviour =
            Behaviour::new(&config.name, config.weight, config.measure, selector);
        for option_ref in &config.options {
            let option = match option_ref {
                OptionRef::Named(name) => self.create_option(name)?,
                OptionRef::Inline(inline) => self.instantiate_option(inline)?,
            };
            let option_name = option.name().to_string();
            if !behaviour.add_option(option) {
                return Err(RegistryError::DuplicateChild(option_name));
            }
        }
        tracing::debug!(
            "instantiated behaviour '{}' with {} options",
            behaviour.name(),
            behaviour.options_count()
        );
        Ok(behaviour)
    }

    fn resolve_consideration(
        &self,
        child_ref: &ConsiderationRef,
    ) -> Result<Consideration<C>, RegistryError> {
        match child_ref {
            ConsiderationRef::Named(name) => self.create_consideration(name),
            ConsiderationRef::Inline(inline) => self.instantiate_consideration(inline),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConsiderationRef, OptionRef};
    use crate::measure::Measure;
    use crate::selector::SelectorConfig;
    use crate::utility::Utility;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Ctx {
        hunger: f32,
    }

    #[derive(Clone)]
    struct CountingAction {
        runs: Rc<Cell<u32>>,
    }

    impl Action<Ctx> for CountingAction {
        fn execute(&mut self, _ctx: &mut Ctx) {
            self.runs.set(self.runs.get() + 1);
        }

        fn clone_boxed(&self) -> Box<dyn Action<Ctx>> {
            Box::new(self.clone())
        }
    }

    fn registry_with_basics() -> (DecisionRegistry<Ctx>, Rc<Cell<u32>>) {
        let mut registry = DecisionRegistry::new();
        registry
            .register_appraisal("hunger_level", |c: &Ctx| c.hunger)
            .unwrap();
        let runs = Rc::new(Cell::new(0));
        registry
            .register_action("eat", Box::new(CountingAction { runs: Rc::clone(&runs) }))
            .unwrap();
        (registry, runs)
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let (mut registry, _) = registry_with_basics();
        let err = registry
            .register_appraisal("hunger_level", |_: &Ctx| 0.0)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Duplicate(_)));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry: DecisionRegistry<Ctx> = DecisionRegistry::new();
        let err = registry.register_appraisal("", |_: &Ctx| 0.0).unwrap_err();
        assert!(matches!(err, RegistryError::AnonymousName));
    }

    #[test]
    fn test_unknown_appraisal_fails_instantiation() {
        let registry: DecisionRegistry<Ctx> = DecisionRegistry::new();
        let config = ConsiderationConfig::leaf("x", 1.0, "missing");
        let err = registry.instantiate_consideration(&config).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownAppraisal(_)));
    }

    #[test]
    fn test_unknown_action_fails_instantiation() {
        let (registry, _) = registry_with_basics();
        let config = OptionConfig {
            name: "opt".into(),
            weight: 1.0,
            default_utility: Utility::default(),
            measure: Measure::Chebyshev,
            considerations: vec![ConsiderationRef::Named("unknown".into())],
            action: None,
        };
        let err = registry.instantiate_option(&config).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownConsideration(_)));
    }

    #[test]
    fn test_create_behaviour_from_configs() {
        let (mut registry, runs) = registry_with_basics();
        registry
            .register_consideration(ConsiderationConfig::leaf("hunger", 1.0, "hunger_level"))
            .unwrap();
        registry
            .register_option(OptionConfig {
                name: "eat_option".into(),
                weight: 1.0,
                default_utility: Utility::default(),
                measure: Measure::Chebyshev,
                considerations: vec![ConsiderationRef::Named("hunger".into())],
                action: Some("eat".into()),
            })
            .unwrap();
        registry
            .register_behaviour(BehaviourConfig {
                name: "survive".into(),
                weight: 1.0,
                measure: Measure::Chebyshev,
                selector: SelectorConfig::MaxUtility,
                options: vec![OptionRef::Named("eat_option".into())],
            })
            .unwrap();

        let mut behaviour = registry.create_behaviour("survive").unwrap();
        let mut ctx = Ctx { hunger: 0.8 };
        let action = behaviour.select(&ctx).expect("hungry agent should eat");
        action.execute(&mut ctx);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_instances_are_independent() {
        let (mut registry, _) = registry_with_basics();
        registry
            .register_behaviour(BehaviourConfig {
                name: "b".into(),
                weight: 1.0,
                measure: Measure::Chebyshev,
                selector: SelectorConfig::MaxUtility,
                options: vec![OptionRef::Inline(OptionConfig {
                    name: "opt".into(),
                    weight: 1.0,
                    default_utility: Utility::default(),
                    measure: Measure::Chebyshev,
                    considerations: vec![ConsiderationRef::Inline(Box::new(
                        ConsiderationConfig::leaf("h", 1.0, "hunger_level"),
                    ))],
                    action: Some("eat".into()),
                })],
            })
            .unwrap();

        let mut first = registry.create_behaviour("b").unwrap();
        let second = registry.create_behaviour("b").unwrap();

        first.consider(&Ctx { hunger: 1.0 });
        // The sibling instance's cache is untouched.
        assert_eq!(second.utility(), Utility::default());
        assert!(first.utility().value() > 0.0);
    }

    #[test]
    fn test_create_unknown_behaviour() {
        let registry: DecisionRegistry<Ctx> = DecisionRegistry::new();
        assert!(matches!(
            registry.create_behaviour("nope").unwrap_err(),
            RegistryError::UnknownBehaviour(_)
        ));
    }
}
