//! Utility-based decision engine: considerations aggregated through
//! measures, options bound to actions, behaviours resolving to one chosen
//! action through a selector.
//!
//! Scoring trees are authored as plain-data configs, registered by name in
//! a [`DecisionRegistry`], and instantiated into fresh runtime nodes per
//! agent so no two agents ever share mutable scoring state. The tree
//! depends only on the [`Action`] and appraisal capabilities, never on
//! registry internals.

pub mod behaviour;
pub mod config;
pub mod consideration;
pub mod measure;
pub mod option;
pub mod registry;
pub mod selector;
pub mod utility;

pub use behaviour::Behaviour;
pub use config::{
    BehaviourConfig, ConsiderationConfig, ConsiderationKind, ConsiderationRef, OptionConfig,
    OptionRef,
};
pub use consideration::{Appraisal, Consideration};
pub use measure::Measure;
pub use option::{Action, ActionOption};
pub use registry::{DecisionRegistry, RegistryError};
pub use selector::{Selector, SelectorConfig};
pub use utility::Utility;
