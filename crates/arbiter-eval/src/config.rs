//! Declarative Node Configs
//!
//! Scoring trees are authored as plain-data configs and instantiated into
//! fresh runtime nodes per agent, keeping "same shape" separate from
//! "fresh mutable state". Children and options reference either a name
//! registered in the [`DecisionRegistry`](crate::registry::DecisionRegistry)
//! or an inline config, so trees can be written wholesale in TOML or JSON.

use serde::{Deserialize, Serialize};

use crate::measure::Measure;
use crate::selector::SelectorConfig;
use crate::utility::Utility;

fn default_weight() -> f32 {
    1.0
}

/// Reference to a consideration: registered name or inline definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConsiderationRef {
    Named(String),
    Inline(Box<ConsiderationConfig>),
}

/// Template for one scoring node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsiderationConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
    /// Utility held before the first evaluation and by empty composites.
    #[serde(default)]
    pub default_utility: Utility,
    #[serde(flatten)]
    pub kind: ConsiderationKind,
}

/// Leaf nodes name a registered appraisal; composites carry a measure and
/// child references.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConsiderationKind {
    Leaf {
        appraisal: String,
    },
    Composite {
        measure: Measure,
        #[serde(default)]
        children: Vec<ConsiderationRef>,
    },
}

impl ConsiderationConfig {
    pub fn leaf(name: impl Into<String>, weight: f32, appraisal: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight,
            default_utility: Utility::default(),
            kind: ConsiderationKind::Leaf {
                appraisal: appraisal.into(),
            },
        }
    }

    pub fn composite(
        name: impl Into<String>,
        weight: f32,
        measure: Measure,
        children: Vec<ConsiderationRef>,
    ) -> Self {
        Self {
            name: name.into(),
            weight,
            default_utility: Utility::default(),
            kind: ConsiderationKind::Composite { measure, children },
        }
    }
}

/// Reference to an option: registered name or inline definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionRef {
    Named(String),
    Inline(OptionConfig),
}

/// Template for an option: a composite consideration plus the name of the
/// action it binds. The action may stay unbound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default)]
    pub default_utility: Utility,
    pub measure: Measure,
    #[serde(default)]
    pub considerations: Vec<ConsiderationRef>,
    #[serde(default)]
    pub action: Option<String>,
}

/// Template for a behaviour: options plus the selection policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviourConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
    pub measure: Measure,
    #[serde(default)]
    pub selector: SelectorConfig,
    #[serde(default)]
    pub options: Vec<OptionRef>,
}
