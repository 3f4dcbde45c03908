//! Scoring Nodes
//!
//! A [`Consideration`] is one node of the scoring tree. Leaves appraise the
//! agent context through a caller-supplied function; composites recursively
//! consider their children and aggregate the results through a [`Measure`].
//! Every node caches its last computed [`Utility`].
//!
//! Cloning deep-clones children and copies the measure, while leaf
//! appraisal functions are shared behind an `Arc` (they are immutable);
//! sibling agents therefore never share mutable scoring state.

use std::fmt;
use std::sync::Arc;

use crate::measure::Measure;
use crate::utility::Utility;

/// Leaf scoring function mapping agent context to a raw [0, 1] value.
pub type Appraisal<C> = Arc<dyn Fn(&C) -> f32>;

/// One node of the scoring tree.
pub struct Consideration<C> {
    name: String,
    weight: f32,
    default_utility: Utility,
    utility: Utility,
    node: Node<C>,
}

enum Node<C> {
    Leaf(Appraisal<C>),
    Composite {
        children: Vec<Consideration<C>>,
        measure: Measure,
    },
}

impl<C> Consideration<C> {
    /// Creates a leaf node. An empty name makes the node anonymous.
    pub fn leaf(name: impl Into<String>, weight: f32, appraisal: Appraisal<C>) -> Self {
        Self::with_node(name.into(), weight, Node::Leaf(appraisal))
    }

    /// Creates a composite node with no children yet.
    pub fn composite(name: impl Into<String>, weight: f32, measure: Measure) -> Self {
        Self::with_node(
            name.into(),
            weight,
            Node::Composite {
                children: Vec::new(),
                measure,
            },
        )
    }

    fn with_node(name: String, weight: f32, node: Node<C>) -> Self {
        let default_utility = Utility::default();
        Self {
            name,
            weight: weight.clamp(0.0, 1.0),
            default_utility,
            utility: default_utility,
            node,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight.clamp(0.0, 1.0);
    }

    pub fn default_utility(&self) -> Utility {
        self.default_utility
    }

    /// Sets the fallback utility and resets the cache to it; before the
    /// first `consider` the cache mirrors the default.
    pub fn set_default_utility(&mut self, utility: Utility) {
        self.default_utility = utility;
        self.utility = utility;
    }

    /// The utility computed by the most recent `consider` call.
    pub fn utility(&self) -> Utility {
        self.utility
    }

    pub(crate) fn set_utility(&mut self, utility: Utility) {
        self.utility = utility;
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.node, Node::Leaf(_))
    }

    pub fn children_count(&self) -> usize {
        match &self.node {
            Node::Leaf(_) => 0,
            Node::Composite { children, .. } => children.len(),
        }
    }

    /// Adds a child to a composite. Returns `false` on a leaf node or when
    /// a non-anonymous child of the same name is already present.
    pub fn add_child(&mut self, child: Consideration<C>) -> bool {
        match &mut self.node {
            Node::Leaf(_) => {
                tracing::warn!("cannot add child '{}' to leaf consideration '{}'", child.name, self.name);
                false
            }
            Node::Composite { children, .. } => {
                if !child.name.is_empty() && children.iter().any(|c| c.name == child.name) {
                    tracing::warn!("rejected duplicate child consideration '{}'", child.name);
                    return false;
                }
                children.push(child);
                true
            }
        }
    }

    /// Recomputes the cached utility from the context.
    ///
    /// A composite with no children keeps its default utility instead of
    /// taking the measure's empty-input zero.
    pub fn consider(&mut self, ctx: &C) {
        match &mut self.node {
            Node::Leaf(appraisal) => {
                self.utility = Utility::new(appraisal(ctx), self.weight);
            }
            Node::Composite { children, measure } => {
                if children.is_empty() {
                    self.utility = self.default_utility;
                    return;
                }
                let mut scores = Vec::with_capacity(children.len());
                for child in children.iter_mut() {
                    child.consider(ctx);
                    scores.push(child.utility());
                }
                self.utility = Utility::new(measure.calculate(&scores), self.weight);
            }
        }
    }
}

impl<C> Clone for Consideration<C> {
    fn clone(&self) -> Self {
        let node = match &self.node {
            Node::Leaf(appraisal) => Node::Leaf(Arc::clone(appraisal)),
            Node::Composite { children, measure } => Node::Composite {
                children: children.clone(),
                measure: *measure,
            },
        };
        Self {
            name: self.name.clone(),
            weight: self.weight,
            default_utility: self.default_utility,
            utility: self.utility,
            node,
        }
    }
}

impl<C> fmt::Debug for Consideration<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consideration")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .field("utility", &self.utility)
            .field("children", &self.children_count())
            .finish()
    }
}
