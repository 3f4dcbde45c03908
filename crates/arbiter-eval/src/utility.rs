//! Elementary Scored Values
//!
//! A [`Utility`] pairs a normalized score with the weight of the opinion
//! that produced it. Both fields are clamped to [0, 1] at every
//! construction and mutation point, so downstream aggregation never sees
//! out-of-range inputs.

use serde::{Deserialize, Serialize};

/// A scored value in [0, 1] together with its weight in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "UtilityDef")]
pub struct Utility {
    value: f32,
    weight: f32,
}

impl Utility {
    /// Creates a utility, clamping both fields to [0, 1].
    pub fn new(value: f32, weight: f32) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
            weight: weight.clamp(0.0, 1.0),
        }
    }

    /// A full-weight utility.
    pub fn from_value(value: f32) -> Self {
        Self::new(value, 1.0)
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn set_value(&mut self, value: f32) {
        self.value = value.clamp(0.0, 1.0);
    }

    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight.clamp(0.0, 1.0);
    }

    /// The value scaled by its weight.
    pub fn combined(&self) -> f32 {
        self.value * self.weight
    }
}

impl Default for Utility {
    fn default() -> Self {
        Self {
            value: 0.0,
            weight: 1.0,
        }
    }
}

/// Deserialization shim so the clamping invariant survives serde.
#[derive(Deserialize)]
struct UtilityDef {
    value: f32,
    #[serde(default = "default_weight")]
    weight: f32,
}

fn default_weight() -> f32 {
    1.0
}

impl From<UtilityDef> for Utility {
    fn from(def: UtilityDef) -> Self {
        Utility::new(def.value, def.weight)
    }
}
