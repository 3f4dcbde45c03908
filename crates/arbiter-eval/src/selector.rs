//! Selection Policies
//!
//! A [`Selector`] chooses one index from a utility vector. Most policies
//! are stateless; `Sequential` keeps a cursor, and the random policies own
//! a seeded [`SmallRng`] so selection stays reproducible. The serializable
//! [`SelectorConfig`] carries the seed; [`Selector::from_config`] builds
//! the runtime form.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::utility::Utility;

/// Serializable description of a selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectorConfig {
    MaxUtility,
    Random {
        #[serde(default)]
        seed: u64,
    },
    Sequential,
    WeightedRandom {
        proportion: f32,
        #[serde(default)]
        seed: u64,
    },
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig::MaxUtility
    }
}

/// Policy choosing one index among a vector of utilities.
#[derive(Debug, Clone)]
pub enum Selector {
    /// Running-max scan over combined scores. The scan starts at a
    /// threshold of zero, so entries with combined <= 0 never win even
    /// when they are the only input; ties go to the earliest index.
    MaxUtility,
    /// Uniform index.
    Random { rng: SmallRng },
    /// Round-robin modulo the current size; the cursor resets to zero on
    /// the first call after the observed size changes.
    Sequential { cursor: usize, last_len: usize },
    /// Softly biased draw: restricts sampling to the top
    /// `ceil(proportion * n)` entries by combined score, then samples the
    /// pool proportionally to those scores.
    WeightedRandom { proportion: f32, rng: SmallRng },
}

impl Selector {
    pub fn from_config(config: &SelectorConfig) -> Self {
        match *config {
            SelectorConfig::MaxUtility => Selector::MaxUtility,
            SelectorConfig::Random { seed } => Selector::random(seed),
            SelectorConfig::Sequential => Selector::sequential(),
            SelectorConfig::WeightedRandom { proportion, seed } => {
                Selector::weighted_random(proportion, seed)
            }
        }
    }

    pub fn max_utility() -> Self {
        Selector::MaxUtility
    }

    pub fn random(seed: u64) -> Self {
        Selector::Random {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn sequential() -> Self {
        Selector::Sequential {
            cursor: 0,
            last_len: 0,
        }
    }

    pub fn weighted_random(proportion: f32, seed: u64) -> Self {
        Selector::WeightedRandom {
            proportion: proportion.clamp(0.0, 1.0),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Returns the chosen index, or `None` when nothing is selectable:
    /// always on empty input, and for `MaxUtility` also when no combined
    /// score is strictly positive.
    pub fn select(&mut self, elements: &[Utility]) -> Option<usize> {
        match self {
            Selector::MaxUtility => select_max(elements),
            Selector::Random { rng } => {
                if elements.is_empty() {
                    None
                } else {
                    Some(rng.gen_range(0..elements.len()))
                }
            }
            Selector::Sequential { cursor, last_len } => {
                select_sequential(cursor, last_len, elements.len())
            }
            Selector::WeightedRandom { proportion, rng } => {
                select_weighted(*proportion, rng, elements)
            }
        }
    }
}

fn select_max(elements: &[Utility]) -> Option<usize> {
    let mut best = 0.0f32;
    let mut chosen = None;
    for (i, el) in elements.iter().enumerate() {
        if el.combined() > best {
            best = el.combined();
            chosen = Some(i);
        }
    }
    chosen
}

fn select_sequential(cursor: &mut usize, last_len: &mut usize, len: usize) -> Option<usize> {
    if len == 0 {
        *cursor = 0;
        *last_len = 0;
        return None;
    }
    if len != *last_len {
        *cursor = 0;
        *last_len = len;
    }
    let idx = *cursor % len;
    *cursor = idx + 1;
    Some(idx)
}

fn select_weighted(proportion: f32, rng: &mut SmallRng, elements: &[Utility]) -> Option<usize> {
    if elements.is_empty() {
        return None;
    }
    let proportion = proportion.clamp(0.0, 1.0);

    // Stable sort keeps earlier indices first on equal scores.
    let mut order: Vec<usize> = (0..elements.len()).collect();
    order.sort_by(|&a, &b| elements[b].combined().total_cmp(&elements[a].combined()));

    let pool = ((proportion * elements.len() as f32).ceil() as usize)
        .max(1)
        .min(elements.len());

    let total: f32 = order[..pool].iter().map(|&i| elements[i].combined()).sum();
    if total <= f32::EPSILON {
        // Nothing to weight by; draw uniformly over the pool.
        return Some(order[rng.gen_range(0..pool)]);
    }

    let mut cumulative = Vec::with_capacity(pool);
    let mut acc = 0.0f32;
    for &i in &order[..pool] {
        acc += elements[i].combined() / total;
        cumulative.push(acc);
    }

    let draw = rng.gen::<f32>();
    let slot = cumulative.partition_point(|&c| c <= draw).min(pool - 1);
    Some(order[slot])
}
