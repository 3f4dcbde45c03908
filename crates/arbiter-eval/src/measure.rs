//! Aggregation Measures
//!
//! A [`Measure`] reduces a vector of utilities to a single score. Measures
//! are stateless, so the serializable description and the runtime form are
//! the same type. Empty input and near-zero total weight are expected
//! steady states and produce 0.0 rather than an error.

use serde::{Deserialize, Serialize};

use crate::utility::Utility;

/// Weight sums at or below this are treated as zero.
const WEIGHT_EPSILON: f32 = 1e-6;

/// Allowed range for the power-mean exponent.
const P_MIN: f32 = 1.0;
const P_MAX: f32 = 10_000.0;

fn default_p() -> f32 {
    2.0
}

/// Aggregation rule reducing a utility vector to one score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Measure {
    /// Weighted max: the single most urgent consideration dominates.
    Chebyshev,
    /// Chebyshev with a hard veto: any element whose combined score falls
    /// below `lower_bound` zeroes the whole result.
    ConstrainedChebyshev { lower_bound: f32 },
    /// Weighted power mean. `p = 2` is the weighted quadratic mean; larger
    /// `p` approaches the max, `p = 1` the plain weighted mean.
    WeightedMetrics {
        #[serde(default = "default_p")]
        p: f32,
    },
    /// Power mean behind the same veto gate as [`Measure::ConstrainedChebyshev`].
    ConstrainedWeightedMetrics {
        #[serde(default = "default_p")]
        p: f32,
        lower_bound: f32,
    },
    /// Product of combined scores. Longer consideration chains score lower
    /// under this rule; that skew is relied on by tuned content, so it is
    /// kept as-is.
    Multiplicative,
}

impl Measure {
    /// Reduces `elements` to one score. Returns 0.0 on empty input.
    pub fn calculate(&self, elements: &[Utility]) -> f32 {
        if elements.is_empty() {
            return 0.0;
        }
        match *self {
            Measure::Chebyshev => chebyshev(elements),
            Measure::ConstrainedChebyshev { lower_bound } => {
                if any_below(elements, lower_bound) {
                    0.0
                } else {
                    chebyshev(elements)
                }
            }
            Measure::WeightedMetrics { p } => power_mean(elements, p),
            Measure::ConstrainedWeightedMetrics { p, lower_bound } => {
                if any_below(elements, lower_bound) {
                    0.0
                } else {
                    power_mean(elements, p)
                }
            }
            Measure::Multiplicative => elements.iter().map(Utility::combined).product(),
        }
    }
}

impl Default for Measure {
    fn default() -> Self {
        Measure::WeightedMetrics { p: default_p() }
    }
}

fn total_weight(elements: &[Utility]) -> f32 {
    elements.iter().map(Utility::weight).sum()
}

fn any_below(elements: &[Utility], lower_bound: f32) -> bool {
    let bound = lower_bound.clamp(0.0, 1.0);
    elements.iter().any(|u| u.combined() < bound)
}

fn chebyshev(elements: &[Utility]) -> f32 {
    let weight_sum = total_weight(elements);
    if weight_sum <= WEIGHT_EPSILON {
        return 0.0;
    }
    elements
        .iter()
        .map(|u| u.combined() / weight_sum)
        .fold(0.0, f32::max)
}

fn power_mean(elements: &[Utility], p: f32) -> f32 {
    let p = p.clamp(P_MIN, P_MAX);
    let weight_sum = total_weight(elements);
    if weight_sum <= WEIGHT_EPSILON {
        return 0.0;
    }
    let sum: f32 = elements
        .iter()
        .map(|u| (u.weight() / weight_sum) * u.value().powf(p))
        .sum();
    sum.powf(1.0 / p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utilities(pairs: &[(f32, f32)]) -> Vec<Utility> {
        pairs.iter().map(|&(v, w)| Utility::new(v, w)).collect()
    }

    #[test]
    fn test_all_measures_return_zero_on_empty() {
        let measures = [
            Measure::Chebyshev,
            Measure::ConstrainedChebyshev { lower_bound: 0.1 },
            Measure::WeightedMetrics { p: 2.0 },
            Measure::ConstrainedWeightedMetrics {
                p: 2.0,
                lower_bound: 0.1,
            },
            Measure::Multiplicative,
        ];
        for m in measures {
            assert_eq!(m.calculate(&[]), 0.0);
        }
    }

    #[test]
    fn test_chebyshev_zero_on_zero_weight() {
        let els = utilities(&[(0.9, 0.0), (0.4, 0.0)]);
        assert_eq!(Measure::Chebyshev.calculate(&els), 0.0);
    }

    #[test]
    fn test_chebyshev_matches_formula() {
        let els = utilities(&[(0.9, 0.5), (0.4, 1.0), (0.7, 0.5)]);
        let weight_sum = 2.0;
        let expected = [0.9 * 0.5, 0.4 * 1.0, 0.7 * 0.5]
            .iter()
            .map(|c| c / weight_sum)
            .fold(0.0f32, f32::max);
        let got = Measure::Chebyshev.calculate(&els);
        assert!((got - expected).abs() < 1e-6);
    }

    #[test]
    fn test_chebyshev_bounded_by_values_for_single_element() {
        let els = utilities(&[(0.63, 0.8)]);
        let got = Measure::Chebyshev.calculate(&els);
        assert!(got >= 0.0 && got <= 0.63 + 1e-6);
        // Single element: combined / weight = value
        assert!((got - 0.63).abs() < 1e-6);
    }

    #[test]
    fn test_constrained_chebyshev_vetoes_below_bound() {
        let els = utilities(&[(0.9, 1.0), (0.05, 1.0)]);
        let measure = Measure::ConstrainedChebyshev { lower_bound: 0.1 };
        assert_eq!(measure.calculate(&els), 0.0);
    }

    #[test]
    fn test_constrained_chebyshev_passes_above_bound() {
        let els = utilities(&[(0.9, 1.0), (0.5, 1.0)]);
        let constrained = Measure::ConstrainedChebyshev { lower_bound: 0.1 };
        let plain = Measure::Chebyshev;
        assert_eq!(constrained.calculate(&els), plain.calculate(&els));
    }

    #[test]
    fn test_weighted_metrics_p2_is_quadratic_mean() {
        let els = utilities(&[(0.6, 1.0), (0.8, 1.0)]);
        let expected = (0.5f32 * 0.36 + 0.5 * 0.64).sqrt();
        let got = Measure::WeightedMetrics { p: 2.0 }.calculate(&els);
        assert!((got - expected).abs() < 1e-6);
    }

    #[test]
    fn test_weighted_metrics_monotonic_in_p() {
        let els = utilities(&[(0.3, 1.0), (0.9, 0.5), (0.6, 0.8)]);
        let mut last = 0.0f32;
        for p in [1.0, 2.0, 4.0, 8.0, 32.0, 128.0] {
            let score = Measure::WeightedMetrics { p }.calculate(&els);
            assert!(
                score >= last - 1e-6,
                "power mean decreased at p={}: {} < {}",
                p,
                score,
                last
            );
            last = score;
        }
    }

    #[test]
    fn test_weighted_metrics_clamps_p() {
        let els = utilities(&[(0.4, 1.0), (0.8, 1.0)]);
        let below = Measure::WeightedMetrics { p: 0.01 }.calculate(&els);
        let at_min = Measure::WeightedMetrics { p: 1.0 }.calculate(&els);
        assert!((below - at_min).abs() < 1e-6);
    }

    #[test]
    fn test_constrained_weighted_metrics_veto() {
        let els = utilities(&[(0.9, 1.0), (0.02, 1.0)]);
        let measure = Measure::ConstrainedWeightedMetrics {
            p: 2.0,
            lower_bound: 0.1,
        };
        assert_eq!(measure.calculate(&els), 0.0);
    }

    #[test]
    fn test_multiplicative_is_product_of_combined() {
        let els = utilities(&[(0.5, 1.0), (0.5, 1.0), (0.5, 1.0)]);
        let got = Measure::Multiplicative.calculate(&els);
        assert!((got - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_multiplicative_penalizes_longer_chains() {
        let short = utilities(&[(0.8, 1.0), (0.8, 1.0)]);
        let long = utilities(&[(0.8, 1.0), (0.8, 1.0), (0.8, 1.0)]);
        assert!(
            Measure::Multiplicative.calculate(&long) < Measure::Multiplicative.calculate(&short)
        );
    }

    #[test]
    fn test_serde_tagged_representation() {
        let json = serde_json::to_string(&Measure::ConstrainedChebyshev { lower_bound: 0.2 })
            .unwrap();
        assert!(json.contains("constrained_chebyshev"));
        let back: Measure = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Measure::ConstrainedChebyshev { lower_bound: 0.2 });
    }

    #[test]
    fn test_weighted_metrics_default_p() {
        let m: Measure = serde_json::from_str(r#"{"type": "weighted_metrics"}"#).unwrap();
        assert_eq!(m, Measure::WeightedMetrics { p: 2.0 });
    }
}
