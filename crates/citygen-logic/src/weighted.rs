//! Weighted random choice.
//!
//! A uniform draw in `[0, total_weight)` is walked along the weight list,
//! subtracting each weight until the remainder is non-positive; the item at
//! that position is returned. O(n) per draw, which is fine for the small
//! tables used here (rule sets and archetype palettes stay under ten items).

use rand::Rng;

use crate::config::ConfigError;

/// Draw an index from `weights`, proportional to weight.
///
/// The weights are a fixed, programmer-supplied table; an empty list or a
/// non-positive total is an invariant violation, not a runtime condition.
pub fn choose_index(weights: &[f32], rng: &mut impl Rng) -> usize {
    let total: f32 = weights.iter().sum();
    assert!(
        !weights.is_empty() && total > 0.0,
        "weighted draw over empty or zero-total weights"
    );

    let mut remaining = rng.gen::<f32>() * total;
    let mut last_positive = 0;
    for (i, w) in weights.iter().enumerate() {
        if *w <= 0.0 {
            continue;
        }
        last_positive = i;
        remaining -= w;
        if remaining <= 0.0 {
            return i;
        }
    }
    // Float rounding can leave a sliver of `remaining` after the last weight.
    last_positive
}

/// A weighted item table validated at construction.
///
/// Caller-supplied weights (rule sets from configuration) go through this
/// type so that degenerate tables are rejected before generation starts.
#[derive(Debug, Clone)]
pub struct WeightedTable<T> {
    weights: Vec<f32>,
    items: Vec<T>,
}

impl<T> WeightedTable<T> {
    pub fn new(weights: Vec<f32>, items: Vec<T>) -> Result<Self, ConfigError> {
        if weights.len() != items.len() {
            return Err(ConfigError::WeightLengthMismatch {
                weights: weights.len(),
                items: items.len(),
            });
        }
        if items.is_empty() {
            return Err(ConfigError::EmptyWeightTable);
        }
        if weights.iter().any(|w| *w < 0.0) || weights.iter().sum::<f32>() <= 0.0 {
            return Err(ConfigError::NonPositiveTotalWeight);
        }
        Ok(Self { weights, items })
    }

    pub fn choose(&self, rng: &mut impl Rng) -> &T {
        &self.items[choose_index(&self.weights, rng)]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
