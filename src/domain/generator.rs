//! Combination generator
//!
//! Cartesian product of the resolved dimensions. The first dimension is the outer
//! loop and the last one the innermost, so output order is deterministic.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::domain::combination::Combination;
use crate::domain::dimension::ResolvedDimension;
use crate::domain::value_objects::{CategoryId, ValueId, ValueIdSet};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Generation {
    pub combinations: Vec<Combination>,
    /// Full product size, `None` when it overflows `usize`.
    pub requested: Option<usize>,
    pub capped: bool,
}

/// Product of the value counts, ignoring empty dimensions. Zero dimensions yield 0.
pub fn cardinality(dimensions: &[ResolvedDimension]) -> Option<usize> {
    product_of(dimensions.iter().map(|d| d.value_ids.len()))
}

fn product_of(sizes: impl Iterator<Item = usize>) -> Option<usize> {
    let mut sizes = sizes.filter(|n| *n > 0).peekable();
    if sizes.peek().is_none() { return Some(0); }
    sizes.try_fold(1usize, |acc, n| acc.checked_mul(n))
}

/// Generate at most `max_combinations` combinations with default price/stock/SKU.
pub fn generate(dimensions: &[ResolvedDimension], max_combinations: usize) -> Generation {
    let dimensions: Vec<&ResolvedDimension> = dimensions.iter().filter(|d| !d.value_ids.is_empty()).collect();
    if dimensions.is_empty() { return Generation { requested: Some(0), ..Generation::default() }; }

    let requested = product_of(dimensions.iter().map(|d| d.value_ids.len()));
    let capped = requested.map_or(true, |n| n > max_combinations);
    if capped {
        tracing::warn!(requested = ?requested, cap = max_combinations, "variant combination count exceeds cap, truncating");
    }

    let mut combinations = Vec::with_capacity(requested.unwrap_or(max_combinations).min(max_combinations));
    let mut current = Vec::with_capacity(dimensions.len());
    expand(&dimensions, 0, &mut current, &mut combinations, max_combinations);
    Generation { combinations, requested, capped }
}

fn expand(dimensions: &[&ResolvedDimension], depth: usize, current: &mut Vec<ValueId>, out: &mut Vec<Combination>, max: usize) {
    if out.len() >= max { return; }
    if depth == dimensions.len() {
        out.push(Combination::new(ValueIdSet::new(current.iter().copied())));
        return;
    }
    for &value in &dimensions[depth].value_ids {
        current.push(value);
        expand(dimensions, depth + 1, current, out, max);
        current.pop();
        if out.len() >= max { return; }
    }
}

/// Structural hash of a generator input, used to skip redundant regenerations.
pub fn generation_key(category_id: Option<CategoryId>, dimensions: &[ResolvedDimension]) -> u64 {
    let mut hasher = DefaultHasher::new();
    category_id.hash(&mut hasher);
    dimensions.hash(&mut hasher);
    hasher.finish()
}
