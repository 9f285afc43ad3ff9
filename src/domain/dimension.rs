//! Variant dimensions and the admin's working selection

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::domain::combination::ConcreteVariant;
use crate::domain::value_objects::{CategoryId, DimensionId, ValueId};
use crate::{EngineError, RawVariant, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantValue {
    pub id: ValueId,
    pub value: String,
    pub dimension_id: DimensionId,
    pub active: bool,
}

/// One independent axis of variation (e.g. Color) scoped to a category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDimension {
    pub id: DimensionId,
    pub name: String,
    pub category_id: Option<CategoryId>,
    pub active: bool,
    pub values: Vec<VariantValue>,
}

impl VariantDimension {
    pub fn value(&self, id: ValueId) -> Option<&VariantValue> { self.values.iter().find(|v| v.id == id) }
    pub fn active_values(&self) -> impl Iterator<Item = &VariantValue> { self.values.iter().filter(|v| v.active) }
}

impl From<RawVariant> for VariantDimension {
    fn from(raw: RawVariant) -> Self {
        let id = raw.id;
        let values = raw.variant_values.into_iter()
            .map(|v| VariantValue { id: v.id, value: v.value, dimension_id: id, active: v.status })
            .collect();
        Self {
            id,
            name: raw.name,
            category_id: raw.category_id.or(raw.category.map(|c| c.id)),
            active: raw.status,
            values,
        }
    }
}

/// Normalize a category's variant listing, keeping listing order.
///
/// Inactive dimensions and dimensions declared for another category are left out.
pub fn normalize(raw: Vec<RawVariant>, category_id: Option<CategoryId>) -> Vec<VariantDimension> {
    raw.into_iter()
        .map(VariantDimension::from)
        .filter(|d| d.active)
        .filter(|d| match (category_id, d.category_id) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        })
        .collect()
}

/// Ids of every inactive value across `dimensions`.
pub fn inactive_values(dimensions: &[VariantDimension]) -> HashSet<ValueId> {
    dimensions.iter().flat_map(|d| d.values.iter()).filter(|v| !v.active).map(|v| v.id).collect()
}

/// For each dimension the admin turned on, the values currently checked.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedDimensionSet(BTreeMap<DimensionId, BTreeSet<ValueId>>);

impl SelectedDimensionSet {
    pub fn new() -> Self { Self::default() }

    /// Selection implied by persisted variants: every dimension and value they reference.
    pub fn from_variants(variants: &[ConcreteVariant]) -> Self {
        let mut set = Self::new();
        for option in variants.iter().flat_map(|v| v.options.iter()) {
            if let Some(dimension) = option.dimension_id {
                set.0.entry(dimension).or_default().insert(option.value_id);
            }
        }
        set
    }

    pub fn from_map(map: BTreeMap<DimensionId, Vec<ValueId>>) -> Self {
        Self(map.into_iter().map(|(d, values)| (d, values.into_iter().collect())).collect())
    }

    pub fn is_on(&self, dimension: DimensionId) -> bool { self.0.contains_key(&dimension) }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn dimensions(&self) -> impl Iterator<Item = DimensionId> + '_ { self.0.keys().copied() }
    pub fn checked(&self, dimension: DimensionId) -> Option<&BTreeSet<ValueId>> { self.0.get(&dimension) }

    pub fn is_checked(&self, dimension: DimensionId, value: ValueId) -> bool {
        self.0.get(&dimension).is_some_and(|values| values.contains(&value))
    }

    // The mutators below return whether the selection actually changed.

    /// Turning a dimension on starts it with no checked values.
    pub fn turn_on(&mut self, dimension: DimensionId) -> bool {
        if self.is_on(dimension) { return false; }
        self.0.insert(dimension, BTreeSet::new());
        true
    }

    pub fn turn_off(&mut self, dimension: DimensionId) -> bool { self.0.remove(&dimension).is_some() }

    pub fn check(&mut self, dimension: DimensionId, value: ValueId) -> bool {
        self.0.entry(dimension).or_default().insert(value)
    }

    pub fn uncheck(&mut self, dimension: DimensionId, value: ValueId) -> bool {
        self.0.get_mut(&dimension).is_some_and(|values| values.remove(&value))
    }

    pub fn clear(&mut self) { self.0.clear(); }
}

/// A dimension reduced to the value ids that take part in generation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResolvedDimension {
    pub dimension_id: DimensionId,
    pub value_ids: Vec<ValueId>,
}

/// Reduce `available` to what the generator consumes.
///
/// Dimensions keep listing order. A checked value qualifies when it is active, or when
/// it is inactive but still referenced by an existing row (`retained`). Dimensions left
/// with no qualifying value are dropped.
pub fn resolve(
    available: &[VariantDimension],
    selection: &SelectedDimensionSet,
    retained: &HashSet<ValueId>,
) -> Vec<ResolvedDimension> {
    available.iter()
        .filter(|d| selection.is_on(d.id))
        .map(|d| ResolvedDimension {
            dimension_id: d.id,
            value_ids: d.values.iter()
                .filter(|v| selection.is_checked(d.id, v.id))
                .filter(|v| v.active || retained.contains(&v.id))
                .map(|v| v.id)
                .collect(),
        })
        .filter(|d| !d.value_ids.is_empty())
        .collect()
}

/// Look up a dimension in `available`, checking that `value` (if given) belongs to it.
pub fn find_dimension<'a>(
    available: &'a [VariantDimension],
    dimension: DimensionId,
    value: Option<ValueId>,
) -> Result<&'a VariantDimension> {
    let found = available.iter().find(|d| d.id == dimension).ok_or(EngineError::UnknownDimension(dimension))?;
    if let Some(value) = value {
        found.value(value).ok_or(EngineError::UnknownValue { dimension, value })?;
    }
    Ok(found)
}
