//! Selection matcher
//!
//! Resolves a storefront selection (dimension name -> value) to a persisted variant.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::domain::combination::ConcreteVariant;

/// A shopper's in-progress choice. Unset dimensions are absent.
///
/// On the wire this is a plain `{dimension: value}` map; empty values are dropped when read.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Selection(BTreeMap<String, String>);

impl Selection {
    pub fn new() -> Self { Self::default() }

    /// Choose `value` for `dimension`; an empty value clears the dimension.
    pub fn select(&mut self, dimension: impl Into<String>, value: impl Into<String>) {
        let (dimension, value) = (dimension.into(), value.into());
        if value.is_empty() { self.0.remove(&dimension); } else { self.0.insert(dimension, value); }
    }

    pub fn clear(&mut self, dimension: &str) { self.0.remove(dimension); }
    pub fn get(&self, dimension: &str) -> Option<&str> { self.0.get(dimension).map(String::as_str) }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> { self.0.iter().map(|(k, v)| (k.as_str(), v.as_str())) }

    /// Build the selection that names exactly `variant`'s values.
    pub fn of(variant: &ConcreteVariant) -> Self {
        variant.options.iter().map(|o| (o.dimension_label().to_string(), o.value.clone())).collect()
    }
}

impl FromIterator<(String, String)> for Selection {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut selection = Self::new();
        for (dimension, value) in iter { selection.select(dimension, value); }
        selection
    }
}

impl From<BTreeMap<String, String>> for Selection {
    fn from(map: BTreeMap<String, String>) -> Self { map.into_iter().collect() }
}

impl From<Selection> for BTreeMap<String, String> {
    fn from(selection: Selection) -> Self { selection.0 }
}

/// First variant carrying every selected value, in list order.
///
/// With a partial selection several variants may qualify; the answer is provisional.
pub fn find_matching<'a>(variants: &'a [ConcreteVariant], selection: &Selection) -> Option<&'a ConcreteVariant> {
    find_matching_index(variants, selection).map(|i| &variants[i])
}

/// Position of the variant `find_matching` returns.
pub fn find_matching_index(variants: &[ConcreteVariant], selection: &Selection) -> Option<usize> {
    variants.iter().position(|v| selection.iter().all(|(dimension, value)| v.has_value(dimension, value)))
}

/// Distinct values offered for one dimension, in first-seen order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionGroup {
    pub name: String,
    pub values: Vec<String>,
}

/// Option groups derived from persisted variants, groups and values in first-seen order.
pub fn option_groups(variants: &[ConcreteVariant]) -> Vec<OptionGroup> {
    let mut groups: Vec<OptionGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for option in variants.iter().flat_map(|v| v.options.iter()) {
        let name = option.dimension_label();
        let i = *index.entry(name.to_string()).or_insert_with(|| {
            groups.push(OptionGroup { name: name.to_string(), values: Vec::new() });
            groups.len() - 1
        });
        if !groups[i].values.contains(&option.value) {
            groups[i].values.push(option.value.clone());
        }
    }
    groups
}

/// First value of every group.
pub fn default_selection(groups: &[OptionGroup]) -> Selection {
    groups.iter()
        .filter_map(|g| g.values.first().map(|v| (g.name.clone(), v.clone())))
        .collect()
}
