//! Value Objects for the variant engine

use serde::{Deserialize, Serialize};
use std::fmt;

pub type DimensionId = u64;
pub type ValueId = u64;
pub type VariantId = u64;
pub type CategoryId = u64;

/// Identity of a combination: its variant value ids, sorted and deduplicated.
///
/// Two rows are the same entity iff their `ValueIdSet`s are equal, no matter in
/// which order the ids were collected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Vec<ValueId>", into = "Vec<ValueId>")]
pub struct ValueIdSet(Vec<ValueId>);

impl ValueIdSet {
    pub fn new(ids: impl IntoIterator<Item = ValueId>) -> Self {
        let mut ids: Vec<ValueId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Self(ids)
    }
    pub fn as_slice(&self) -> &[ValueId] { &self.0 }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn contains(&self, id: ValueId) -> bool { self.0.binary_search(&id).is_ok() }
    pub fn iter(&self) -> impl Iterator<Item = ValueId> + '_ { self.0.iter().copied() }
    pub fn to_vec(&self) -> Vec<ValueId> { self.0.clone() }
}

impl From<Vec<ValueId>> for ValueIdSet {
    fn from(ids: Vec<ValueId>) -> Self { Self::new(ids) }
}

impl From<ValueIdSet> for Vec<ValueId> {
    fn from(set: ValueIdSet) -> Self { set.0 }
}

impl FromIterator<ValueId> for ValueIdSet {
    fn from_iter<I: IntoIterator<Item = ValueId>>(iter: I) -> Self { Self::new(iter) }
}

impl fmt::Display for ValueIdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|id| id.to_string()).collect();
        write!(f, "[{}]", parts.join(","))
    }
}

/// SKU (Stock Keeping Unit) value object
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sku(String);

impl Sku {
    pub const MAX_LEN: usize = 50;

    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_uppercase();
        if value.is_empty() { return Err(SkuError::Empty); }
        if value.len() > Self::MAX_LEN { return Err(SkuError::TooLong); }
        Ok(Self(value))
    }

    /// Derive a variant SKU from the product SPU: `SPU-<id>-<id>...`, ids ascending.
    pub fn generate(spu: &Sku, value_ids: &ValueIdSet) -> Result<Self, SkuError> {
        let ids: Vec<String> = value_ids.iter().map(|id| id.to_string()).collect();
        if ids.is_empty() { return Self::new(spu.as_str()); }
        Self::new(format!("{}-{}", spu.as_str(), ids.join("-")))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum SkuError { Empty, TooLong }
impl std::error::Error for SkuError {}
impl fmt::Display for SkuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => write!(f, "SKU empty"), Self::TooLong => write!(f, "SKU too long") }
    }
}
