//! Pricing/stock matrix
//!
//! Rows are keyed by their [`ValueIdSet`], not by position: positions shift whenever
//! a dimension is toggled, identities do not.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use validator::Validate;

use crate::domain::combination::Combination;
use crate::domain::value_objects::{Sku, ValueId, ValueIdSet};
use crate::{EngineError, ProductVariantRequest, Result};

/// A single-cell edit addressed by row identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum CellEdit {
    Price(Decimal),
    OldPrice(Option<Decimal>),
    Sku(String),
    Stock(i32),
}

/// The triple written to every row by "apply to all".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkEdit {
    pub price: Decimal,
    pub stock: i32,
    pub sku: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariantMatrix {
    rows: Vec<Combination>,
    index: HashMap<ValueIdSet, usize>,
}

impl VariantMatrix {
    pub fn new() -> Self { Self::default() }

    /// Build from rows in order. A repeated identity keeps its first row.
    pub fn from_rows(rows: impl IntoIterator<Item = Combination>) -> Self {
        let mut matrix = Self::new();
        for row in rows {
            if matrix.index.contains_key(&row.value_ids) {
                tracing::warn!(value_ids = %row.value_ids, "duplicate variant combination dropped");
                continue;
            }
            matrix.push(row);
        }
        matrix
    }

    fn push(&mut self, row: Combination) {
        self.index.insert(row.value_ids.clone(), self.rows.len());
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[Combination] { &self.rows }
    pub fn into_rows(self) -> Vec<Combination> { self.rows }
    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = &Combination> { self.rows.iter() }
    pub fn get(&self, key: &ValueIdSet) -> Option<&Combination> { self.index.get(key).map(|&i| &self.rows[i]) }
    pub fn contains(&self, key: &ValueIdSet) -> bool { self.index.contains_key(key) }

    /// Every value id referenced by some row.
    pub fn referenced_values(&self) -> HashSet<ValueId> {
        self.rows.iter().flat_map(|r| r.value_ids.iter()).collect()
    }

    pub fn edit(&mut self, key: &ValueIdSet, edit: CellEdit) -> Result<()> {
        let &i = self.index.get(key).ok_or_else(|| EngineError::UnknownRow(key.clone()))?;
        let row = &mut self.rows[i];
        match edit {
            CellEdit::Price(price) => row.price = price,
            CellEdit::OldPrice(old_price) => row.old_price = old_price,
            CellEdit::Sku(sku) => row.sku = sku,
            CellEdit::Stock(stock) => row.stock = stock,
        }
        Ok(())
    }

    /// Overwrite price, stock and SKU of every row. Value ids and old price are untouched.
    pub fn bulk_apply(&mut self, edit: &BulkEdit) {
        for row in &mut self.rows {
            row.price = edit.price;
            row.stock = edit.stock;
            row.sku = edit.sku.clone();
        }
    }

    /// Give every row with a blank SKU one derived from the product SPU.
    ///
    /// All SKUs are derived before any is written, so a failure leaves the matrix unchanged.
    pub fn fill_blank_skus(&mut self, spu: &Sku) -> Result<usize> {
        let derived = self.rows.iter().enumerate()
            .filter(|(_, r)| r.sku.trim().is_empty())
            .map(|(index, r)| -> Result<(usize, String)> { Ok((index, Sku::generate(spu, &r.value_ids)?.to_string())) })
            .collect::<Result<Vec<_>>>()?;
        for (index, sku) in &derived {
            self.rows[*index].sku = sku.clone();
        }
        Ok(derived.len())
    }

    /// Rows in the submitted wire shape, validated in order.
    pub fn to_requests(&self) -> Result<Vec<ProductVariantRequest>> {
        self.rows.iter().enumerate().map(|(index, row)| {
            let request = row.to_request();
            request.validate().map_err(|source| EngineError::InvalidVariant { index, source })?;
            Ok(request)
        }).collect()
    }
}

/// Pure form of [`VariantMatrix::bulk_apply`].
pub fn bulk_apply(mut matrix: VariantMatrix, edit: &BulkEdit) -> VariantMatrix {
    matrix.bulk_apply(edit);
    matrix
}
