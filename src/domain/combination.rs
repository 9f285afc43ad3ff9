//! Combination rows and persisted variants

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{DimensionId, ValueId, ValueIdSet, VariantId};
use crate::{ProductVariantRequest, ProductVariantResponse};

/// Label used for values whose dimension name is unknown.
pub const DEFAULT_DIMENSION_LABEL: &str = "Default";

/// One row of the admin pricing/stock matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combination {
    #[serde(rename = "variantValueIds", alias = "valueIds")]
    pub value_ids: ValueIdSet,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub old_price: Option<Decimal>,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub stock: i32,
}

impl Combination {
    pub fn new(value_ids: ValueIdSet) -> Self {
        Self { value_ids, price: Decimal::ZERO, old_price: Some(Decimal::ZERO), sku: String::new(), stock: 0 }
    }

    pub fn to_request(&self) -> ProductVariantRequest {
        ProductVariantRequest {
            price: self.price,
            old_price: self.old_price,
            sku: self.sku.clone(),
            stock: self.stock,
            variant_value_ids: self.value_ids.to_vec(),
        }
    }
}

impl From<ProductVariantRequest> for Combination {
    fn from(r: ProductVariantRequest) -> Self {
        Self { value_ids: ValueIdSet::new(r.variant_value_ids), price: r.price, old_price: r.old_price, sku: r.sku, stock: r.stock }
    }
}

/// A value a persisted variant is tagged with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantOption {
    pub value_id: ValueId,
    pub dimension_id: Option<DimensionId>,
    pub dimension_name: Option<String>,
    pub value: String,
    pub active: bool,
}

impl VariantOption {
    pub fn dimension_label(&self) -> &str {
        self.dimension_name.as_deref().unwrap_or(DEFAULT_DIMENSION_LABEL)
    }
}

/// A saved SKU with a backend-assigned id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcreteVariant {
    pub id: VariantId,
    pub price: Decimal,
    pub old_price: Option<Decimal>,
    pub sku: String,
    pub stock: i32,
    pub options: Vec<VariantOption>,
}

impl ConcreteVariant {
    pub fn value_ids(&self) -> ValueIdSet { self.options.iter().map(|o| o.value_id).collect() }

    pub fn value_for(&self, dimension: &str) -> Option<&str> {
        self.options.iter().find(|o| o.dimension_label() == dimension).map(|o| o.value.as_str())
    }

    pub fn has_value(&self, dimension: &str, value: &str) -> bool {
        self.options.iter().any(|o| o.dimension_label() == dimension && o.value == value)
    }

    pub fn in_stock(&self) -> bool { self.stock > 0 }

    /// The matrix row this variant occupies when its product is edited.
    pub fn to_combination(&self) -> Combination {
        Combination { value_ids: self.value_ids(), price: self.price, old_price: self.old_price, sku: self.sku.clone(), stock: self.stock }
    }
}

impl From<ProductVariantResponse> for ConcreteVariant {
    fn from(r: ProductVariantResponse) -> Self {
        let options = r.product_variant_values.into_iter().map(|pvv| {
            let v = pvv.variant_value;
            VariantOption { value_id: v.id, dimension_id: v.variant_id, dimension_name: v.variant_name, value: v.value, active: v.status }
        }).collect();
        Self { id: r.id, price: r.price, old_price: r.old_price, sku: r.sku, stock: r.stock, options }
    }
}
