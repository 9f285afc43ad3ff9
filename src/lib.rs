//! OpenSASE Variants
//!
//! Product variant combination engine shared by the admin product editor and the
//! storefront product page.
//!
//! ## Features
//! - Variant dimension normalization
//! - Cartesian combination generation with a size cap
//! - Matrix reconciliation that keeps per-row edits across regenerations
//! - Bulk price/stock/SKU editing
//! - Storefront selection matching

pub mod api;
pub mod config;
pub mod domain;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::domain::value_objects::{CategoryId, DimensionId, SkuError, ValueId, ValueIdSet, VariantId};

// =============================================================================
// Core Types
// =============================================================================

/// Variant dimension as returned by the category variant listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariant {
    pub id: DimensionId,
    pub name: String,
    #[serde(default = "default_status")]
    pub status: bool,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub variant_values: Vec<RawVariantValue>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawVariantValue {
    pub id: ValueId,
    pub value: String,
    #[serde(default)]
    pub variant_id: Option<DimensionId>,
    #[serde(default)]
    pub variant_name: Option<String>,
    #[serde(default = "default_status")]
    pub status: bool,
}

fn default_status() -> bool { true }

/// One row of the submitted variant list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariantRequest {
    #[validate(custom = "non_negative")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom = "non_negative")]
    pub old_price: Option<Decimal>,
    #[validate(custom = "not_blank")]
    pub sku: String,
    #[validate(range(min = 0))]
    pub stock: i32,
    #[validate(length(min = 1))]
    pub variant_value_ids: Vec<ValueId>,
}

/// Persisted variant as returned with a product.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariantResponse {
    pub id: VariantId,
    pub price: Decimal,
    #[serde(default)]
    pub old_price: Option<Decimal>,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub product_variant_values: Vec<ProductVariantValueResponse>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariantValueResponse {
    #[serde(default)]
    pub id: Option<u64>,
    pub variant_value: RawVariantValue,
}

fn non_negative(value: &Decimal) -> std::result::Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative"));
    }
    Ok(())
}

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown combination row {0}")]
    UnknownRow(ValueIdSet),

    #[error("Unknown variant dimension {0}")]
    UnknownDimension(DimensionId),

    #[error("Value {value} does not belong to dimension {dimension}")]
    UnknownValue { dimension: DimensionId, value: ValueId },

    #[error("Variant row {index} is invalid: {source}")]
    InvalidVariant {
        index: usize,
        #[source]
        source: validator::ValidationErrors,
    },

    #[error("Invalid SKU: {0}")]
    Sku(#[from] SkuError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
