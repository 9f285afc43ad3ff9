//! Aggregates module
pub mod editor;
pub mod storefront;

pub use editor::{CapWarning, ProductVariantEditor};
pub use storefront::VariantPicker;
