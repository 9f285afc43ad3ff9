//! Matrix reconciler
//!
//! Merges freshly generated combinations with the previous matrix. Rows are matched
//! by value-id identity; matched rows keep their price, old price, SKU and stock.

use std::collections::HashSet;

use crate::domain::combination::Combination;
use crate::domain::matrix::VariantMatrix;
use crate::domain::value_objects::ValueId;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconciliation {
    pub matrix: VariantMatrix,
    /// Rows carried over from the previous matrix.
    pub carried: usize,
    /// Rows initialized with defaults.
    pub created: usize,
    /// Previous rows with no counterpart in the new combinations.
    pub dropped: usize,
    /// New combinations skipped because they reference an inactive value.
    pub skipped_inactive: usize,
}

/// One output row per generated combination, in generation order.
///
/// A combination touching an `inactive` value is only kept when the previous matrix
/// already had it; inactive values never start new rows.
pub fn reconcile(generated: Vec<Combination>, previous: &VariantMatrix, inactive: &HashSet<ValueId>) -> Reconciliation {
    let mut out = Reconciliation::default();
    let mut rows = Vec::with_capacity(generated.len());
    for combination in generated {
        if let Some(existing) = previous.get(&combination.value_ids) {
            rows.push(existing.clone());
            out.carried += 1;
        } else if combination.value_ids.iter().any(|id| inactive.contains(&id)) {
            out.skipped_inactive += 1;
        } else {
            rows.push(combination);
            out.created += 1;
        }
    }
    out.matrix = VariantMatrix::from_rows(rows);
    out.dropped = previous.len().saturating_sub(out.carried);
    out
}
