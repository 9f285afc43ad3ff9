//! selection -> generate -> reconcile -> matrix

use crate::domain::dimension::{inactive_values, resolve, SelectedDimensionSet, VariantDimension};
use crate::domain::generator::{generate, generation_key};
use crate::domain::matrix::VariantMatrix;
use crate::domain::reconciler::{reconcile, Reconciliation};
use crate::domain::value_objects::CategoryId;

#[derive(Clone, Debug, PartialEq)]
pub struct Regeneration {
    pub key: u64,
    pub reconciliation: Reconciliation,
    pub requested: Option<usize>,
    pub capped: bool,
}

/// Structural key of the generator input for this selection and matrix.
pub fn selection_key(
    category_id: Option<CategoryId>,
    available: &[VariantDimension],
    selection: &SelectedDimensionSet,
    previous: &VariantMatrix,
) -> u64 {
    let dimensions = resolve(available, selection, &previous.referenced_values());
    generation_key(category_id, &dimensions)
}

pub fn regenerate(
    category_id: Option<CategoryId>,
    available: &[VariantDimension],
    selection: &SelectedDimensionSet,
    previous: &VariantMatrix,
    max_combinations: usize,
) -> Regeneration {
    let dimensions = resolve(available, selection, &previous.referenced_values());
    let key = generation_key(category_id, &dimensions);
    let generation = generate(&dimensions, max_combinations);
    let reconciliation = reconcile(generation.combinations, previous, &inactive_values(available));
    tracing::debug!(
        dimensions = dimensions.len(),
        rows = reconciliation.matrix.len(),
        carried = reconciliation.carried,
        created = reconciliation.created,
        dropped = reconciliation.dropped,
        "variant matrix regenerated"
    );
    Regeneration { key, reconciliation, requested: generation.requested, capped: generation.capped }
}
