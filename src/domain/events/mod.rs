//! Domain events
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_objects::{CategoryId, ValueIdSet, VariantId};

#[derive(Clone, Debug)]
pub struct DomainEvent {
    pub session_id: Uuid,
    pub at: DateTime<Utc>,
    pub kind: VariantEvent,
}

#[derive(Clone, Debug, PartialEq)]
pub enum VariantEvent {
    CategoryChanged { from: Option<CategoryId>, to: Option<CategoryId> },
    MatrixRegenerated { rows: usize, carried: usize, created: usize, dropped: usize },
    RegenerationSuppressed { rows: usize },
    GenerationCapped { requested: Option<usize>, cap: usize },
    CellEdited { value_ids: ValueIdSet },
    BulkApplied { rows: usize },
    SelectionMatched { variant_id: Option<VariantId>, provisional: bool },
}
