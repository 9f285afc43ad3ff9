//! Storefront Variant Picker
//!
//! Tracks a shopper's option choices on a product page and which saved variant they
//! resolve to. No match means nothing can be bought and no price is shown.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::combination::ConcreteVariant;
use crate::domain::events::{DomainEvent, VariantEvent};
use crate::domain::matcher::{default_selection, find_matching_index, option_groups, OptionGroup, Selection};
use crate::domain::value_objects::VariantId;

#[derive(Clone, Debug)]
pub struct VariantPicker {
    id: Uuid,
    variants: Vec<ConcreteVariant>,
    groups: Vec<OptionGroup>,
    selection: Selection,
    matched: Option<usize>,
    events: Vec<DomainEvent>,
}

impl VariantPicker {
    /// Start with the first value of every option group selected.
    pub fn new(variants: Vec<ConcreteVariant>) -> Self {
        let groups = option_groups(&variants);
        let selection = default_selection(&groups);
        let mut picker = Self { id: Uuid::new_v4(), variants, groups, selection, matched: None, events: vec![] };
        picker.rematch();
        picker
    }

    pub fn groups(&self) -> &[OptionGroup] { &self.groups }
    pub fn selection(&self) -> &Selection { &self.selection }
    pub fn current(&self) -> Option<&ConcreteVariant> { self.matched.map(|i| &self.variants[i]) }

    pub fn select(&mut self, dimension: &str, value: &str) -> Option<&ConcreteVariant> {
        self.selection.select(dimension, value);
        self.rematch();
        self.current()
    }

    pub fn clear(&mut self, dimension: &str) -> Option<&ConcreteVariant> {
        self.selection.clear(dimension);
        self.rematch();
        self.current()
    }

    /// True when a variant matched but some option group has nothing chosen.
    pub fn is_provisional(&self) -> bool {
        self.matched.is_some() && self.groups.iter().any(|g| self.selection.get(&g.name).is_none())
    }

    /// Variant id handed to cart-add and buy-now; `None` disables both.
    pub fn purchase_target(&self) -> Option<VariantId> { self.current().map(|v| v.id) }

    pub fn display_price(&self) -> Option<Decimal> { self.current().map(|v| v.price) }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn rematch(&mut self) {
        self.matched = find_matching_index(&self.variants, &self.selection);
        let kind = VariantEvent::SelectionMatched { variant_id: self.purchase_target(), provisional: self.is_provisional() };
        self.events.push(DomainEvent { session_id: self.id, at: chrono::Utc::now(), kind });
    }
}
