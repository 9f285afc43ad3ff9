//! Product Variant Editor Aggregate
//!
//! Owns the admin form's variant state: the category, the dimensions available for
//! it, the admin's selection and the pricing/stock matrix. Every selection change runs
//! the generate -> reconcile pipeline.
//!
//! A product opened for editing with saved variants keeps its persisted matrix until
//! the admin changes the selection or the category; loading dimensions alone does not
//! rebuild it unless `reconcile_on_load` is set.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::domain::combination::ConcreteVariant;
use crate::domain::dimension::{find_dimension, normalize, SelectedDimensionSet, VariantDimension};
use crate::domain::events::{DomainEvent, VariantEvent};
use crate::domain::matrix::{BulkEdit, CellEdit, VariantMatrix};
use crate::domain::pipeline::{regenerate, selection_key};
use crate::domain::value_objects::{CategoryId, DimensionId, Sku, ValueId, ValueIdSet};
use crate::{ProductVariantRequest, RawVariant, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapWarning { pub requested: Option<usize>, pub cap: usize }

#[derive(Clone, Debug)]
pub struct ProductVariantEditor {
    id: Uuid,
    max_combinations: usize,
    category_id: Option<CategoryId>,
    available: Vec<VariantDimension>,
    selection: SelectedDimensionSet,
    matrix: VariantMatrix,
    last_key: Option<u64>,
    keep_persisted: bool,
    cap_warning: Option<CapWarning>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    events: Vec<DomainEvent>,
}

impl ProductVariantEditor {
    pub fn for_new_product(config: &EngineConfig) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(), max_combinations: config.max_combinations, category_id: None,
            available: vec![], selection: SelectedDimensionSet::new(), matrix: VariantMatrix::new(),
            last_key: None, keep_persisted: false, cap_warning: None,
            created_at: now, updated_at: now, events: vec![],
        }
    }

    /// Open a saved product. The selection is derived from the values its variants use.
    pub fn for_existing_product(config: &EngineConfig, category_id: CategoryId, persisted: &[ConcreteVariant]) -> Self {
        let mut editor = Self::for_new_product(config);
        editor.category_id = Some(category_id);
        editor.selection = SelectedDimensionSet::from_variants(persisted);
        editor.matrix = VariantMatrix::from_rows(persisted.iter().map(ConcreteVariant::to_combination));
        editor.keep_persisted = !persisted.is_empty() && !config.reconcile_on_load;
        editor
    }

    pub fn id(&self) -> Uuid { self.id }
    pub fn category_id(&self) -> Option<CategoryId> { self.category_id }
    pub fn available(&self) -> &[VariantDimension] { &self.available }
    pub fn selection(&self) -> &SelectedDimensionSet { &self.selection }
    pub fn matrix(&self) -> &VariantMatrix { &self.matrix }
    pub fn cap_warning(&self) -> Option<&CapWarning> { self.cap_warning.as_ref() }
    pub fn keeps_persisted_matrix(&self) -> bool { self.keep_persisted }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn updated_at(&self) -> DateTime<Utc> { self.updated_at }

    /// Display labels of a row's values, in dimension order. Inactive values stay visible.
    pub fn labels(&self, key: &ValueIdSet) -> Vec<String> {
        self.available.iter()
            .flat_map(|d| d.values.iter())
            .filter(|v| key.contains(v.id))
            .map(|v| if v.active { v.value.clone() } else { format!("{} (inactive)", v.value) })
            .collect()
    }

    /// Switch category. Selection, matrix and available dimensions reset; same category is a no-op.
    pub fn change_category(&mut self, category_id: Option<CategoryId>) {
        if self.category_id == category_id { return; }
        let from = self.category_id;
        self.category_id = category_id;
        self.available.clear();
        self.selection.clear();
        self.matrix = VariantMatrix::new();
        self.last_key = None;
        self.keep_persisted = false;
        self.cap_warning = None;
        self.raise_event(VariantEvent::CategoryChanged { from, to: category_id });
        self.touch();
    }

    /// Install the category's variant listing.
    pub fn load_dimensions(&mut self, raw: Vec<RawVariant>) {
        self.available = normalize(raw, self.category_id);
        self.refresh();
    }

    pub fn toggle_dimension(&mut self, dimension: DimensionId, on: bool) -> Result<()> {
        find_dimension(&self.available, dimension, None)?;
        let changed = if on { self.selection.turn_on(dimension) } else { self.selection.turn_off(dimension) };
        if changed { self.selection_changed(); }
        Ok(())
    }

    /// Check or uncheck one value. Checking a value turns its dimension on.
    pub fn toggle_value(&mut self, dimension: DimensionId, value: ValueId, checked: bool) -> Result<()> {
        find_dimension(&self.available, dimension, Some(value))?;
        let changed = if checked { self.selection.check(dimension, value) } else { self.selection.uncheck(dimension, value) };
        if changed { self.selection_changed(); }
        Ok(())
    }

    pub fn edit_cell(&mut self, key: &ValueIdSet, edit: CellEdit) -> Result<()> {
        self.matrix.edit(key, edit)?;
        self.raise_event(VariantEvent::CellEdited { value_ids: key.clone() });
        self.touch();
        Ok(())
    }

    pub fn bulk_apply(&mut self, edit: &BulkEdit) {
        self.matrix.bulk_apply(edit);
        self.raise_event(VariantEvent::BulkApplied { rows: self.matrix.len() });
        self.touch();
    }

    /// Derive SKUs for rows left blank, from the product SPU.
    pub fn fill_blank_skus(&mut self, spu: &str) -> Result<usize> {
        let spu = Sku::new(spu)?;
        let filled = self.matrix.fill_blank_skus(&spu)?;
        if filled > 0 { self.touch(); }
        Ok(filled)
    }

    /// The variant list to submit with the product.
    pub fn submit(&self) -> Result<Vec<ProductVariantRequest>> { self.matrix.to_requests() }

    pub fn take_events(&mut self) -> Vec<DomainEvent> { std::mem::take(&mut self.events) }

    fn selection_changed(&mut self) {
        self.keep_persisted = false;
        self.refresh();
    }

    fn refresh(&mut self) {
        if self.keep_persisted {
            tracing::debug!(editor = %self.id, rows = self.matrix.len(), "keeping persisted variant matrix");
            self.raise_event(VariantEvent::RegenerationSuppressed { rows: self.matrix.len() });
            return;
        }
        let key = selection_key(self.category_id, &self.available, &self.selection, &self.matrix);
        if self.last_key == Some(key) { return; }

        let run = regenerate(self.category_id, &self.available, &self.selection, &self.matrix, self.max_combinations);
        self.last_key = Some(run.key);
        self.cap_warning = run.capped.then_some(CapWarning { requested: run.requested, cap: self.max_combinations });
        if let Some(warning) = self.cap_warning.clone() {
            self.raise_event(VariantEvent::GenerationCapped { requested: warning.requested, cap: warning.cap });
        }
        let r = run.reconciliation;
        self.raise_event(VariantEvent::MatrixRegenerated { rows: r.matrix.len(), carried: r.carried, created: r.created, dropped: r.dropped });
        self.matrix = r.matrix;
        self.touch();
    }

    fn raise_event(&mut self, kind: VariantEvent) {
        self.events.push(DomainEvent { session_id: self.id, at: Utc::now(), kind });
    }

    fn touch(&mut self) { self.updated_at = Utc::now(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::combination::VariantOption;
    use crate::RawVariantValue;
    use rust_decimal::Decimal;

    // Color(1): Red=1, Blue=2, Green=3 (inactive). Size(2): S=10, M=11, L=12.
    fn listing() -> Vec<RawVariant> {
        let value = |id, value: &str, status| RawVariantValue { id, value: value.into(), variant_id: None, variant_name: None, status };
        vec![
            RawVariant { id: 1, name: "Color".into(), status: true, category_id: Some(5), category: None,
                variant_values: vec![value(1, "Red", true), value(2, "Blue", true), value(3, "Green", false)] },
            RawVariant { id: 2, name: "Size".into(), status: true, category_id: Some(5), category: None,
                variant_values: vec![value(10, "S", true), value(11, "M", true), value(12, "L", true)] },
        ]
    }

    fn new_editor(config: &EngineConfig) -> ProductVariantEditor {
        let mut editor = ProductVariantEditor::for_new_product(config);
        editor.change_category(Some(5));
        editor.load_dimensions(listing());
        editor
    }

    fn check_all(editor: &mut ProductVariantEditor) {
        for (d, v) in [(1, 1), (1, 2), (2, 10), (2, 11), (2, 12)] { editor.toggle_value(d, v, true).unwrap(); }
    }

    fn saved(id: u64, price: i64, values: &[(u64, u64, &str)]) -> ConcreteVariant {
        ConcreteVariant {
            id, price: Decimal::from(price), old_price: None, sku: format!("SAVED-{id}"), stock: 9,
            options: values.iter().map(|(vid, did, val)| VariantOption {
                value_id: *vid, dimension_id: Some(*did), dimension_name: None, value: (*val).into(), active: true,
            }).collect(),
        }
    }

    #[test]
    fn test_new_product_flow() {
        let mut editor = new_editor(&EngineConfig::default());
        assert!(editor.matrix().is_empty());
        check_all(&mut editor);
        assert_eq!(editor.matrix().len(), 6);

        let blue_m = ValueIdSet::new([2, 11]);
        editor.edit_cell(&blue_m, CellEdit::Price(Decimal::from(500_000))).unwrap();
        editor.toggle_value(2, 12, false).unwrap();
        assert_eq!(editor.matrix().len(), 4);
        assert_eq!(editor.matrix().get(&blue_m).unwrap().price, Decimal::from(500_000));
        assert_eq!(editor.labels(&blue_m), vec!["Blue".to_string(), "M".to_string()]);
    }

    #[test]
    fn test_dimension_with_no_values_contributes_nothing() {
        let mut editor = new_editor(&EngineConfig::default());
        editor.toggle_value(1, 1, true).unwrap();
        editor.toggle_dimension(2, true).unwrap();
        assert_eq!(editor.matrix().len(), 1);
        editor.toggle_dimension(1, false).unwrap();
        assert!(editor.matrix().is_empty());
    }

    #[test]
    fn test_inactive_value_never_starts_a_row() {
        let mut editor = new_editor(&EngineConfig::default());
        editor.toggle_value(1, 3, true).unwrap();
        assert!(editor.matrix().is_empty());
        editor.toggle_value(2, 10, true).unwrap();
        let rows: Vec<_> = editor.matrix().iter().map(|r| r.value_ids.to_vec()).collect();
        assert_eq!(rows, vec![vec![10]]);
    }

    #[test]
    fn test_bulk_apply_then_submit() {
        let mut editor = new_editor(&EngineConfig::default());
        check_all(&mut editor);
        editor.bulk_apply(&BulkEdit { price: Decimal::from(99), stock: 2, sku: "".into() });
        assert!(editor.submit().is_err());
        assert_eq!(editor.fill_blank_skus("shirt").unwrap(), 6);
        let submitted = editor.submit().unwrap();
        assert_eq!(submitted.len(), 6);
        assert_eq!(submitted[0].sku, "SHIRT-1-10");
        assert!(submitted.iter().all(|r| r.price == Decimal::from(99) && r.stock == 2));
    }

    #[test]
    fn test_cap_surfaces_warning() {
        let config = EngineConfig { max_combinations: 4, ..EngineConfig::default() };
        let mut editor = new_editor(&config);
        check_all(&mut editor);
        assert_eq!(editor.matrix().len(), 4);
        assert_eq!(editor.cap_warning(), Some(&CapWarning { requested: Some(6), cap: 4 }));
        let events = editor.take_events();
        assert!(events.iter().any(|e| matches!(e.kind, VariantEvent::GenerationCapped { cap: 4, .. })));
    }

    #[test]
    fn test_change_category_resets_state() {
        let mut editor = new_editor(&EngineConfig::default());
        check_all(&mut editor);
        editor.change_category(Some(5));
        assert_eq!(editor.matrix().len(), 6);
        editor.change_category(Some(6));
        assert!(editor.matrix().is_empty());
        assert!(editor.selection().is_empty());
        assert!(editor.available().is_empty());
    }

    #[test]
    fn test_unknown_dimension_or_value() {
        let mut editor = new_editor(&EngineConfig::default());
        assert!(editor.toggle_dimension(42, true).is_err());
        assert!(editor.toggle_value(1, 10, true).is_err());
        assert!(editor.edit_cell(&ValueIdSet::new([1]), CellEdit::Stock(1)).is_err());
    }

    // Saved catalog covers only two of the six Color x Size combinations.
    fn sparse_catalog() -> Vec<ConcreteVariant> {
        vec![saved(100, 700, &[(1, 1, "Red"), (10, 2, "S")]), saved(101, 800, &[(2, 1, "Blue"), (11, 2, "M")])]
    }

    #[test]
    fn test_edit_mode_keeps_persisted_matrix_on_load() {
        let persisted = sparse_catalog();
        let mut editor = ProductVariantEditor::for_existing_product(&EngineConfig::default(), 5, &persisted);
        editor.load_dimensions(listing());
        assert!(editor.keeps_persisted_matrix());
        assert_eq!(editor.matrix().len(), 2);
        assert_eq!(editor.matrix().get(&ValueIdSet::new([1, 10])).unwrap().sku, "SAVED-100");
        assert!(editor.take_events().iter().any(|e| matches!(e.kind, VariantEvent::RegenerationSuppressed { rows: 2 })));
    }

    #[test]
    fn test_edit_mode_rebuilds_after_admin_change() {
        let persisted = sparse_catalog();
        let mut editor = ProductVariantEditor::for_existing_product(&EngineConfig::default(), 5, &persisted);
        editor.load_dimensions(listing());
        editor.toggle_value(2, 12, true).unwrap();
        assert!(!editor.keeps_persisted_matrix());
        // {Red, Blue} x {S, M, L}
        assert_eq!(editor.matrix().len(), 6);
        let red_s = editor.matrix().get(&ValueIdSet::new([1, 10])).unwrap();
        assert_eq!((red_s.price, red_s.sku.as_str()), (Decimal::from(700), "SAVED-100"));
        assert_eq!(editor.matrix().get(&ValueIdSet::new([1, 12])).unwrap().price, Decimal::ZERO);
    }

    #[test]
    fn test_edit_mode_ignores_toggles_that_change_nothing() {
        let persisted = sparse_catalog();
        let mut editor = ProductVariantEditor::for_existing_product(&EngineConfig::default(), 5, &persisted);
        editor.load_dimensions(listing());
        let before = editor.selection().clone();
        editor.toggle_value(2, 12, false).unwrap();
        editor.toggle_value(1, 1, true).unwrap();
        editor.toggle_dimension(2, true).unwrap();
        assert_eq!(editor.selection(), &before);
        assert!(editor.keeps_persisted_matrix());
        assert_eq!(editor.matrix().len(), 2);
        assert_eq!(editor.matrix().get(&ValueIdSet::new([2, 11])).unwrap().sku, "SAVED-101");
    }

    #[test]
    fn test_edit_mode_reconciles_on_load_when_configured() {
        let config = EngineConfig { reconcile_on_load: true, ..EngineConfig::default() };
        let persisted = sparse_catalog();
        let mut editor = ProductVariantEditor::for_existing_product(&config, 5, &persisted);
        editor.load_dimensions(listing());
        assert!(!editor.keeps_persisted_matrix());
        // {Red, Blue} x {S, M}: saved rows carried, the two gaps filled with defaults.
        assert_eq!(editor.matrix().len(), 4);
        assert_eq!(editor.matrix().get(&ValueIdSet::new([2, 11])).unwrap().price, Decimal::from(800));
        assert_eq!(editor.matrix().get(&ValueIdSet::new([1, 11])).unwrap().sku, "");
    }

    #[test]
    fn test_saved_row_with_inactive_value_survives_regeneration() {
        let persisted = vec![saved(100, 700, &[(3, 1, "Green"), (10, 2, "S")])];
        let mut editor = ProductVariantEditor::for_existing_product(&EngineConfig::default(), 5, &persisted);
        editor.load_dimensions(listing());
        editor.toggle_value(2, 11, true).unwrap();
        // Green is inactive: (Green, S) is kept, (Green, M) is never created.
        assert_eq!(editor.matrix().len(), 1);
        assert_eq!(editor.matrix().get(&ValueIdSet::new([3, 10])).unwrap().price, Decimal::from(700));
        assert_eq!(editor.labels(&ValueIdSet::new([3, 10])), vec!["Green (inactive)".to_string(), "S".to_string()]);
    }

    #[test]
    fn test_reloading_same_dimensions_is_memoized() {
        let mut editor = new_editor(&EngineConfig::default());
        check_all(&mut editor);
        editor.take_events();
        editor.load_dimensions(listing());
        assert!(editor.take_events().is_empty());
    }
}
