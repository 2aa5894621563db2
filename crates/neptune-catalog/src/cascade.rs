//! Cascade handlers operating on a single row.
//!
//! Each handler completes synchronously and reports which fields changed, so
//! the caller can log events and trigger follow-up work (identifier lookups,
//! discount recomputation).

use serde::{Deserialize, Serialize};

use crate::field::CascadeField;
use crate::index::CatalogIndex;
use crate::option::SelectOption;
use crate::request::LookupKey;
use crate::row::{CostType, PurchaseType, RowField, SelectionRow};

/// A serial or lot identifier available for a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceItem {
    #[serde(default)]
    pub id: Option<i64>,
    pub identifier: String,
    #[serde(default)]
    pub cost_type: Option<u8>,
}

impl DeviceItem {
    /// Option tagged with the item's cost type under the `cost` attribute.
    pub fn to_option(&self) -> SelectOption {
        let option = SelectOption::named(self.identifier.clone());
        match self.cost_type {
            Some(cost) => option.with_attribute("cost", cost),
            None => option,
        }
    }
}

/// Outcome of a purchase type or device change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierUpdate {
    /// Identifier options must be fetched for this key.
    Lookup(LookupKey),
    /// Identifier options were settled locally; these fields changed.
    Settled(Vec<RowField>),
}

/// Set `field` to `value` and re-derive every descendant, nearest first.
///
/// Descendants keep their value while it is still offered under the new
/// ancestors and are cleared otherwise. Returns the fields whose value
/// changed.
pub fn on_ancestor_change(
    row: &mut SelectionRow,
    index: &CatalogIndex,
    field: CascadeField,
    value: Option<String>,
) -> Vec<RowField> {
    let mut changed = Vec::new();
    if row.field_mut(field).set_value(value) {
        changed.push(field.into());
    }
    for &descendant in field.descendants() {
        let options = index.options_for(descendant, row.ancestors());
        if row.field_mut(descendant).set_options(options) {
            changed.push(descendant.into());
        }
    }
    if !changed.is_empty() {
        tracing::debug!(row = %row.id(), %field, ?changed, "Cascade applied");
    }
    changed
}

/// Re-derive the identifier options after the purchase type or device
/// changed.
///
/// Bulk rows with a device need a remote lookup; everything else settles
/// here and runs [`on_identifier_change`].
pub fn on_purchase_type_or_device_change(row: &mut SelectionRow) -> IdentifierUpdate {
    if row.purchase_type == PurchaseType::Bulk {
        if let Some(device_id) = row.device_id() {
            return IdentifierUpdate::Lookup(LookupKey::Items {
                device_id,
                purchase_type: PurchaseType::Bulk,
            });
        }
        return IdentifierUpdate::Settled(settle_identifier(row, Vec::new()));
    }

    let typed = row.identifier.value().unwrap_or_default().to_string();
    IdentifierUpdate::Settled(settle_identifier(row, vec![SelectOption::named(typed)]))
}

/// Install fetched identifier options on a bulk row.
pub fn apply_identifier_items(row: &mut SelectionRow, items: &[DeviceItem]) -> Vec<RowField> {
    let options = items.iter().map(DeviceItem::to_option).collect();
    settle_identifier(row, options)
}

fn settle_identifier(row: &mut SelectionRow, options: Vec<SelectOption>) -> Vec<RowField> {
    let mut changed = Vec::new();
    if row.identifier.set_options(options) {
        changed.push(RowField::Identifier);
    }
    on_identifier_change(row);
    changed.push(RowField::CostType);
    changed
}

/// Derive the cost type from the selected identifier.
///
/// The identifier's `cost` attribute wins; otherwise [`CostType::FALLBACK`].
/// The caller reports a cost type change event after this runs, whether or
/// not the value moved.
pub fn on_identifier_change(row: &mut SelectionRow) -> CostType {
    let cost_type = row
        .identifier
        .selected()
        .and_then(|option| option.attribute("cost"))
        .and_then(|code| code.parse().ok())
        .and_then(CostType::from_code)
        .unwrap_or(CostType::FALLBACK);
    row.cost_type = cost_type;
    cost_type
}

/// Re-derive every cascade level against a rebuilt index, root first.
pub fn reconcile_row(row: &mut SelectionRow, index: &CatalogIndex) -> Vec<RowField> {
    let mut changed = Vec::new();
    for field in CascadeField::CHAIN {
        let options = index.options_for(field, row.ancestors());
        if row.field_mut(field).set_options(options) {
            changed.push(field.into());
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{DeviceRecord, build_catalog_index};
    use crate::row::RowId;

    fn record(id: i64, specialty: &str, category: &str, manufacturer: &str) -> DeviceRecord {
        DeviceRecord {
            id,
            name: format!("device {id}"),
            specialty: Some(specialty.to_string()),
            category: Some(category.to_string()),
            manufacturer: Some(manufacturer.to_string()),
            product: Some(id * 10),
        }
    }

    fn catalog() -> CatalogIndex {
        build_catalog_index(&[
            record(1, "Cardiac", "Lead", "Medtronic"),
            record(2, "Cardiac", "Lead", "Abbott"),
            record(3, "Cardiac", "Valve", "Medtronic"),
            record(4, "Ortho", "Knee", "Stryker"),
        ])
    }

    fn select_path(row: &mut SelectionRow, index: &CatalogIndex, path: [&str; 4]) {
        for (field, value) in CascadeField::CHAIN.into_iter().zip(path) {
            on_ancestor_change(row, index, field, Some(value.to_string()));
        }
    }

    #[test]
    fn test_specialty_change_clears_everything_below() {
        let index = catalog();
        let mut row = SelectionRow::new(RowId(0), &index);
        select_path(&mut row, &index, ["Cardiac", "Lead", "Medtronic", "1"]);

        let changed = on_ancestor_change(
            &mut row,
            &index,
            CascadeField::Specialty,
            Some("Ortho".to_string()),
        );

        assert_eq!(
            changed,
            [
                RowField::Specialty,
                RowField::Category,
                RowField::Manufacturer,
                RowField::Device
            ]
        );
        assert_eq!(row.category.value(), None);
        assert_eq!(row.manufacturer.value(), None);
        assert_eq!(row.device.value(), None);
        assert_eq!(row.category.options(), [SelectOption::named("Knee")]);
        assert!(row.manufacturer.options().is_empty());
    }

    #[test]
    fn test_still_offered_descendant_is_kept() {
        let index = catalog();
        let mut row = SelectionRow::new(RowId(0), &index);
        select_path(&mut row, &index, ["Cardiac", "Lead", "Medtronic", "1"]);

        let changed = on_ancestor_change(
            &mut row,
            &index,
            CascadeField::Category,
            Some("Valve".to_string()),
        );

        assert_eq!(row.manufacturer.value(), Some("Medtronic"));
        assert_eq!(row.device.value(), None);
        assert_eq!(changed, [RowField::Category, RowField::Device]);
    }

    #[test]
    fn test_bulk_with_device_requests_lookup() {
        let index = catalog();
        let mut row = SelectionRow::new(RowId(0), &index);
        select_path(&mut row, &index, ["Cardiac", "Lead", "Medtronic", "1"]);

        assert_eq!(
            on_purchase_type_or_device_change(&mut row),
            IdentifierUpdate::Lookup(LookupKey::Items {
                device_id: 1,
                purchase_type: PurchaseType::Bulk
            })
        );
    }

    #[test]
    fn test_bulk_without_device_empties_identifiers() {
        let index = catalog();
        let mut row = SelectionRow::new(RowId(0), &index);
        row.identifier.set_options(vec![SelectOption::named("SN9")]);
        row.identifier.set_value(Some("SN9".to_string()));
        row.cost_type = CostType::System;

        let update = on_purchase_type_or_device_change(&mut row);

        assert_eq!(
            update,
            IdentifierUpdate::Settled(vec![RowField::Identifier, RowField::CostType])
        );
        assert!(row.identifier.options().is_empty());
        assert_eq!(row.cost_type, CostType::Unit);
    }

    #[test]
    fn test_consignment_folds_typed_identifier() {
        let index = catalog();
        let mut row = SelectionRow::new(RowId(0), &index);
        row.purchase_type = PurchaseType::Consignment;
        row.identifier.set_value(Some("LOT-77".to_string()));

        on_purchase_type_or_device_change(&mut row);

        assert_eq!(row.identifier.options(), [SelectOption::named("LOT-77")]);
        assert_eq!(row.identifier.value(), Some("LOT-77"));
        assert_eq!(row.cost_type, CostType::FALLBACK);
    }

    #[test]
    fn test_consignment_without_identifier_offers_empty_option() {
        let index = catalog();
        let mut row = SelectionRow::new(RowId(0), &index);
        row.purchase_type = PurchaseType::Consignment;

        on_purchase_type_or_device_change(&mut row);

        assert_eq!(row.identifier.options(), [SelectOption::named("")]);
        assert_eq!(row.identifier.value(), None);
    }

    #[test]
    fn test_identifier_cost_type() {
        let index = catalog();
        let mut row = SelectionRow::new(RowId(0), &index);
        apply_identifier_items(
            &mut row,
            &[DeviceItem {
                id: None,
                identifier: "SN1".to_string(),
                cost_type: Some(2),
            }],
        );
        assert_eq!(
            row.identifier.options(),
            [SelectOption::named("SN1").with_attribute("cost", 2)]
        );

        row.identifier.set_value(Some("SN1".to_string()));
        assert_eq!(on_identifier_change(&mut row), CostType::System);

        row.identifier.set_value(None);
        assert_eq!(on_identifier_change(&mut row), CostType::Unit);
    }

    #[test]
    fn test_reconcile_clears_vanished_values() {
        let index = catalog();
        let mut row = SelectionRow::new(RowId(0), &index);
        select_path(&mut row, &index, ["Cardiac", "Lead", "Abbott", "2"]);

        let rebuilt = build_catalog_index(&[record(1, "Cardiac", "Lead", "Medtronic")]);
        let changed = reconcile_row(&mut row, &rebuilt);

        assert_eq!(changed, [RowField::Manufacturer, RowField::Device]);
        assert_eq!(row.category.value(), Some("Lead"));
        assert_eq!(row.manufacturer.value(), None);
        assert_eq!(
            row.manufacturer.options(),
            [SelectOption::named("Medtronic")]
        );
    }
}
