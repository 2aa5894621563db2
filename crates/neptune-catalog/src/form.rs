//! Rep-case entry form state.
//!
//! `EntryForm` owns everything one form needs: the catalog index, the
//! discount table, its rows, owner selects and the lookup tracker. Every
//! mutation goes through `&mut self`, so a cascade always finishes before the
//! next one starts. Field changes are queued as [`FieldChanged`] events for
//! the caller to drain.
//!
//! Remote lookups are split in two halves. Operations that need one return a
//! [`LookupTicket`]; the caller fetches and hands the result back with the
//! ticket. Stale tickets are dropped on completion.

use std::collections::BTreeMap;

use crate::accounts::{AccountRecord, OwnerSelection};
use crate::api::CatalogApi;
use crate::cascade::{
    DeviceItem, IdentifierUpdate, apply_identifier_items, on_ancestor_change,
    on_identifier_change, on_purchase_type_or_device_change, reconcile_row,
};
use crate::discount::DiscountTable;
use crate::error::{FormError, LookupError, Result};
use crate::field::CascadeField;
use crate::index::{CatalogIndex, build_catalog_index};
use crate::option::{SelectField, SelectOption};
use crate::request::{LookupKey, LookupSlot, LookupTicket, RequestTracker};
use crate::row::{CostType, FieldChanged, PurchaseType, RowField, RowId, SelectionRow};

/// State of one rep-case entry form.
#[derive(Debug, Clone)]
pub struct EntryForm {
    client_id: i64,
    index: CatalogIndex,
    discounts: DiscountTable,
    rows: BTreeMap<RowId, SelectionRow>,
    next_row: u32,
    owners: OwnerSelection,
    owner_client: Option<i64>,
    requests: RequestTracker,
    events: Vec<FieldChanged>,
}

impl EntryForm {
    pub fn new(client_id: i64, index: CatalogIndex, discounts: DiscountTable) -> Self {
        Self {
            client_id,
            index,
            discounts,
            rows: BTreeMap::new(),
            next_row: 0,
            owners: OwnerSelection::default(),
            owner_client: None,
            requests: RequestTracker::new(),
            events: Vec::new(),
        }
    }

    /// Fetch the client's devices and discounts and build an empty form.
    ///
    /// A failed lookup leaves that part empty; the form is still usable.
    pub async fn load<A: CatalogApi>(api: &A, client_id: i64) -> Self {
        let records = api.devices_for_client(client_id).await.unwrap_or_else(|error| {
            tracing::warn!(client_id, %error, "Device lookup failed");
            Vec::new()
        });
        let discounts = api.discounts_for_client(client_id).await.unwrap_or_else(|error| {
            tracing::warn!(client_id, %error, "Discount lookup failed");
            Vec::new()
        });

        let index = build_catalog_index(&records);
        let discounts = DiscountTable::from_products(discounts);
        tracing::info!(
            client_id,
            devices = index.device_count(),
            "Entry form loaded"
        );
        Self::new(client_id, index, discounts)
    }

    pub fn client_id(&self) -> i64 {
        self.client_id
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    pub fn discounts(&self) -> &DiscountTable {
        &self.discounts
    }

    pub fn rows(&self) -> impl Iterator<Item = &SelectionRow> {
        self.rows.values()
    }

    pub fn row(&self, id: RowId) -> Option<&SelectionRow> {
        self.rows.get(&id)
    }

    pub fn owners(&self) -> &OwnerSelection {
        &self.owners
    }

    /// Append a blank row.
    pub fn add_row(&mut self) -> RowId {
        let id = RowId(self.next_row);
        self.next_row += 1;
        self.rows.insert(id, SelectionRow::new(id, &self.index));
        tracing::debug!(row = %id, "Row added");
        id
    }

    /// Remove a row and abandon its pending lookup.
    pub fn remove_row(&mut self, id: RowId) -> Option<SelectionRow> {
        let removed = self.rows.remove(&id)?;
        self.requests.cancel(LookupSlot::Identifier(id));
        tracing::debug!(row = %id, "Row removed");
        Some(removed)
    }

    /// Select a cascade value and re-derive everything that depends on it.
    ///
    /// `None` or an empty string clears the field. Any other value must be
    /// one of the field's current options.
    pub fn select(
        &mut self,
        row: RowId,
        field: CascadeField,
        value: Option<String>,
    ) -> Result<Option<LookupTicket>> {
        let index = &self.index;
        let selection = self.rows.get_mut(&row).ok_or(FormError::UnknownRow(row))?;
        check_offered(row, field.into(), selection.field(field), value.as_deref())?;
        let changed = on_ancestor_change(selection, index, field, value);
        Ok(self.settle(row, changed))
    }

    pub fn set_purchase_type(
        &mut self,
        row: RowId,
        purchase_type: PurchaseType,
    ) -> Result<Option<LookupTicket>> {
        self.row_mut(row)?.purchase_type = purchase_type;
        Ok(self.settle(row, vec![RowField::PurchaseType]))
    }

    /// Choose an identifier. Bulk rows only accept an offered identifier; on
    /// consignment rows the typed value becomes the only option.
    pub fn set_identifier(&mut self, row: RowId, value: Option<String>) -> Result<()> {
        let selection = self.row_mut(row)?;
        if selection.purchase_type == PurchaseType::Bulk {
            check_offered(row, RowField::Identifier, &selection.identifier, value.as_deref())?;
        } else {
            let typed = value.clone().unwrap_or_default();
            selection.identifier.set_options(vec![SelectOption::named(typed)]);
        }
        let mut changed = Vec::new();
        if selection.identifier.set_value(value) {
            changed.push(RowField::Identifier);
        }
        on_identifier_change(selection);
        changed.push(RowField::CostType);
        self.settle(row, changed);
        Ok(())
    }

    pub fn set_cost_type(&mut self, row: RowId, cost_type: CostType) -> Result<()> {
        self.row_mut(row)?.cost_type = cost_type;
        self.settle(row, vec![RowField::CostType]);
        Ok(())
    }

    /// Select discounts by id; ids not offered for the row are ignored.
    pub fn set_discounts<I, V>(&mut self, row: RowId, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        if self.row_mut(row)?.discounts.set_values(ids) {
            self.events.push(FieldChanged {
                row,
                field: RowField::Discounts,
            });
        }
        Ok(())
    }

    /// Issue an identifier lookup for a bulk row with a device.
    pub fn begin_identifier_lookup(&mut self, row: RowId) -> Result<Option<LookupTicket>> {
        let key = current_items_key(self.row_mut(row)?);
        Ok(key.map(|key| self.requests.issue(LookupSlot::Identifier(row), key)))
    }

    /// Apply a finished identifier lookup.
    ///
    /// Returns `false` when the ticket is stale or the row moved on since it
    /// was issued. A failed lookup leaves the row with no identifiers.
    pub fn complete_identifier_lookup(
        &mut self,
        ticket: LookupTicket,
        result: std::result::Result<Vec<DeviceItem>, LookupError>,
    ) -> bool {
        let Some(row) = ticket.row() else {
            return false;
        };
        if !self.requests.is_latest(&ticket) {
            tracing::debug!(
                row = %row,
                generation = ticket.generation,
                "Stale identifier lookup discarded"
            );
            return false;
        }
        let Some(selection) = self.rows.get_mut(&row) else {
            return false;
        };
        if current_items_key(selection) != Some(ticket.key) {
            tracing::debug!(row = %row, "Row changed since identifier lookup, discarded");
            return false;
        }

        let items = result.unwrap_or_else(|error| {
            tracing::warn!(row = %row, %error, "Identifier lookup failed");
            Vec::new()
        });
        let changed = apply_identifier_items(selection, &items);
        self.settle(row, changed);
        true
    }

    /// Fetch and apply identifier options for one row.
    pub async fn refresh_identifiers<A: CatalogApi>(
        &mut self,
        api: &A,
        row: RowId,
    ) -> Result<bool> {
        let Some(ticket) = self.begin_identifier_lookup(row)? else {
            return Ok(false);
        };
        Ok(self.run_lookup(api, ticket).await)
    }

    /// Perform the fetch a ticket describes and apply the result.
    pub async fn run_lookup<A: CatalogApi>(&mut self, api: &A, ticket: LookupTicket) -> bool {
        match ticket.key {
            LookupKey::Items { device_id, .. } => {
                let result = api.items_for_device(device_id).await;
                self.complete_identifier_lookup(ticket, result)
            }
            LookupKey::Accounts { client_id } => {
                let result = api.accounts_for_client(client_id).await;
                self.complete_owner_lookup(ticket, result)
            }
        }
    }

    /// Point the owner selects at a client. Without a client they are
    /// cleared and no lookup is needed.
    pub fn begin_owner_lookup(&mut self, client_id: Option<i64>) -> Option<LookupTicket> {
        self.owner_client = client_id;
        let Some(client_id) = client_id else {
            self.requests.cancel(LookupSlot::Accounts);
            self.owners.update(None, &[]);
            return None;
        };
        Some(
            self.requests
                .issue(LookupSlot::Accounts, LookupKey::Accounts { client_id }),
        )
    }

    pub fn complete_owner_lookup(
        &mut self,
        ticket: LookupTicket,
        result: std::result::Result<Vec<AccountRecord>, LookupError>,
    ) -> bool {
        let LookupKey::Accounts { client_id } = ticket.key else {
            return false;
        };
        if !self.requests.is_latest(&ticket) || self.owner_client != Some(client_id) {
            tracing::debug!(client_id, "Stale account lookup discarded");
            return false;
        }
        let accounts = result.unwrap_or_else(|error| {
            tracing::warn!(client_id, %error, "Account lookup failed");
            Vec::new()
        });
        self.owners.update(Some(client_id), &accounts);
        true
    }

    /// Swap in a rebuilt catalog and reconcile every row against it.
    ///
    /// Returns the tickets of identifier lookups the reconciliation needs.
    pub fn replace_catalog(&mut self, index: CatalogIndex) -> Vec<LookupTicket> {
        self.index = index;
        let ids: Vec<RowId> = self.rows.keys().copied().collect();
        let mut tickets = Vec::new();
        for id in ids {
            let Some(selection) = self.rows.get_mut(&id) else {
                continue;
            };
            let changed = reconcile_row(selection, &self.index);
            tickets.extend(self.settle(id, changed));
        }
        tracing::info!(devices = self.index.device_count(), "Catalog replaced");
        tickets
    }

    /// Swap in a new discount table and recompute every row's options.
    pub fn replace_discounts(&mut self, discounts: DiscountTable) {
        self.discounts = discounts;
        let ids: Vec<RowId> = self.rows.keys().copied().collect();
        for id in ids {
            self.refresh_discounts(id);
        }
    }

    /// Take all queued change events.
    pub fn drain_events(&mut self) -> Vec<FieldChanged> {
        std::mem::take(&mut self.events)
    }

    fn row_mut(&mut self, row: RowId) -> Result<&mut SelectionRow> {
        self.rows.get_mut(&row).ok_or(FormError::UnknownRow(row))
    }

    /// Run the follow-ups for `changed` and queue the events.
    fn settle(&mut self, row: RowId, mut changed: Vec<RowField>) -> Option<LookupTicket> {
        let mut ticket = None;

        if changed
            .iter()
            .any(|field| matches!(field, RowField::Device | RowField::PurchaseType))
            && let Some(selection) = self.rows.get_mut(&row)
        {
            let slot = LookupSlot::Identifier(row);
            match on_purchase_type_or_device_change(selection) {
                IdentifierUpdate::Lookup(key) => {
                    ticket = Some(self.requests.issue(slot, key));
                }
                IdentifierUpdate::Settled(more) => {
                    self.requests.cancel(slot);
                    changed.extend(more);
                }
            }
        }

        if changed
            .iter()
            .any(|field| matches!(field, RowField::Device | RowField::CostType))
            && self.refresh_discounts(row)
        {
            changed.push(RowField::Discounts);
        }

        self.events
            .extend(changed.into_iter().map(|field| FieldChanged { row, field }));
        ticket
    }

    fn refresh_discounts(&mut self, row: RowId) -> bool {
        let Some(selection) = self.rows.get_mut(&row) else {
            return false;
        };
        let options = self
            .discounts
            .options(selection.product_id(), selection.cost_type);
        selection.discounts.set_options(options)
    }
}

fn check_offered(
    row: RowId,
    field: RowField,
    select: &SelectField,
    value: Option<&str>,
) -> Result<()> {
    match value {
        Some(value) if !value.is_empty() && !select.offers(value) => Err(FormError::NotOffered {
            row,
            field,
            value: value.to_string(),
        }),
        _ => Ok(()),
    }
}

fn current_items_key(row: &SelectionRow) -> Option<LookupKey> {
    if row.purchase_type != PurchaseType::Bulk {
        return None;
    }
    row.device_id().map(|device_id| LookupKey::Items {
        device_id,
        purchase_type: row.purchase_type,
    })
}
